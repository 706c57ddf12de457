//! Error types for vine_atelier.
//!
//! Problems in the compiled source are reported as diagnostics on the
//! [`FileContext`](crate::FileContext). These errors cover host-facing
//! operations only.

use thiserror::Error;

/// Errors that can occur while reading compiler options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Options JSON could not be deserialized
    #[error("Invalid compiler options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while compiling a component style.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StyleCompileError {
    /// No style is registered under the scope id
    #[error("No vine style registered for scope id {0}")]
    UnknownScope(String),

    /// The style compiler rejected the source
    #[error("Failed to compile {lang} style: {message}")]
    Compile { lang: String, message: String },
}

//! Lifecycle hooks for hosting toolchains.
//!
//! Hooks fire in a fixed order for every compiled file:
//! `on_options_resolved` -> `on_bind_file_ctx` -> `on_validate_end` ->
//! `on_analysis_end`. The last one is skipped when the file fails
//! structural validation.

use crate::context::FileContext;
use crate::options::CompilerOptions;

/// Observers of the compilation pipeline. Every method defaults to a no-op.
pub trait CompilerHooks {
    fn on_options_resolved(&mut self, _options: &CompilerOptions) {}

    fn on_bind_file_ctx(&mut self, _file_ctx: &mut FileContext) {}

    fn on_validate_end(&mut self, _file_ctx: &mut FileContext) {}

    fn on_analysis_end(&mut self, _file_ctx: &mut FileContext) {}
}

/// Hooks that observe nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl CompilerHooks for NoopHooks {}

//! Compiler options.

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Options shared by every file compiled with one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Inline the compiled template into the setup function.
    pub inline_template: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            inline_template: true,
        }
    }
}

impl CompilerOptions {
    /// Read options passed by a host as JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert!(CompilerOptions::default().inline_template);
        assert_eq!(CompilerOptions::from_json("{}").unwrap(), CompilerOptions::default());
    }

    #[test]
    fn test_from_json() {
        let options = CompilerOptions::from_json(r#"{ "inlineTemplate": false }"#).unwrap();
        assert!(!options.inline_template);
    }

    #[test]
    fn test_invalid_json() {
        let err = CompilerOptions::from_json(r#"{ "inlineTemplate": "yes" }"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid compiler options"));
    }
}

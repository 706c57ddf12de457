//! Style scope correlation.
//!
//! Derives the scope id that ties a component to its `vineStyle` block and
//! the short hashes used for `v-bind()` CSS variables.

use memchr::{memchr, memmem};
use serde::Serialize;
use vine_carton::{hash_sum, CompactString, FxHashMap};

/// Style languages accepted by `vineStyle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleLang {
    #[default]
    Css,
    Scss,
    Sass,
    Less,
    Stylus,
    Postcss,
}

impl StyleLang {
    /// Resolve a tagged-template tag (`scss\`...\``).
    #[inline]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "css" => Some(Self::Css),
            "scss" => Some(Self::Scss),
            "sass" => Some(Self::Sass),
            "less" => Some(Self::Less),
            "stylus" => Some(Self::Stylus),
            "postcss" => Some(Self::Postcss),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Sass => "sass",
            Self::Less => "less",
            Self::Stylus => "stylus",
            Self::Postcss => "postcss",
        }
    }
}

impl std::fmt::Display for StyleLang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope id of a component: `hash_sum("<file_id>:<component>")`.
#[inline]
pub fn compute_scope_id(file_id: &str, component_name: &str) -> String {
    hash_sum(&format!("{file_id}:{component_name}"))
}

/// Hash of one `v-bind()` expression inside a component's style.
#[inline]
pub fn css_binding_hash(component_name: &str, expr: &str) -> String {
    hash_sum(&format!("{component_name}__{expr}"))
}

/// Expressions referenced by `v-bind()` in a style, in order of first use.
///
/// Surrounding whitespace and quotes are trimmed; an unterminated
/// `v-bind(` ends the scan.
pub fn extract_v_bind_expressions(css: &str) -> Vec<CompactString> {
    let bytes = css.as_bytes();
    let mut expressions: Vec<CompactString> = Vec::new();
    let mut pos = 0;

    while let Some(rel) = memmem::find(&bytes[pos..], b"v-bind(") {
        let start = pos + rel + "v-bind(".len();
        let Some(end) = memchr(b')', &bytes[start..]) else {
            break;
        };
        let expr = css[start..start + end]
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');
        if !expr.is_empty() && !expressions.iter().any(|e| e == expr) {
            expressions.push(CompactString::new(expr));
        }
        pos = start + end + 1;
    }

    expressions
}

/// `v-bind()` expression -> hash for one component's style.
pub fn css_bindings_for(component_name: &str, css: &str) -> FxHashMap<CompactString, String> {
    extract_v_bind_expressions(css)
        .into_iter()
        .map(|expr| {
            let hash = css_binding_hash(component_name, &expr);
            (expr, hash)
        })
        .collect()
}

//! Template compiler seam.
//!
//! Markup inside `vine` templates is compiled by an external template
//! compiler. Analysis only keeps its AST as an opaque JSON value and uses
//! the identifiers it reports to mark imports used in templates.

use vine_carton::{CompactString, FxHashMap, SourceRange};
use vine_croquis::BindingKind;

use crate::options::CompilerOptions;

/// What the template compiler receives for one component.
#[derive(Debug, Clone, Copy)]
pub struct TemplateInput<'i> {
    pub component_name: &'i str,
    /// Template text between the backticks.
    pub source: &'i str,
    pub range: SourceRange,
    pub bindings: &'i FxHashMap<CompactString, BindingKind>,
    pub options: &'i CompilerOptions,
}

/// Result of compiling one template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateOutput {
    /// Template AST, not interpreted by analysis.
    pub ast: serde_json::Value,
    /// Identifiers referenced by template expressions and component tags.
    pub referenced_identifiers: Vec<CompactString>,
}

/// Compiles the markup of a vine template.
pub trait TemplateCompiler: Send + Sync {
    fn compile(&self, input: TemplateInput<'_>) -> TemplateOutput;
}

/// Template compiler that produces no AST.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTemplateCompiler;

impl TemplateCompiler for NoopTemplateCompiler {
    fn compile(&self, _input: TemplateInput<'_>) -> TemplateOutput {
        TemplateOutput::default()
    }
}

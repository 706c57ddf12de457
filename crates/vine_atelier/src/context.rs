//! Compilation context and the per-file / per-component IR.

use serde::{Serialize, Serializer};
use vine_carton::{CompactString, FxHashMap, SourceRange};
use vine_croquis::ast::ExportKind;
use vine_croquis::{
    BindingKind, ImportRecord, PropMeta, StyleLang, ValidationOutcome, VineDiagnostic,
};

use crate::options::CompilerOptions;
use crate::template::{NoopTemplateCompiler, TemplateCompiler};

/// State threaded through every compile call of one host worker.
///
/// A context is used by one thread at a time. Parallel hosts give each
/// worker its own context and [`merge`](Self::merge) them afterwards.
pub struct CompilerContext {
    pub options: CompilerOptions,
    /// File id -> analysis result of the last compile of that file.
    pub file_ctx_map: FxHashMap<String, FileContext>,
    /// Every diagnostic reported through this context, in report order.
    pub diagnostics: Vec<VineDiagnostic>,
    template_compiler: Box<dyn TemplateCompiler>,
}

impl Default for CompilerContext {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl CompilerContext {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            file_ctx_map: FxHashMap::default(),
            diagnostics: Vec::new(),
            template_compiler: Box::new(NoopTemplateCompiler),
        }
    }

    /// Use `compiler` for the markup of every component.
    pub fn with_template_compiler(mut self, compiler: impl TemplateCompiler + 'static) -> Self {
        self.template_compiler = Box::new(compiler);
        self
    }

    #[inline]
    pub fn template_compiler(&self) -> &dyn TemplateCompiler {
        self.template_compiler.as_ref()
    }

    #[inline]
    pub fn file_ctx(&self, file_id: &str) -> Option<&FileContext> {
        self.file_ctx_map.get(file_id)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Absorb the results of another worker's context.
    ///
    /// Diagnostics of `other` are appended after ours; file contexts of
    /// `other` replace ours on file id collision.
    pub fn merge(&mut self, other: CompilerContext) {
        self.diagnostics.extend(other.diagnostics);
        self.file_ctx_map.extend(other.file_ctx_map);
    }
}

/// Analysis result of one vine file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContext {
    pub file_id: String,
    #[serde(skip)]
    pub source: String,
    /// Components in source order.
    #[serde(rename = "vineCompFns")]
    pub components: Vec<ComponentContext>,
    pub user_imports: FxHashMap<CompactString, ImportRecord>,
    pub vue_import_aliases: FxHashMap<CompactString, CompactString>,
    /// Scope id -> style of the component owning that id.
    pub style_define: FxHashMap<String, StyleDefinition>,
    /// Diagnostics of this file only.
    pub diagnostics: Vec<VineDiagnostic>,
    #[serde(skip)]
    pub validation: ValidationOutcome,
}

impl FileContext {
    pub fn new(file_id: &str, source: &str) -> Self {
        Self {
            file_id: file_id.to_string(),
            source: source.to_string(),
            components: Vec::new(),
            user_imports: FxHashMap::default(),
            vue_import_aliases: FxHashMap::default(),
            style_define: FxHashMap::default(),
            diagnostics: Vec::new(),
            validation: ValidationOutcome::default(),
        }
    }

    /// Whether the file passed validation; codegen must not run otherwise.
    pub fn is_valid(&self) -> bool {
        self.validation.passed && !self.diagnostics.iter().any(VineDiagnostic::is_error)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentContext> {
        self.components.iter().find(|comp| comp.fn_name == name)
    }

    /// Component owning the style registered under `scope_id`.
    pub fn style_owner(&self, scope_id: &str) -> Option<&ComponentContext> {
        let style = self.style_define.get(scope_id)?;
        self.components
            .iter()
            .find(|comp| comp.scope_id == scope_id && comp.fn_name == style.component_name)
    }
}

/// Verbatim payload of a `vineExpose` or `vineOptions` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroPayload {
    pub source: String,
    pub range: SourceRange,
}

/// A `vineStyle` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    pub lang: StyleLang,
    /// Style text, without quotes, backticks or tag.
    pub source: String,
    pub range: SourceRange,
    pub scoped: bool,
    pub component_name: CompactString,
}

/// Analysis result of one vine component.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentContext {
    pub fn_name: CompactString,
    pub export_kind: ExportKind,
    /// Name of the formal props parameter, empty when props come from macros.
    pub props_alias: CompactString,
    /// Props in declaration order.
    #[serde(serialize_with = "serialize_entries")]
    pub props: Vec<(CompactString, PropMeta)>,
    pub emits_alias: CompactString,
    pub emits: Vec<CompactString>,
    pub expose: Option<MacroPayload>,
    pub options: Option<MacroPayload>,
    pub bindings: FxHashMap<CompactString, BindingKind>,
    /// `setup-const` bindings that may still hold a ref at runtime.
    pub maybe_refs: Vec<CompactString>,
    pub scope_id: String,
    pub css_bindings: FxHashMap<CompactString, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_range: Option<SourceRange>,
    /// Output of the template compiler.
    pub template_ast: Option<serde_json::Value>,
    pub range: SourceRange,
}

impl ComponentContext {
    pub fn prop(&self, name: &str) -> Option<&PropMeta> {
        self.props
            .iter()
            .find(|(prop, _)| prop.as_str() == name)
            .map(|(_, meta)| meta)
    }

    #[inline]
    pub fn binding(&self, name: &str) -> Option<BindingKind> {
        self.bindings.get(name).copied()
    }
}

fn serialize_entries<S: Serializer>(
    entries: &[(CompactString, PropMeta)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(key, value)| (key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vine_carton::SourceLocation;
    use vine_croquis::{DiagnosticKind, Severity};

    fn diagnostic(file_id: &str, severity: Severity) -> VineDiagnostic {
        VineDiagnostic {
            file_id: CompactString::new(file_id),
            severity,
            kind: DiagnosticKind::MacroUsage,
            message: "test".to_string(),
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn test_merge_contexts() {
        let mut main = CompilerContext::default();
        main.diagnostics.push(diagnostic("a", Severity::Error));
        main.file_ctx_map.insert("a".into(), FileContext::new("a", ""));

        let mut worker = CompilerContext::default();
        worker.diagnostics.push(diagnostic("b", Severity::Warning));
        worker.file_ctx_map.insert("b".into(), FileContext::new("b", ""));

        main.merge(worker);
        assert_eq!(main.diagnostics.len(), 2);
        assert_eq!(main.diagnostics[1].file_id, "b");
        assert_eq!(main.error_count(), 1);
        assert!(main.file_ctx("a").is_some());
        assert!(main.file_ctx("b").is_some());
    }

    #[test]
    fn test_file_validity() {
        let mut file_ctx = FileContext::new("a", "");
        assert!(!file_ctx.is_valid());

        file_ctx.validation = ValidationOutcome {
            structural_ok: true,
            passed: true,
        };
        file_ctx.diagnostics.push(diagnostic("a", Severity::Warning));
        assert!(file_ctx.is_valid());

        file_ctx.diagnostics.push(diagnostic("a", Severity::Error));
        assert!(!file_ctx.is_valid());
    }

    #[test]
    fn test_props_serialize_in_order() {
        let comp = ComponentContext {
            props: vec![
                ("zeta".into(), PropMeta::default()),
                ("alpha".into(), PropMeta::default()),
            ],
            ..Default::default()
        };
        let json = serde_json::to_string(&comp).unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
        assert!(comp.prop("zeta").is_some());
        assert!(comp.prop("beta").is_none());
    }
}

//! # vine_atelier
//!
//! Atelier - The vine file workshop.
//!
//! ## Name Origin
//!
//! **Atelier** (/ˌætəlˈjeɪ/) is the French word for an artist's workshop. Here
//! the raw sketches from `vine_croquis` are assembled into finished pieces:
//! one [`FileContext`] per vine file, one [`ComponentContext`] per component.
//!
//! ## Pipeline
//!
//! ```text
//!  options resolved ─→ parse ─→ file context bound ─→ validate ─→ analyze
//!        │                            │                   │           │
//!  on_options_resolved        on_bind_file_ctx    on_validate_end  on_analysis_end
//! ```
//!
//! Source problems never surface as `Err`: they are collected as diagnostics
//! on the file context and on the [`CompilerContext`]. Codegen must not run
//! for a file whose [`FileContext::is_valid`] is false.

mod analyze;
pub mod context;
pub mod error;
pub mod hooks;
pub mod options;
pub mod style;
pub mod template;

pub use context::{
    CompilerContext, ComponentContext, FileContext, MacroPayload, StyleDefinition,
};
pub use error::{OptionsError, StyleCompileError};
pub use hooks::{CompilerHooks, NoopHooks};
pub use options::CompilerOptions;
pub use style::{compile_vine_style, style_import_requests, StyleCompileRequest, StyleCompiler};
pub use template::{NoopTemplateCompiler, TemplateCompiler, TemplateInput, TemplateOutput};

use std::collections::hash_map::Entry;

use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use vine_croquis::{
    resolve_vine_components, validate_vine, BindingScope, DiagnosticKind, Diagnostics,
    ImportAnalysis,
};

use analyze::Analyzer;

/// Validate and analyze one vine TypeScript file.
///
/// The resulting [`FileContext`] replaces any earlier one for `file_id`.
/// Its diagnostics are also appended to `ctx.diagnostics`.
pub fn compile_vine_typescript_file<'c>(
    ctx: &'c mut CompilerContext,
    hooks: &mut dyn CompilerHooks,
    code: &str,
    file_id: &str,
) -> &'c FileContext {
    tracing::debug!(file_id, "compiling vine file");
    hooks.on_options_resolved(&ctx.options);

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::ts()).parse();

    let mut file_ctx = FileContext::new(file_id, code);
    hooks.on_bind_file_ctx(&mut file_ctx);
    let mut diagnostics = Diagnostics::new(file_id, code);

    if ret.panicked || !ret.errors.is_empty() {
        for err in &ret.errors {
            let span = err
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map(|label| {
                    let start = label.offset() as u32;
                    Span::new(start, start + label.len() as u32)
                })
                .unwrap_or_default();
            diagnostics.error(DiagnosticKind::Structural, err.to_string(), span);
        }
        if diagnostics.is_empty() {
            diagnostics.error(
                DiagnosticKind::Structural,
                "Failed to parse vine file.",
                Span::default(),
            );
        }
        tracing::debug!(file_id, errors = diagnostics.len(), "vine file failed to parse");
        file_ctx.diagnostics = diagnostics.into_vec();
        hooks.on_validate_end(&mut file_ctx);
        return store_file_ctx(ctx, file_ctx);
    }

    let program_body: &[Statement<'_>] = &ret.program.body;
    let imports = ImportAnalysis::of_program(program_body);
    let apis = imports.reactivity();
    let scope = BindingScope {
        program_body,
        apis: &apis,
    };
    let components = resolve_vine_components(program_body);
    tracing::debug!(file_id, components = components.len(), "found vine components");

    let outcome = validate_vine(program_body, &components, &scope, &mut diagnostics);
    tracing::debug!(
        file_id,
        structural_ok = outcome.structural_ok,
        passed = outcome.passed,
        diagnostics = diagnostics.len(),
        "validated vine file"
    );
    file_ctx.validation = outcome;
    file_ctx.diagnostics = diagnostics.into_vec();
    hooks.on_validate_end(&mut file_ctx);

    if !outcome.structural_ok {
        return store_file_ctx(ctx, file_ctx);
    }

    let analyzer = Analyzer {
        source: code,
        imports: &imports,
        scope: &scope,
        template_compiler: ctx.template_compiler(),
        options: &ctx.options,
    };
    analyzer.analyze(&mut file_ctx, &components);
    hooks.on_analysis_end(&mut file_ctx);

    store_file_ctx(ctx, file_ctx)
}

fn store_file_ctx(ctx: &mut CompilerContext, file_ctx: FileContext) -> &FileContext {
    ctx.diagnostics.extend(file_ctx.diagnostics.iter().cloned());
    match ctx.file_ctx_map.entry(file_ctx.file_id.clone()) {
        Entry::Occupied(mut entry) => {
            entry.insert(file_ctx);
            entry.into_mut()
        }
        Entry::Vacant(entry) => entry.insert(file_ctx),
    }
}

//! Analysis of validated vine files into [`ComponentContext`]s.

use oxc_span::Span;
use vine_carton::{CompactString, FxHashMap, SourceRange};
use vine_croquis::css::{compute_scope_id, css_bindings_for};
use vine_croquis::macros::{sites_of, ArgumentShape, MacroCallSite};
use vine_croquis::props::{formal_props, macro_props};
use vine_croquis::{
    BindingScope, ImportAnalysis, ImportRecord, MacroBase, MacroMatcher, MacroVariant,
    ResolvedComponent, StyleLang,
};

use crate::context::{ComponentContext, FileContext, MacroPayload, StyleDefinition};
use crate::options::CompilerOptions;
use crate::template::{TemplateCompiler, TemplateInput};

/// Collaborators and shared inputs of one analysis run.
pub(crate) struct Analyzer<'r, 's, 'a> {
    pub source: &'r str,
    pub imports: &'r ImportAnalysis,
    pub scope: &'r BindingScope<'s, 'a>,
    pub template_compiler: &'r dyn TemplateCompiler,
    pub options: &'r CompilerOptions,
}

impl<'a> Analyzer<'_, '_, 'a> {
    /// Fill `file_ctx` with imports, components and styles.
    pub fn analyze(&self, file_ctx: &mut FileContext, components: &[ResolvedComponent<'a>]) {
        file_ctx.user_imports = self.imports.user_imports.clone();
        file_ctx.vue_import_aliases = self.imports.vue_import_aliases.clone();

        for component in components {
            if let Some(comp) = self.analyze_component(file_ctx, component) {
                file_ctx.components.push(comp);
            }
        }

        tracing::debug!(
            file = %file_ctx.file_id,
            components = file_ctx.components.len(),
            styles = file_ctx.style_define.len(),
            "analyzed vine file"
        );
    }

    fn analyze_component(
        &self,
        file_ctx: &mut FileContext,
        component: &ResolvedComponent<'a>,
    ) -> Option<ComponentContext> {
        let decl = &component.decl;
        let Some(fn_node) = decl.fn_node else {
            tracing::trace!(component = decl.name, "skipping non-function component");
            return None;
        };
        let sites = &component.macro_calls;
        let span = decl.span();

        let mut comp = ComponentContext {
            fn_name: decl.name(),
            export_kind: decl.export_kind,
            scope_id: compute_scope_id(&file_ctx.file_id, decl.name),
            range: SourceRange::new(span.start, span.end),
            ..Default::default()
        };

        match formal_props(fn_node, self.source) {
            Ok(Some(formal)) => {
                comp.props_alias = formal.alias;
                comp.props = formal.props;
            }
            _ => comp.props = macro_props(sites, self.source),
        }

        if let Some(site) = sites_of(sites, MacroMatcher::Base(MacroBase::Emits)).next() {
            comp.emits_alias = site.binding.clone().unwrap_or_default();
            comp.emits = site
                .type_argument
                .as_ref()
                .and_then(|ty| ty.literal_members.clone())
                .unwrap_or_default();
        }
        comp.expose = self.payload_of(sites, MacroBase::Expose);
        comp.options = self.payload_of(sites, MacroBase::Options);

        let props_alias = (!comp.props_alias.is_empty()).then_some(comp.props_alias.as_str());
        let analysis = self
            .scope
            .classify(decl.statement, fn_node, decl.name, props_alias);
        comp.bindings = analysis.bindings;
        comp.maybe_refs = analysis.maybe_refs;

        if let Some(style) = self.style_of(sites, decl.name) {
            if style.scoped {
                comp.css_bindings = css_bindings_for(decl.name, &style.source);
            }
            file_ctx
                .style_define
                .entry(comp.scope_id.clone())
                .or_insert(style);
        }

        if let Some(template) = &component.template {
            self.analyze_template(file_ctx, &mut comp, template.content_span);
        }

        tracing::trace!(
            component = decl.name,
            scope_id = %comp.scope_id,
            props = comp.props.len(),
            emits = comp.emits.len(),
            "analyzed vine component"
        );
        Some(comp)
    }

    fn payload_of(&self, sites: &[MacroCallSite], base: MacroBase) -> Option<MacroPayload> {
        let argument = sites_of(sites, MacroMatcher::Base(base))
            .next()?
            .first_argument()?;
        Some(MacroPayload {
            source: argument.span.source_text(self.source).to_string(),
            range: SourceRange::new(argument.span.start, argument.span.end),
        })
    }

    fn style_of(&self, sites: &[MacroCallSite], component_name: &str) -> Option<StyleDefinition> {
        let site = sites_of(sites, MacroMatcher::Base(MacroBase::Style)).next()?;
        let (lang, content) = match &site.first_argument()?.shape {
            ArgumentShape::StringLiteral { content }
            | ArgumentShape::TemplateLiteral { content, .. } => (StyleLang::Css, *content),
            ArgumentShape::TaggedTemplate { tag, content, .. } => {
                (StyleLang::from_tag(tag)?, *content)
            }
            _ => return None,
        };
        Some(StyleDefinition {
            lang,
            source: content.source_text(self.source).to_string(),
            range: SourceRange::new(content.start, content.end),
            scoped: site.name.variant == Some(MacroVariant::Scoped),
            component_name: CompactString::new(component_name),
        })
    }

    fn analyze_template(
        &self,
        file_ctx: &mut FileContext,
        comp: &mut ComponentContext,
        content: Span,
    ) {
        let source = content.source_text(self.source);
        let range = SourceRange::new(content.start, content.end);
        let output = self.template_compiler.compile(TemplateInput {
            component_name: &comp.fn_name,
            source,
            range,
            bindings: &comp.bindings,
            options: self.options,
        });

        mark_template_imports(&mut file_ctx.user_imports, &output.referenced_identifiers);
        comp.template_source = Some(source.to_string());
        comp.template_range = Some(range);
        comp.template_ast = (!output.ast.is_null()).then_some(output.ast);
    }
}

fn mark_template_imports(
    user_imports: &mut FxHashMap<CompactString, ImportRecord>,
    referenced: &[CompactString],
) {
    for name in referenced {
        if let Some(record) = user_imports.get_mut(name) {
            record.is_used_in_template = true;
        }
    }
}

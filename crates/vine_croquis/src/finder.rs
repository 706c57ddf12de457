//! Component declaration finder.

use oxc_ast::ast::Statement;
use oxc_span::{GetSpan, Span};
use vine_carton::CompactString;

use crate::ast::{
    export_kind_of, find_vine_template_return, get_function_info, is_vine_comp_fn_decl,
    ExportKind, VineFnNode, VineTemplateReturn,
};
use crate::macros::{resolve_macro_calls, MacroCallSite};

/// Top-level statements that declare vine components, in source order.
pub fn find_vine_comp_fn_decls<'a>(body: &'a [Statement<'a>]) -> Vec<&'a Statement<'a>> {
    body.iter().filter(|stmt| is_vine_comp_fn_decl(stmt)).collect()
}

/// A discovered component declaration with its function resolved.
#[derive(Debug, Clone, Copy)]
pub struct VineComponentDecl<'a> {
    pub statement: &'a Statement<'a>,
    /// `None` when the declaration is not a function or a function-valued
    /// variable (validation reports it).
    pub fn_node: Option<VineFnNode<'a>>,
    pub name: &'a str,
    pub export_kind: ExportKind,
}

impl<'a> VineComponentDecl<'a> {
    pub fn new(statement: &'a Statement<'a>) -> Self {
        let (fn_node, name) = get_function_info(statement);
        Self {
            statement,
            fn_node,
            name,
            export_kind: export_kind_of(statement),
        }
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.statement.span()
    }

    #[inline]
    pub fn name(&self) -> CompactString {
        CompactString::new(self.name)
    }

    /// The last `vine` template returned by the component function.
    pub fn template_return(&self) -> Option<VineTemplateReturn> {
        self.fn_node.and_then(find_vine_template_return)
    }
}

/// Find and resolve every component of a file.
pub fn find_vine_components<'a>(body: &'a [Statement<'a>]) -> Vec<VineComponentDecl<'a>> {
    find_vine_comp_fn_decls(body)
        .into_iter()
        .map(VineComponentDecl::new)
        .collect()
}

/// A component declaration together with its macro calls and template.
///
/// Validation and analysis both consume this, so macro calls are resolved
/// once per component.
#[derive(Debug, Clone)]
pub struct ResolvedComponent<'a> {
    pub decl: VineComponentDecl<'a>,
    pub macro_calls: Vec<MacroCallSite>,
    pub template: Option<VineTemplateReturn>,
}

impl<'a> ResolvedComponent<'a> {
    pub fn resolve(decl: VineComponentDecl<'a>) -> Self {
        let macro_calls = decl.fn_node.map(resolve_macro_calls).unwrap_or_default();
        let template = decl.template_return();
        Self {
            decl,
            macro_calls,
            template,
        }
    }
}

/// Find every component of a file and resolve its macro calls.
pub fn resolve_vine_components<'a>(body: &'a [Statement<'a>]) -> Vec<ResolvedComponent<'a>> {
    find_vine_components(body)
        .into_iter()
        .map(ResolvedComponent::resolve)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    #[test]
    fn test_finds_components_in_order() {
        let source = r#"
import { ref } from 'vue'
function helper() { return 1 }
export function First() { return vine`<a/>` }
const Second = () => { return vine`<b/>` }
export default function Third() { return vine`<c/>` }
const notComponent = vine`<d/>`
"#;
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::ts()).parse();
        let components = find_vine_components(&ret.program.body);

        let names: Vec<_> = components.iter().map(|c| c.name).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
        let exports: Vec<_> = components.iter().map(|c| c.export_kind).collect();
        assert_eq!(exports, [ExportKind::Named, ExportKind::None, ExportKind::Default]);
        assert!(components.iter().all(|c| c.fn_node.is_some()));
        assert!(components[1].template_return().is_some());

        let resolved = resolve_vine_components(&ret.program.body);
        assert_eq!(resolved.len(), 3);
        assert!(resolved.iter().all(|c| c.macro_calls.is_empty()));
        assert!(resolved.iter().all(|c| c.template.is_some()));
    }

    #[test]
    fn test_empty_file() {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, "", SourceType::ts()).parse();
        assert!(find_vine_components(&ret.program.body).is_empty());
    }

    #[test]
    fn test_non_function_initializer() {
        let source = "const Wrapped = wrap(() => { return vine`<a/>` })";
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::ts()).parse();
        let components = find_vine_components(&ret.program.body);
        assert_eq!(components.len(), 1);
        assert!(components[0].fn_node.is_none());
        assert_eq!(components[0].name, "Wrapped");
    }
}

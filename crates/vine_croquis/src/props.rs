//! Props extraction for vine components.
//!
//! A component declares props in exactly one of two ways:
//! - a typed formal parameter: `function Comp(props: { title: string })`
//! - `vineProp*` macro calls bound to identifiers in the function body.

use oxc_ast::ast::{BindingPattern, TSSignature, TSType};
use oxc_span::{GetSpan, Span};
use serde::Serialize;
use vine_carton::{CompactString, SourceRange};

use crate::ast::{is_boolean_type, ts_property_signature_name, VineFnNode};
use crate::macros::{ArgumentShape, MacroBase, MacroCallSite, MacroVariant};

/// Metadata for one component prop.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropMeta {
    pub is_required: bool,
    pub is_bool: bool,
    pub is_from_macro_define: bool,
    /// Declared type, as written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    pub range: SourceRange,
}

impl PropMeta {
    #[inline]
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }
}

/// Why a formal props parameter could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormalPropsIssue {
    /// More than one formal parameter.
    TooManyParams(Span),
    /// The parameter is destructured instead of a plain identifier.
    NotIdentifier(Span),
    /// The annotation is missing or not an object type literal.
    NotTypeLiteral(Span),
}

/// Props declared through the first formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalProps {
    pub alias: CompactString,
    pub span: Span,
    pub props: Vec<(CompactString, PropMeta)>,
}

/// Inspect the formal parameters of a component function.
///
/// Returns `Ok(None)` when the function takes no parameters.
pub fn formal_props(
    fn_node: VineFnNode<'_>,
    source: &str,
) -> Result<Option<FormalProps>, FormalPropsIssue> {
    let params = fn_node.params();
    if params.items.len() > 1 {
        return Err(FormalPropsIssue::TooManyParams(params.span));
    }
    let Some(param) = params.items.first() else {
        return Ok(None);
    };
    let BindingPattern::BindingIdentifier(id) = &param.pattern else {
        return Err(FormalPropsIssue::NotIdentifier(param.span));
    };
    let Some(annotation) = &param.type_annotation else {
        return Err(FormalPropsIssue::NotTypeLiteral(param.span));
    };
    let TSType::TSTypeLiteral(literal) = &annotation.type_annotation else {
        return Err(FormalPropsIssue::NotTypeLiteral(annotation.span));
    };

    let props = literal
        .members
        .iter()
        .filter_map(|member| match member {
            TSSignature::TSPropertySignature(sig) => Some(sig),
            _ => None,
        })
        .filter_map(|sig| {
            let name = ts_property_signature_name(sig);
            if name.is_empty() {
                return None;
            }
            let ty = sig.type_annotation.as_ref().map(|ann| &ann.type_annotation);
            Some((
                CompactString::new(name),
                PropMeta {
                    is_required: !sig.optional,
                    is_bool: ty.is_some_and(is_boolean_type),
                    is_from_macro_define: false,
                    type_annotation: ty.map(|ty| ty.span().source_text(source).to_string()),
                    default_value: None,
                    validator: None,
                    range: SourceRange::new(sig.span.start, sig.span.end),
                },
            ))
        })
        .collect();

    Ok(Some(FormalProps {
        alias: CompactString::new(id.name.as_str()),
        span: param.span,
        props,
    }))
}

/// Props declared through `vineProp*` calls, in declaration order.
///
/// Calls without a bound identifier are skipped; validation reports them.
pub fn macro_props(sites: &[MacroCallSite], source: &str) -> Vec<(CompactString, PropMeta)> {
    sites
        .iter()
        .filter(|site| site.name.base == MacroBase::Prop)
        .filter_map(|site| {
            let name = site.binding.clone()?;
            Some((name, prop_meta_of(site, source)))
        })
        .collect()
}

fn prop_meta_of(site: &MacroCallSite, source: &str) -> PropMeta {
    let text = |span: Span| span.source_text(source).to_string();
    let type_annotation = site.type_argument.as_ref().map(|ty| text(ty.span));
    let declared_bool = site.type_argument.as_ref().is_some_and(|ty| ty.is_boolean);

    let (is_required, is_bool, default_value, validator) = match site.name.variant {
        Some(MacroVariant::WithDefault) => {
            let default = site.arguments.first();
            let default_is_bool =
                default.is_some_and(|arg| matches!(arg.shape, ArgumentShape::BooleanLiteral(_)));
            (
                false,
                declared_bool || default_is_bool,
                default.map(|arg| text(arg.span)),
                site.arguments.get(1).map(|arg| text(arg.span)),
            )
        }
        Some(MacroVariant::Optional) => (
            false,
            declared_bool,
            None,
            site.arguments.first().map(|arg| text(arg.span)),
        ),
        _ => (
            true,
            declared_bool,
            None,
            site.arguments.first().map(|arg| text(arg.span)),
        ),
    };

    PropMeta {
        is_required,
        is_bool,
        is_from_macro_define: true,
        type_annotation,
        default_value,
        validator,
        range: SourceRange::new(site.span.start, site.span.end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::get_function_info;
    use crate::macros::resolve_macro_calls;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn with_component<R>(source: &str, f: impl FnOnce(VineFnNode<'_>) -> R) -> R {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::ts()).parse();
        assert!(ret.errors.is_empty(), "parse errors: {:?}", ret.errors);
        let (fn_node, _) = get_function_info(&ret.program.body[0]);
        f(fn_node.expect("component function"))
    }

    fn summarize(props: &[(CompactString, PropMeta)]) -> String {
        props
            .iter()
            .map(|(name, meta)| {
                format!(
                    "{name}: required={} bool={} macro={} type={} default={} validator={}",
                    meta.is_required,
                    meta.is_bool,
                    meta.is_from_macro_define,
                    meta.type_annotation.as_deref().unwrap_or("-"),
                    meta.default_value.as_deref().unwrap_or("-"),
                    meta.validator.as_deref().unwrap_or("-"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_formal_param_props() {
        let source = r#"
function MyComp(p: { foo: string; isBool?: boolean; 'quoted-key': number }) {
  return vine`<div/>`
}
"#;
        let formal = with_component(source, |fn_node| formal_props(fn_node, source));
        let formal = formal.expect("valid props param").expect("has props param");
        assert_eq!(formal.alias, "p");
        insta::assert_snapshot!(summarize(&formal.props), @r"
        foo: required=true bool=false macro=false type=string default=- validator=-
        isBool: required=false bool=true macro=false type=boolean default=- validator=-
        quoted-key: required=true bool=false macro=false type=number default=- validator=-
        ");
    }

    #[test]
    fn test_formal_param_issues() {
        let no_params = "function A() { return vine`` }";
        assert_eq!(
            with_component(no_params, |fn_node| formal_props(fn_node, no_params)),
            Ok(None)
        );

        let two = "function A(a: {}, b: {}) { return vine`` }";
        assert!(matches!(
            with_component(two, |fn_node| formal_props(fn_node, two)),
            Err(FormalPropsIssue::TooManyParams(_))
        ));

        let destructured = "function A({ a }: { a: string }) { return vine`` }";
        assert!(matches!(
            with_component(destructured, |fn_node| formal_props(fn_node, destructured)),
            Err(FormalPropsIssue::NotIdentifier(_))
        ));

        let referenced = "function A(props: Props) { return vine`` }";
        assert!(matches!(
            with_component(referenced, |fn_node| formal_props(fn_node, referenced)),
            Err(FormalPropsIssue::NotTypeLiteral(_))
        ));
    }

    #[test]
    fn test_macro_props() {
        let source = r#"
function MyComp() {
  const prop1 = vineProp<string>()
  const prop2 = vineProp.optional<boolean>((v) => v !== undefined)
  const prop3 = vineProp.withDefault(false)
  const prop4 = vineProp.withDefault<number>(1, (v: number) => v > 0)
  vineProp<string>()
  return vine`<div/>`
}
"#;
        let props = with_component(source, |fn_node| {
            macro_props(&resolve_macro_calls(fn_node), source)
        });
        insta::assert_snapshot!(summarize(&props), @r"
        prop1: required=true bool=false macro=true type=string default=- validator=-
        prop2: required=false bool=true macro=true type=boolean default=- validator=(v) => v !== undefined
        prop3: required=false bool=true macro=true type=- default=false validator=-
        prop4: required=false bool=false macro=true type=number default=1 validator=(v: number) => v > 0
        ");
        assert!(props[1].1.has_validator());
        assert!(props[2].1.has_default());
    }
}

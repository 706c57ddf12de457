//! Validation of vine files.
//!
//! Runs in two passes:
//! 1. Structural checks over the top-level statements. Any failure here is
//!    fatal for the file and skips the per-component checks.
//! 2. Per component: component shape, macro usage and hoisting safety.
//!    Everything is collected; no check stops at the first error.

use oxc_ast::ast::Statement;
use oxc_span::GetSpan;
use vine_carton::FxHashMap;

use crate::ast::{find_vine_macro_calls, is_valid_root_statement};
use crate::binding::BindingScope;
use crate::css::StyleLang;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::finder::ResolvedComponent;
use crate::macros::{
    duplicated_singletons, ArgumentShape, MacroBase, MacroCallSite, MacroName, MacroVariant,
};
use crate::node_tree::SyntaxIndex;
use crate::props::{formal_props, FormalPropsIssue};

/// Outcome of validating one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    /// Top-level structure is sound; analysis may run.
    pub structural_ok: bool,
    /// No errors at all; codegen may run.
    pub passed: bool,
}

/// Validate a parsed vine file.
pub fn validate_vine<'a>(
    program_body: &'a [Statement<'a>],
    components: &[ResolvedComponent<'a>],
    scope: &BindingScope<'_, 'a>,
    diagnostics: &mut Diagnostics<'_>,
) -> ValidationOutcome {
    let start = diagnostics.len();

    validate_root_statements(program_body, components, diagnostics);
    if diagnostics.has_errors_since(start) {
        tracing::debug!("structural validation failed");
        return ValidationOutcome::default();
    }

    for component in components {
        let mark = diagnostics.len();
        validate_component(component, scope, diagnostics);
        diagnostics.sort_since(mark);
    }

    ValidationOutcome {
        structural_ok: true,
        passed: !diagnostics.has_errors_since(start),
    }
}

fn validate_root_statements<'a>(
    program_body: &'a [Statement<'a>],
    components: &[ResolvedComponent<'a>],
    diagnostics: &mut Diagnostics<'_>,
) {
    for stmt in program_body {
        if !is_valid_root_statement(stmt) {
            diagnostics.error(
                DiagnosticKind::Structural,
                "Invalid root scope statement. Only import, export, function, class, enum, \
                 variable, type alias and interface declarations are allowed in a vine file.",
                stmt.span(),
            );
            continue;
        }
        let is_component = components
            .iter()
            .any(|component| std::ptr::eq(component.decl.statement, stmt));
        if is_component {
            continue;
        }
        for call in find_vine_macro_calls(stmt) {
            diagnostics.error(
                DiagnosticKind::Structural,
                "Vine macros can only be called inside a vine component function.",
                call,
            );
        }
    }
}

fn validate_component<'a>(
    component: &ResolvedComponent<'a>,
    scope: &BindingScope<'_, 'a>,
    diagnostics: &mut Diagnostics<'_>,
) {
    let decl = &component.decl;
    let Some(fn_node) = decl.fn_node else {
        diagnostics.error(
            DiagnosticKind::MacroUsage,
            format!(
                "Vine component \"{}\" must be a function declaration or a variable \
                 initialized with a function.",
                decl.name
            ),
            decl.span(),
        );
        return;
    };

    if let Some(template) = &component.template {
        if template.has_interpolation {
            diagnostics.error(
                DiagnosticKind::MacroUsage,
                "Vine template string must not contain any interpolation.",
                template.span,
            );
        }
    }

    let props_alias = match formal_props(fn_node, diagnostics.source()) {
        Ok(formal) => formal.map(|formal| formal.alias),
        Err(issue) => {
            let (message, span) = match issue {
                FormalPropsIssue::TooManyParams(span) => (
                    "Vine component function can only have one parameter for its props.",
                    span,
                ),
                FormalPropsIssue::NotIdentifier(span) => (
                    "Vine component props parameter must be a plain identifier.",
                    span,
                ),
                FormalPropsIssue::NotTypeLiteral(span) => (
                    "Vine component props parameter must be annotated with an object type \
                     literal containing only property signatures.",
                    span,
                ),
            };
            diagnostics.error(DiagnosticKind::MacroUsage, message, span);
            None
        }
    };
    if props_alias.is_some() {
        let first_prop_macro = component
            .macro_calls
            .iter()
            .find(|site| site.name.base == MacroBase::Prop);
        if let Some(site) = first_prop_macro {
            diagnostics.warn(
                DiagnosticKind::MacroUsage,
                format!(
                    "vineProp calls in \"{}\" are ignored because props are already declared \
                     by its parameter.",
                    decl.name
                ),
                site.span,
            );
        }
    }

    for site in duplicated_singletons(&component.macro_calls) {
        diagnostics.error(
            DiagnosticKind::MacroUsage,
            format!(
                "Multiple {} calls are not allowed in one vine component.",
                site.name.base.as_str()
            ),
            site.span,
        );
    }

    for site in &component.macro_calls {
        validate_macro_call(site, diagnostics);
    }

    validate_hoisting(component, scope, props_alias.as_deref(), diagnostics);
}

fn validate_macro_call(site: &MacroCallSite, diagnostics: &mut Diagnostics<'_>) {
    let mut error = |message: String| {
        diagnostics.error(DiagnosticKind::MacroUsage, message, site.span);
    };
    let name = site.name;

    match name.base {
        MacroBase::Prop => {
            if site.binding.is_none() {
                error(format!(
                    "{name} must be used as the initializer of a variable declaration with a \
                     single identifier."
                ));
            }
            if name.variant == Some(MacroVariant::WithDefault) {
                if site.arguments.is_empty() {
                    error(format!("{name} must have a default value as its first argument."));
                } else if site.arguments.len() > 2 {
                    error(format!("{name} accepts a default value and a validator only."));
                }
            } else {
                if site.type_argument_count == 0 {
                    error(format!("{name} must have a type parameter."));
                }
                if site.arguments.len() > 1 {
                    error(format!("{name} accepts a validator function only."));
                }
            }
        }
        MacroBase::Emits => {
            let has_literal = site
                .type_argument
                .as_ref()
                .is_some_and(|ty| ty.literal_members.is_some());
            if !has_literal || !site.arguments.is_empty() {
                error(format!(
                    "{name} must have an object type literal as its only type parameter and \
                     no arguments."
                ));
            }
        }
        MacroBase::Expose | MacroBase::Options | MacroBase::Style => {
            if site.arguments.len() != 1 {
                error(format!("{name} must have exactly one argument."));
                return;
            }
            let shape = &site.arguments[0].shape;
            if name == MacroName::OPTIONS && *shape != ArgumentShape::ObjectLiteral {
                error(format!("{name} argument must be an object literal."));
            }
            if name.base == MacroBase::Style {
                validate_style_argument(name, shape, &mut error);
            }
        }
    }
}

fn validate_style_argument(name: MacroName, shape: &ArgumentShape, error: &mut impl FnMut(String)) {
    match shape {
        ArgumentShape::StringLiteral { .. } => {}
        ArgumentShape::TemplateLiteral { interpolated, .. } => {
            if *interpolated {
                error(format!("{name} template must not contain any interpolation."));
            }
        }
        ArgumentShape::TaggedTemplate {
            tag, interpolated, ..
        } => {
            if StyleLang::from_tag(tag).is_none() {
                error(format!("{name} does not support style language \"{tag}\"."));
            } else if *interpolated {
                error(format!("{name} template must not contain any interpolation."));
            }
        }
        _ => error(format!(
            "{name} argument must be a string, a template literal or a tagged template with a \
             style language."
        )),
    }
}

/// Hoisted macro arguments must not reference body declarations that come
/// after the statement holding the macro call.
fn validate_hoisting<'a>(
    component: &ResolvedComponent<'a>,
    scope: &BindingScope<'_, 'a>,
    props_alias: Option<&str>,
    diagnostics: &mut Diagnostics<'_>,
) {
    let Some(fn_node) = component.decl.fn_node else {
        return;
    };
    let hoisted: Vec<&MacroCallSite> = component
        .macro_calls
        .iter()
        .filter(|site| site.name.base.is_hoisted() && !site.references.is_empty())
        .collect();
    if hoisted.is_empty() {
        return;
    }

    let local_declarations: FxHashMap<_, _> = scope
        .classify(
            component.decl.statement,
            fn_node,
            component.decl.name,
            props_alias,
        )
        .local_declarations;
    let index = SyntaxIndex::of_statements(fn_node.body_statements());

    for site in hoisted {
        let Some(statement_index) = index
            .find(site.span)
            .and_then(|node| index.enclosing_root(node))
        else {
            continue;
        };
        for reference in &site.references {
            let Some(&declared_at) = local_declarations.get(&reference.name) else {
                continue;
            };
            if declared_at > statement_index {
                diagnostics.error(
                    DiagnosticKind::Hoisting,
                    format!(
                        "Cannot reference \"{}\" locally declared variables because it will be \
                         hoisted outside of the setup() function.",
                        reference.name
                    ),
                    reference.span,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Severity, VineDiagnostic};
    use crate::finder::resolve_vine_components;
    use crate::imports::ImportAnalysis;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn validate(source: &str) -> (ValidationOutcome, Vec<VineDiagnostic>) {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::ts()).parse();
        assert!(ret.errors.is_empty(), "parse errors: {:?}", ret.errors);
        let body = &ret.program.body;
        let apis = ImportAnalysis::of_program(body).reactivity();
        let scope = BindingScope {
            program_body: body,
            apis: &apis,
        };
        let components = resolve_vine_components(body);
        let mut diagnostics = Diagnostics::new("test.vine.ts", source);
        let outcome = validate_vine(body, &components, &scope, &mut diagnostics);
        (outcome, diagnostics.into_vec())
    }

    fn messages(diagnostics: &[VineDiagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| format!("{}: {}", d.severity.as_str(), d.message))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_valid_file() {
        let (outcome, diagnostics) = validate(
            r#"
import { ref } from 'vue'
export function MyComp() {
  const title = vineProp<string>()
  const myEmits = vineEmits<{ change: [value: string] }>()
  vineStyle.scoped(scss`.a { color: red }`)
  vineOptions({ name: 'my-comp' })
  return vine`<div>{{ title }}</div>`
}
"#,
        );
        assert!(diagnostics.is_empty(), "{}", messages(&diagnostics));
        assert_eq!(
            outcome,
            ValidationOutcome {
                structural_ok: true,
                passed: true
            }
        );
    }

    #[test]
    fn test_structural_errors_are_fatal() {
        let (outcome, diagnostics) = validate(
            r#"
console.log('top level')
const outside = vineProp<string>()
function MyComp() {
  vineStyle('.a {}')
  vineStyle('.b {}')
  return vine`<div/>`
}
"#,
        );
        assert!(!outcome.structural_ok);
        assert!(!outcome.passed);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::Structural));
        assert_eq!(diagnostics[0].location.line, 2);
        assert_eq!(diagnostics[1].location.line, 3);
    }

    #[test]
    fn test_macro_usage_errors() {
        let (outcome, diagnostics) = validate(
            r#"
function MyComp() {
  const a = vineProp()
  const { b } = vineProp<string>()
  const c = vineProp.withDefault()
  vineEmits<Foo>()
  vineExpose()
  vineOptions(opts)
  vineStyle(less`.a {}`)
  vineStyle(foo`.b {}`)
  return vine`<div/>`
}
"#,
        );
        assert!(outcome.structural_ok);
        assert!(!outcome.passed);
        insta::assert_snapshot!(messages(&diagnostics), @r#"
        error: vineProp must have a type parameter.
        error: vineProp must be used as the initializer of a variable declaration with a single identifier.
        error: vineProp.withDefault must have a default value as its first argument.
        error: vineEmits must have an object type literal as its only type parameter and no arguments.
        error: vineExpose must have exactly one argument.
        error: vineOptions argument must be an object literal.
        error: Multiple vineStyle calls are not allowed in one vine component.
        error: vineStyle does not support style language "foo".
        "#);
    }

    #[test]
    fn test_hoisting_errors_in_reference_order() {
        let source = r#"
import { ref } from 'vue'

function MyComp() {
  const prop1 = vineProp<string>(() => {
    return val1.value > 0.5 ? 'A' : 'B'
  })
  vineOptions({
    name: val2.value,
  })

  const val1 = ref(Math.random())
  const val2 = ref('Test')
  return vine`
    <div>Test reference locally declared variables</div>
  `
}"#;
        let (outcome, diagnostics) = validate(source);
        assert!(outcome.structural_ok);
        assert!(!outcome.passed);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.kind == DiagnosticKind::Hoisting));
        insta::assert_snapshot!(messages(&diagnostics), @r#"
        error: Cannot reference "val1" locally declared variables because it will be hoisted outside of the setup() function.
        error: Cannot reference "val2" locally declared variables because it will be hoisted outside of the setup() function.
        "#);
        assert_eq!(diagnostics[0].location.line, 6);
        assert_eq!(diagnostics[1].location.line, 9);
    }

    #[test]
    fn test_earlier_declarations_are_safe() {
        let (outcome, diagnostics) = validate(
            r#"
function MyComp() {
  const limit = 10
  const count = vineProp.withDefault(0, (v: number) => v < limit && v > MIN)
  return vine`<div/>`
}
const MIN = 0
"#,
        );
        assert!(diagnostics.is_empty(), "{}", messages(&diagnostics));
        assert!(outcome.passed);
    }

    #[test]
    fn test_parameter_does_not_hide_outer_forward_reference() {
        let (outcome, diagnostics) = validate(
            r#"
function MyComp() {
  const count = vineProp.withDefault(later, (later: number) => later > 0)
  const later = 1
  return vine`<div/>`
}
"#,
        );
        assert!(!outcome.passed);
        assert_eq!(diagnostics.len(), 1, "{}", messages(&diagnostics));
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Hoisting);
        assert!(diagnostics[0].message.contains("\"later\""));
        assert_eq!(diagnostics[0].location.line, 3);
        assert_eq!(diagnostics[0].location.column, 38);
    }

    #[test]
    fn test_type_annotations_do_not_count_as_references() {
        let (outcome, diagnostics) = validate(
            r#"
function MyComp() {
  const item = vineProp<object>((v: Item) => v !== null)
  class Item {}
  return vine`<div/>`
}
"#,
        );
        assert!(diagnostics.is_empty(), "{}", messages(&diagnostics));
        assert!(outcome.passed);
    }

    #[test]
    fn test_hoisting_errors_within_one_expression_follow_source_order() {
        let (outcome, diagnostics) = validate(
            r#"
import { ref } from 'vue'
function MyComp() {
  const p = vineProp<string>(() => b.value + a.value)
  const a = ref(1)
  const b = ref(2)
  return vine`<div/>`
}
"#,
        );
        assert!(!outcome.passed);
        insta::assert_snapshot!(messages(&diagnostics), @r#"
        error: Cannot reference "b" locally declared variables because it will be hoisted outside of the setup() function.
        error: Cannot reference "a" locally declared variables because it will be hoisted outside of the setup() function.
        "#);
        assert!(diagnostics[0].location.column < diagnostics[1].location.column);
    }

    #[test]
    fn test_formal_props_win_with_warning() {
        let (outcome, diagnostics) = validate(
            r#"
function MyComp(props: { a: string }) {
  const b = vineProp<string>()
  return vine`<div/>`
}
"#,
        );
        assert!(outcome.passed);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_component_shape_errors() {
        let (_, diagnostics) = validate(
            r#"
function A(a: { x: string }, b: number) { return vine`<a/>` }
function B({ x }: { x: string }) { return vine`<b/>` }
function C(props: Props) { return vine`<c/>` }
function D() { return vine`<d>${1}</d>` }
const E = wrap(() => { return vine`<e/>` })
"#,
        );
        insta::assert_snapshot!(messages(&diagnostics), @r#"
        error: Vine component function can only have one parameter for its props.
        error: Vine component props parameter must be a plain identifier.
        error: Vine component props parameter must be annotated with an object type literal containing only property signatures.
        error: Vine template string must not contain any interpolation.
        error: Vine component "E" must be a function declaration or a variable initialized with a function.
        "#);
    }
}

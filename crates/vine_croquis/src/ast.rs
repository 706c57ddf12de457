//! AST predicates and helpers over the oxc syntax tree.
//!
//! Everything here is a pure query: no function mutates the tree and every
//! predicate is total (a non-matching shape answers `false` / `None`).

use oxc_ast::ast::{
    ArrowFunctionExpression, BindingPattern, CallExpression, Class, Declaration,
    ExportDefaultDeclarationKind, Expression, FormalParameters, Function, ImportDeclaration,
    PropertyKey, ReturnStatement, Statement, TSEnumDeclaration, TSPropertySignature, TSType,
    TaggedTemplateExpression, VariableDeclaration,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::{GetSpan, Span};
use oxc_syntax::scope::ScopeFlags;

use crate::macros::macro_name_of_call;

/// Tag identifier that marks a component's markup template.
pub const VINE_TEMPLATE_TAG: &str = "vine";

/// Vue reactivity APIs whose result is a ref.
pub const VUE_REF_APIS: &[&str] = &["ref", "shallowRef", "computed", "customRef", "toRef"];

/// Vue reactivity APIs whose result is a reactive object.
pub const VUE_REACTIVE_APIS: &[&str] = &["reactive", "shallowReactive"];

/// Check if an expression is a template tagged with `vine`.
#[inline]
pub fn is_vine_tagged_template(expr: &Expression<'_>) -> bool {
    match expr {
        Expression::TaggedTemplateExpression(tagged) => is_vine_tag(tagged),
        _ => false,
    }
}

#[inline]
fn is_vine_tag(tagged: &TaggedTemplateExpression<'_>) -> bool {
    matches!(&tagged.tag, Expression::Identifier(id) if id.name.as_str() == VINE_TEMPLATE_TAG)
}

/// Check if a `vine` template contains `${}` interpolations.
#[inline]
pub fn has_template_interpolation(tagged: &TaggedTemplateExpression<'_>) -> bool {
    !tagged.quasi.expressions.is_empty()
}

/// A top-level statement with one level of `export` wrapping removed.
#[derive(Debug, Clone, Copy)]
pub enum RootDeclaration<'a> {
    Import(&'a ImportDeclaration<'a>),
    Function(&'a Function<'a>),
    Variable(&'a VariableDeclaration<'a>),
    Class(&'a Class<'a>),
    Enum(&'a TSEnumDeclaration<'a>),
    /// Type aliases and interfaces.
    Type,
    Other,
}

/// How a top-level declaration is exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    #[default]
    None,
    Named,
    Default,
}

/// Unwrap one level of named/default export and classify the declaration.
pub fn unwrap_root_statement<'a>(stmt: &'a Statement<'a>) -> RootDeclaration<'a> {
    match stmt {
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(decl) => root_declaration(decl),
            None => RootDeclaration::Other,
        },
        Statement::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                RootDeclaration::Function(func)
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => RootDeclaration::Class(class),
            _ => RootDeclaration::Other,
        },
        Statement::ImportDeclaration(import) => RootDeclaration::Import(import),
        Statement::FunctionDeclaration(func) => RootDeclaration::Function(func),
        Statement::VariableDeclaration(var) => RootDeclaration::Variable(var),
        Statement::ClassDeclaration(class) => RootDeclaration::Class(class),
        Statement::TSEnumDeclaration(decl) => RootDeclaration::Enum(decl),
        Statement::TSTypeAliasDeclaration(_) | Statement::TSInterfaceDeclaration(_) => {
            RootDeclaration::Type
        }
        _ => RootDeclaration::Other,
    }
}

fn root_declaration<'a>(decl: &'a Declaration<'a>) -> RootDeclaration<'a> {
    match decl {
        Declaration::FunctionDeclaration(func) => RootDeclaration::Function(func),
        Declaration::VariableDeclaration(var) => RootDeclaration::Variable(var),
        Declaration::ClassDeclaration(class) => RootDeclaration::Class(class),
        Declaration::TSEnumDeclaration(decl) => RootDeclaration::Enum(decl),
        Declaration::TSTypeAliasDeclaration(_) | Declaration::TSInterfaceDeclaration(_) => {
            RootDeclaration::Type
        }
        _ => RootDeclaration::Other,
    }
}

/// Export wrapping of a top-level statement.
#[inline]
pub fn export_kind_of(stmt: &Statement<'_>) -> ExportKind {
    match stmt {
        Statement::ExportNamedDeclaration(_) => ExportKind::Named,
        Statement::ExportDefaultDeclaration(_) => ExportKind::Default,
        _ => ExportKind::None,
    }
}

/// Check if a top-level statement declares a vine component function.
///
/// The function (or the variable initializer) must contain a `return` of a
/// `vine` tagged template somewhere in its subtree, not only in its
/// immediate body.
pub fn is_vine_comp_fn_decl<'a>(stmt: &'a Statement<'a>) -> bool {
    let mut finder = VineReturnFinder::default();
    match unwrap_root_statement(stmt) {
        RootDeclaration::Function(func) => finder.visit_function(func, ScopeFlags::Function),
        RootDeclaration::Variable(var) => finder.visit_variable_declaration(var),
        _ => return false,
    }
    finder.last.is_some()
}

/// The `vine` template returned by a component function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VineTemplateReturn {
    /// Span of the whole tagged template expression.
    pub span: Span,
    /// Span of the template literal contents (between the backticks).
    pub content_span: Span,
    pub has_interpolation: bool,
}

#[derive(Default)]
struct VineReturnFinder {
    last: Option<VineTemplateReturn>,
}

impl<'a> Visit<'a> for VineReturnFinder {
    fn visit_return_statement(&mut self, it: &ReturnStatement<'a>) {
        if let Some(Expression::TaggedTemplateExpression(tagged)) = &it.argument {
            if is_vine_tag(tagged) {
                let quasi = tagged.quasi.span;
                self.last = Some(VineTemplateReturn {
                    span: tagged.span,
                    content_span: Span::new(
                        quasi.start + 1,
                        quasi.end.saturating_sub(1).max(quasi.start + 1),
                    ),
                    has_interpolation: has_template_interpolation(tagged),
                });
            }
        }
        walk::walk_return_statement(self, it);
    }
}

/// Find the last `return vine\`...\`` inside a component function.
pub fn find_vine_template_return(fn_node: VineFnNode<'_>) -> Option<VineTemplateReturn> {
    let mut finder = VineReturnFinder::default();
    match fn_node {
        VineFnNode::Function(func) => finder.visit_function(func, ScopeFlags::Function),
        VineFnNode::Arrow(arrow) => finder.visit_arrow_function_expression(arrow),
    }
    finder.last
}

/// Check if an expression is a call to any recognized vine macro.
#[inline]
pub fn is_vine_macro_call(expr: &Expression<'_>) -> bool {
    matches!(expr, Expression::CallExpression(call) if macro_name_of_call(call).is_some())
}

/// Spans of every vine macro call inside a statement, in source order.
pub fn find_vine_macro_calls(stmt: &Statement<'_>) -> Vec<Span> {
    let mut finder = MacroCallFinder::default();
    finder.visit_statement(stmt);
    finder.calls
}

/// Check if a statement contains a vine macro call anywhere in its subtree.
#[inline]
pub fn contains_vine_macro_call(stmt: &Statement<'_>) -> bool {
    !find_vine_macro_calls(stmt).is_empty()
}

#[derive(Default)]
struct MacroCallFinder {
    calls: Vec<Span>,
}

impl<'a> Visit<'a> for MacroCallFinder {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if macro_name_of_call(it).is_some() {
            self.calls.push(it.span);
        }
        walk::walk_call_expression(self, it);
    }
}

/// Check if a statement may appear at the top level of a vine file.
#[inline]
pub fn is_valid_root_statement(stmt: &Statement<'_>) -> bool {
    matches!(
        stmt,
        Statement::ImportDeclaration(_)
            | Statement::ExportNamedDeclaration(_)
            | Statement::FunctionDeclaration(_)
            | Statement::ClassDeclaration(_)
            | Statement::TSEnumDeclaration(_)
            | Statement::VariableDeclaration(_)
            | Statement::TSTypeAliasDeclaration(_)
            | Statement::TSInterfaceDeclaration(_)
    )
}

/// Strip TypeScript-only expression wrappers (`as`, `satisfies`, `!`, `<T>x`).
pub fn unwrap_ts_node<'b, 'a>(expr: &'b Expression<'a>) -> &'b Expression<'a> {
    match expr {
        Expression::TSAsExpression(e) => unwrap_ts_node(&e.expression),
        Expression::TSSatisfiesExpression(e) => unwrap_ts_node(&e.expression),
        Expression::TSNonNullExpression(e) => unwrap_ts_node(&e.expression),
        Expression::TSTypeAssertion(e) => unwrap_ts_node(&e.expression),
        Expression::TSInstantiationExpression(e) => unwrap_ts_node(&e.expression),
        _ => expr,
    }
}

/// Strip TypeScript wrappers and parentheses.
pub fn unwrap_expression<'b, 'a>(expr: &'b Expression<'a>) -> &'b Expression<'a> {
    match unwrap_ts_node(expr) {
        Expression::ParenthesizedExpression(paren) => unwrap_expression(&paren.expression),
        other => other,
    }
}

/// Check if an expression is built only from literals, so its value is
/// known at compile time.
pub fn is_static_node(expr: &Expression<'_>) -> bool {
    match unwrap_ts_node(expr) {
        // void 0, !true
        Expression::UnaryExpression(e) => is_static_node(&e.argument),
        Expression::LogicalExpression(e) => is_static_node(&e.left) && is_static_node(&e.right),
        Expression::BinaryExpression(e) => is_static_node(&e.left) && is_static_node(&e.right),
        Expression::ConditionalExpression(e) => {
            is_static_node(&e.test) && is_static_node(&e.consequent) && is_static_node(&e.alternate)
        }
        Expression::SequenceExpression(e) => e.expressions.iter().all(is_static_node),
        Expression::TemplateLiteral(e) => e.expressions.iter().all(is_static_node),
        Expression::ParenthesizedExpression(e) => is_static_node(&e.expression),
        Expression::StringLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::BigIntLiteral(_) => true,
        _ => false,
    }
}

/// Check if an expression is any literal form.
#[inline]
pub fn is_literal_node(expr: &Expression<'_>) -> bool {
    matches!(
        expr,
        Expression::StringLiteral(_)
            | Expression::NumericLiteral(_)
            | Expression::BooleanLiteral(_)
            | Expression::NullLiteral(_)
            | Expression::BigIntLiteral(_)
            | Expression::RegExpLiteral(_)
            | Expression::TemplateLiteral(_)
    )
}

/// How [`is_call_of`] tests a callee identifier.
#[derive(Clone, Copy)]
pub enum CalleeTest<'t> {
    Name(&'t str),
    Matches(&'t dyn Fn(&str) -> bool),
}

/// Check if `expr` is a call whose callee is a plain identifier accepted by
/// `test`. An absent expression or an absent test never matches.
pub fn is_call_of(expr: Option<&Expression<'_>>, test: Option<CalleeTest<'_>>) -> bool {
    let (Some(Expression::CallExpression(call)), Some(test)) = (expr, test) else {
        return false;
    };
    let Expression::Identifier(callee) = &call.callee else {
        return false;
    };
    match test {
        CalleeTest::Name(name) => callee.name.as_str() == name,
        CalleeTest::Matches(matches) => matches(callee.name.as_str()),
    }
}

/// Check if a binding initialized by `expr` can never hold a ref.
///
/// `user_reactive_import` is the local name of Vue's `reactive`, whose
/// result is a proxy and never a ref.
pub fn can_never_be_ref(expr: &Expression<'_>, user_reactive_import: Option<&str>) -> bool {
    if is_call_of(Some(expr), user_reactive_import.map(CalleeTest::Name)) {
        return true;
    }
    match expr {
        Expression::UnaryExpression(_)
        | Expression::BinaryExpression(_)
        | Expression::ArrayExpression(_)
        | Expression::ObjectExpression(_)
        | Expression::FunctionExpression(_)
        | Expression::ArrowFunctionExpression(_)
        | Expression::UpdateExpression(_)
        | Expression::ClassExpression(_)
        | Expression::TaggedTemplateExpression(_) => true,
        Expression::SequenceExpression(seq) => seq
            .expressions
            .last()
            .is_some_and(|last| can_never_be_ref(last, user_reactive_import)),
        _ => is_literal_node(expr),
    }
}

/// The function node behind a component declaration.
#[derive(Debug, Clone, Copy)]
pub enum VineFnNode<'a> {
    Function(&'a Function<'a>),
    Arrow(&'a ArrowFunctionExpression<'a>),
}

impl<'a> VineFnNode<'a> {
    #[inline]
    pub fn params(&self) -> &'a FormalParameters<'a> {
        match *self {
            Self::Function(func) => &func.params,
            Self::Arrow(arrow) => &arrow.params,
        }
    }

    /// Top-level statements of the function body.
    pub fn body_statements(&self) -> &'a [Statement<'a>] {
        match *self {
            Self::Function(func) => match &func.body {
                Some(body) => &body.statements,
                None => &[],
            },
            Self::Arrow(arrow) => &arrow.body.statements,
        }
    }
}

impl GetSpan for VineFnNode<'_> {
    fn span(&self) -> Span {
        match *self {
            Self::Function(func) => func.span,
            Self::Arrow(arrow) => arrow.span,
        }
    }
}

/// Resolve the function node and name behind a component declaration.
///
/// Variable declarations only qualify when the first declarator binds a
/// plain identifier to a function or arrow expression.
pub fn get_function_info<'a>(stmt: &'a Statement<'a>) -> (Option<VineFnNode<'a>>, &'a str) {
    match unwrap_root_statement(stmt) {
        RootDeclaration::Function(func) => (
            Some(VineFnNode::Function(func)),
            func.id.as_ref().map_or("", |id| id.name.as_str()),
        ),
        RootDeclaration::Variable(var) => {
            let Some(declarator) = var.declarations.first() else {
                return (None, "");
            };
            let BindingPattern::BindingIdentifier(id) = &declarator.id else {
                return (None, "");
            };
            let fn_node = match declarator.init.as_ref().map(unwrap_expression) {
                Some(Expression::FunctionExpression(func)) => Some(VineFnNode::Function(func)),
                Some(Expression::ArrowFunctionExpression(arrow)) => Some(VineFnNode::Arrow(arrow)),
                _ => None,
            };
            (fn_node, id.name.as_str())
        }
        _ => (None, ""),
    }
}

/// All import declarations at the top level of a file.
pub fn get_import_statements<'a>(body: &'a [Statement<'a>]) -> Vec<&'a ImportDeclaration<'a>> {
    body.iter()
        .filter_map(|stmt| match stmt {
            Statement::ImportDeclaration(import) => Some(&**import),
            _ => None,
        })
        .collect()
}

/// Name of a property signature inside a type literal, or `""` for
/// computed keys.
pub fn ts_property_signature_name<'a>(signature: &TSPropertySignature<'a>) -> &'a str {
    match &signature.key {
        PropertyKey::StaticIdentifier(id) => id.name.as_str(),
        PropertyKey::StringLiteral(lit) => lit.value.as_str(),
        _ => "",
    }
}

/// Check if a type annotation is the `boolean` keyword.
#[inline]
pub fn is_boolean_type(ty: &TSType<'_>) -> bool {
    matches!(ty, TSType::TSBooleanKeyword(_))
}

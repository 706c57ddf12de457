//! Vine macro analysis.
//!
//! Recognizes the closed set of vine macros (`vineProp`, `vineEmits`,
//! `vineExpose`, `vineOptions`, `vineStyle` and their dotted variants) and
//! resolves every macro call inside a component function into an owned
//! [`MacroCallSite`].

use std::cell::Cell;

use oxc_ast::ast::{
    Argument, BindingIdentifier, BindingPattern, CallExpression, Expression, Function,
    IdentifierReference, TSSignature, TSType, TSTypeParameterDeclaration, VariableDeclarationKind,
    VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::{GetSpan, Span};
use oxc_syntax::scope::{ScopeFlags, ScopeId};
use serde::Serialize;
use vine_carton::{smallvec, CompactString, FxHashMap, FxHashSet, SmallVec};

use crate::ast::{is_boolean_type, ts_property_signature_name, unwrap_expression, VineFnNode};

/// Macro family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum MacroBase {
    Prop = 0,
    Emits = 1,
    Expose = 2,
    Options = 3,
    Style = 4,
}

impl MacroBase {
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vineProp" => Some(Self::Prop),
            "vineEmits" => Some(Self::Emits),
            "vineExpose" => Some(Self::Expose),
            "vineOptions" => Some(Self::Options),
            "vineStyle" => Some(Self::Style),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prop => "vineProp",
            Self::Emits => "vineEmits",
            Self::Expose => "vineExpose",
            Self::Options => "vineOptions",
            Self::Style => "vineStyle",
        }
    }

    /// Whether arguments of this macro are hoisted out of the setup function.
    #[inline]
    pub const fn is_hoisted(&self) -> bool {
        matches!(self, Self::Prop | Self::Options)
    }

    /// Whether the macro may be called at most once per component.
    #[inline]
    pub const fn is_singleton(&self) -> bool {
        !matches!(self, Self::Prop)
    }
}

/// Dotted variant of a macro (`vineProp.optional`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum MacroVariant {
    Optional = 0,
    WithDefault = 1,
    Scoped = 2,
}

impl MacroVariant {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Optional => "optional",
            Self::WithDefault => "withDefault",
            Self::Scoped => "scoped",
        }
    }
}

/// Structured macro key. Matching compares `base` and `variant` exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MacroName {
    pub base: MacroBase,
    pub variant: Option<MacroVariant>,
}

impl MacroName {
    pub const PROP: Self = Self::base(MacroBase::Prop);
    pub const PROP_OPTIONAL: Self = Self::with_variant(MacroBase::Prop, MacroVariant::Optional);
    pub const PROP_WITH_DEFAULT: Self =
        Self::with_variant(MacroBase::Prop, MacroVariant::WithDefault);
    pub const EMITS: Self = Self::base(MacroBase::Emits);
    pub const EXPOSE: Self = Self::base(MacroBase::Expose);
    pub const OPTIONS: Self = Self::base(MacroBase::Options);
    pub const STYLE: Self = Self::base(MacroBase::Style);
    pub const STYLE_SCOPED: Self = Self::with_variant(MacroBase::Style, MacroVariant::Scoped);

    #[inline]
    pub const fn base(base: MacroBase) -> Self {
        Self {
            base,
            variant: None,
        }
    }

    #[inline]
    pub const fn with_variant(base: MacroBase, variant: MacroVariant) -> Self {
        Self {
            base,
            variant: Some(variant),
        }
    }

    /// Resolve `object` / `object.property` callee names.
    pub fn from_callee(object: &str, property: Option<&str>) -> Option<Self> {
        let base = MacroBase::from_name(object)?;
        let variant = match (base, property) {
            (_, None) => None,
            (MacroBase::Prop, Some("optional")) => Some(MacroVariant::Optional),
            (MacroBase::Prop, Some("withDefault")) => Some(MacroVariant::WithDefault),
            (MacroBase::Style, Some("scoped")) => Some(MacroVariant::Scoped),
            _ => return None,
        };
        Some(Self { base, variant })
    }

    /// Source spelling, e.g. `vineProp.withDefault`.
    pub fn to_source(&self) -> CompactString {
        let mut name = CompactString::new(self.base.as_str());
        if let Some(variant) = self.variant {
            name.push('.');
            name.push_str(variant.as_str());
        }
        name
    }
}

impl std::fmt::Display for MacroName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_source())
    }
}

/// Resolve the macro a call expression invokes, if any.
pub fn macro_name_of_call(call: &CallExpression<'_>) -> Option<MacroName> {
    match &call.callee {
        Expression::Identifier(id) => MacroName::from_callee(id.name.as_str(), None),
        Expression::StaticMemberExpression(member) => match &member.object {
            Expression::Identifier(object) => MacroName::from_callee(
                object.name.as_str(),
                Some(member.property.name.as_str()),
            ),
            _ => None,
        },
        _ => None,
    }
}

/// Predicate over macro calls, built from one or more macro names.
#[derive(Debug, Clone, Copy)]
pub enum MacroMatcher<'n> {
    /// Every variant of a macro family.
    Base(MacroBase),
    /// Exactly one of the listed names.
    Names(&'n [MacroName]),
}

impl MacroMatcher<'_> {
    #[inline]
    pub fn matches_name(&self, name: MacroName) -> bool {
        match self {
            Self::Base(base) => name.base == *base,
            Self::Names(names) => names.contains(&name),
        }
    }

    #[inline]
    pub fn matches_call(&self, call: &CallExpression<'_>) -> bool {
        macro_name_of_call(call).is_some_and(|name| self.matches_name(name))
    }

    #[inline]
    pub fn matches(&self, expr: &Expression<'_>) -> bool {
        matches!(expr, Expression::CallExpression(call) if self.matches_call(call))
    }
}

/// Build a matcher accepting exactly the given macro names.
#[inline]
pub fn vine_macro_of(names: &[MacroName]) -> MacroMatcher<'_> {
    MacroMatcher::Names(names)
}

/// Shape of a macro call argument, as far as validation and analysis care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentShape {
    ObjectLiteral,
    BooleanLiteral(bool),
    /// `'...'`; `content` excludes the quotes.
    StringLiteral { content: Span },
    /// `` `...` ``; `content` excludes the backticks.
    TemplateLiteral { content: Span, interpolated: bool },
    /// `` tag`...` `` with an identifier tag.
    TaggedTemplate {
        tag: CompactString,
        content: Span,
        interpolated: bool,
    },
    Spread,
    Other,
}

/// One argument of a macro call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroArgument {
    pub span: Span,
    pub shape: ArgumentShape,
}

/// The single type argument of a macro call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroTypeArgument {
    pub span: Span,
    pub is_boolean: bool,
    /// Member names when the type argument is an object type literal.
    pub literal_members: Option<Vec<CompactString>>,
}

/// A free identifier referenced inside a hoisted macro argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentReference {
    pub name: CompactString,
    pub span: Span,
}

/// A resolved macro call inside a component function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroCallSite {
    pub name: MacroName,
    pub span: Span,
    /// Identifier bound by the declarator this call initializes, if the call
    /// is the (possibly wrapped) initializer of a single-identifier declarator.
    pub binding: Option<CompactString>,
    /// Number of type arguments written at the call.
    pub type_argument_count: usize,
    pub type_argument: Option<MacroTypeArgument>,
    pub arguments: SmallVec<[MacroArgument; 2]>,
    /// Free identifiers referenced from hoisted arguments, in source order.
    pub references: Vec<ArgumentReference>,
}

impl MacroCallSite {
    #[inline]
    pub fn first_argument(&self) -> Option<&MacroArgument> {
        self.arguments.first()
    }
}

/// Resolve every vine macro call inside a component function, in source order.
pub fn resolve_macro_calls(fn_node: VineFnNode<'_>) -> Vec<MacroCallSite> {
    let mut collector = MacroSiteCollector::default();
    match fn_node {
        VineFnNode::Function(func) => collector.visit_function(func, ScopeFlags::Function),
        VineFnNode::Arrow(arrow) => collector.visit_arrow_function_expression(arrow),
    }
    tracing::trace!(count = collector.sites.len(), "resolved vine macro calls");
    collector.sites
}

/// Calls of `matcher` among resolved sites.
pub fn sites_of<'s>(
    sites: &'s [MacroCallSite],
    matcher: MacroMatcher<'s>,
) -> impl Iterator<Item = &'s MacroCallSite> + 's {
    sites.iter().filter(move |site| matcher.matches_name(site.name))
}

#[derive(Default)]
struct MacroSiteCollector {
    sites: Vec<MacroCallSite>,
    /// Call span (start, end) -> identifier of the declarator it initializes.
    bound_calls: FxHashMap<(u32, u32), CompactString>,
}

impl<'a> Visit<'a> for MacroSiteCollector {
    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        if let (BindingPattern::BindingIdentifier(id), Some(init)) = (&it.id, &it.init) {
            if let Expression::CallExpression(call) = unwrap_expression(init) {
                self.bound_calls.insert(
                    (call.span.start, call.span.end),
                    CompactString::new(id.name.as_str()),
                );
            }
        }
        walk::walk_variable_declarator(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Some(name) = macro_name_of_call(it) {
            let binding = self.bound_calls.remove(&(it.span.start, it.span.end));
            self.sites.push(build_site(name, it, binding));
        }
        walk::walk_call_expression(self, it);
    }
}

fn build_site(
    name: MacroName,
    call: &CallExpression<'_>,
    binding: Option<CompactString>,
) -> MacroCallSite {
    let type_params = call.type_arguments.as_ref().map(|ta| &ta.params);
    let type_argument_count = type_params.map_or(0, |params| params.len());
    let type_argument = type_params
        .and_then(|params| params.first())
        .map(type_argument_of);

    let arguments: SmallVec<[MacroArgument; 2]> = call
        .arguments
        .iter()
        .map(|arg| MacroArgument {
            span: arg.span(),
            shape: argument_shape(arg),
        })
        .collect();

    let references = if name.base.is_hoisted() {
        ReferenceCollector::collect(call)
    } else {
        Vec::new()
    };

    MacroCallSite {
        name,
        span: call.span,
        binding,
        type_argument_count,
        type_argument,
        arguments,
        references,
    }
}

fn type_argument_of(ty: &TSType<'_>) -> MacroTypeArgument {
    let literal_members = match ty {
        TSType::TSTypeLiteral(lit) => Some(
            lit.members
                .iter()
                .filter_map(|member| match member {
                    TSSignature::TSPropertySignature(sig) => {
                        Some(CompactString::new(ts_property_signature_name(sig)))
                    }
                    TSSignature::TSMethodSignature(method) => method
                        .key
                        .static_name()
                        .map(|name| CompactString::new(name.as_ref())),
                    _ => None,
                })
                .filter(|name| !name.is_empty())
                .collect(),
        ),
        _ => None,
    };
    MacroTypeArgument {
        span: ty.span(),
        is_boolean: is_boolean_type(ty),
        literal_members,
    }
}

fn argument_shape(arg: &Argument<'_>) -> ArgumentShape {
    let expr = match arg {
        Argument::SpreadElement(_) => return ArgumentShape::Spread,
        _ => match arg.as_expression() {
            Some(expr) => unwrap_expression(expr),
            None => return ArgumentShape::Other,
        },
    };
    match expr {
        Expression::ObjectExpression(_) => ArgumentShape::ObjectLiteral,
        Expression::BooleanLiteral(lit) => ArgumentShape::BooleanLiteral(lit.value),
        Expression::StringLiteral(lit) => ArgumentShape::StringLiteral {
            content: inner_span(lit.span),
        },
        Expression::TemplateLiteral(tpl) => ArgumentShape::TemplateLiteral {
            content: inner_span(tpl.span),
            interpolated: !tpl.expressions.is_empty(),
        },
        Expression::TaggedTemplateExpression(tagged) => match &tagged.tag {
            Expression::Identifier(tag) => ArgumentShape::TaggedTemplate {
                tag: CompactString::new(tag.name.as_str()),
                content: inner_span(tagged.quasi.span),
                interpolated: !tagged.quasi.expressions.is_empty(),
            },
            _ => ArgumentShape::Other,
        },
        _ => ArgumentShape::Other,
    }
}

/// Strip the delimiters of a quoted literal span.
#[inline]
fn inner_span(span: Span) -> Span {
    let start = span.start + 1;
    Span::new(start, span.end.saturating_sub(1).max(start))
}

/// Collects free identifier references in hoisted macro arguments.
///
/// A name bound inside the arguments (parameter, local declaration) only
/// shadows references within the lexical scope declaring it. Type positions
/// are skipped since types are erased.
#[derive(Default)]
struct ReferenceCollector {
    scopes: Vec<LexicalScope>,
    /// Scopes enclosing the current node, innermost last.
    stack: ScopeChain,
    references: Vec<(ArgumentReference, ScopeChain)>,
    /// Bindings currently visited belong to a `var` declarator.
    in_var_binding: bool,
}

type ScopeChain = SmallVec<[usize; 8]>;

#[derive(Default)]
struct LexicalScope {
    names: FxHashSet<CompactString>,
    is_var_target: bool,
}

impl ReferenceCollector {
    fn collect(call: &CallExpression<'_>) -> Vec<ArgumentReference> {
        let mut collector = Self::default();
        collector.push_scope(true);
        for arg in call.arguments.iter() {
            collector.visit_argument(arg);
        }
        collector.into_free_references()
    }

    fn push_scope(&mut self, is_var_target: bool) {
        self.stack.push(self.scopes.len());
        self.scopes.push(LexicalScope {
            names: FxHashSet::default(),
            is_var_target,
        });
    }

    fn declare(&mut self, name: &str, hoist_to_var_scope: bool) {
        let target = if hoist_to_var_scope {
            self.stack
                .iter()
                .rev()
                .find(|&&scope| self.scopes[scope].is_var_target)
                .copied()
        } else {
            self.stack.last().copied()
        };
        if let Some(scope) = target {
            self.scopes[scope].names.insert(CompactString::new(name));
        }
    }

    /// Resolve after the walk, so declarations later in a scope still
    /// shadow earlier references in it.
    fn into_free_references(self) -> Vec<ArgumentReference> {
        let scopes = self.scopes;
        self.references
            .into_iter()
            .filter(|(reference, chain)| {
                !chain
                    .iter()
                    .any(|&scope| scopes[scope].names.contains(&reference.name))
            })
            .map(|(reference, _)| reference)
            .collect()
    }
}

impl<'a> Visit<'a> for ReferenceCollector {
    fn enter_scope(&mut self, flags: ScopeFlags, _scope_id: &Cell<Option<ScopeId>>) {
        self.push_scope(flags.is_var());
    }

    fn leave_scope(&mut self) {
        self.stack.pop();
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        // a declaration's name belongs to the enclosing scope
        if let (true, Some(id)) = (it.is_declaration(), &it.id) {
            self.declare(id.name.as_str(), true);
        }
        walk::walk_function(self, it, flags);
    }

    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        self.in_var_binding = it.kind == VariableDeclarationKind::Var;
        self.visit_binding_pattern(&it.id);
        self.in_var_binding = false;
        if let Some(init) = &it.init {
            self.visit_expression(init);
        }
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        self.references.push((
            ArgumentReference {
                name: CompactString::new(it.name.as_str()),
                span: it.span,
            },
            self.stack.clone(),
        ));
    }

    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.declare(it.name.as_str(), self.in_var_binding);
    }

    fn visit_ts_type(&mut self, _it: &TSType<'a>) {}

    fn visit_ts_type_parameter_declaration(&mut self, _it: &TSTypeParameterDeclaration<'a>) {}
}

/// Singleton macro calls that repeat an earlier call of the same family.
pub fn duplicated_singletons(sites: &[MacroCallSite]) -> SmallVec<[&MacroCallSite; 2]> {
    let mut seen: SmallVec<[MacroBase; 4]> = smallvec![];
    let mut duplicates = SmallVec::new();
    for site in sites.iter().filter(|site| site.name.base.is_singleton()) {
        if seen.contains(&site.name.base) {
            duplicates.push(site);
        } else {
            seen.push(site.name.base);
        }
    }
    duplicates
}

//! Binding classification for vine components.
//!
//! Every identifier visible at the top of a component body gets a
//! [`BindingKind`] that tells codegen how the template may access it.

use oxc_ast::ast::{
    BindingPattern, Expression, ImportDeclarationSpecifier, Statement,
    VariableDeclaration, VariableDeclarationKind,
};
use serde::Serialize;
use vine_carton::{CompactString, FxHashMap};

use crate::ast::{
    can_never_be_ref, is_static_node, is_vine_macro_call, unwrap_expression, unwrap_root_statement,
    RootDeclaration, VineFnNode,
};
use crate::imports::{ReactiveCall, ReactivityApis};
use crate::macros::{MacroBase, MacroMatcher};

/// How a binding is exposed to the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingKind {
    /// Stable reference; may not be known statically.
    SetupConst,
    /// Compile-time constant or module-level function/class/enum.
    LiteralConst,
    /// Reactive reference accessed through `.value`.
    SetupRef,
    /// Reactive proxy object.
    SetupReactiveConst,
}

impl BindingKind {
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SetupConst => "setup-const",
            Self::LiteralConst => "literal-const",
            Self::SetupRef => "setup-ref",
            Self::SetupReactiveConst => "setup-reactive-const",
        }
    }
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingAnalysis {
    pub bindings: FxHashMap<CompactString, BindingKind>,
    /// Body `setup-const` bindings that might still hold a ref at runtime.
    pub maybe_refs: Vec<CompactString>,
    /// Body top-level declarations -> index of the declaring statement.
    pub local_declarations: FxHashMap<CompactString, usize>,
}

/// Inputs shared by every component of a file.
pub struct BindingScope<'s, 'a> {
    pub program_body: &'a [Statement<'a>],
    pub apis: &'s ReactivityApis,
}

impl<'a> BindingScope<'_, 'a> {
    /// Classify the bindings visible inside `component`.
    pub fn classify(
        &self,
        component: &'a Statement<'a>,
        fn_node: VineFnNode<'a>,
        fn_name: &str,
        props_alias: Option<&str>,
    ) -> BindingAnalysis {
        let mut analysis = BindingAnalysis::default();

        for stmt in self.program_body {
            if std::ptr::eq(stmt, component) {
                continue;
            }
            collect_module_bindings(stmt, &mut analysis.bindings);
        }
        if !fn_name.is_empty() {
            analysis
                .bindings
                .insert(CompactString::new(fn_name), BindingKind::SetupConst);
        }
        if let Some(alias) = props_alias {
            analysis
                .bindings
                .insert(CompactString::new(alias), BindingKind::SetupReactiveConst);
        }

        for (index, stmt) in fn_node.body_statements().iter().enumerate() {
            self.collect_body_bindings(stmt, index, &mut analysis);
        }

        tracing::trace!(
            component = fn_name,
            bindings = analysis.bindings.len(),
            maybe_refs = analysis.maybe_refs.len(),
            "classified bindings"
        );
        analysis
    }

    fn collect_body_bindings(
        &self,
        stmt: &Statement<'a>,
        index: usize,
        analysis: &mut BindingAnalysis,
    ) {
        match stmt {
            Statement::VariableDeclaration(var) => self.collect_body_variables(var, index, analysis),
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    analysis.declare(id.name.as_str(), BindingKind::SetupConst, index);
                }
            }
            Statement::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    analysis.declare(id.name.as_str(), BindingKind::SetupConst, index);
                }
            }
            Statement::TSEnumDeclaration(decl) => {
                analysis.declare(decl.id.name.as_str(), BindingKind::SetupConst, index);
            }
            _ => {}
        }
    }

    fn collect_body_variables(
        &self,
        var: &VariableDeclaration<'a>,
        index: usize,
        analysis: &mut BindingAnalysis,
    ) {
        let is_const = var.kind == VariableDeclarationKind::Const;
        for declarator in var.declarations.iter() {
            let BindingPattern::BindingIdentifier(id) = &declarator.id else {
                let mut names = Vec::new();
                pattern_names(&declarator.id, &mut names);
                for name in names {
                    analysis.declare(&name, BindingKind::SetupConst, index);
                    analysis.maybe_refs.push(name);
                }
                continue;
            };
            let name = id.name.as_str();
            let init = declarator.init.as_ref().map(unwrap_expression);
            let kind = init.map_or(BindingKind::SetupConst, |init| self.classify_init(init));
            analysis.declare(name, kind, index);

            let provably_plain = is_const
                && init.is_some_and(|init| {
                    is_vine_macro_call(init) || can_never_be_ref(init, self.apis.reactive_local())
                });
            if kind == BindingKind::SetupConst && !provably_plain {
                analysis.maybe_refs.push(CompactString::new(name));
            }
        }
    }

    fn classify_init(&self, init: &Expression<'_>) -> BindingKind {
        if MacroMatcher::Base(MacroBase::Prop).matches(init) {
            return BindingKind::SetupRef;
        }
        if let Expression::CallExpression(call) = init {
            if let Expression::Identifier(callee) = &call.callee {
                match self.apis.classify_callee(callee.name.as_str()) {
                    Some(ReactiveCall::Ref) => return BindingKind::SetupRef,
                    Some(ReactiveCall::Reactive) => return BindingKind::SetupReactiveConst,
                    None => {}
                }
            }
        }
        BindingKind::SetupConst
    }
}

impl BindingAnalysis {
    fn declare(&mut self, name: &str, kind: BindingKind, index: usize) {
        let name = CompactString::new(name);
        self.local_declarations.insert(name.clone(), index);
        self.bindings.insert(name, kind);
    }
}

/// Module-level bindings of one top-level statement.
fn collect_module_bindings<'a>(
    stmt: &'a Statement<'a>,
    bindings: &mut FxHashMap<CompactString, BindingKind>,
) {
    match unwrap_root_statement(stmt) {
        RootDeclaration::Import(import) => {
            let Some(specifiers) = &import.specifiers else {
                return;
            };
            if import.import_kind.is_type() {
                return;
            }
            for specifier in specifiers.iter() {
                let local = match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => {
                        if s.import_kind.is_type() {
                            continue;
                        }
                        s.local.name.as_str()
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => s.local.name.as_str(),
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        s.local.name.as_str()
                    }
                };
                bindings.insert(CompactString::new(local), BindingKind::SetupConst);
            }
        }
        RootDeclaration::Function(func) => {
            if let Some(id) = &func.id {
                bindings.insert(CompactString::new(id.name.as_str()), BindingKind::LiteralConst);
            }
        }
        RootDeclaration::Class(class) => {
            if let Some(id) = &class.id {
                bindings.insert(CompactString::new(id.name.as_str()), BindingKind::LiteralConst);
            }
        }
        RootDeclaration::Enum(decl) => {
            bindings.insert(
                CompactString::new(decl.id.name.as_str()),
                BindingKind::LiteralConst,
            );
        }
        RootDeclaration::Variable(var) => {
            for declarator in var.declarations.iter() {
                match &declarator.id {
                    BindingPattern::BindingIdentifier(id) => {
                        let is_literal = var.kind == VariableDeclarationKind::Const
                            && declarator.init.as_ref().is_some_and(is_static_node);
                        let kind = if is_literal {
                            BindingKind::LiteralConst
                        } else {
                            BindingKind::SetupConst
                        };
                        bindings.insert(CompactString::new(id.name.as_str()), kind);
                    }
                    _ => {
                        let mut names = Vec::new();
                        pattern_names(&declarator.id, &mut names);
                        for name in names {
                            bindings.insert(name, BindingKind::SetupConst);
                        }
                    }
                }
            }
        }
        RootDeclaration::Type | RootDeclaration::Other => {}
    }
}

/// Every identifier bound by a (possibly nested) binding pattern.
fn pattern_names(pattern: &BindingPattern<'_>, names: &mut Vec<CompactString>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            names.push(CompactString::new(id.name.as_str()));
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in obj.properties.iter() {
                pattern_names(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                pattern_names(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for elem in arr.elements.iter().flatten() {
                pattern_names(elem, names);
            }
            if let Some(rest) = &arr.rest {
                pattern_names(&rest.argument, names);
            }
        }
        BindingPattern::AssignmentPattern(assign) => pattern_names(&assign.left, names),
    }
}

//! Import analysis for vine files.
//!
//! Records every imported local name and recognizes Vue reactivity
//! constructors, including aliased imports such as
//! `import { reactive as VueReactive } from 'vue'`.

use oxc_ast::ast::{ImportDeclaration, ImportDeclarationSpecifier, Statement};
use serde::Serialize;
use vine_carton::{CompactString, FxHashMap, FxHashSet};

use crate::ast::{get_import_statements, VUE_REACTIVE_APIS, VUE_REF_APIS};

/// Metadata for one imported local name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub source: CompactString,
    pub is_type: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_namespace: bool,
    pub is_used_in_template: bool,
}

/// Imports of a file, keyed by local name.
#[derive(Debug, Clone, Default)]
pub struct ImportAnalysis {
    pub user_imports: FxHashMap<CompactString, ImportRecord>,
    /// Imported Vue API name -> local name.
    pub vue_import_aliases: FxHashMap<CompactString, CompactString>,
}

impl ImportAnalysis {
    /// Analyze every top-level import of a file.
    pub fn of_program<'a>(body: &'a [Statement<'a>]) -> Self {
        let mut analysis = Self::default();
        for import in get_import_statements(body) {
            analysis.add_import(import);
        }
        analysis
    }

    fn add_import(&mut self, import: &ImportDeclaration<'_>) {
        let source = CompactString::new(import.source.value.as_str());
        let is_vue = source == "vue";
        let declaration_is_type = import.import_kind.is_type();
        let Some(specifiers) = &import.specifiers else {
            return;
        };

        for specifier in specifiers.iter() {
            let (local, is_type, is_namespace) = match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    if is_vue {
                        self.vue_import_aliases.insert(
                            CompactString::new(s.imported.name().as_str()),
                            CompactString::new(s.local.name.as_str()),
                        );
                    }
                    (
                        s.local.name.as_str(),
                        declaration_is_type || s.import_kind.is_type(),
                        false,
                    )
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    (s.local.name.as_str(), declaration_is_type, false)
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    (s.local.name.as_str(), declaration_is_type, true)
                }
            };
            self.user_imports.insert(
                CompactString::new(local),
                ImportRecord {
                    source: source.clone(),
                    is_type,
                    is_namespace,
                    is_used_in_template: false,
                },
            );
        }
    }

    pub fn reactivity(&self) -> ReactivityApis {
        ReactivityApis::new(&self.user_imports, &self.vue_import_aliases)
    }
}

/// What a reactivity constructor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactiveCall {
    /// `ref`, `computed`, ... : accessed through `.value`.
    Ref,
    /// `reactive`, `shallowReactive`: a proxy object.
    Reactive,
}

/// Resolves callee names to Vue reactivity constructors.
#[derive(Debug, Clone, Default)]
pub struct ReactivityApis {
    /// Local name -> constructor kind, for imports from `vue`.
    vue_locals: FxHashMap<CompactString, ReactiveCall>,
    /// Local names imported from other modules.
    foreign: FxHashSet<CompactString>,
    reactive_local: Option<CompactString>,
}

impl ReactivityApis {
    pub fn new(
        user_imports: &FxHashMap<CompactString, ImportRecord>,
        vue_import_aliases: &FxHashMap<CompactString, CompactString>,
    ) -> Self {
        let mut vue_locals = FxHashMap::default();
        for (api, local) in vue_import_aliases {
            if let Some(kind) = canonical_kind(api) {
                vue_locals.insert(local.clone(), kind);
            }
        }
        let foreign = user_imports
            .iter()
            .filter(|(_, record)| record.source != "vue")
            .map(|(local, _)| local.clone())
            .collect();
        let reactive_local = vue_import_aliases.get("reactive").cloned();
        Self {
            vue_locals,
            foreign,
            reactive_local,
        }
    }

    /// Resolve a callee identifier.
    pub fn classify_callee(&self, name: &str) -> Option<ReactiveCall> {
        if let Some(kind) = self.vue_locals.get(name) {
            return Some(*kind);
        }
        if self.foreign.contains(name) {
            return None;
        }
        canonical_kind(name)
    }

    /// Local name of Vue's `reactive`, if it is callable in this file.
    pub fn reactive_local(&self) -> Option<&str> {
        match &self.reactive_local {
            Some(local) => Some(local.as_str()),
            None if !self.foreign.contains("reactive") => Some("reactive"),
            None => None,
        }
    }
}

#[inline]
fn canonical_kind(name: &str) -> Option<ReactiveCall> {
    if VUE_REF_APIS.contains(&name) {
        Some(ReactiveCall::Ref)
    } else if VUE_REACTIVE_APIS.contains(&name) {
        Some(ReactiveCall::Reactive)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn analyze(source: &str) -> ImportAnalysis {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::ts()).parse();
        ImportAnalysis::of_program(&ret.program.body)
    }

    #[test]
    fn test_import_records() {
        let analysis = analyze(
            r#"
import type { Foo } from 'lib-a'
import { type Bar, baz } from 'lib-b'
import Def from 'lib-c'
import * as NS from 'lib-d'
import 'side-effect'
"#,
        );
        let imports = &analysis.user_imports;
        assert_eq!(imports.len(), 5);
        assert!(imports["Foo"].is_type);
        assert!(imports["Bar"].is_type);
        assert!(!imports["baz"].is_type);
        assert_eq!(imports["Def"].source, "lib-c");
        assert!(imports["NS"].is_namespace);
        assert!(!imports["NS"].is_used_in_template);
    }

    #[test]
    fn test_vue_aliases() {
        let analysis = analyze("import { ref, reactive as VueReactive } from 'vue'");
        assert_eq!(analysis.vue_import_aliases["ref"], "ref");
        assert_eq!(analysis.vue_import_aliases["reactive"], "VueReactive");

        let apis = analysis.reactivity();
        assert_eq!(apis.classify_callee("VueReactive"), Some(ReactiveCall::Reactive));
        assert_eq!(apis.classify_callee("ref"), Some(ReactiveCall::Ref));
        assert_eq!(apis.classify_callee("computed"), Some(ReactiveCall::Ref));
        assert_eq!(apis.classify_callee("useFoo"), None);
        assert_eq!(apis.reactive_local(), Some("VueReactive"));
    }

    #[test]
    fn test_foreign_import_shadows_api_name() {
        let analysis = analyze("import { ref } from 'my-signals'");
        let apis = analysis.reactivity();
        assert_eq!(apis.classify_callee("ref"), None);
        assert_eq!(apis.classify_callee("reactive"), Some(ReactiveCall::Reactive));
        assert_eq!(apis.reactive_local(), Some("reactive"));
    }
}

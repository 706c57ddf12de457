//! # vine_croquis
//!
//! Croquis - The semantic analysis layer for Vine.
//!
//! ## Name Origin
//!
//! **Croquis** (/kʁɔ.ki/) is a French term for a quick, sketchy drawing that captures
//! the essential features of a subject. `vine_croquis` sketches the meaning of a
//! vine file: which functions are components, what their macros declare, and how
//! every identifier they touch is bound.
//!
//! ## Purpose
//!
//! - **Predicates**: Pure queries over the oxc AST (`ast`)
//! - **Component Discovery**: Top-level component declarations (`finder`)
//! - **Macro Resolution**: `vineProp`, `vineEmits`, `vineExpose`, `vineOptions`, `vineStyle` (`macros`)
//! - **Binding Classification**: How the template sees each identifier (`binding`)
//! - **Validation**: Structural, macro-usage and hoisting checks (`validate`)
//! - **Style Correlation**: Scope ids and `v-bind()` hashes (`css`)
//!
//! ## Architecture
//!
//! ```text
//!   oxc_parser (Parse)
//!        ↓
//!  vine_croquis (Semantic Analysis)  ← This crate
//!        ↓
//!  vine_atelier (Compile context, IR)
//! ```

pub mod ast;
pub mod binding;
pub mod css;
pub mod diagnostics;
pub mod finder;
pub mod imports;
pub mod macros;
pub mod node_tree;
pub mod props;
pub mod validate;

pub use binding::{BindingAnalysis, BindingKind, BindingScope};
pub use css::StyleLang;
pub use diagnostics::{DiagnosticKind, Diagnostics, Severity, VineDiagnostic};
pub use finder::{resolve_vine_components, ResolvedComponent, VineComponentDecl};
pub use imports::{ImportAnalysis, ImportRecord, ReactivityApis};
pub use macros::{MacroBase, MacroCallSite, MacroMatcher, MacroName, MacroVariant};
pub use node_tree::{NodeId, SyntaxIndex};
pub use props::PropMeta;
pub use validate::{validate_vine, ValidationOutcome};

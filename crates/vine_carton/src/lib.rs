//! Carton - The shared toolbox for Vine.
//!
//! Foundational utilities used by every other Vine crate: the `hash-sum`
//! compatible hasher behind scope ids, source location mapping, and the
//! collection types the analysis crates share.

pub mod hash;
pub mod source_range;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

pub use hash::hash_sum;
pub use source_range::{LineIndex, SourceLocation, SourceRange};

//! `hash-sum` compatible hashing.
//!
//! Scope ids and css variable names have to agree with what the JavaScript side
//! of the toolchain computes for the same component, so this mirrors the fold
//! the `hash-sum` package applies when it hashes a string value.

/// Hash a string the way `hash-sum` does and return the 8+ digit hex form.
///
/// # Example
///
/// ```
/// use vine_carton::hash::hash_sum;
///
/// assert_eq!(hash_sum("testAnalyzeVineStyle:MyComp"), "77af4072");
/// ```
pub fn hash_sum(value: &str) -> String {
    // hash-sum folds the (empty) key, the object tag and the type name
    // before the value itself.
    let mut hash = fold(0, "");
    hash = fold(hash, "[object String]");
    hash = fold(hash, "string");
    hash = fold(hash, value);
    format!("{:08x}", hash)
}

/// One `fold` step over the UTF-16 code units of `text`.
///
/// The intermediate value may exceed `i32` after the final sign fix-up,
/// which is why the accumulator is carried as `i64`.
fn fold(hash: i64, text: &str) -> i64 {
    if text.is_empty() {
        return hash;
    }
    let mut hash = hash;
    for unit in text.encode_utf16() {
        let shifted = to_int32(hash).wrapping_shl(5) as i64;
        hash = to_int32(shifted - hash + unit as i64) as i64;
    }
    if hash < 0 {
        hash * -2
    } else {
        hash
    }
}

/// ECMAScript `ToInt32` for integral values.
#[inline]
fn to_int32(value: i64) -> i32 {
    value as i32
}

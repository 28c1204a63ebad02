//! Constant-time comparison of integrity tags.

use std::hint::black_box;

/// Compare two hex tag strings without short-circuiting on the first difference.
///
/// Lengths are public (tags have a fixed size), so a length mismatch returns
/// `false` straight away. Equal-length inputs are always scanned in full.
///
/// This is the only function that may be used to compare integrity tags.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    accumulate_difference(a.as_bytes(), b.as_bytes(), |_| {}) == 0
}

/// OR together the XOR of every byte pair, calling `visit` with each index.
fn accumulate_difference(a: &[u8], b: &[u8], mut visit: impl FnMut(usize)) -> u8 {
    let mut diff = 0u8;
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        visit(i);
        diff |= black_box(x ^ y);
    }
    black_box(diff)
}

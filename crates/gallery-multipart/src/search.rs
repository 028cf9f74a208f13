//! Byte-sequence search.

use memchr::memmem;

/// Find the first occurrence of `needle` in `haystack` at or after `from`.
///
/// Returns the absolute index of the match. An empty needle never matches,
/// and a `from` past the end of the haystack yields `None`.
#[must_use]
pub fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    memmem::find(&haystack[from..], needle).map(|pos| from + pos)
}

//! Boundary scanning and part segmentation.
//!
//! A body looks like this on the wire:
//!
//! ```text
//! [preamble]--TOKEN\r\n
//! <part 0 headers>\r\n\r\n<part 0 value>\r\n
//! --TOKEN\r\n
//! <part 1 headers>\r\n\r\n<part 1 value>\r\n
//! --TOKEN--[epilogue]
//! ```
//!
//! [`Parts`] yields the slices between consecutive delimiters with the
//! delimiter, its `--` marker and the surrounding CRLF removed. Only literal
//! delimiter positions drive segmentation: a file whose bytes contain
//! `--TOKEN` will be split at that point. That is a known limitation.

use crate::search::find;

const CRLF: &[u8] = b"\r\n";
const DASHES: &[u8] = b"--";

/// Lazy iterator over the raw parts of a multipart body.
///
/// The iterator is finite and fused: once it returns `None` it keeps
/// returning `None`. Each emitted part advances the scan cursor strictly
/// forward, so segmentation always terminates.
#[derive(Debug, Clone)]
pub struct Parts<'a> {
    body: &'a [u8],
    delimiter: Vec<u8>,
    /// Start of the next part, or `None` once segmentation has ended.
    cursor: Option<usize>,
    boundary_found: bool,
}

impl<'a> Parts<'a> {
    /// Start segmenting `body` on `boundary`.
    ///
    /// `boundary` is the bare token from the `Content-Type` header; the `--`
    /// marker is added here. An empty boundary produces no parts.
    #[must_use]
    pub fn new(body: &'a [u8], boundary: &[u8]) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + DASHES.len());
        delimiter.extend_from_slice(DASHES);
        delimiter.extend_from_slice(boundary);

        let first = if boundary.is_empty() {
            None
        } else {
            find(body, &delimiter, 0)
        };

        let cursor = first.and_then(|at| after_delimiter(body, at + delimiter.len()));
        tracing::trace!(
            boundary_found = first.is_some(),
            first_part = ?cursor,
            "multipart scan started"
        );

        Self {
            body,
            delimiter,
            cursor,
            boundary_found: first.is_some(),
        }
    }

    /// Returns true if at least one delimiter occurs in the body.
    #[must_use]
    pub fn boundary_found(&self) -> bool {
        self.boundary_found
    }

    /// Returns true once no further parts will be produced.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor?;

        let Some(at) = find(self.body, &self.delimiter, start) else {
            // Trailing bytes without a closing delimiter are not a part.
            self.cursor = None;
            return None;
        };

        let end = if self.body[..at].ends_with(CRLF) {
            at - CRLF.len()
        } else {
            at
        };

        let next = after_delimiter(self.body, at + self.delimiter.len());
        debug_assert!(next.is_none_or(|n| n > start));
        self.cursor = next;

        if end <= start {
            tracing::debug!(start, end, "empty multipart segment, stopping scan");
            self.cursor = None;
            return None;
        }

        Some(&self.body[start..end])
    }
}

impl std::iter::FusedIterator for Parts<'_> {}

/// Position of the next part after a delimiter ending at `pos`, or `None` if
/// the delimiter is the terminal `--TOKEN--` form.
fn after_delimiter(body: &[u8], pos: usize) -> Option<usize> {
    let rest = &body[pos..];
    if rest.starts_with(DASHES) {
        return None;
    }
    if rest.starts_with(CRLF) {
        Some(pos + CRLF.len())
    } else {
        Some(pos)
    }
}

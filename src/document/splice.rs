//! Span-based text splicing.

use std::ops::Range;

/// A replacement of one byte span of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// Byte range being replaced. An empty range is an insertion.
    pub range: Range<usize>,
    /// Text written in place of the range.
    pub replacement: String,
}

impl Splice {
    /// Replace `range` with `replacement`.
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self { range, replacement: replacement.into() }
    }

    /// Insert `text` at byte offset `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self { range: at..at, replacement: text.into() }
    }

    /// Apply the splice, leaving every byte outside the range untouched.
    ///
    /// Out-of-bounds or non-boundary ranges are clamped to the document.
    pub fn apply(&self, text: &str) -> String {
        let end = clamp_to_boundary(text, self.range.end);
        let start = clamp_to_boundary(text, self.range.start.min(end));

        let mut out = String::with_capacity(text.len() - (end - start) + self.replacement.len());
        out.push_str(&text[..start]);
        out.push_str(&self.replacement);
        out.push_str(&text[end..]);
        out
    }
}

fn clamp_to_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Byte offset of the first line that is exactly `heading` (ignoring trailing whitespace).
pub fn find_heading(text: &str, heading: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end() == heading {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

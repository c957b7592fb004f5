//! Byte positions of core terms in their source file.
//!
//! The elaborator never reads source text itself, it only carries these positions along
//! so that diagnostics can point at the place a metavariable or an equation came from.

use std::fmt;
use std::ops::Range;

/// A byte position in a source file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteIndex(pub u32);

impl ByteIndex {
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ByteIndex {
    fn from(raw: u32) -> ByteIndex {
        ByteIndex(raw)
    }
}

impl fmt::Display for ByteIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A half-open range of bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    start: ByteIndex,
    end: ByteIndex,
}

impl Span {
    /// # Panics
    ///
    /// If `end` lies before `start`.
    pub fn new(start: u32, end: u32) -> Span {
        let start = ByteIndex(start);
        let end = ByteIndex(end);
        assert!(start <= end, "span ends before it starts");
        Span { start, end }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span { start: self.start.min(other.start), end: self.end.max(other.end) }
    }

    pub fn start(self) -> ByteIndex {
        self.start
    }

    pub fn end(self) -> ByteIndex {
        self.end
    }

    pub fn len(self) -> usize {
        (self.end.0 - self.start.0) as usize
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<Range<u32>> for Span {
    fn from(range: Range<u32>) -> Span {
        Span::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Range<usize> {
        span.start.to_usize()..span.end.to_usize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_gap() {
        let merged = Span::new(2, 4).merge(Span::new(10, 12));
        assert_eq!(merged, Span::new(2, 12));
        assert_eq!(merged.len(), 10);
    }

    #[test]
    fn range_roundtrip() {
        let span = Span::from(3u32..7);
        let range: Range<usize> = span.into();
        assert_eq!(range, 3..7);
    }

    #[test]
    #[should_panic]
    fn reversed_span_is_rejected() {
        let _ = Span::new(5, 1);
    }
}

use serde::{Deserialize, Serialize};

/// Inclusive range of 1-based line numbers in the original source file.
///
/// The parser assigns spans when it builds the tree; after that the only
/// mutation is the condense pass extending an atom's end line while
/// merging adjacent text runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    /// Span with no position information (nodes synthesized without a
    /// source location, e.g. an implicit empty else block).
    pub const EMPTY: LineSpan = LineSpan { start: 0, end: 0 };

    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Single-line span.
    pub const fn line(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: LineSpan) -> LineSpan {
        LineSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub const fn is_empty(self) -> bool {
        self.start == 0 && self.end == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_takes_the_union() {
        let a = LineSpan::new(3, 4);
        let b = LineSpan::new(6, 9);
        assert_eq!(a.cover(b), LineSpan::new(3, 9));
        assert_eq!(b.cover(a), LineSpan::new(3, 9));
    }

    #[test]
    fn single_line_span() {
        let s = LineSpan::line(7);
        assert_eq!(s.start, 7);
        assert_eq!(s.end, 7);
        assert!(!s.is_empty());
        assert!(LineSpan::EMPTY.is_empty());
    }
}

//! Source position tracking for the Vue template compiler.
//!
//! This crate provides the cursor arithmetic used by the template parser:
//! line/column/offset positions, located source snippets, and plain byte
//! spans that convert to and from `text-size` ranges.

pub use text_size::{TextRange, TextSize};
use std::ops::Range;

/// Byte range `start..end` into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The span as a slice index.
    #[inline]
    pub fn range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self::new(range.start().into(), range.end().into())
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start.into(), span.end.into())
    }
}

/// A cursor position in the template source.
///
/// `line` and `column` are 1-based, `offset` is a 0-based byte offset.
/// Columns count characters, not bytes, so multi-byte text does not skew
/// positions reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Byte offset from the start of the source.
    pub offset: u32,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column, in characters.
    pub column: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl Position {
    /// The position of the first character of any source.
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 1,
    };

    /// Create a new position.
    #[inline]
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Advance this position past the first `len` bytes of `source`.
    ///
    /// `source` must be the text that starts at this position and `len`
    /// must fall on a character boundary.
    pub fn advance(&mut self, source: &str, len: usize) {
        let consumed = &source[..len];
        match consumed.rfind('\n') {
            Some(last_newline) => {
                self.line += consumed.bytes().filter(|&b| b == b'\n').count() as u32;
                self.column = consumed[last_newline + 1..].chars().count() as u32 + 1;
            }
            None => {
                self.column += consumed.chars().count() as u32;
            }
        }
        self.offset += len as u32;
    }

    /// Return a copy of this position advanced past `len` bytes of `source`.
    #[inline]
    pub fn advanced(mut self, source: &str, len: usize) -> Self {
        self.advance(source, len);
        self
    }
}

/// A located snippet of the original source.
///
/// Invariant: `source == original[start.offset..end.offset]` for every
/// location produced by the parser. Synthesized nodes use [`SourceLocation::STUB`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    /// Start position (inclusive).
    pub start: Position,
    /// End position (exclusive).
    pub end: Position,
    /// The source text covered by this location.
    pub source: String,
}

impl SourceLocation {
    /// Location carried by synthesized nodes.
    pub const STUB: SourceLocation = SourceLocation {
        start: Position::START,
        end: Position::START,
        source: String::new(),
    };

    /// Slice `original` between two positions.
    pub fn new(original: &str, start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            source: original[Span::new(start.offset, end.offset).range()].to_string(),
        }
    }

    /// A zero-width location at `pos`.
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
            source: String::new(),
        }
    }

    /// The byte span covered by this location.
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.start.offset, self.end.offset)
    }

    /// Extend this location to `end`, appending the text in between.
    pub fn extend_to(&mut self, original: &str, end: Position) {
        self.source
            .push_str(&original[Span::new(self.end.offset, end.offset).range()]);
        self.end = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_span_converts_to_text_range() {
        let span = Span::new(3, 7);
        assert_eq!(span.len(), 4);
        assert_eq!(span.range(), 3..7);
        let range: TextRange = span.into();
        assert_eq!(range.len(), TextSize::new(4));
        assert_eq!(Span::from(range), span);
        assert!(Span::new(5, 5).is_empty());
    }

    #[test]
    fn test_advance_single_line() {
        let mut pos = Position::START;
        pos.advance("hello world", 5);
        assert_eq!(pos, Position::new(5, 1, 6));
    }

    #[test]
    fn test_advance_across_newlines() {
        let mut pos = Position::START;
        pos.advance("ab\ncd\nef", 7);
        assert_eq!(pos, Position::new(7, 3, 2));
    }

    #[test]
    fn test_advance_counts_characters_for_columns() {
        let source = "héllo";
        let mut pos = Position::START;
        pos.advance(source, source.len());
        assert_eq!(pos.offset, 6);
        assert_eq!(pos.column, 6);
    }

    #[test]
    fn test_advanced_does_not_mutate() {
        let pos = Position::START;
        let next = pos.advanced("abc", 2);
        assert_eq!(pos, Position::START);
        assert_eq!(next, Position::new(2, 1, 3));
    }

    #[test]
    fn test_location_slices_original() {
        let original = "<div>hi</div>";
        let start = Position::START.advanced(original, 5);
        let end = start.advanced(&original[5..], 2);
        let loc = SourceLocation::new(original, start, end);
        assert_eq!(loc.source, "hi");
        assert_eq!(loc.span(), Span::new(5, 7));
    }

    #[test]
    fn test_extend_to() {
        let original = "abcdef";
        let mut loc = SourceLocation::new(original, Position::START, Position::new(2, 1, 3));
        loc.extend_to(original, Position::new(4, 1, 5));
        assert_eq!(loc.source, "abcd");
        assert_eq!(loc.end.offset, 4);
    }
}

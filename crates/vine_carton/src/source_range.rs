//! Byte-offset to line/column mapping.

use serde::Serialize;

/// A byte range inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SourceRange {
    pub start: u32,
    pub end: u32,
}

impl SourceRange {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Slice the range out of `source`, or `""` when it does not fit.
    #[inline]
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}

/// A located range inside a source file.
///
/// `start`/`end` are byte offsets, `line`/`column` are 1-based and describe
/// `start`. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub start: u32,
    pub end: u32,
    pub line: u32,
    pub column: u32,
}

/// Line start table for a single source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(source.len() / 32 + 1);
        line_starts.push(0);
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// Resolve a byte range to a [`SourceLocation`].
    ///
    /// Offsets past the end of `source` are clamped to its length.
    pub fn locate(&self, source: &str, start: u32, end: u32) -> SourceLocation {
        let clamped = (start as usize).min(source.len()) as u32;
        let line_idx = match self.line_starts.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx] as usize;
        let column = source
            .get(line_start..clamped as usize)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(clamped as usize - line_start);

        SourceLocation {
            start,
            end,
            line: line_idx as u32 + 1,
            column: column as u32 + 1,
        }
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let source = "const a = 1";
        let index = LineIndex::new(source);
        let loc = index.locate(source, 6, 7);
        assert_eq!((loc.line, loc.column), (1, 7));
    }

    #[test]
    fn test_later_lines() {
        let source = "a\nbc\n\ndef";
        let index = LineIndex::new(source);
        assert_eq!(index.line_count(), 4);

        let loc = index.locate(source, 3, 4);
        assert_eq!((loc.line, loc.column), (2, 2));

        let loc = index.locate(source, 6, 9);
        assert_eq!((loc.line, loc.column), (4, 1));
    }

    #[test]
    fn test_offset_at_newline_boundary() {
        let source = "ab\ncd";
        let index = LineIndex::new(source);
        let loc = index.locate(source, 3, 3);
        assert_eq!((loc.line, loc.column), (2, 1));
    }

    #[test]
    fn test_range_slice() {
        let source = "vineProp<string>()";
        assert_eq!(SourceRange::new(0, 8).slice(source), "vineProp");
        assert_eq!(SourceRange::new(4, 99).slice(source), "");
    }

    #[test]
    fn test_clamps_out_of_range() {
        let source = "ab";
        let index = LineIndex::new(source);
        let loc = index.locate(source, 10, 12);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.start, 10);
    }
}

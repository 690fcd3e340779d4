//! Line and column lookup for spans.
//!
//! For repeated lookups on the same source, [`LineOffsetTable`] pre-computes
//! line starts so each lookup is a binary search.

/// Pre-computed line offset table.
///
/// # Example
///
/// ```
/// use ts2c_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "let a;\nlet b;";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 11), (2, 5));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start; `offsets[0]` is always 0.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX).saturating_add(1)
    }

    /// 1-based (line, column). Columns count characters, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.line_start(line);
        let end = (offset as usize).min(source.len()).max(line_start);
        let col = source
            .get(line_start..end)
            .map_or(0, |text| text.chars().count());
        (line, u32::try_from(col).unwrap_or(u32::MAX).saturating_add(1))
    }

    /// Text of a 1-based line, without its trailing newline. Empty for a
    /// line past the end of the source.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> &'s str {
        if line == 0 || line as usize > self.offsets.len() {
            return "";
        }
        let start = self.line_start(line).min(source.len());
        let end = self
            .offsets
            .get(line as usize)
            .map_or(source.len(), |&next| (next as usize).saturating_sub(1))
            .clamp(start, source.len());
        source.get(start..end).unwrap_or("").trim_end_matches('\r')
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    fn line_start(&self, line: u32) -> usize {
        let idx = (line as usize).saturating_sub(1);
        self.offsets.get(idx).copied().unwrap_or(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_from_offset() {
        let table = LineOffsetTable::build("ab\ncd\n\nef");
        assert_eq!(table.line_from_offset(0), 1);
        assert_eq!(table.line_from_offset(2), 1);
        assert_eq!(table.line_from_offset(3), 2);
        assert_eq!(table.line_from_offset(6), 3);
        assert_eq!(table.line_from_offset(7), 4);
        assert_eq!(table.line_count(), 4);
    }

    #[test]
    fn test_columns_count_chars() {
        let source = "s = \"é\"; x";
        let table = LineOffsetTable::build(source);
        let x = u32::try_from(source.find('x').unwrap_or(0)).unwrap_or(0);
        assert_eq!(table.offset_to_line_col(source, x), (1, 10));
    }

    #[test]
    fn test_line_text() {
        let source = "first\r\nsecond\nthird";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_text(source, 1), "first");
        assert_eq!(table.line_text(source, 2), "second");
        assert_eq!(table.line_text(source, 3), "third");
        assert_eq!(table.line_text(source, 0), "");
        assert_eq!(table.line_text(source, 4), "");
        assert_eq!(table.line_text(source, 9), "");
    }
}

/// Position tracking for tokens and error reports
///
/// Lines and columns are 1-based, matching what the parse engines report
/// and what the error context prints.
use text_size::TextSize;

/// A position in source text (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The position of the very first character.
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets to line/column positions.
///
/// Columns count characters, not bytes, so a marker inserted at
/// `column - 1` chars lands where the user sees the token.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    text: String,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(TextSize::new((offset + 1) as u32));
            }
        }
        Self {
            line_starts,
            text: text.to_string(),
        }
    }

    /// Convert a byte offset into a 1-based position.
    pub fn position(&self, offset: TextSize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = u32::from(self.line_starts[line]) as usize;
        let end = (u32::from(offset) as usize).min(self.text.len());
        let column = self
            .text
            .get(start..end)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        Position::new(line + 1, column + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_based() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.position(TextSize::new(0)), Position::new(1, 1));
        assert_eq!(index.position(TextSize::new(1)), Position::new(1, 2));
        assert_eq!(index.position(TextSize::new(3)), Position::new(2, 1));
        assert_eq!(index.position(TextSize::new(7)), Position::new(4, 1));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_columns_count_chars() {
        let index = LineIndex::new("ä := 1");
        // 'ä' takes two bytes
        assert_eq!(index.position(TextSize::new(3)), Position::new(1, 3));
    }
}

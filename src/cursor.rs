//! Byte cursor over a `&str`, plus the line helpers the block parser uses.
//!
//! All delimiters the parsers look for are ASCII, so the cursor scans bytes
//! and only ever slices the input at positions that sit next to an ASCII
//! byte (or at the ends). [`Cursor::bump_char`] is used to step over text so
//! the offset never lands inside a multi-byte character.

/// A cursor for byte-by-byte scanning of UTF-8 text.
///
/// # Example
/// ```
/// use vaultdown::cursor::Cursor;
///
/// let mut cursor = Cursor::new("Hello, World!");
/// assert_eq!(cursor.peek(), Some(b'H'));
/// cursor.advance(7);
/// assert_eq!(cursor.peek(), Some(b'W'));
/// ```
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor over a string.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Current offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Peek the current byte without advancing.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Peek at byte n positions ahead.
    #[inline]
    pub fn peek_ahead(&self, n: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + n).copied()
    }

    /// The byte just before the cursor.
    #[inline]
    pub fn peek_back(&self) -> Option<u8> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.input.as_bytes().get(i).copied())
    }

    /// Advance by n bytes.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Advance by 1 byte.
    #[inline]
    pub fn bump(&mut self) {
        self.advance(1);
    }

    /// Advance past the current character, however many bytes it takes.
    #[inline]
    pub fn bump_char(&mut self) {
        let width = self.remaining_str().chars().next().map_or(0, char::len_utf8);
        self.advance(width);
    }

    #[inline]
    pub fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Check if the remaining input starts with `s`.
    #[inline]
    pub fn starts_with(&self, s: &str) -> bool {
        self.remaining_str().starts_with(s)
    }

    /// Length of the run of `b` starting at the cursor.
    #[inline]
    pub fn run_length(&self, b: u8) -> usize {
        self.input.as_bytes()[self.pos..]
            .iter()
            .take_while(|&&c| c == b)
            .count()
    }

    /// Consume a specific byte if present.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.at(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a specific string if present.
    #[inline]
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// The remaining input.
    #[inline]
    pub fn remaining_str(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Input between `start` and the cursor.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }

    /// Input between two offsets.
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Find the next occurrence of a byte, relative to the cursor.
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        memchr::memchr(needle, self.remaining_str().as_bytes())
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.pos)
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// Split input into lines, accepting both `\n` and `\r\n` endings.
///
/// A trailing newline does not produce a final empty line.
pub fn split_lines(input: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = input.as_bytes();
    let mut start = 0;
    for pos in memchr::memchr_iter(b'\n', bytes) {
        let end = if pos > start && bytes[pos - 1] == b'\r' {
            pos - 1
        } else {
            pos
        };
        lines.push(&input[start..end]);
        start = pos + 1;
    }
    if start < input.len() {
        lines.push(input[start..].strip_suffix('\r').unwrap_or(&input[start..]));
    }
    lines
}

/// Whether a line is empty or whitespace only.
#[inline]
pub fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Leading indentation width, counting a tab as four columns.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for b in line.bytes() {
        match b {
            b' ' => width += 1,
            b'\t' => width += 4,
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_new() {
        let cursor = Cursor::new("Hello");
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.remaining(), 5);
    }

    #[test]
    fn test_cursor_empty() {
        let cursor = Cursor::new("");
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.peek_back(), None);
    }

    #[test]
    fn test_cursor_peek() {
        let cursor = Cursor::new("abc");
        assert_eq!(cursor.peek(), Some(b'a'));
        assert_eq!(cursor.peek_ahead(2), Some(b'c'));
        assert_eq!(cursor.peek_ahead(3), None);
    }

    #[test]
    fn test_cursor_bump_char_multibyte() {
        let mut cursor = Cursor::new("ä*");
        cursor.bump_char();
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.peek(), Some(b'*'));
        assert_eq!(cursor.slice_from(0), "ä");
    }

    #[test]
    fn test_cursor_bump_and_back() {
        let mut cursor = Cursor::new("ab");
        cursor.bump();
        assert_eq!(cursor.peek_back(), Some(b'a'));
        assert!(cursor.at(b'b'));
        cursor.bump();
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn test_cursor_run_length() {
        let mut cursor = Cursor::new("x***y");
        cursor.bump();
        assert_eq!(cursor.run_length(b'*'), 3);
        assert_eq!(cursor.run_length(b'y'), 0);
    }

    #[test]
    fn test_cursor_eat_str_on_copy() {
        let cursor = Cursor::new("[[note]]");
        let mut attempt = cursor;
        assert!(attempt.eat_str("[["));
        assert!(!attempt.eat_str("]]"));
        assert_eq!(attempt.offset(), 2);
        assert!(cursor.starts_with("[["));
    }

    #[test]
    fn test_cursor_find() {
        let mut cursor = Cursor::new("a|b|c");
        cursor.bump();
        cursor.bump();
        assert_eq!(cursor.find(b'|'), Some(1));
        assert_eq!(cursor.find(b'x'), None);
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\r\nc"), ["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb\n"), ["a", "", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    - a"), 4);
        assert_eq!(indent_width("\t- a"), 4);
        assert_eq!(indent_width("- a"), 0);
        assert!(is_blank("  \t"));
        assert!(!is_blank(" x"));
    }
}

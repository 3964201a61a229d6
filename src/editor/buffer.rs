use ropey::Rope;

/// Cursor position in a field buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Rope-backed text for one editable template field.
///
/// Single-line buffers (subject, preview text) refuse line breaks; the HTML
/// body buffer is multi-line. Mutating methods return `true` only when the
/// text actually changed, so callers can decide whether to schedule a save.
pub struct FieldBuffer {
    rope: Rope,
    cursor: Cursor,
    multiline: bool,
}

impl FieldBuffer {
    /// A single-line buffer with the cursor at the end of the text.
    pub fn single_line(text: &str) -> Self {
        let flat: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        let mut buf = Self {
            rope: Rope::from_str(&flat),
            cursor: Cursor::new(),
            multiline: false,
        };
        buf.move_end();
        buf
    }

    /// A multi-line buffer with the cursor at the start of the text.
    pub fn multi_line(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            multiline: true,
        }
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub const fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Caret position as a char offset into the whole text.
    pub fn caret(&self) -> usize {
        self.cursor_char_idx()
    }

    /// Place the caret at a char offset, clamped to the end of the text.
    pub fn set_caret(&mut self, char_idx: usize) {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        let col: usize = self
            .rope
            .slice(line_start..char_idx)
            .chars()
            .map(char::len_utf8)
            .sum();
        self.cursor.line = line;
        self.cursor.set_col(col.min(self.line_len(line)));
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch == '\n' {
            return self.split_line();
        }
        if ch == '\r' {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, ch);
        self.cursor.set_col(self.cursor.col + ch.len_utf8());
        true
    }

    /// Insert a string at the caret and leave the caret after it.
    pub fn insert_str(&mut self, s: &str) -> bool {
        let s = if self.multiline {
            s.replace('\r', "")
        } else {
            s.chars().filter(|c| *c != '\n' && *c != '\r').collect()
        };
        if s.is_empty() {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, &s);
        self.set_caret(char_idx + s.chars().count());
        true
    }

    /// Break the line at the caret. Single-line buffers ignore this.
    pub fn split_line(&mut self) -> bool {
        if !self.multiline {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
        true
    }

    /// Delete the character before the caret (Backspace).
    pub fn delete_back(&mut self) -> bool {
        let char_idx = self.cursor_char_idx();
        if char_idx == 0 {
            return false;
        }
        self.rope.remove(char_idx - 1..char_idx);
        self.set_caret(char_idx - 1);
        true
    }

    /// Delete the character at the caret (Delete).
    pub fn delete_forward(&mut self) -> bool {
        let char_idx = self.cursor_char_idx();
        if char_idx >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(char_idx..=char_idx);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let trimmed = line[..self.cursor.col].trim_end();
        if trimmed.is_empty() {
            self.cursor.set_col(0);
            return;
        }
        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + 1);
        self.cursor.set_col(pos);
    }

    pub fn move_word_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let after = &line[self.cursor.col..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let rest = &after[word_end..];
        let space_end = rest
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .unwrap_or(rest.len());
        self.cursor.set_col(self.cursor.col + word_end + space_end);
    }

    /// Move cursor to a line and byte column, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let line_text = self.line_at(self.cursor.line).unwrap_or_default();
        let mut col = col.min(line_text.len());
        while !line_text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.set_col(col);
    }

    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    pub fn move_to_end(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.cursor.line = last_line;
        self.cursor.set_col(self.line_len(last_line));
    }

    fn cursor_char_idx(&self) -> usize {
        let line_start = self.rope.line_to_char(self.cursor.line);
        let line_str = self.line_at(self.cursor.line).unwrap_or_default();
        let byte_col = self.cursor.col.min(line_str.len());
        line_start + line_str[..byte_col].chars().count()
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let prev_char_len = line[..self.cursor.col]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[self.cursor.col..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.clamp_to_memory();
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.clamp_to_memory();
        }
    }

    fn clamp_to_memory(&mut self) {
        let line_text = self.line_at(self.cursor.line).unwrap_or_default();
        let mut col = self.cursor.col_memory.min(line_text.len());
        while !line_text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.col = col;
    }
}

impl std::fmt::Debug for FieldBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBuffer")
            .field(
                "rope",
                &format_args!("Rope({} chars)", self.rope.len_chars()),
            )
            .field("cursor", &self.cursor)
            .field("multiline", &self.multiline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_starts_with_cursor_at_end() {
        let buf = FieldBuffer::single_line("Subject");
        assert_eq!(buf.cursor(), Cursor::at(0, 7));
        assert_eq!(buf.caret(), 7);
    }

    #[test]
    fn test_single_line_strips_newlines() {
        let buf = FieldBuffer::single_line("a\nb");
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn test_single_line_refuses_split() {
        let mut buf = FieldBuffer::single_line("abc");
        assert!(!buf.split_line());
        assert!(!buf.insert_char('\n'));
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn test_multi_line_split_line() {
        let mut buf = FieldBuffer::multi_line("helloworld");
        buf.move_to(0, 5);
        assert!(buf.split_line());
        assert_eq!(buf.text(), "hello\nworld");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_insert_str_at_caret() {
        let mut buf = FieldBuffer::multi_line("Hello World");
        buf.set_caret(5);
        assert!(buf.insert_str("{{Name}}"));
        assert_eq!(buf.text(), "Hello{{Name}} World");
        assert_eq!(buf.caret(), 13);
    }

    #[test]
    fn test_insert_empty_str_is_not_a_change() {
        let mut buf = FieldBuffer::multi_line("x");
        assert!(!buf.insert_str(""));
    }

    #[test]
    fn test_set_caret_across_lines() {
        let mut buf = FieldBuffer::multi_line("ab\ncd");
        buf.set_caret(4);
        assert_eq!(buf.cursor(), Cursor::at(1, 1));
        buf.set_caret(99);
        assert_eq!(buf.cursor(), Cursor::at(1, 2));
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = FieldBuffer::multi_line("hello\nworld");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut buf = FieldBuffer::multi_line("hello");
        assert!(!buf.delete_back());
        assert_eq!(buf.text(), "hello");
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut buf = FieldBuffer::single_line("hello");
        assert!(!buf.delete_forward());
    }

    #[test]
    fn test_multibyte_insert_and_delete() {
        let mut buf = FieldBuffer::single_line("caf");
        assert!(buf.insert_char('é'));
        assert_eq!(buf.text(), "café");
        assert_eq!(buf.cursor().col, 5);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "caf");
        assert_eq!(buf.cursor().col, 3);
    }

    #[test]
    fn test_move_left_wraps_to_prev_line() {
        let mut buf = FieldBuffer::multi_line("hello\nworld");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = FieldBuffer::multi_line("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor(), Cursor::at(2, 4));
    }

    #[test]
    fn test_move_word_left_and_right() {
        let mut buf = FieldBuffer::single_line("hello world");
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 6);
        buf.move_home();
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 6);
    }

    #[test]
    fn test_move_to_end_of_buffer() {
        let mut buf = FieldBuffer::multi_line("a\nbc");
        buf.move_to_end();
        assert_eq!(buf.cursor(), Cursor::at(1, 2));
        buf.move_to_start();
        assert_eq!(buf.caret(), 0);
    }
}

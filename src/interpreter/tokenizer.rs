/// A character cursor over one input string.
///
/// The tokenizer knows nothing about the language. It hands out characters,
/// runs of characters matching a predicate, and answers lookahead questions;
/// classifying what it returns is the caller's job.
///
/// Positions are byte offsets into the text.
///
/// # Example
/// ```
/// use rulexpr::interpreter::tokenizer::Tokenizer;
///
/// let mut tokenizer = Tokenizer::new("12.5mm");
/// assert_eq!(tokenizer.consume_while(|c| c.is_ascii_digit()), "12");
/// assert_eq!(tokenizer.peek_char(), '.');
/// tokenizer.advance(2);
/// assert!(tokenizer.match_ahead("mm", |c| !c.is_alphanumeric()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tokenizer<'s> {
    text: &'s str,
    pos:  usize,
}

impl<'s> Tokenizer<'s> {
    /// Creates a tokenizer positioned at the start of `text`.
    #[must_use]
    pub const fn new(text: &'s str) -> Self {
        Self { text, pos: 0 }
    }

    /// Starts over on new text.
    pub const fn restart(&mut self, text: &'s str) {
        self.text = text;
        self.pos = 0;
    }

    /// Drops the current text.
    pub const fn clear(&mut self) {
        self.text = "";
        self.pos = 0;
    }

    /// Returns `true` once the cursor has passed the last character.
    #[must_use]
    pub const fn done(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Returns the character under the cursor, or `'\0'` past the end.
    #[must_use]
    pub fn peek_char(&self) -> char {
        self.rest().chars().next().unwrap_or('\0')
    }

    /// Moves the cursor forward by `n` characters, stopping at the end.
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            match self.rest().chars().next() {
                Some(c) => self.pos += c.len_utf8(),
                None => break,
            }
        }
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an earlier or later byte offset.
    ///
    /// Offsets past the end are clamped; offsets inside a multi-byte
    /// character are moved back to its start.
    pub fn seek(&mut self, pos: usize) {
        let mut pos = pos.min(self.text.len());
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        self.pos = pos;
    }

    /// Returns the longest run starting at the cursor whose characters all
    /// satisfy `pred`, and moves past it.
    pub fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> &'s str {
        let rest = self.rest();
        let len = rest.char_indices()
                      .find(|&(_, c)| !pred(c))
                      .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    /// Tests whether `literal` occurs at the cursor.
    ///
    /// The character following the match, if there is one, must satisfy
    /// `stop`. This keeps `mm` from matching the start of `mmx` when `stop`
    /// rejects alphanumerics. The cursor does not move.
    #[must_use]
    pub fn match_ahead(&self, literal: &str, stop: impl Fn(char) -> bool) -> bool {
        self.rest()
            .strip_prefix(literal)
            .is_some_and(|after| after.chars().next().is_none_or(stop))
    }

    fn rest(&self) -> &'s str {
        &self.text[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_past_end_is_nul() {
        let mut tokenizer = Tokenizer::new("a");
        assert_eq!(tokenizer.peek_char(), 'a');
        tokenizer.advance(5);
        assert!(tokenizer.done());
        assert_eq!(tokenizer.peek_char(), '\0');
        assert_eq!(tokenizer.position(), 1);
    }

    #[test]
    fn consume_while_stops_at_first_mismatch() {
        let mut tokenizer = Tokenizer::new("  42abc");
        assert_eq!(tokenizer.consume_while(char::is_whitespace), "  ");
        assert_eq!(tokenizer.consume_while(|c| c.is_ascii_digit()), "42");
        assert_eq!(tokenizer.position(), 4);
        assert_eq!(tokenizer.consume_while(|c| c.is_ascii_digit()), "");
    }

    #[test]
    fn match_ahead_respects_stop_condition() {
        let not_alnum = |c: char| !c.is_alphanumeric();
        assert!(Tokenizer::new("mm").match_ahead("mm", not_alnum));
        assert!(Tokenizer::new("mm)").match_ahead("mm", not_alnum));
        assert!(!Tokenizer::new("mmx").match_ahead("mm", not_alnum));
        assert!(!Tokenizer::new("m").match_ahead("mm", not_alnum));
    }

    #[test]
    fn restart_and_clear_reset_the_cursor() {
        let mut tokenizer = Tokenizer::new("abc");
        tokenizer.advance(2);
        tokenizer.restart("xyz");
        assert_eq!(tokenizer.position(), 0);
        assert_eq!(tokenizer.peek_char(), 'x');
        tokenizer.clear();
        assert!(tokenizer.done());
    }

    #[test]
    fn multibyte_characters_advance_whole() {
        let mut tokenizer = Tokenizer::new("µm");
        tokenizer.advance(1);
        assert_eq!(tokenizer.peek_char(), 'm');
        assert_eq!(tokenizer.position(), 'µ'.len_utf8());
        tokenizer.seek(1);
        assert_eq!(tokenizer.position(), 0);
    }
}

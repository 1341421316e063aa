use crate::ScanError;

/// Character stream over an abbreviation.
///
/// Both tokenizers drive this primitive. It keeps the source as a
/// `Vec<char>` for index-based navigation and works inside a `[start, end)`
/// window: nothing is ever read past `end`.
///
/// - `pos` is the read position.
/// - `start` marks the beginning of the token being consumed, so
///   `current()` returns everything eaten since the last mark.
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    pub start: usize,
    pub pos: usize,
    end: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over the whole source.
    pub fn new(source: &'a str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let end = chars.len();
        Self {
            source,
            chars,
            start: 0,
            pos: 0,
            end,
        }
    }

    /// Create a scanner limited to the `[start, end)` window of `source`.
    pub fn with_range(source: &'a str, start: usize, end: usize) -> Self {
        let mut scanner = Self::new(source);
        scanner.end = end.min(scanner.chars.len());
        scanner.start = start.min(scanner.end);
        scanner.pos = scanner.start;
        scanner
    }

    /// A new scanner over a sub-window of this one.
    pub fn limit(&self, start: usize, end: usize) -> Scanner<'a> {
        Scanner::with_range(self.source, start, end.min(self.end))
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Character at the read position, `None` at end of stream.
    pub fn peek(&self) -> Option<char> {
        if self.eof() {
            None
        } else {
            Some(self.chars[self.pos])
        }
    }

    /// Character at an arbitrary offset inside the window.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        if pos < self.end {
            self.chars.get(pos).copied()
        } else {
            None
        }
    }

    /// Return the current character and advance.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Consume one character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        self.eat_if(|ch| ch == expected)
    }

    /// Consume one character if it satisfies `matcher`.
    pub fn eat_if(&mut self, matcher: impl Fn(char) -> bool) -> bool {
        match self.peek() {
            Some(ch) if matcher(ch) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consume characters while `matcher` holds. Returns `true` if anything was eaten.
    pub fn eat_while(&mut self, matcher: impl Fn(char) -> bool) -> bool {
        let start = self.pos;
        while self.eat_if(&matcher) {}
        self.pos != start
    }

    /// Rewind `n` characters. Callers must not rewind past the token start.
    pub fn back_up(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// Text between the `start` mark and the read position.
    pub fn current(&self) -> String {
        self.substring(self.start, self.pos)
    }

    pub fn substring(&self, from: usize, to: usize) -> String {
        let to = to.min(self.chars.len());
        let from = from.min(to);
        self.chars[from..to].iter().collect()
    }

    /// The full scanned abbreviation.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Error positioned at the read position.
    pub fn error(&self, message: impl Into<String>) -> ScanError {
        self.error_at(message, self.pos)
    }

    pub fn error_at(&self, message: impl Into<String>, pos: usize) -> ScanError {
        ScanError {
            message: message.into(),
            pos,
            abbreviation: self.source.to_string(),
        }
    }
}

// Character classes shared by both tokenizers.

pub fn is_number(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Letters and underscore.
pub fn is_alpha_word(ch: char) -> bool {
    ch == '_' || is_alpha(ch)
}

pub fn is_alpha_numeric_word(ch: char) -> bool {
    is_number(ch) || is_alpha_word(ch)
}

/// Latin-1 letters beyond ASCII (`ü`, `é`, ...).
pub fn is_umlaut(ch: char) -> bool {
    ch as u32 >= 0xC0 && ch as u32 <= 0x24F && ch != '×' && ch != '÷'
}

pub fn is_space(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\u{a0}'
}

pub fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

pub fn is_hex(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_next() {
        let mut s = Scanner::new("ab");
        assert_eq!(s.peek(), Some('a'));
        assert_eq!(s.next(), Some('a'));
        assert_eq!(s.next(), Some('b'));
        assert_eq!(s.next(), None);
        assert!(s.eof());
    }

    #[test]
    fn test_eat_while_and_current() {
        let mut s = Scanner::new("123abc");
        assert!(s.eat_while(is_number));
        assert_eq!(s.current(), "123");
        assert!(!s.eat('x'));
        assert!(s.eat('a'));
        assert_eq!(s.pos, 4);
    }

    #[test]
    fn test_back_up() {
        let mut s = Scanner::new("abc");
        s.eat_while(is_alpha);
        s.back_up(2);
        assert_eq!(s.peek(), Some('b'));
        s.back_up(10);
        assert_eq!(s.pos, 0);
    }

    #[test]
    fn test_window_stops_at_end() {
        let mut s = Scanner::with_range("abcdef", 1, 3);
        assert_eq!(s.peek(), Some('b'));
        s.eat_while(is_alpha);
        assert_eq!(s.current(), "bc");
        assert!(s.eof());
        assert_eq!(s.char_at(3), None);
    }

    #[test]
    fn test_multibyte_positions_are_chars() {
        let mut s = Scanner::new("üb");
        assert!(s.eat_if(is_umlaut));
        assert_eq!(s.pos, 1);
        assert_eq!(s.peek(), Some('b'));
    }

    #[test]
    fn test_error_carries_offset() {
        let mut s = Scanner::new("a}");
        s.next();
        let err = s.error("Unexpected character");
        assert_eq!(err.pos, 1);
        assert_eq!(err.abbreviation, "a}");
    }
}

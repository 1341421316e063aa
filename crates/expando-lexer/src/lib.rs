//! Expando Lexer
//!
//! Tokenizes abbreviation strings. Holds the shared `Scanner` primitive
//! and two tokenizers built on it: one for markup abbreviations
//! (`ul>li.item$*3`) and one for stylesheet abbreviations (`bd1-s#f00`).
//!
//! # Example
//!
//! ```
//! use expando_lexer::{markup, TokenKind};
//!
//! let tokens = markup::tokenize("a").unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Literal("a".into()));
//! ```

pub mod markup;
pub mod scanner;
pub mod stylesheet;
pub mod token;

pub use scanner::Scanner;
pub use token::{BracketContext, OperatorKind, Span, Token, TokenKind};

/// Scanner error with the offending offset.
///
/// Keeps a copy of the scanned abbreviation so callers can render a
/// pointer line under the failing column with [`ScanError::ruler`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {pos}")]
pub struct ScanError {
    pub message: String,
    pub pos: usize,
    pub abbreviation: String,
}

impl ScanError {
    /// Two-line message: the abbreviation and a caret under `pos`.
    pub fn ruler(&self) -> String {
        ruler(&self.abbreviation, self.pos)
    }
}

/// Render `text` with a `^` pointer under the character at `pos`.
pub fn ruler(text: &str, pos: usize) -> String {
    format!("{text}\n{}^", " ".repeat(pos))
}

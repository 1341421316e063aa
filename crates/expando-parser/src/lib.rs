//! Expando Parser
//!
//! Turns abbreviation tokens into trees. Markup abbreviations go through
//! the recursive-descent [`Parser`] into a token tree, which the unroller
//! expands into the stable [`Abbreviation`] node tree. Stylesheet
//! abbreviations parse into a flat list of [`CssProperty`] declarations.

pub mod ast;
pub mod parser;
pub mod stylesheet;
pub mod unroll;

use std::collections::HashMap;

pub use ast::{
    Abbreviation, AbbreviationNode, Attribute, Field, Repeater, Value, ValueType,
};
pub use parser::Parser;
pub use stylesheet::{CssProperty, CssValue, CssValueToken, FunctionCall};

use expando_lexer::ScanError;

/// Parser error with the offset of the offending token.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {pos}")]
pub struct ParseError {
    pub message: String,
    pub pos: usize,
    pub abbreviation: String,
}

impl ParseError {
    /// Two-line message: the abbreviation and a caret under `pos`.
    pub fn ruler(&self) -> String {
        expando_lexer::ruler(&self.abbreviation, self.pos)
    }
}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        Self {
            message: err.message,
            pos: err.pos,
            abbreviation: err.abbreviation,
        }
    }
}

/// Text supplied by the caller to wrap with an abbreviation.
#[derive(Debug, Clone, PartialEq)]
pub enum Text {
    Single(String),
    /// One entry per line; drives implicit repeaters.
    Lines(Vec<String>),
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::Single(text.to_string())
    }
}

impl From<Vec<String>> for Text {
    fn from(lines: Vec<String>) -> Self {
        Text::Lines(lines)
    }
}

/// Options that affect how a markup abbreviation is parsed and unrolled.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Capitalized component names and `.{expr}` class expressions.
    pub jsx: bool,
    pub text: Option<Text>,
    /// Values for `${name}` fields.
    pub variables: HashMap<String, String>,
    /// Upper bound on the total number of repeated copies.
    pub max_repeat: Option<usize>,
    /// Fill `href` of a link wrapped around a URL or e-mail.
    pub href: bool,
}

/// Parse and unroll a markup abbreviation.
pub fn parse_abbreviation(source: &str, options: &ParseOptions) -> Result<Abbreviation, ParseError> {
    let tree = Parser::parse(source, options.jsx)?;
    Ok(unroll::convert(&tree, options))
}

/// Parse a stylesheet abbreviation. In `value` mode the whole input is a
/// single property value.
pub fn parse_stylesheet(source: &str, value: bool) -> Result<Vec<CssProperty>, ParseError> {
    stylesheet::parse(source, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scan_error_converts() {
        let err = parse_abbreviation("a[title=\"x", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.abbreviation, "a[title=\"x");
        assert!(err.to_string().contains(" at "));
    }

    #[test]
    fn test_ruler() {
        let err = parse_abbreviation("a)", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.ruler(), "a)\n ^");
    }

    #[test]
    fn test_parse_abbreviation_roundtrip_names() {
        let abbr = parse_abbreviation("ul>li", &ParseOptions::default()).unwrap();
        assert_eq!(abbr.children[0].name.as_deref(), Some("ul"));
        assert_eq!(abbr.children[0].children[0].name.as_deref(), Some("li"));
    }
}

//! Stylesheet abbreviation tokenizer.
//!
//! Recognizes numbers with units, quoted strings, hex colors, bracketed
//! function calls, fields and the operators `+ ! , : -`. The grammar is
//! different enough from markup that it has its own token type, but it
//! runs on the same `Scanner`.

use crate::markup::consume_placeholder;
use crate::scanner::{
    is_alpha, is_alpha_numeric_word, is_alpha_word, is_hex, is_number, is_quote, is_space,
    Scanner,
};
use crate::token::Span;
use crate::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssOperator {
    /// `+`
    Sibling,
    /// `!`
    Important,
    /// `,`
    ArgumentDelimiter,
    /// `:`
    PropertyDelimiter,
    /// `-`
    ValueDelimiter,
}

impl CssOperator {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Sibling),
            '!' => Some(Self::Important),
            ',' => Some(Self::ArgumentDelimiter),
            ':' => Some(Self::PropertyDelimiter),
            '-' => Some(Self::ValueDelimiter),
            _ => None,
        }
    }
}

/// RGBA color parsed from `#...` shorthand.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
    /// Source text after `#`.
    pub raw: String,
}

impl Color {
    /// Expand hex shorthand: `#0` → black, `#abc` → `#aabbcc`, `#t` → transparent.
    /// `alpha` is the `.N` suffix, if any.
    pub fn parse(value: &str, alpha: &str, raw: String) -> Self {
        let mut a = if alpha.is_empty() {
            1.0
        } else {
            alpha.parse().unwrap_or(1.0)
        };
        let (r, g, b) = if value == "t" {
            a = 0.0;
            (String::from("0"), String::from("0"), String::from("0"))
        } else {
            let chars: Vec<char> = value.chars().collect();
            match chars.len() {
                0 => ("0".into(), "0".into(), "0".into()),
                1 => {
                    let v = value.repeat(2);
                    (v.clone(), v.clone(), v)
                }
                2 => (value.to_string(), value.to_string(), value.to_string()),
                3 => (
                    [chars[0], chars[0]].iter().collect(),
                    [chars[1], chars[1]].iter().collect(),
                    [chars[2], chars[2]].iter().collect(),
                ),
                _ => {
                    let doubled: Vec<char> = chars.iter().chain(chars.iter()).copied().collect();
                    (
                        doubled[0..2].iter().collect(),
                        doubled[2..4].iter().collect(),
                        doubled[4..6].iter().collect(),
                    )
                }
            }
        };

        Self {
            r: u8::from_str_radix(&r, 16).unwrap_or(0),
            g: u8::from_str_radix(&g, 16).unwrap_or(0),
            b: u8::from_str_radix(&b, 16).unwrap_or(0),
            a,
            raw,
        }
    }
}

/// Token classification for stylesheet abbreviations.
#[derive(Debug, Clone, PartialEq)]
pub enum CssTokenKind {
    Literal(String),
    /// `--custom-prop`
    CustomProperty(String),
    Number {
        value: f64,
        raw: String,
        unit: String,
    },
    Color(Color),
    String {
        value: String,
        single: bool,
    },
    Bracket {
        open: bool,
    },
    Operator(CssOperator),
    WhiteSpace,
    Field {
        index: Option<usize>,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssToken {
    pub kind: CssTokenKind,
    pub span: Span,
}

impl CssToken {
    pub fn new(kind: CssTokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Tokenize a stylesheet abbreviation. In `value` mode the whole input is
/// a property value, so literals may contain dashes.
pub fn tokenize(source: &str, value: bool) -> Result<Vec<CssToken>, ScanError> {
    let mut scanner = Scanner::new(source);
    let mut tokens: Vec<CssToken> = Vec::new();
    let mut brackets: i32 = 0;

    while !scanner.eof() {
        let Some(token) = next_token(&mut scanner, brackets == 0 && !value)? else {
            return Err(scanner.error("Unexpected character"));
        };

        if let CssTokenKind::Bracket { open } = token.kind {
            if brackets == 0 && open {
                merge_tokens(&scanner, &mut tokens);
            }
            brackets += if open { 1 } else { -1 };
            if brackets < 0 {
                return Err(scanner.error_at("Unexpected bracket", token.span.start));
            }
        }

        let consume_dash = should_consume_dash_after(&token);
        tokens.push(token);

        // After a unit-less number or a color the next `-` is a value
        // delimiter, never a negative sign
        if consume_dash {
            if let Some(op) = operator(&mut scanner) {
                tokens.push(op);
            }
        }
    }

    Ok(tokens)
}

fn next_token(scanner: &mut Scanner, short: bool) -> Result<Option<CssToken>, ScanError> {
    if let Some(token) = field(scanner)? {
        return Ok(Some(token));
    }
    Ok(custom_property(scanner)
        .or_else(|| number_value(scanner))
        .or_else(|| color_value(scanner))
        .or_else(|| string_value(scanner))
        .or_else(|| bracket(scanner))
        .or_else(|| operator(scanner))
        .or_else(|| whitespace(scanner))
        .or_else(|| literal(scanner, short)))
}

fn field(scanner: &mut Scanner) -> Result<Option<CssToken>, ScanError> {
    let start = scanner.pos;
    if scanner.eat('$') && scanner.eat('{') {
        scanner.start = scanner.pos;
        let mut index = None;
        let mut name = String::new();

        if scanner.eat_while(is_number) {
            index = scanner.current().parse().ok();
            if scanner.eat(':') {
                name = consume_placeholder(scanner)?;
            }
        } else if scanner.peek().is_some_and(is_alpha) {
            name = consume_placeholder(scanner)?;
        }

        if scanner.eat('}') {
            return Ok(Some(CssToken::new(
                CssTokenKind::Field { index, name },
                Span::new(start, scanner.pos),
            )));
        }
        return Err(scanner.error("Expecting }"));
    }

    scanner.pos = start;
    Ok(None)
}

/// Collapse trailing literal/number tokens into one literal right before a
/// top-level `(`, so `lg(` names the whole function.
fn merge_tokens(scanner: &Scanner, tokens: &mut Vec<CssToken>) {
    let mut start = 0;
    let mut end = 0;

    while let Some(token) = tokens.last() {
        if matches!(
            token.kind,
            CssTokenKind::Literal(_) | CssTokenKind::Number { .. }
        ) {
            start = token.span.start;
            if end == 0 {
                end = token.span.end;
            }
            tokens.pop();
        } else {
            break;
        }
    }

    if start != end {
        tokens.push(CssToken::new(
            CssTokenKind::Literal(scanner.substring(start, end)),
            Span::new(start, end),
        ));
    }
}

fn literal(scanner: &mut Scanner, short: bool) -> Option<CssToken> {
    let start = scanner.pos;

    if scanner.eat_if(is_ident_prefix) {
        // SCSS/LESS variable: when embedded, keep dashes
        if start > 0 {
            scanner.eat_while(is_keyword);
        } else {
            scanner.eat_while(is_literal);
        }
    } else if scanner.eat_if(is_alpha_word) {
        if short {
            scanner.eat_while(is_literal);
        } else {
            scanner.eat_while(is_keyword);
        }
    } else {
        // Dots are allowed only at the beginning of a literal
        scanner.eat('.');
        scanner.eat_while(is_literal);
    }

    if start != scanner.pos {
        scanner.start = start;
        return Some(CssToken::new(
            CssTokenKind::Literal(scanner.current()),
            Span::new(start, scanner.pos),
        ));
    }
    None
}

fn custom_property(scanner: &mut Scanner) -> Option<CssToken> {
    let start = scanner.pos;
    if scanner.eat('-') && scanner.eat('-') {
        scanner.start = start;
        scanner.eat_while(is_keyword);
        return Some(CssToken::new(
            CssTokenKind::CustomProperty(scanner.current()),
            Span::new(start, scanner.pos),
        ));
    }
    scanner.pos = start;
    None
}

fn number_value(scanner: &mut Scanner) -> Option<CssToken> {
    let start = scanner.pos;
    if !consume_number(scanner) {
        return None;
    }

    scanner.start = start;
    let raw = scanner.current();
    scanner.start = scanner.pos;
    if !scanner.eat('%') {
        scanner.eat_while(is_alpha_word);
    }

    Some(CssToken::new(
        CssTokenKind::Number {
            value: raw.parse().unwrap_or(0.0),
            raw,
            unit: scanner.current(),
        },
        Span::new(start, scanner.pos),
    ))
}

fn consume_number(scanner: &mut Scanner) -> bool {
    let start = scanner.pos;
    scanner.eat('-');
    let after_negative = scanner.pos;
    let has_decimal = scanner.eat_while(is_number);
    let prev_pos = scanner.pos;

    if scanner.eat('.') {
        // `1.` is a valid number and forces the float unit
        let has_float = scanner.eat_while(is_number);
        if !has_decimal && !has_float {
            scanner.pos = prev_pos;
        }
    }

    // A lone dash is not a number
    if scanner.pos == after_negative {
        scanner.pos = start;
    }
    scanner.pos != start
}

fn color_value(scanner: &mut Scanner) -> Option<CssToken> {
    let start = scanner.pos;
    if !scanner.eat('#') {
        return None;
    }

    let value_start = scanner.pos;
    let mut color = String::new();
    let alpha;

    if scanner.eat_while(is_hex) {
        color = scanner.substring(value_start, scanner.pos);
        alpha = color_alpha(scanner);
    } else if scanner.eat('t') {
        color = "0".into();
        let a = color_alpha(scanner);
        alpha = if a.is_empty() { "0".into() } else { a };
    } else {
        alpha = color_alpha(scanner);
    }

    let span = Span::new(start, scanner.pos);
    if !color.is_empty() || !alpha.is_empty() || scanner.eof() {
        let raw = scanner.substring(start + 1, scanner.pos);
        return Some(CssToken::new(
            CssTokenKind::Color(Color::parse(&color, &alpha, raw)),
            span,
        ));
    }

    // `#` without a value is a plain literal
    Some(CssToken::new(
        CssTokenKind::Literal(scanner.substring(start, scanner.pos)),
        span,
    ))
}

fn color_alpha(scanner: &mut Scanner) -> String {
    let start = scanner.pos;
    if scanner.eat('.') {
        scanner.start = start;
        if scanner.eat_while(is_number) {
            return scanner.current();
        }
        return "1".into();
    }
    String::new()
}

fn string_value(scanner: &mut Scanner) -> Option<CssToken> {
    let quote = scanner.peek().filter(|ch| is_quote(*ch))?;
    let start = scanner.pos;
    scanner.pos += 1;

    // Malformed strings are not an error
    let mut finished = false;
    while !scanner.eof() {
        if scanner.eat(quote) {
            finished = true;
            break;
        }
        scanner.pos += 1;
    }

    let end = if finished { scanner.pos - 1 } else { scanner.pos };
    Some(CssToken::new(
        CssTokenKind::String {
            value: scanner.substring(start + 1, end),
            single: quote == '\'',
        },
        Span::new(start, scanner.pos),
    ))
}

fn bracket(scanner: &mut Scanner) -> Option<CssToken> {
    let ch = scanner.peek().filter(|ch| *ch == '(' || *ch == ')')?;
    let start = scanner.pos;
    scanner.pos += 1;
    Some(CssToken::new(
        CssTokenKind::Bracket { open: ch == '(' },
        Span::new(start, scanner.pos),
    ))
}

fn operator(scanner: &mut Scanner) -> Option<CssToken> {
    let op = scanner.peek().and_then(CssOperator::from_char)?;
    let start = scanner.pos;
    scanner.pos += 1;
    Some(CssToken::new(
        CssTokenKind::Operator(op),
        Span::new(start, scanner.pos),
    ))
}

fn whitespace(scanner: &mut Scanner) -> Option<CssToken> {
    let start = scanner.pos;
    if scanner.eat_while(is_space) {
        return Some(CssToken::new(
            CssTokenKind::WhiteSpace,
            Span::new(start, scanner.pos),
        ));
    }
    None
}

fn should_consume_dash_after(token: &CssToken) -> bool {
    match &token.kind {
        CssTokenKind::Color(_) => true,
        CssTokenKind::Number { unit, .. } => unit.is_empty(),
        _ => false,
    }
}

fn is_ident_prefix(ch: char) -> bool {
    ch == '@' || ch == '$'
}

fn is_keyword(ch: char) -> bool {
    is_alpha_numeric_word(ch) || ch == '-'
}

fn is_literal(ch: char) -> bool {
    is_alpha_word(ch) || ch == '%' || ch == '/'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<CssTokenKind> {
        tokenize(source, false)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn num(value: f64, raw: &str, unit: &str) -> CssTokenKind {
        CssTokenKind::Number {
            value,
            raw: raw.into(),
            unit: unit.into(),
        }
    }

    fn color(source: &str) -> Color {
        match &kinds(source)[0] {
            CssTokenKind::Color(c) => c.clone(),
            other => panic!("expected color, got {other:?}"),
        }
    }

    #[test]
    fn test_property_with_number_and_keyword() {
        let k = kinds("bd1-s#f00");
        assert_eq!(k[0], CssTokenKind::Literal("bd".into()));
        assert_eq!(k[1], num(1.0, "1", ""));
        assert_eq!(k[2], CssTokenKind::Operator(CssOperator::ValueDelimiter));
        assert_eq!(k[3], CssTokenKind::Literal("s".into()));
        assert!(matches!(k[4], CssTokenKind::Color(_)));
        assert_eq!(k.len(), 5);
    }

    #[test]
    fn test_negative_number_and_units() {
        let k = kinds("m-10p");
        assert_eq!(k[0], CssTokenKind::Literal("m".into()));
        assert_eq!(k[1], num(-10.0, "-10", "p"));
    }

    #[test]
    fn test_float_number() {
        assert_eq!(kinds("lh1.5"), vec![
            CssTokenKind::Literal("lh".into()),
            num(1.5, "1.5", ""),
        ]);
    }

    #[test]
    fn test_dash_after_unitless_number_is_delimiter() {
        let k = kinds("m10-20");
        assert_eq!(k[1], num(10.0, "10", ""));
        assert_eq!(k[2], CssTokenKind::Operator(CssOperator::ValueDelimiter));
        assert_eq!(k[3], num(20.0, "20", ""));
    }

    #[test]
    fn test_color_black() {
        let c = color("#0");
        assert_eq!((c.r, c.g, c.b, c.a), (0, 0, 0, 1.0));
    }

    #[test]
    fn test_color_white_short() {
        let c = color("#fff");
        assert_eq!((c.r, c.g, c.b, c.a), (255, 255, 255, 1.0));
    }

    #[test]
    fn test_color_transparent() {
        let c = color("#t");
        assert_eq!(c.a, 0.0);
        assert_eq!((c.r, c.g, c.b), (0, 0, 0));
    }

    #[test]
    fn test_color_with_alpha() {
        let c = color("#abc.5");
        assert_eq!((c.r, c.g, c.b), (0xaa, 0xbb, 0xcc));
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn test_function_name_is_merged() {
        let k = kinds("lg(red, blue)");
        assert_eq!(k[0], CssTokenKind::Literal("lg".into()));
        assert_eq!(k[1], CssTokenKind::Bracket { open: true });
    }

    #[test]
    fn test_value_mode_keeps_dashes() {
        let k: Vec<_> = tokenize("inline-block", true)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(k, vec![CssTokenKind::Literal("inline-block".into())]);
    }

    #[test]
    fn test_string_value() {
        let k = kinds("ff'Arial'");
        assert_eq!(
            k[1],
            CssTokenKind::String {
                value: "Arial".into(),
                single: true
            }
        );
    }

    #[test]
    fn test_important() {
        let k = kinds("p10!");
        assert_eq!(k[2], CssTokenKind::Operator(CssOperator::Important));
    }

    #[test]
    fn test_custom_property() {
        assert_eq!(
            kinds("--foo-bar"),
            vec![CssTokenKind::CustomProperty("--foo-bar".into())]
        );
    }

    #[test]
    fn test_unbalanced_bracket() {
        let err = tokenize("a)", false).unwrap_err();
        assert_eq!(err.message, "Unexpected bracket");
        assert_eq!(err.pos, 1);
    }
}

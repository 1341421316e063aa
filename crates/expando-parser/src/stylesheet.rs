//! Stylesheet abbreviation parser.
//!
//! Builds a flat list of declarations separated by `+`:
//!
//! ```text
//! properties := property ('+' property)*
//! property   := name? (':' | '-')? (value | '!' | ',')*
//! value      := (literal | number | color | string | field | call) (('-' | ':') ...)*
//! call       := literal '(' (value | ',')* ')'
//! ```

use expando_lexer::stylesheet::{tokenize, Color, CssOperator, CssToken, CssTokenKind};

use crate::ParseError;

/// A single `name: value !important` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CssProperty {
    pub name: Option<String>,
    pub value: Vec<CssValue>,
    pub important: bool,
}

/// Space-separated value fragment; fragments are comma-separated in output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CssValue {
    pub value: Vec<CssValueToken>,
}

impl CssValue {
    pub fn new(value: Vec<CssValueToken>) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssValueToken {
    Literal(String),
    CustomProperty(String),
    Number { value: f64, raw: String, unit: String },
    Color(Color),
    String { value: String, single: bool },
    /// `glued` is set when the field directly follows the previous token,
    /// as in `foo${1}`.
    Field {
        index: Option<usize>,
        name: String,
        glued: bool,
    },
    Function(FunctionCall),
}

impl CssValueToken {
    pub fn literal(value: &str) -> Self {
        CssValueToken::Literal(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<CssValue>,
}

/// Tokenize and parse a stylesheet abbreviation.
pub fn parse(source: &str, value_mode: bool) -> Result<Vec<CssProperty>, ParseError> {
    let tokens = tokenize(source, value_mode)?;
    let mut parser = CssParser {
        tokens,
        pos: 0,
        source,
        value_mode,
    };

    let mut result = Vec::new();
    while parser.has_next() {
        if let Some(property) = parser.property()? {
            result.push(property);
        } else if !parser.consume(|t| is_operator(t, CssOperator::Sibling)) {
            return Err(parser.error("Unexpected token"));
        }
    }

    Ok(result)
}

struct CssParser<'a> {
    tokens: Vec<CssToken>,
    pos: usize,
    source: &'a str,
    value_mode: bool,
}

impl CssParser<'_> {
    fn property(&mut self) -> Result<Option<CssProperty>, ParseError> {
        let mut name = None;
        let mut important = false;
        let mut value = Vec::new();

        if !self.value_mode && !self.is_function_start() {
            if let Some(CssTokenKind::Literal(literal)) = self.peek().map(|t| &t.kind) {
                name = Some(literal.clone());
                self.pos += 1;
                self.consume(is_value_delimiter);
            }
        }

        if self.value_mode {
            self.consume(|t| t.kind == CssTokenKind::WhiteSpace);
        }

        while self.has_next() {
            if self.consume(|t| is_operator(t, CssOperator::Important)) {
                important = true;
            } else if let Some(fragment) = self.value(self.value_mode)? {
                value.push(fragment);
            } else if !self.consume(|t| is_operator(t, CssOperator::ArgumentDelimiter)) {
                break;
            }
        }

        if name.is_some() || !value.is_empty() || important {
            return Ok(Some(CssProperty {
                name,
                value,
                important,
            }));
        }
        Ok(None)
    }

    fn value(&mut self, in_argument: bool) -> Result<Option<CssValue>, ParseError> {
        let mut result = Vec::new();
        let mut prev_end = None;

        while let Some(token) = self.peek() {
            let kind = token.kind.clone();
            let start = token.span.start;
            if is_value_delimiter(token)
                || (in_argument && kind == CssTokenKind::WhiteSpace)
            {
                self.pos += 1;
                continue;
            }

            let item = match kind {
                CssTokenKind::Literal(name) => {
                    self.pos += 1;
                    match self.arguments()? {
                        Some(arguments) => {
                            CssValueToken::Function(FunctionCall { name, arguments })
                        }
                        None => CssValueToken::Literal(name),
                    }
                }
                CssTokenKind::CustomProperty(name) => CssValueToken::CustomProperty(name),
                CssTokenKind::Number { value, raw, unit } => {
                    CssValueToken::Number { value, raw, unit }
                }
                CssTokenKind::Color(color) => CssValueToken::Color(color),
                CssTokenKind::String { value, single } => CssValueToken::String { value, single },
                CssTokenKind::Field { index, name } => CssValueToken::Field {
                    index,
                    name,
                    glued: !result.is_empty() && prev_end == Some(start),
                },
                _ => break,
            };

            if !matches!(item, CssValueToken::Literal(_) | CssValueToken::Function(_)) {
                self.pos += 1;
            }
            prev_end = self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)).map(|t| t.span.end);
            result.push(item);
        }

        Ok(if result.is_empty() {
            None
        } else {
            Some(CssValue::new(result))
        })
    }

    fn arguments(&mut self) -> Result<Option<Vec<CssValue>>, ParseError> {
        if !self.consume(|t| t.kind == CssTokenKind::Bracket { open: true }) {
            return Ok(None);
        }

        let mut args = Vec::new();
        while self.has_next() && !self.consume(|t| t.kind == CssTokenKind::Bracket { open: false }) {
            if let Some(value) = self.value(true)? {
                args.push(value);
            } else if !self.consume(|t| t.kind == CssTokenKind::WhiteSpace)
                && !self.consume(|t| is_operator(t, CssOperator::ArgumentDelimiter))
            {
                return Err(self.error("Unexpected token"));
            }
        }

        Ok(Some(args))
    }

    fn is_function_start(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(CssTokenKind::Literal(_)))
            && self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|t| t.kind == CssTokenKind::Bracket { open: true })
    }

    fn has_next(&self) -> bool {
        self.pos < self.tokens.len()
    }

    fn peek(&self) -> Option<&CssToken> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self, test: impl Fn(&CssToken) -> bool) -> bool {
        if self.peek().is_some_and(test) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn error(&self, message: &str) -> ParseError {
        let (message, pos) = match self.peek() {
            Some(token) => (message.to_string(), token.span.start),
            None => ("Unexpected end of input".into(), self.source.chars().count()),
        };
        ParseError {
            message,
            pos,
            abbreviation: self.source.to_string(),
        }
    }
}

fn is_operator(token: &CssToken, op: CssOperator) -> bool {
    token.kind == CssTokenKind::Operator(op)
}

fn is_value_delimiter(token: &CssToken) -> bool {
    is_operator(token, CssOperator::PropertyDelimiter) || is_operator(token, CssOperator::ValueDelimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn number(value: f64, raw: &str, unit: &str) -> CssValueToken {
        CssValueToken::Number {
            value,
            raw: raw.into(),
            unit: unit.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn test_name_with_values() {
        let props = parse("bd1-s#f00", false).unwrap();
        assert_eq!(props.len(), 1);
        let prop = &props[0];
        assert_eq!(prop.name.as_deref(), Some("bd"));
        assert_eq!(prop.value.len(), 1);
        let tokens = &prop.value[0].value;
        assert_eq!(tokens[0], number(1.0, "1", ""));
        assert_eq!(tokens[1], CssValueToken::literal("s"));
        assert!(matches!(tokens[2], CssValueToken::Color(_)));
    }

    #[test]
    fn test_siblings_and_important() {
        let props = parse("p10+m5!", false).unwrap();
        assert_eq!(props.len(), 2);
        assert!(props[1].important);
        assert!(!props[0].important);
    }

    #[test]
    fn test_negative_values() {
        let props = parse("m-10--20", false).unwrap();
        let tokens = &props[0].value[0].value;
        assert_eq!(tokens[0], number(-10.0, "-10", ""));
        assert_eq!(tokens[1], number(-20.0, "-20", ""));
    }

    #[test]
    fn test_comma_separated_fragments() {
        let props = parse("ff:a,b", false).unwrap();
        assert_eq!(props[0].value.len(), 2);
    }

    // =========================================================================
    // Functions
    // =========================================================================

    #[test]
    fn test_function_call() {
        let props = parse("lg(to right, #0, #f00.5)", false).unwrap();
        let prop = &props[0];
        assert_eq!(prop.name, None);
        match &prop.value[0].value[0] {
            CssValueToken::Function(call) => {
                assert_eq!(call.name, "lg");
                assert_eq!(call.arguments.len(), 3);
                assert_eq!(call.arguments[0].value.len(), 2);
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_value_mode() {
        let props = parse("solid 1px", true).unwrap();
        assert_eq!(props[0].name, None);
        assert_eq!(props[0].value[0].value.len(), 2);
    }

    #[test]
    fn test_glued_field() {
        let props = parse("${1:inset }${2:hoff} ${3:voff}", true).unwrap();
        let tokens = &props[0].value[0].value;
        let glued: Vec<bool> = tokens
            .iter()
            .map(|t| matches!(t, CssValueToken::Field { glued: true, .. }))
            .collect();
        assert_eq!(glued, vec![false, true, false]);
    }

    #[test]
    fn test_unexpected_bracket() {
        let err = parse("a)", false).unwrap_err();
        assert_eq!(err.pos, 1);
    }
}

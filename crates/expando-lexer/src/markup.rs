//! Markup abbreviation tokenizer.
//!
//! Single pass over the abbreviation. Bracket and quote depth is tracked
//! in a small context record which decides whether a character is an
//! operator or part of a literal: inside `[...]` only `=` is an operator,
//! inside `{...}` and quotes nothing is.

use crate::scanner::{
    is_alpha, is_alpha_numeric_word, is_number, is_quote, is_space, is_umlaut, Scanner,
};
use crate::token::{BracketContext, OperatorKind, Span, Token, TokenKind};
use crate::ScanError;

#[derive(Debug, Default)]
struct Context {
    group: i32,
    attribute: i32,
    expression: i32,
    quote: Option<char>,
}

/// Tokenize a markup abbreviation.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ScanError> {
    let mut scanner = Scanner::new(source);
    let mut ctx = Context::default();
    let mut tokens = Vec::new();

    while !scanner.eof() {
        let ch = scanner.peek();
        let Some(token) = next_token(&mut scanner, &mut ctx)? else {
            return Err(scanner.error("Unexpected character"));
        };

        match token.kind {
            TokenKind::Quote { .. } => {
                ctx.quote = if ch == ctx.quote { None } else { ch };
            }
            TokenKind::Bracket { open, context } => {
                let delta = if open { 1 } else { -1 };
                match context {
                    BracketContext::Group => ctx.group += delta,
                    BracketContext::Attribute => ctx.attribute += delta,
                    BracketContext::Expression => ctx.expression += delta,
                }
            }
            _ => {}
        }

        tokens.push(token);
    }

    Ok(tokens)
}

fn next_token(scanner: &mut Scanner, ctx: &mut Context) -> Result<Option<Token>, ScanError> {
    if let Some(token) = field(scanner, ctx)? {
        return Ok(Some(token));
    }
    Ok(repeater_placeholder(scanner)
        .or_else(|| repeater_number(scanner))
        .or_else(|| repeater(scanner))
        .or_else(|| whitespace(scanner))
        .or_else(|| literal(scanner, ctx))
        .or_else(|| operator(scanner))
        .or_else(|| quote(scanner))
        .or_else(|| bracket(scanner)))
}

/// `${1}`, `${1:placeholder}` or `${name}`. Only recognized inside
/// attributes and text expressions.
fn field(scanner: &mut Scanner, ctx: &Context) -> Result<Option<Token>, ScanError> {
    let start = scanner.pos;
    if (ctx.expression > 0 || ctx.attribute > 0) && scanner.eat('$') && scanner.eat('{') {
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
            return Ok(Some(Token::new(
                TokenKind::Field { index, name },
                Span::new(start, scanner.pos),
            )));
        }

        return Err(scanner.error("Expecting }"));
    }

    scanner.pos = start;
    Ok(None)
}

/// Consume a field placeholder, honoring nested `{}` pairs.
pub fn consume_placeholder(scanner: &mut Scanner) -> Result<String, ScanError> {
    let mut stack = Vec::new();
    scanner.start = scanner.pos;

    while !scanner.eof() {
        if scanner.eat('{') {
            stack.push(scanner.pos);
        } else if scanner.eat('}') {
            if stack.pop().is_none() {
                scanner.back_up(1);
                break;
            }
        } else {
            scanner.pos += 1;
        }
    }

    if let Some(pos) = stack.pop() {
        scanner.pos = pos;
        return Err(scanner.error("Expecting }"));
    }

    Ok(scanner.current())
}

fn repeater_placeholder(scanner: &mut Scanner) -> Option<Token> {
    let start = scanner.pos;
    if scanner.eat('$') && scanner.eat('#') {
        return Some(Token::new(
            TokenKind::RepeaterPlaceholder,
            Span::new(start, scanner.pos),
        ));
    }
    scanner.pos = start;
    None
}

fn repeater_number(scanner: &mut Scanner) -> Option<Token> {
    let start = scanner.pos;
    if !scanner.eat_while(|ch| ch == '$') {
        return None;
    }

    let size = scanner.pos - start;
    let mut reverse = false;
    let mut base = 1;
    let mut parent = 0;

    if scanner.eat('@') {
        while scanner.eat('^') {
            parent += 1;
        }
        reverse = scanner.eat('-');
        scanner.start = scanner.pos;
        if scanner.eat_while(is_number) {
            base = scanner.current().parse().unwrap_or(1);
        }
    }

    scanner.start = start;
    Some(Token::new(
        TokenKind::RepeaterNumber {
            size,
            reverse,
            base,
            parent,
        },
        Span::new(start, scanner.pos),
    ))
}

fn repeater(scanner: &mut Scanner) -> Option<Token> {
    let start = scanner.pos;
    if !scanner.eat('*') {
        return None;
    }

    scanner.start = scanner.pos;
    let (count, implicit) = if scanner.eat_while(is_number) {
        (scanner.current().parse().unwrap_or(1), false)
    } else {
        (1, true)
    };

    Some(Token::new(
        TokenKind::Repeater { count, implicit },
        Span::new(start, scanner.pos),
    ))
}

fn whitespace(scanner: &mut Scanner) -> Option<Token> {
    let start = scanner.pos;
    if scanner.eat_while(is_space) {
        let value = scanner.substring(start, scanner.pos);
        return Some(Token::new(
            TokenKind::WhiteSpace(value),
            Span::new(start, scanner.pos),
        ));
    }
    None
}

fn literal(scanner: &mut Scanner, ctx: &mut Context) -> Option<Token> {
    let start = scanner.pos;
    let expression_start = ctx.expression;
    let mut value = String::new();

    while let Some(ch) = scanner.peek() {
        // Escaped characters are taken verbatim in any context
        if ch == '\\' {
            scanner.pos += 1;
            if let Some(escaped) = scanner.next() {
                value.push(escaped);
            }
            continue;
        }

        if ch == '/' && ctx.quote.is_none() && ctx.expression == 0 && ctx.attribute == 0 {
            // `/` between digits belongs to the literal, e.g. `.w-1/2`
            let prev = scanner.pos.checked_sub(1).and_then(|p| scanner.char_at(p));
            let next = scanner.char_at(scanner.pos + 1);
            if prev.is_some_and(is_number) && next.is_some_and(is_number) {
                value.push(ch);
                scanner.pos += 1;
                continue;
            }
        }

        if Some(ch) == ctx.quote || ch == '$' || is_allowed_operator(ch, ctx) {
            break;
        }

        if expression_start > 0 {
            // Nested expressions, e.g. span{{foo}}
            if ch == '{' {
                ctx.expression += 1;
            } else if ch == '}' {
                if ctx.expression > expression_start {
                    ctx.expression -= 1;
                } else {
                    break;
                }
            }
        } else if ctx.quote.is_none() {
            if ctx.attribute == 0 && !is_element_name(ch) {
                break;
            }
            if is_allowed_space(ch, ctx)
                || is_allowed_repeater(ch, ctx)
                || is_quote(ch)
                || bracket_context(ch).is_some()
            {
                break;
            }
        }

        value.push(ch);
        scanner.pos += 1;
    }

    if start != scanner.pos {
        scanner.start = start;
        return Some(Token::new(
            TokenKind::Literal(value),
            Span::new(start, scanner.pos),
        ));
    }
    None
}

fn operator(scanner: &mut Scanner) -> Option<Token> {
    let kind = scanner.peek().and_then(OperatorKind::from_char)?;
    let start = scanner.pos;
    scanner.pos += 1;
    Some(Token::new(
        TokenKind::Operator(kind),
        Span::new(start, scanner.pos),
    ))
}

fn quote(scanner: &mut Scanner) -> Option<Token> {
    let ch = scanner.peek().filter(|ch| is_quote(*ch))?;
    let start = scanner.pos;
    scanner.pos += 1;
    Some(Token::new(
        TokenKind::Quote { single: ch == '\'' },
        Span::new(start, scanner.pos),
    ))
}

fn bracket(scanner: &mut Scanner) -> Option<Token> {
    let ch = scanner.peek()?;
    let context = bracket_context(ch)?;
    let start = scanner.pos;
    scanner.pos += 1;
    Some(Token::new(
        TokenKind::Bracket {
            open: matches!(ch, '(' | '[' | '{'),
            context,
        },
        Span::new(start, scanner.pos),
    ))
}

fn bracket_context(ch: char) -> Option<BracketContext> {
    match ch {
        '(' | ')' => Some(BracketContext::Group),
        '[' | ']' => Some(BracketContext::Attribute),
        '{' | '}' => Some(BracketContext::Expression),
        _ => None,
    }
}

fn is_allowed_operator(ch: char, ctx: &Context) -> bool {
    let Some(op) = OperatorKind::from_char(ch) else {
        return false;
    };
    if ctx.quote.is_some() || ctx.expression > 0 {
        return false;
    }
    // Inside attributes only `=` is an operator
    ctx.attribute == 0 || op == OperatorKind::Equal
}

fn is_allowed_space(ch: char, ctx: &Context) -> bool {
    is_space(ch) && ctx.expression == 0
}

fn is_allowed_repeater(ch: char, ctx: &Context) -> bool {
    ch == '*' && ctx.attribute == 0 && ctx.expression == 0
}

fn is_element_name(ch: char) -> bool {
    is_alpha_numeric_word(ch) || is_umlaut(ch) || ch == '-' || ch == ':' || ch == '!'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn lit(s: &str) -> TokenKind {
        TokenKind::Literal(s.into())
    }

    fn op(kind: OperatorKind) -> TokenKind {
        TokenKind::Operator(kind)
    }

    #[test]
    fn test_empty_source() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_child_and_sibling() {
        assert_eq!(
            kinds("ul>li+p"),
            vec![
                lit("ul"),
                op(OperatorKind::Child),
                lit("li"),
                op(OperatorKind::Sibling),
                lit("p"),
            ]
        );
    }

    #[test]
    fn test_class_id_and_repeater() {
        assert_eq!(
            kinds("li.item#main*3"),
            vec![
                lit("li"),
                op(OperatorKind::Class),
                lit("item"),
                op(OperatorKind::Id),
                lit("main"),
                TokenKind::Repeater {
                    count: 3,
                    implicit: false
                },
            ]
        );
    }

    #[test]
    fn test_implicit_repeater() {
        assert_eq!(
            kinds("li*"),
            vec![
                lit("li"),
                TokenKind::Repeater {
                    count: 1,
                    implicit: true
                },
            ]
        );
    }

    #[test]
    fn test_repeater_number_modifiers() {
        assert_eq!(
            kinds("$$@-5"),
            vec![TokenKind::RepeaterNumber {
                size: 2,
                reverse: true,
                base: 5,
                parent: 0,
            }]
        );
        assert_eq!(
            kinds("$@^^"),
            vec![TokenKind::RepeaterNumber {
                size: 1,
                reverse: false,
                base: 1,
                parent: 2,
            }]
        );
    }

    #[test]
    fn test_repeater_placeholder() {
        assert_eq!(
            kinds("a$#"),
            vec![lit("a"), TokenKind::RepeaterPlaceholder]
        );
    }

    #[test]
    fn test_attribute_context_allows_operators_in_literal() {
        assert_eq!(
            kinds("[href=a.b>c]"),
            vec![
                TokenKind::Bracket {
                    open: true,
                    context: BracketContext::Attribute
                },
                lit("href"),
                op(OperatorKind::Equal),
                lit("a.b>c"),
                TokenKind::Bracket {
                    open: false,
                    context: BracketContext::Attribute
                },
            ]
        );
    }

    #[test]
    fn test_text_expression_keeps_nested_braces() {
        let k = kinds("p{a {b} c}");
        assert_eq!(k[2], lit("a {b} c"));
        assert_eq!(k.len(), 4);
    }

    #[test]
    fn test_quoted_value() {
        let k = kinds("[title=\"a b\"]");
        assert_eq!(k[3], TokenKind::Quote { single: false });
        assert_eq!(k[4], lit("a b"));
        assert_eq!(k[5], TokenKind::Quote { single: false });
    }

    #[test]
    fn test_field_in_attribute() {
        let k = kinds("[a=${1:foo}]");
        assert_eq!(
            k[3],
            TokenKind::Field {
                index: Some(1),
                name: "foo".into()
            }
        );
    }

    #[test]
    fn test_variable_field_in_text() {
        let k = kinds("{${charset}}");
        assert_eq!(
            k[1],
            TokenKind::Field {
                index: None,
                name: "charset".into()
            }
        );
    }

    #[test]
    fn test_field_placeholder_nested_braces() {
        let k = kinds("{${1:a{b}c}}");
        assert_eq!(
            k[1],
            TokenKind::Field {
                index: Some(1),
                name: "a{b}c".into()
            }
        );
    }

    #[test]
    fn test_unterminated_field() {
        let err = tokenize("{${1:abc").unwrap_err();
        assert_eq!(err.message, "Expecting }");
    }

    #[test]
    fn test_dollar_outside_attribute_is_repeater_number() {
        let k = kinds("${1}");
        assert!(matches!(k[0], TokenKind::RepeaterNumber { .. }));
    }

    #[test]
    fn test_escape_is_verbatim() {
        assert_eq!(kinds("a\\>b"), vec![lit("a>b")]);
    }

    #[test]
    fn test_slash_between_digits() {
        assert_eq!(
            kinds(".w-1/2"),
            vec![op(OperatorKind::Class), lit("w-1/2")]
        );
    }

    #[test]
    fn test_self_close_operator() {
        assert_eq!(
            kinds("img/"),
            vec![lit("img"), op(OperatorKind::Close)]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("ab>c").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(2, 3));
        assert_eq!(tokens[2].span, Span::new(3, 4));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a~").unwrap_err();
        assert_eq!(err.message, "Unexpected character");
        assert_eq!(err.pos, 1);
    }
}

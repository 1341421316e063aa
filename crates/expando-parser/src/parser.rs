//! Markup abbreviation parser.
//!
//! Parses the token stream from `expando_lexer::markup` into a token tree
//! using recursive descent:
//!
//! ```text
//! statements := (element | group) (child_op statements | sibling_op statements | climb_op+)*
//! group      := '(' statements ')' repeat?
//! element    := name? (repeat | text | short_attr | attr_set | close_op repeat?)*
//! attr_set   := '[' (attribute | whitespace)* ']'
//! ```

use crate::ast::{RepeatToken, TokenAttribute, TokenElement, TokenGroup, TokenNode};
use crate::ParseError;
use expando_lexer::{BracketContext, OperatorKind, Span, Token, TokenKind};

/// Markup abbreviation parser.
///
/// Converts a flat token stream into a `TokenGroup` tree. Operators are
/// resolved here; repeaters are only recorded and expanded later by the
/// unroller.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    start: usize,
    source: String,
    jsx: bool,
}

impl Parser {
    /// Create a new parser for the given tokens of `source`.
    pub fn new(tokens: Vec<Token>, source: &str) -> Self {
        Self {
            tokens,
            pos: 0,
            start: 0,
            source: source.to_string(),
            jsx: false,
        }
    }

    /// Enable JSX mode: capitalized `Foo.Bar` component names and
    /// `.{expr}` class expressions.
    pub fn with_jsx(mut self, jsx: bool) -> Self {
        self.jsx = jsx;
        self
    }

    /// Tokenize and parse an abbreviation into a token tree.
    pub fn parse(source: &str, jsx: bool) -> Result<TokenGroup, ParseError> {
        let tokens = expando_lexer::markup::tokenize(source)?;
        let mut parser = Parser::new(tokens, source).with_jsx(jsx);
        let result = parser.statements()?;

        if parser.has_next() {
            return Err(parser.error("Unexpected character"));
        }

        Ok(result)
    }

    // =========================================================================
    // Statements and groups
    // =========================================================================

    fn statements(&mut self) -> Result<TokenGroup, ParseError> {
        let mut root = TokenGroup::default();
        // Path of child indices from `root` to the current context node
        let mut path: Vec<usize> = Vec::new();

        while self.has_next() {
            let node = match self.element()? {
                Some(elem) => TokenNode::Element(elem),
                None => match self.group()? {
                    Some(group) => TokenNode::Group(group),
                    None => break,
                },
            };

            let ctx = context_at(&mut root, &path);
            ctx.push(node);
            let index = ctx.len() - 1;

            if self.consume(|t| t.is_operator(OperatorKind::Child)) {
                path.push(index);
            } else if self.consume(|t| t.is_operator(OperatorKind::Sibling)) {
                continue;
            } else if self.consume(|t| t.is_operator(OperatorKind::Climb)) {
                // Each `^` leaves one level; climbing past the root is a no-op
                path.pop();
                while self.consume(|t| t.is_operator(OperatorKind::Climb)) {
                    path.pop();
                }
            }
        }

        Ok(root)
    }

    fn group(&mut self) -> Result<Option<TokenGroup>, ParseError> {
        if !self.consume(|t| t.is_bracket(BracketContext::Group, Some(true))) {
            return Ok(None);
        }

        let mut result = self.statements()?;
        if self
            .next()
            .is_some_and(|t| t.is_bracket(BracketContext::Group, Some(false)))
        {
            result.repeat = self.repeater();
        }

        Ok(Some(result))
    }

    // =========================================================================
    // Elements
    // =========================================================================

    fn element(&mut self) -> Result<Option<TokenElement>, ParseError> {
        let mut elem = TokenElement::default();

        if self.element_name() {
            elem.name = Some(self.slice(self.start, self.pos));
        }

        while self.has_next() {
            self.start = self.pos;

            if elem.repeat.is_none() && !elem.is_empty() && self.peek_is(Token::is_repeater) {
                elem.repeat = self.repeater();
            } else if elem.value.is_none() && self.text() {
                elem.value = Some(self.text_tokens());
            } else if let Some(attrs) = self.attributes()? {
                elem.attributes.get_or_insert_with(Vec::new).extend(attrs);
            } else {
                if !elem.is_empty() && self.consume(|t| t.is_operator(OperatorKind::Close)) {
                    elem.self_close = true;
                    if elem.repeat.is_none() {
                        elem.repeat = self.repeater();
                    }
                }
                break;
            }
        }

        Ok(if elem.is_empty() { None } else { Some(elem) })
    }

    fn attributes(&mut self) -> Result<Option<Vec<TokenAttribute>>, ParseError> {
        if let Some(attr) = self.short_attribute(OperatorKind::Id) {
            return Ok(Some(vec![attr]));
        }
        if let Some(attr) = self.short_attribute(OperatorKind::Class) {
            return Ok(Some(vec![attr]));
        }
        self.attribute_set()
    }

    fn element_name(&mut self) -> bool {
        let start = self.pos;

        if self.jsx && self.consume(is_capitalized_literal) {
            // React components: `Foo.Bar.Baz`
            while self.has_next() {
                let pos = self.pos;
                if !self.consume(|t| t.is_operator(OperatorKind::Class))
                    || !self.consume(is_capitalized_literal)
                {
                    self.pos = pos;
                    break;
                }
            }
        }

        while self.has_next() && self.consume(is_element_name) {}

        if self.pos != start {
            self.start = start;
            return true;
        }
        false
    }

    /// `{...}` text expression.
    fn text(&mut self) -> bool {
        let start = self.pos;
        if !self.consume(|t| t.is_bracket(BracketContext::Expression, Some(true))) {
            return false;
        }

        let mut brackets = 0;
        while let Some(token) = self.next() {
            if let TokenKind::Bracket {
                open,
                context: BracketContext::Expression,
            } = token.kind
            {
                if open {
                    brackets += 1;
                } else if brackets == 0 {
                    break;
                } else {
                    brackets -= 1;
                }
            }
        }

        self.start = start;
        true
    }

    /// Tokens of the last consumed text expression without its braces.
    fn text_tokens(&self) -> Vec<Token> {
        let mut from = self.start;
        let mut end = self.pos;
        if self
            .tokens
            .get(from)
            .is_some_and(|t| t.is_bracket(BracketContext::Expression, Some(true)))
        {
            from += 1;
        }
        if end > from
            && self
                .tokens
                .get(end - 1)
                .is_some_and(|t| t.is_bracket(BracketContext::Expression, Some(false)))
        {
            end -= 1;
        }
        self.slice(from, end)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn short_attribute(&mut self, kind: OperatorKind) -> Option<TokenAttribute> {
        if !self.peek_is(|t| t.is_operator(kind)) {
            return None;
        }

        self.pos += 1;
        let mut count = 1;
        while self.peek_is(|t| t.is_operator(kind)) {
            self.pos += 1;
            count += 1;
        }

        let name = if kind == OperatorKind::Id { "id" } else { "class" };
        let mut attr = TokenAttribute {
            name: Some(vec![create_literal(name)]),
            multiple: count > 1,
            ..Default::default()
        };

        // JSX computed class names: `.{styles.foo}`
        if self.jsx && self.text() {
            attr.value = Some(self.text_tokens());
            attr.expression = true;
        } else if self.literal(false) {
            attr.value = Some(self.slice(self.start, self.pos));
        }

        Some(attr)
    }

    fn attribute_set(&mut self) -> Result<Option<Vec<TokenAttribute>>, ParseError> {
        if !self.consume(|t| t.is_bracket(BracketContext::Attribute, Some(true))) {
            return Ok(None);
        }

        let mut attributes = Vec::new();
        while self.has_next() {
            if let Some(attr) = self.attribute()? {
                attributes.push(attr);
            } else if self.consume(|t| t.is_bracket(BracketContext::Attribute, Some(false))) {
                break;
            } else if !self.consume(Token::is_whitespace) {
                let message = format!("Unexpected \"{}\" token", token_type(self.peek()));
                return Err(self.error(&message));
            }
        }

        Ok(Some(attributes))
    }

    fn attribute(&mut self) -> Result<Option<TokenAttribute>, ParseError> {
        if self.quoted()? {
            // Quoted value alone is the value of a default attribute
            return Ok(Some(TokenAttribute {
                value: Some(self.slice(self.start, self.pos)),
                ..Default::default()
            }));
        }

        if self.literal(true) {
            let name = self.slice(self.start, self.pos);
            let mut value = None;
            if self.consume(|t| t.is_operator(OperatorKind::Equal))
                && (self.quoted()? || self.literal(true))
            {
                value = Some(self.slice(self.start, self.pos));
            }
            return Ok(Some(TokenAttribute {
                name: Some(name),
                value,
                ..Default::default()
            }));
        }

        Ok(None)
    }

    fn quoted(&mut self) -> Result<bool, ParseError> {
        let start = self.pos;
        let Some(TokenKind::Quote { single }) = self.peek().map(|t| t.kind.clone()) else {
            return Ok(false);
        };

        self.pos += 1;
        while let Some(token) = self.next() {
            if token.kind == (TokenKind::Quote { single }) {
                self.start = start;
                return Ok(true);
            }
        }

        let quote = self.tokens[start].clone();
        Err(self.error_at("Unclosed quote", &quote))
    }

    fn literal(&mut self, allow_brackets: bool) -> bool {
        let start = self.pos;
        let mut attribute = 0;
        let mut expression = 0;
        let mut group = 0;

        while let Some(token) = self.peek() {
            if expression > 0 {
                // Inside an expression everything is consumed
                if let TokenKind::Bracket {
                    open,
                    context: BracketContext::Expression,
                } = token.kind
                {
                    expression += if open { 1 } else { -1 };
                }
            } else if matches!(
                token.kind,
                TokenKind::Quote { .. }
                    | TokenKind::Operator(_)
                    | TokenKind::WhiteSpace(_)
                    | TokenKind::Repeater { .. }
            ) {
                break;
            } else if let TokenKind::Bracket { open, context } = token.kind {
                if !allow_brackets {
                    break;
                }
                let depth = match context {
                    BracketContext::Attribute => &mut attribute,
                    BracketContext::Expression => &mut expression,
                    BracketContext::Group => &mut group,
                };
                if open {
                    *depth += 1;
                } else if *depth == 0 {
                    // Unmatched closing bracket belongs to the parent consumer
                    break;
                } else {
                    *depth -= 1;
                }
            }
            self.pos += 1;
        }

        if start != self.pos {
            self.start = start;
            return true;
        }
        false
    }

    fn repeater(&mut self) -> Option<RepeatToken> {
        match self.peek()?.kind {
            TokenKind::Repeater { count, implicit } => {
                self.pos += 1;
                Some(RepeatToken { count, implicit })
            }
            _ => None,
        }
    }

    // =========================================================================
    // Token navigation helpers
    // =========================================================================

    fn has_next(&self) -> bool {
        self.pos < self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, test: impl Fn(&Token) -> bool) -> bool {
        self.peek().is_some_and(test)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, test: impl Fn(&Token) -> bool) -> bool {
        if self.peek_is(test) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn slice(&self, from: usize, to: usize) -> Vec<Token> {
        self.tokens[from.min(to)..to].to_vec()
    }

    fn error(&self, message: &str) -> ParseError {
        match self.peek() {
            Some(token) => self.error_at(message, token),
            None => ParseError {
                message: "Unexpected end of input".into(),
                pos: self.source.chars().count(),
                abbreviation: self.source.clone(),
            },
        }
    }

    fn error_at(&self, message: &str, token: &Token) -> ParseError {
        ParseError {
            message: message.into(),
            pos: token.span.start,
            abbreviation: self.source.clone(),
        }
    }
}

/// Child list of the node addressed by `path`, starting from `root`.
fn context_at<'a>(root: &'a mut TokenGroup, path: &[usize]) -> &'a mut Vec<TokenNode> {
    let mut elements = &mut root.elements;
    for &index in path {
        elements = match &mut elements[index] {
            TokenNode::Group(group) => &mut group.elements,
            TokenNode::Element(elem) => &mut elem.elements,
        };
    }
    elements
}

fn create_literal(value: &str) -> Token {
    Token::new(TokenKind::Literal(value.into()), Span::default())
}

fn is_element_name(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Literal(_) | TokenKind::RepeaterNumber { .. } | TokenKind::RepeaterPlaceholder
    )
}

fn is_capitalized_literal(token: &Token) -> bool {
    match &token.kind {
        TokenKind::Literal(value) => value.chars().next().is_some_and(char::is_uppercase),
        _ => false,
    }
}

fn token_type(token: Option<&Token>) -> &'static str {
    match token.map(|t| &t.kind) {
        Some(TokenKind::Literal(_)) => "Literal",
        Some(TokenKind::WhiteSpace(_)) => "WhiteSpace",
        Some(TokenKind::Quote { .. }) => "Quote",
        Some(TokenKind::Bracket { .. }) => "Bracket",
        Some(TokenKind::Operator(_)) => "Operator",
        Some(TokenKind::Repeater { .. }) => "Repeater",
        Some(TokenKind::RepeaterNumber { .. }) => "RepeaterNumber",
        Some(TokenKind::RepeaterPlaceholder) => "RepeaterPlaceholder",
        Some(TokenKind::Field { .. }) => "Field",
        None => "EOF",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> TokenGroup {
        Parser::parse(source, false).unwrap()
    }

    fn element(node: &TokenNode) -> &TokenElement {
        match node {
            TokenNode::Element(elem) => elem,
            TokenNode::Group(_) => panic!("expected element"),
        }
    }

    fn name(node: &TokenNode) -> String {
        element(node)
            .name
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| match &t.kind {
                TokenKind::Literal(s) => s.clone(),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn test_single_element() {
        let tree = parse("div");
        assert_eq!(tree.elements.len(), 1);
        assert_eq!(name(&tree.elements[0]), "div");
    }

    #[test]
    fn test_child_nesting() {
        let tree = parse("div>ul>li");
        let div = element(&tree.elements[0]);
        let ul = element(&div.elements[0]);
        assert_eq!(name(&ul.elements[0]), "li");
    }

    #[test]
    fn test_siblings() {
        let tree = parse("a+b+c");
        assert_eq!(tree.elements.len(), 3);
    }

    #[test]
    fn test_climb() {
        let tree = parse("div>p^span");
        assert_eq!(tree.elements.len(), 2);
        assert_eq!(name(&tree.elements[1]), "span");
    }

    #[test]
    fn test_climb_clamps_at_root() {
        let tree = parse("a^^^b");
        assert_eq!(tree.elements.len(), 2);
        assert_eq!(name(&tree.elements[1]), "b");
    }

    #[test]
    fn test_group_with_repeat() {
        let tree = parse("(a+b)*2+c");
        assert_eq!(tree.elements.len(), 2);
        match &tree.elements[0] {
            TokenNode::Group(group) => {
                assert_eq!(group.elements.len(), 2);
                assert_eq!(
                    group.repeat,
                    Some(RepeatToken {
                        count: 2,
                        implicit: false
                    })
                );
            }
            TokenNode::Element(_) => panic!("expected group"),
        }
    }

    #[test]
    fn test_short_attributes() {
        let tree = parse("div#main.a.b");
        let div = element(&tree.elements[0]);
        assert_eq!(div.attributes.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_attribute_set() {
        let tree = parse("a[href=\"#\" title=x disabled]");
        let a = element(&tree.elements[0]);
        let attrs = a.attributes.as_ref().unwrap();
        assert_eq!(attrs.len(), 3);
        assert!(attrs[2].value.is_none());
    }

    #[test]
    fn test_text_and_self_close_with_repeat() {
        let tree = parse("p{hello}+img/*2");
        let p = element(&tree.elements[0]);
        assert_eq!(p.value.as_ref().unwrap().len(), 1);
        let img = element(&tree.elements[1]);
        assert!(img.self_close);
        assert_eq!(img.repeat.unwrap().count, 2);
    }

    #[test]
    fn test_text_only_element() {
        let tree = parse("{text}");
        let node = element(&tree.elements[0]);
        assert!(node.name.is_none());
        assert!(node.value.is_some());
    }

    #[test]
    fn test_trailing_tokens_error() {
        let err = Parser::parse("a)", false).unwrap_err();
        assert_eq!(err.message, "Unexpected character");
        assert_eq!(err.pos, 1);
    }

    #[test]
    fn test_unclosed_quote() {
        let err = Parser::parse("a[title=\"foo]", false).unwrap_err();
        assert_eq!(err.message, "Unclosed quote");
        assert_eq!(err.pos, 8);
    }

    #[test]
    fn test_bare_self_close_is_error() {
        assert!(Parser::parse("/", false).is_err());
    }

    #[test]
    fn test_jsx_component_name() {
        let tree = Parser::parse("Foo.Bar", true).unwrap();
        let elem = element(&tree.elements[0]);
        assert_eq!(elem.name.as_ref().unwrap().len(), 3);
        assert!(elem.attributes.is_none());
    }

    #[test]
    fn test_jsx_class_expression() {
        let tree = Parser::parse("div.{styles.foo}", true).unwrap();
        let attrs = element(&tree.elements[0]).attributes.clone().unwrap();
        assert!(attrs[0].expression);
    }
}

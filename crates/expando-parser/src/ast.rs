//! Abstract Syntax Trees for abbreviations.
//!
//! Two markup trees live here:
//! - the token tree produced by the parser (`TokenGroup`/`TokenElement`),
//!   which still references raw tokens and unexpanded repeaters;
//! - the `Abbreviation` tree produced by the unroller, which is the stable
//!   output of parsing and what snippet resolution and output work on.
//!
//! Stylesheet declarations are in `stylesheet.rs`.

use expando_lexer::Token;

// ---------------------------------------------------------------------------
// Token tree (pre-unroll)
// ---------------------------------------------------------------------------

/// Repeater as written in the abbreviation: `*N` or implicit `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatToken {
    pub count: usize,
    pub implicit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Group(TokenGroup),
    Element(TokenElement),
}

/// `( ... )`, or the implicit root group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenGroup {
    pub elements: Vec<TokenNode>,
    pub repeat: Option<RepeatToken>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenElement {
    pub name: Option<Vec<Token>>,
    pub attributes: Option<Vec<TokenAttribute>>,
    pub value: Option<Vec<Token>>,
    pub repeat: Option<RepeatToken>,
    pub self_close: bool,
    pub elements: Vec<TokenNode>,
}

impl TokenElement {
    /// An element with no name, value or attributes carries nothing and is
    /// dropped by the parser.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.value.is_none() && self.attributes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenAttribute {
    pub name: Option<Vec<Token>>,
    pub value: Option<Vec<Token>>,
    pub expression: bool,
    /// `..class` written with repeated short operators.
    pub multiple: bool,
}

// ---------------------------------------------------------------------------
// Abbreviation tree (post-unroll)
// ---------------------------------------------------------------------------

/// Fully unrolled abbreviation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Abbreviation {
    pub children: Vec<AbbreviationNode>,
}

/// Iteration state of a repeated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeater {
    pub count: usize,
    /// Current iteration, 0-based.
    pub value: usize,
    pub implicit: bool,
}

/// An editor tabstop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub index: usize,
    pub name: String,
}

/// A piece of text or a field inside a node or attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Field(Field),
}

impl Value {
    pub fn is_field(&self) -> bool {
        matches!(self, Value::Field(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Field(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

/// Append to a value list, gluing adjacent text pieces together.
pub fn push_value(tokens: &mut Vec<Value>, value: Value) {
    if let (Some(Value::Text(last)), Value::Text(text)) = (tokens.last_mut(), &value) {
        last.push_str(text);
        return;
    }
    tokens.push(value);
}

/// Plain-text rendering of a value; fields contribute their placeholder.
pub fn value_to_string(tokens: &[Value]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            Value::Text(text) => text.as_str(),
            Value::Field(field) => field.name.as_str(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    #[default]
    Raw,
    SingleQuote,
    DoubleQuote,
    Expression,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attribute {
    pub name: Option<String>,
    pub value: Option<Vec<Value>>,
    /// `[disabled.]`: outputs as a boolean attribute.
    pub boolean: bool,
    /// `[!href]`: output only when it receives a value.
    pub implied: bool,
    pub value_type: ValueType,
    pub multiple: bool,
}

impl Attribute {
    pub fn new(name: &str, value: Option<Vec<Value>>) -> Self {
        Self {
            name: Some(name.to_string()),
            value,
            ..Default::default()
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AbbreviationNode {
    pub name: Option<String>,
    /// Empty when the node has no text.
    pub value: Vec<Value>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<AbbreviationNode>,
    pub repeat: Option<Repeater>,
    pub self_closing: bool,
}

impl AbbreviationNode {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Text-only node: no name and no attributes.
    pub fn is_snippet(&self) -> bool {
        self.name.is_none() && self.attributes.is_empty()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_named(name))
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.is_named(name))
    }

    /// Last descendant along the last-child chain (the node itself if it
    /// has no children).
    pub fn deepest_mut(&mut self) -> &mut AbbreviationNode {
        let mut node = self;
        while !node.children.is_empty() {
            let last = node.children.len() - 1;
            node = &mut node.children[last];
        }
        node
    }

    /// Append text to the node value.
    pub fn insert_text(&mut self, text: &str) {
        push_value(&mut self.value, Value::Text(text.to_string()));
    }
}

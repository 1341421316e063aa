/// Half-open `[start, end)` character offsets into the abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Which bracket pair a `Bracket` token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketContext {
    /// `(` `)`
    Group,
    /// `[` `]`
    Attribute,
    /// `{` `}`
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// `>`
    Child,
    /// `+`
    Sibling,
    /// `^`
    Climb,
    /// `.`
    Class,
    /// `#`
    Id,
    /// `/`
    Close,
    /// `=`
    Equal,
}

impl OperatorKind {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '>' => Some(Self::Child),
            '+' => Some(Self::Sibling),
            '^' => Some(Self::Climb),
            '.' => Some(Self::Class),
            '#' => Some(Self::Id),
            '/' => Some(Self::Close),
            '=' => Some(Self::Equal),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Child => '>',
            Self::Sibling => '+',
            Self::Climb => '^',
            Self::Class => '.',
            Self::Id => '#',
            Self::Close => '/',
            Self::Equal => '=',
        }
    }
}

/// Token classification for markup abbreviations.
///
/// Data-carrying variants embed their value directly.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Literal(String),
    WhiteSpace(String),
    Quote {
        single: bool,
    },
    Bracket {
        open: bool,
        context: BracketContext,
    },
    Operator(OperatorKind),
    /// `*N`, or `*` alone when `implicit`.
    Repeater {
        count: usize,
        implicit: bool,
    },
    /// `$`, `$$$`, `$@-`, `$@^^3`...
    RepeaterNumber {
        size: usize,
        reverse: bool,
        base: usize,
        parent: usize,
    },
    /// `$#`
    RepeaterPlaceholder,
    /// `${1}`, `${1:placeholder}` or a `${name}` variable.
    Field {
        index: Option<usize>,
        name: String,
    },
}

/// A token produced by the markup tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_operator(&self, kind: OperatorKind) -> bool {
        self.kind == TokenKind::Operator(kind)
    }

    pub fn is_bracket(&self, context: BracketContext, open: Option<bool>) -> bool {
        match self.kind {
            TokenKind::Bracket { open: o, context: c } => {
                c == context && open.map_or(true, |expected| expected == o)
            }
            _ => false,
        }
    }

    pub fn is_quote(&self) -> bool {
        matches!(self.kind, TokenKind::Quote { .. })
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::WhiteSpace(_))
    }

    pub fn is_repeater(&self) -> bool {
        matches!(self.kind, TokenKind::Repeater { .. })
    }
}

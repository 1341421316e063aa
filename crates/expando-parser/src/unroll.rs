//! Tree unroller.
//!
//! Converts the parser's token tree into the [`Abbreviation`] node tree:
//! repeated elements and groups are copied, repeater numbers (`$`, `$@-`,
//! `$@^3`) are rendered from the repeater stack and caller text is placed
//! into implicitly repeated elements.

use std::sync::LazyLock;

use expando_lexer::{BracketContext, Token, TokenKind};
use regex::Regex;

use crate::ast::{
    push_value, Abbreviation, AbbreviationNode, Attribute, Field, RepeatToken, Repeater,
    TokenAttribute, TokenElement, TokenGroup, TokenNode, Value, ValueType,
};
use crate::{ParseOptions, Text};

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:(?:https?|ftp|file):)?//|(?:www|ftp)\.)[^ ]*$").expect("valid url regex")
});
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.+-]+@[\w-]+\.[\w.-]+$").expect("valid email regex"));
static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+:").expect("valid scheme regex"));

/// Unrolling state shared by the whole tree walk.
struct State<'a> {
    /// Caller text was consumed by an implicit repeater or `$#`.
    inserted: bool,
    /// Caller text was read at least once.
    text_inserted: bool,
    repeaters: Vec<Repeater>,
    text: Option<&'a Text>,
    /// Non-blank caller lines.
    clean_text: Vec<&'a str>,
    /// Remaining repeat budget; `None` means unbounded.
    repeat_guard: Option<usize>,
    options: &'a ParseOptions,
}

impl<'a> State<'a> {
    fn text_at(&mut self, pos: Option<usize>) -> String {
        self.text_inserted = true;
        match self.text {
            Some(Text::Lines(lines)) => match pos {
                Some(pos) if pos < self.clean_text.len() => self.clean_text[pos].to_string(),
                Some(pos) => lines.get(pos).cloned().unwrap_or_default(),
                None => lines.join("\n"),
            },
            Some(Text::Single(text)) => text.clone(),
            None => String::new(),
        }
    }

    fn variable(&self, name: &str) -> String {
        self.options
            .variables
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Returns `true` once the repeat budget is exhausted.
    fn spend_repeat(&mut self) -> bool {
        match &mut self.repeat_guard {
            Some(guard) => {
                *guard = guard.saturating_sub(1);
                *guard == 0
            }
            None => false,
        }
    }
}

/// Unroll a parsed token tree into an abbreviation.
pub fn convert(tree: &TokenGroup, options: &ParseOptions) -> Abbreviation {
    let clean_text = match &options.text {
        Some(Text::Lines(lines)) => lines
            .iter()
            .map(String::as_str)
            .filter(|line| !line.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    };

    let mut state = State {
        inserted: false,
        text_inserted: false,
        repeaters: Vec::new(),
        text: options.text.as_ref(),
        clean_text,
        repeat_guard: options.max_repeat,
        options,
    };

    let mut result = Abbreviation {
        children: convert_group(tree, &mut state),
    };

    // No implicit repeater consumed the text: wrap the last element with it
    if !state.text_inserted {
        if let (Some(text), Some(last)) = (&options.text, result.children.last_mut()) {
            let text = match text {
                Text::Lines(lines) => lines.join("\n"),
                Text::Single(text) => text.clone(),
            };
            let deepest = last.deepest_mut();
            deepest.insert_text(&text);
            if options.href && deepest.name.as_deref() == Some("a") {
                insert_href(deepest, &text);
            }
        }
    }

    result
}

fn convert_statement(node: &TokenNode, state: &mut State) -> Vec<AbbreviationNode> {
    let token_repeat = match node {
        TokenNode::Group(group) => group.repeat,
        TokenNode::Element(elem) => elem.repeat,
    };

    let Some(RepeatToken { count, implicit }) = token_repeat else {
        return convert_node(node, None, state);
    };

    let count = match state.text {
        Some(Text::Lines(_)) if implicit => state.clean_text.len(),
        _ => count,
    }
    .max(1);

    let mut result = Vec::new();
    state.repeaters.push(Repeater {
        count,
        value: 0,
        implicit,
    });

    for i in 0..count {
        let repeat = Repeater {
            count,
            value: i,
            implicit,
        };
        if let Some(top) = state.repeaters.last_mut() {
            *top = repeat;
        }

        let mut items = convert_node(node, Some(repeat), state);
        if implicit && !state.inserted && state.text.is_some() {
            if let Some(target) = items.last_mut() {
                let text = state.text_at(Some(i));
                target.deepest_mut().insert_text(&text);
            }
        }
        result.append(&mut items);

        // The current iteration always completes before the guard stops the loop
        if state.spend_repeat() {
            break;
        }
    }

    state.repeaters.pop();
    if implicit {
        state.inserted = true;
    }

    result
}

fn convert_node(
    node: &TokenNode,
    repeat: Option<Repeater>,
    state: &mut State,
) -> Vec<AbbreviationNode> {
    match node {
        TokenNode::Group(group) => {
            let mut items = convert_group(group, state);
            if let Some(repeat) = repeat {
                for item in items.iter_mut().filter(|item| item.repeat.is_none()) {
                    item.repeat = Some(repeat);
                }
            }
            items
        }
        TokenNode::Element(elem) => convert_element(elem, repeat, state),
    }
}

fn convert_group(group: &TokenGroup, state: &mut State) -> Vec<AbbreviationNode> {
    group
        .elements
        .iter()
        .flat_map(|child| convert_statement(child, state))
        .collect()
}

fn convert_element(
    elem: &TokenElement,
    repeat: Option<Repeater>,
    state: &mut State,
) -> Vec<AbbreviationNode> {
    let mut node = AbbreviationNode {
        name: elem.name.as_deref().map(|tokens| stringify_name(tokens, state)),
        value: elem
            .value
            .as_deref()
            .map(|tokens| stringify_value(tokens, state))
            .unwrap_or_default(),
        repeat,
        self_closing: elem.self_close,
        ..Default::default()
    };

    let mut children: Vec<AbbreviationNode> = elem
        .elements
        .iter()
        .flat_map(|child| convert_statement(child, state))
        .collect();

    if let Some(attributes) = &elem.attributes {
        node.attributes = attributes
            .iter()
            .map(|attr| convert_attribute(attr, state))
            .collect();
    }

    // Text-only wrapper: its children become siblings
    if node.name.is_none()
        && node.attributes.is_empty()
        && !node.value.is_empty()
        && !node.value.iter().any(Value::is_field)
    {
        let mut result = vec![node];
        result.append(&mut children);
        return result;
    }

    node.children = children;
    vec![node]
}

fn convert_attribute(attr: &TokenAttribute, state: &mut State) -> Attribute {
    let mut value_type = if attr.expression {
        ValueType::Expression
    } else {
        ValueType::Raw
    };

    let mut name = attr.name.as_deref().map(|tokens| stringify_name(tokens, state));
    let mut implied = false;
    let mut boolean = false;

    if let Some(n) = &mut name {
        if let Some(rest) = n.strip_prefix('!') {
            implied = true;
            *n = rest.to_string();
        }
        if let Some(rest) = n.strip_suffix('.') {
            boolean = true;
            *n = rest.to_string();
        }
    }

    let value = attr.value.as_deref().map(|tokens| {
        let mut tokens = tokens;
        match tokens.first().map(|t| t.kind.clone()) {
            Some(quote @ TokenKind::Quote { single }) => {
                value_type = if single {
                    ValueType::SingleQuote
                } else {
                    ValueType::DoubleQuote
                };
                tokens = &tokens[1..];
                if tokens.last().is_some_and(|t| t.kind == quote) {
                    tokens = &tokens[..tokens.len() - 1];
                }
            }
            Some(TokenKind::Bracket {
                open: true,
                context: BracketContext::Expression,
            }) => {
                value_type = ValueType::Expression;
                tokens = &tokens[1..];
                if tokens
                    .last()
                    .is_some_and(|t| t.is_bracket(BracketContext::Expression, Some(false)))
                {
                    tokens = &tokens[..tokens.len() - 1];
                }
            }
            _ => {}
        }
        stringify_value(tokens, state)
    });

    Attribute {
        name,
        value,
        boolean,
        implied,
        value_type,
        multiple: attr.multiple,
    }
}

// =============================================================================
// Token stringification
// =============================================================================

fn stringify_name(tokens: &[Token], state: &mut State) -> String {
    tokens.iter().map(|t| stringify(t, state)).collect()
}

/// Numbered fields are kept as `Value::Field` so the output stage can place
/// tabstops; everything else is rendered to text.
fn stringify_value(tokens: &[Token], state: &mut State) -> Vec<Value> {
    let mut result = Vec::new();
    for token in tokens {
        match &token.kind {
            TokenKind::Field {
                index: Some(index),
                name,
            } => result.push(Value::Field(Field {
                index: *index,
                name: name.clone(),
            })),
            _ => {
                let text = stringify(token, state);
                if !text.is_empty() {
                    push_value(&mut result, Value::Text(text));
                }
            }
        }
    }
    result
}

fn stringify(token: &Token, state: &mut State) -> String {
    match &token.kind {
        TokenKind::Literal(value) => value.clone(),
        TokenKind::WhiteSpace(value) => value.clone(),
        TokenKind::Quote { single } => if *single { "'" } else { "\"" }.into(),
        TokenKind::Bracket { open, context } => match (context, open) {
            (BracketContext::Group, true) => "(",
            (BracketContext::Group, false) => ")",
            (BracketContext::Attribute, true) => "[",
            (BracketContext::Attribute, false) => "]",
            (BracketContext::Expression, true) => "{",
            (BracketContext::Expression, false) => "}",
        }
        .into(),
        TokenKind::Operator(op) => op.as_char().to_string(),
        TokenKind::Repeater { count, implicit } => {
            if *implicit {
                "*".into()
            } else {
                format!("*{count}")
            }
        }
        TokenKind::Field { index, name } => match index {
            Some(index) if name.is_empty() => format!("${{{index}}}"),
            Some(index) => format!("${{{index}:{name}}}"),
            None if !name.is_empty() => state.variable(name),
            None => String::new(),
        },
        TokenKind::RepeaterNumber {
            size,
            reverse,
            base,
            parent,
        } => {
            let mut value = 1;
            if let Some(repeater) = state.repeaters.last() {
                let offset = if *reverse {
                    repeater.count - repeater.value - 1
                } else {
                    repeater.value
                };
                value = base.saturating_add(offset);

                if *parent > 0 {
                    let last = state.repeaters.len() - 1;
                    let parent_ix = last.saturating_sub(*parent);
                    if parent_ix != last {
                        let scaled = repeater.count.saturating_mul(state.repeaters[parent_ix].value);
                        value = value.saturating_add(scaled);
                    }
                }
            }
            format!("{value:0>size$}", size = *size)
        }
        TokenKind::RepeaterPlaceholder => {
            let pos = state
                .repeaters
                .iter()
                .rev()
                .find(|r| r.implicit)
                .map(|r| r.value);
            state.inserted = true;
            state.text_at(pos)
        }
    }
}

/// Fill the `href` of a link wrapped around a URL or e-mail.
fn insert_href(node: &mut AbbreviationNode, text: &str) {
    let mut href = String::new();
    if URL.is_match(text) {
        href = text.to_string();
        if !SCHEME.is_match(&href) && !href.starts_with("//") {
            href = format!("http://{href}");
        }
    } else if EMAIL.is_match(text) {
        href = format!("mailto:{text}");
    }

    match node.attribute_mut("href") {
        Some(attr) => {
            if attr.value.as_ref().map_or(true, Vec::is_empty) {
                attr.value = Some(vec![Value::Text(href)]);
            }
        }
        None => node.attributes.push(Attribute {
            value_type: ValueType::DoubleQuote,
            ..Attribute::new("href", Some(vec![Value::Text(href)]))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_abbreviation, ParseOptions};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn unroll(source: &str) -> Abbreviation {
        parse_abbreviation(source, &ParseOptions::default()).unwrap()
    }

    fn class_of(node: &AbbreviationNode) -> String {
        node.attribute("class")
            .and_then(|a| a.value.as_ref())
            .map(|v| crate::ast::value_to_string(v))
            .unwrap_or_default()
    }

    // =========================================================================
    // Repeaters
    // =========================================================================

    #[test]
    fn test_repeat_numbering() {
        let abbr = unroll("li.item$*3");
        let classes: Vec<String> = abbr.children.iter().map(class_of).collect();
        assert_eq!(classes, vec!["item1", "item2", "item3"]);
    }

    #[test]
    fn test_reverse_numbering() {
        let abbr = unroll("li.item$@-*3");
        let classes: Vec<String> = abbr.children.iter().map(class_of).collect();
        assert_eq!(classes, vec!["item3", "item2", "item1"]);
    }

    #[test]
    fn test_padded_numbering_with_base() {
        let abbr = unroll("li.i$$$@5*2");
        assert_eq!(class_of(&abbr.children[1]), "i006");
    }

    #[test]
    fn test_parent_scaled_numbering() {
        let abbr = unroll("ul*2>li.x$@^*2");
        let second = &abbr.children[1];
        assert_eq!(class_of(&second.children[0]), "x3");
        assert_eq!(class_of(&second.children[1]), "x4");
    }

    #[test]
    fn test_numbering_base_saturates() {
        let abbr = unroll(&format!("li.x$@{}*2", usize::MAX));
        assert_eq!(abbr.children.len(), 2);
        assert_eq!(class_of(&abbr.children[1]), format!("x{}", usize::MAX));

        let abbr = unroll(&format!("li.x$@-{}*2", usize::MAX));
        assert_eq!(class_of(&abbr.children[0]), format!("x{}", usize::MAX));
    }

    #[test]
    fn test_repeat_state_is_copied_per_node() {
        let abbr = unroll("p*3");
        let values: Vec<usize> = abbr
            .children
            .iter()
            .map(|n| n.repeat.unwrap().value)
            .collect();
        assert_eq!(values, vec![0, 1, 2]);
    }

    #[test]
    fn test_group_repeat_attaches_to_items() {
        let abbr = unroll("(a+b)*2");
        assert_eq!(abbr.children.len(), 4);
        assert_eq!(abbr.children[3].repeat.unwrap().value, 1);
    }

    #[test]
    fn test_repeat_guard_stops_after_iteration() {
        let options = ParseOptions {
            max_repeat: Some(2),
            ..Default::default()
        };
        let abbr = parse_abbreviation("p*10", &options).unwrap();
        assert_eq!(abbr.children.len(), 2);
    }

    // =========================================================================
    // Text
    // =========================================================================

    #[test]
    fn test_implicit_repeat_uses_text_lines() {
        let options = ParseOptions {
            text: Some(Text::Lines(vec!["one".into(), " ".into(), "two".into()])),
            ..Default::default()
        };
        let abbr = parse_abbreviation("ul>li*", &options).unwrap();
        let items = &abbr.children[0].children;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].value, vec![Value::from("two")]);
    }

    #[test]
    fn test_implicit_repeat_without_text_keeps_empty_value() {
        let abbr = unroll("ul>li*");
        let items = &abbr.children[0].children;
        assert_eq!(items.len(), 1);
        assert!(items[0].value.is_empty());
    }

    #[test]
    fn test_text_wraps_deepest_node() {
        let options = ParseOptions {
            text: Some("hello".into()),
            ..Default::default()
        };
        let abbr = parse_abbreviation("div>p", &options).unwrap();
        assert_eq!(abbr.children[0].children[0].value, vec![Value::from("hello")]);
    }

    #[test]
    fn test_placeholder_consumes_text() {
        let options = ParseOptions {
            text: Some(Text::Lines(vec!["a".into(), "b".into()])),
            ..Default::default()
        };
        let abbr = parse_abbreviation("li[title=$#]*", &options).unwrap();
        assert_eq!(abbr.children.len(), 2);
        let title = abbr.children[1].attribute("title").unwrap();
        assert_eq!(title.value, Some(vec![Value::from("b")]));
        assert!(abbr.children[1].value.is_empty());
    }

    #[test]
    fn test_href_from_url() {
        let options = ParseOptions {
            text: Some("www.example.com".into()),
            href: true,
            ..Default::default()
        };
        let abbr = parse_abbreviation("a", &options).unwrap();
        let href = abbr.children[0].attribute("href").unwrap();
        assert_eq!(href.value, Some(vec![Value::from("http://www.example.com")]));
    }

    #[test]
    fn test_href_from_email() {
        let options = ParseOptions {
            text: Some("me@example.com".into()),
            href: true,
            ..Default::default()
        };
        let abbr = parse_abbreviation("a", &options).unwrap();
        let href = abbr.children[0].attribute("href").unwrap();
        assert_eq!(href.value, Some(vec![Value::from("mailto:me@example.com")]));
    }

    #[test]
    fn test_text_only_wrapper_promotes_children() {
        let abbr = unroll("{Click}+a");
        assert_eq!(abbr.children.len(), 2);
        let abbr = unroll("{Text}>b");
        assert_eq!(abbr.children.len(), 2);
        assert!(abbr.children[0].children.is_empty());
    }

    // =========================================================================
    // Attributes and fields
    // =========================================================================

    #[test]
    fn test_attribute_flags() {
        let abbr = unroll("input[!value disabled. title='x']");
        let attrs = &abbr.children[0].attributes;
        assert!(attrs[0].implied);
        assert_eq!(attrs[0].name.as_deref(), Some("value"));
        assert!(attrs[1].boolean);
        assert_eq!(attrs[1].name.as_deref(), Some("disabled"));
        assert_eq!(attrs[2].value_type, ValueType::SingleQuote);
        assert_eq!(attrs[2].value, Some(vec![Value::from("x")]));
    }

    #[test]
    fn test_numbered_field_is_kept() {
        let abbr = unroll("a[href=${1:url}]");
        let href = abbr.children[0].attribute("href").unwrap();
        assert_eq!(
            href.value,
            Some(vec![Value::Field(Field {
                index: 1,
                name: "url".into()
            })])
        );
    }

    #[test]
    fn test_variable_field_substitutes() {
        let mut variables = HashMap::new();
        variables.insert("lang".to_string(), "en".to_string());
        let options = ParseOptions {
            variables,
            ..Default::default()
        };
        let abbr = parse_abbreviation("html[lang=${lang}]", &options).unwrap();
        let lang = abbr.children[0].attribute("lang").unwrap();
        assert_eq!(lang.value, Some(vec![Value::from("en")]));
    }
}

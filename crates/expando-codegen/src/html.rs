//! HTML/XML stringifier.
//!
//! Walks the resolved tree with an explicit parent stack and decides for
//! every node whether it starts on a new line. Fields are renumbered on the
//! fly so each expansion yields unique tabstop indexes.

use std::sync::LazyLock;

use expando_parser::{Abbreviation, AbbreviationNode, Attribute, Field, Value};
use regex::Regex;

use crate::config::{Config, SelfClosingStyle};
use crate::output::{
    attr_name, attr_quote, is_boolean_attribute, is_inline, is_inline_element, tag_name,
    OutputStream,
};

static BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([\w\-:]+)[\s>]").expect("valid tag regex"));
static COMMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]|[A-Z][A-Z_-]*").expect("valid comment regex"));
static ATTRIBUTE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][A-Z_-]*").expect("valid comment regex"));

/// Render a resolved and transformed tree as HTML.
pub fn stringify(abbr: &Abbreviation, config: &Config) -> String {
    let mut writer = HtmlWriter {
        out: OutputStream::new(&config.options.output, 0),
        config,
        field_index: 1,
        parents: Vec::new(),
    };
    writer.children(&abbr.children);
    writer.out.value
}

struct HtmlWriter<'a> {
    out: OutputStream<'a>,
    config: &'a Config,
    /// Offset added to every field index of the next pushed value.
    field_index: usize,
    parents: Vec<&'a AbbreviationNode>,
}

impl<'a> HtmlWriter<'a> {
    fn parent(&self) -> Option<&'a AbbreviationNode> {
        self.parents.last().copied()
    }

    fn children(&mut self, items: &'a [AbbreviationNode]) {
        for (index, node) in items.iter().enumerate() {
            self.element(node, index, items);
        }
    }

    fn nested(&mut self, node: &'a AbbreviationNode) {
        self.parents.push(node);
        self.children(&node.children);
        self.parents.pop();
    }

    fn element(&mut self, node: &'a AbbreviationNode, index: usize, items: &'a [AbbreviationNode]) {
        let config = self.config;
        let parent = self.parent();
        let format = should_format(node, index, items, parent, config);
        let level = indent_level(parent, config);

        self.out.level += level;
        if format {
            self.out.push_newline(true);
        }

        if let Some(raw_name) = &node.name {
            let name = tag_name(raw_name, config);
            self.comment(node, &config.options.comment.before);
            self.out.push(&format!("<{name}"));
            for attr in node.attributes.iter().filter(|a| should_output(a)) {
                self.attribute(attr);
            }

            if node.self_closing && node.children.is_empty() && node.value.is_empty() {
                self.out.push(&format!("{}>", self_close(config)));
            } else {
                self.out.push(">");
                if !self.snippet(node) {
                    self.content(node, raw_name);
                }
                self.out.push(&format!("</{name}>"));
                self.comment(node, &config.options.comment.after);
            }
        } else if !self.snippet(node) {
            self.tokens(&node.value);
            self.nested(node);
        }

        if format && index + 1 == items.len() {
            if let Some(parent) = parent {
                let offset = if parent.is_snippet() { 0 } else { 1 };
                self.newline_at(self.out.level - offset);
            }
        }
        self.out.level -= level;
    }

    fn content(&mut self, node: &'a AbbreviationNode, raw_name: &str) {
        let config = self.config;
        let options = &config.options.output;

        if !node.value.is_empty() {
            let inner = node.value.iter().any(has_newline)
                || starts_with_block_tag(&node.value, config);
            self.value_block(&node.value, inner);
        }

        self.nested(node);

        if node.value.is_empty() && node.children.is_empty() {
            let inner = options.format_leaf_node
                || options.format_force.iter().any(|tag| tag == raw_name);
            self.value_block(&[caret()], inner);
        }
    }

    /// Push a value, on its own indented lines when `inner` is set.
    fn value_block(&mut self, value: &[Value], inner: bool) {
        if inner {
            self.out.level += 1;
            self.out.push_newline(true);
        }
        self.tokens(value);
        if inner {
            self.out.level -= 1;
            self.out.push_newline(true);
        }
    }

    /// Output children in place of the first field of the node value.
    fn snippet(&mut self, node: &'a AbbreviationNode) -> bool {
        if node.value.is_empty() || node.children.is_empty() {
            return false;
        }
        let Some(field_ix) = node.value.iter().position(Value::is_field) else {
            return false;
        };

        self.tokens(&node.value[..field_ix]);
        let line = self.out.line;
        let mut pos = field_ix + 1;
        self.nested(node);

        if self.out.line != line {
            if let Some(Value::Text(text)) = node.value.get(pos) {
                self.out.push_string(text.trim_start());
                pos += 1;
            }
        }
        self.tokens(&node.value[pos..]);
        true
    }

    fn tokens(&mut self, tokens: &[Value]) {
        let mut largest: Option<usize> = None;
        for token in tokens {
            match token {
                Value::Text(text) => self.out.push_string(text),
                Value::Field(field) => {
                    self.out.push_field(self.field_index + field.index, &field.name);
                    largest = largest.max(Some(field.index));
                }
            }
        }
        if let Some(largest) = largest {
            self.field_index += largest + 1;
        }
    }

    fn attribute(&mut self, attr: &Attribute) {
        let config = self.config;
        let Some(raw_name) = &attr.name else {
            return;
        };
        let name = attr_name(raw_name, config);
        let (open, close) = (attr_quote(attr, config, true), attr_quote(attr, config, false));

        let value = match &attr.value {
            Some(value) => Some(value.clone()),
            None if is_boolean_attribute(attr, config) => {
                if config.options.output.compact_boolean {
                    None
                } else {
                    Some(vec![Value::Text(name.clone())])
                }
            }
            None => Some(vec![caret()]),
        };

        self.out.push(&format!(" {name}"));
        match value {
            Some(value) => {
                self.out.push(&format!("={open}"));
                self.tokens(&value);
                self.out.push(close);
            }
            None if config.options.output.self_closing_style != SelfClosingStyle::Html => {
                self.out.push(&format!("={open}{name}{close}"));
            }
            None => {}
        }
    }

    fn comment(&mut self, node: &AbbreviationNode, template: &str) {
        let config = self.config;
        let comment = &config.options.comment;
        if !comment.enabled || template.is_empty() {
            return;
        }
        if !comment.trigger.iter().any(|attr| node.attribute(attr).is_some()) {
            return;
        }
        let text = render_comment(template, node);
        self.out.push_string(&text);
    }

    fn newline_at(&mut self, level: i32) {
        self.out.push_newline(false);
        self.out.push_indent(level);
    }
}

fn caret() -> Value {
    Value::Field(Field {
        index: 0,
        name: String::new(),
    })
}

fn self_close(config: &Config) -> &'static str {
    match config.options.output.self_closing_style {
        SelfClosingStyle::Html => "",
        SelfClosingStyle::Xhtml => " /",
        SelfClosingStyle::Xml => "/",
    }
}

/// Implied attributes only appear once they receive a value.
fn should_output(attr: &Attribute) -> bool {
    !attr.implied || attr.value.as_ref().is_some_and(|v| !v.is_empty())
}

fn has_newline(value: &Value) -> bool {
    value.as_text().is_some_and(|text| text.contains(['\r', '\n']))
}

fn starts_with_block_tag(value: &[Value], config: &Config) -> bool {
    value
        .first()
        .and_then(Value::as_text)
        .and_then(|text| BLOCK_TAG.captures(text))
        .is_some_and(|caps| !is_inline_element(&caps[1], config))
}

/// Indentation the node adds relative to its parent.
fn indent_level(parent: Option<&AbbreviationNode>, config: &Config) -> i32 {
    match parent {
        None => 0,
        Some(parent) if parent.is_snippet() => 0,
        Some(parent) => {
            let skip = parent.name.as_deref().is_some_and(|name| {
                config.options.output.format_skip.iter().any(|tag| tag == name)
            });
            if skip {
                0
            } else {
                1
            }
        }
    }
}

fn should_format(
    node: &AbbreviationNode,
    index: usize,
    items: &[AbbreviationNode],
    parent: Option<&AbbreviationNode>,
    config: &Config,
) -> bool {
    let options = &config.options.output;
    if !options.format {
        return false;
    }
    if index == 0 && parent.is_none() {
        return false;
    }
    if parent.is_some_and(AbbreviationNode::is_snippet) && items.len() == 1 {
        return false;
    }

    if node.is_snippet() {
        let prev_snippet = index > 0 && items[index - 1].is_snippet();
        let next_snippet = items.get(index + 1).is_some_and(AbbreviationNode::is_snippet);
        if prev_snippet
            || next_snippet
            || node.value.iter().any(has_newline)
            || (node.value.iter().any(Value::is_field) && !node.children.is_empty())
        {
            return true;
        }
    }

    if !is_inline(node, config) {
        return true;
    }

    if index == 0 {
        if items.iter().any(|item| !is_inline(item, config)) {
            return true;
        }
    } else if !is_inline(&items[index - 1], config) {
        return true;
    }

    if options.inline_break > 0 {
        let inline_named = |item: &&AbbreviationNode| {
            item.name.as_deref().is_some_and(|name| is_inline_element(name, config))
        };
        let before = items[..index].iter().rev().take_while(inline_named).count();
        let after = items[index + 1..].iter().take_while(inline_named).count();
        if 1 + before + after >= options.inline_break {
            return true;
        }
    }

    node.children
        .iter()
        .enumerate()
        .any(|(i, child)| should_format(child, i, &node.children, Some(node), config))
}

/// Fill a comment template. `[...]` sections are dropped unless every
/// attribute they reference is present; `ID`, `CLASS` and other upper-case
/// attribute names are replaced by attribute values.
fn render_comment(template: &str, node: &AbbreviationNode) -> String {
    COMMENT_TOKEN
        .replace_all(template, |caps: &regex::Captures| match caps.get(1) {
            Some(section) => {
                let section = section.as_str();
                let complete = ATTRIBUTE_REF
                    .find_iter(section)
                    .all(|m| attribute_text(node, m.as_str()).is_some());
                if complete {
                    ATTRIBUTE_REF
                        .replace_all(section, |m: &regex::Captures| {
                            attribute_text(node, &m[0]).unwrap_or_default()
                        })
                        .into_owned()
                } else {
                    String::new()
                }
            }
            None => attribute_text(node, &caps[0]).unwrap_or_else(|| caps[0].to_string()),
        })
        .into_owned()
}

fn attribute_text(node: &AbbreviationNode, token: &str) -> Option<String> {
    let name = token.to_lowercase();
    let value = node.attribute(&name)?.value.as_deref()?;
    let text = expando_parser::ast::value_to_string(value);
    Some(if name == "class" {
        text.split_whitespace().collect::<Vec<_>>().join(".")
    } else {
        text
    })
}

//! Stringifier for indentation-based template syntaxes: HAML, SLIM, PUG.
//!
//! Nesting is expressed with indentation alone, so unlike HTML there are no
//! closing tags and every element except the first top-level one starts on
//! its own line. `id` and `class` are written in selector form (`#a.b`);
//! other attributes use the syntax-specific delimiters.

use expando_parser::{Abbreviation, AbbreviationNode, Attribute, Field, Value};

use crate::config::{Config, SelfClosingStyle};
use crate::output::{attr_name, attr_quote, is_boolean_attribute, OutputStream};

/// Delimiters of a specific indentation syntax.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndentSyntax {
    pub before_name: &'static str,
    pub before_attribute: &'static str,
    pub after_attribute: &'static str,
    pub glue_attribute: &'static str,
    pub before_text_line: &'static str,
    pub after_text_line: &'static str,
    /// Value written for boolean attributes without `compactBoolean`.
    pub boolean_value: &'static str,
    pub self_close: &'static str,
}

impl IndentSyntax {
    pub fn haml() -> Self {
        Self {
            before_name: "%",
            before_attribute: "(",
            after_attribute: ")",
            glue_attribute: " ",
            after_text_line: " |",
            boolean_value: "true",
            self_close: "/",
            ..Default::default()
        }
    }

    pub fn slim() -> Self {
        Self {
            before_attribute: " ",
            glue_attribute: " ",
            before_text_line: "| ",
            self_close: "/",
            ..Default::default()
        }
    }

    pub fn pug(config: &Config) -> Self {
        Self {
            before_attribute: "(",
            after_attribute: ")",
            glue_attribute: ", ",
            before_text_line: "| ",
            self_close: match config.options.output.self_closing_style {
                SelfClosingStyle::Xml => "/",
                _ => "",
            },
            ..Default::default()
        }
    }

    /// Delimiters for a markup syntax name, if it is indentation-based.
    pub fn for_syntax(syntax: &str, config: &Config) -> Option<Self> {
        match syntax {
            "haml" => Some(Self::haml()),
            "slim" => Some(Self::slim()),
            "pug" => Some(Self::pug(config)),
            _ => None,
        }
    }
}

pub fn stringify(abbr: &Abbreviation, config: &Config, syntax: &IndentSyntax) -> String {
    let mut writer = IndentWriter {
        out: OutputStream::new(&config.options.output, 0),
        config,
        syntax,
        field_index: 1,
        depth: 0,
    };
    writer.children(&abbr.children);
    writer.out.value
}

struct IndentWriter<'a> {
    out: OutputStream<'a>,
    config: &'a Config,
    syntax: &'a IndentSyntax,
    field_index: usize,
    /// Number of enclosing elements.
    depth: usize,
}

impl<'a> IndentWriter<'a> {
    fn children(&mut self, items: &'a [AbbreviationNode]) {
        for (index, node) in items.iter().enumerate() {
            self.element(node, index);
        }
    }

    fn element(&mut self, node: &'a AbbreviationNode, index: usize) {
        let syntax = self.syntax;
        let (primary, secondary): (Vec<&Attribute>, Vec<&Attribute>) = node
            .attributes
            .iter()
            .partition(|attr| attr.is_named("class") || attr.is_named("id"));

        let level = if self.depth > 0 { 1 } else { 0 };
        self.out.level += level;

        let first_top_level = self.depth == 0 && index == 0;
        if !first_top_level && !node.is_snippet() {
            self.out.push_newline(true);
        }

        if let Some(name) = &node.name {
            if name != "div" || primary.is_empty() {
                self.out.push(&format!("{}{name}", syntax.before_name));
            }
        }
        self.primary_attributes(&primary);
        let secondary: Vec<&Attribute> = secondary
            .into_iter()
            .filter(|attr| !attr.implied || attr.value.is_some())
            .collect();
        self.secondary_attributes(&secondary);

        if node.self_closing && node.value.is_empty() && node.children.is_empty() {
            self.out.push(syntax.self_close);
        } else {
            self.value(node);
            self.depth += 1;
            self.children(&node.children);
            self.depth -= 1;
        }

        self.out.level -= level;
    }

    fn primary_attributes(&mut self, attrs: &[&Attribute]) {
        for attr in attrs {
            let Some(value) = &attr.value else {
                continue;
            };
            if attr.is_named("class") {
                self.out.push(".");
                let tokens: Vec<Value> = value
                    .iter()
                    .map(|token| match token {
                        Value::Text(text) => {
                            Value::Text(text.split_whitespace().collect::<Vec<_>>().join("."))
                        }
                        field => field.clone(),
                    })
                    .collect();
                self.tokens(&tokens);
            } else {
                self.out.push("#");
                self.tokens(value);
            }
        }
    }

    fn secondary_attributes(&mut self, attrs: &[&Attribute]) {
        if attrs.is_empty() {
            return;
        }
        let config = self.config;
        let syntax = self.syntax;

        self.out.push(syntax.before_attribute);
        for (i, attr) in attrs.iter().enumerate() {
            self.out.push(&attr_name(attr.name.as_deref().unwrap_or_default(), config));
            match &attr.value {
                None if is_boolean_attribute(attr, config) => {
                    if !config.options.output.compact_boolean && !syntax.boolean_value.is_empty() {
                        self.out.push(&format!("={}", syntax.boolean_value));
                    }
                }
                value => {
                    self.out.push(&format!("={}", attr_quote(attr, config, true)));
                    match value {
                        Some(value) => self.tokens(value),
                        None => self.tokens(&[caret()]),
                    }
                    self.out.push(attr_quote(attr, config, false));
                }
            }
            if i + 1 != attrs.len() {
                self.out.push(syntax.glue_attribute);
            }
        }
        self.out.push(syntax.after_attribute);
    }

    /// Node text, or a caret for leaf nodes. Multi-line text goes on its own
    /// lines, padded so line terminators align.
    fn value(&mut self, node: &AbbreviationNode) {
        if node.value.is_empty() && !node.children.is_empty() {
            return;
        }
        let caret_value = [caret()];
        let value: &[Value] = if node.value.is_empty() {
            &caret_value
        } else {
            &node.value
        };

        let lines = split_by_lines(value);
        if lines.len() == 1 {
            if node.name.is_some() || !node.attributes.is_empty() {
                self.out.push(" ");
            }
            self.tokens(value);
            return;
        }

        let syntax = self.syntax;
        let lengths: Vec<usize> = lines.iter().map(|line| value_length(line)).collect();
        let max_length = lengths.iter().copied().max().unwrap_or(0);

        self.out.level += 1;
        for (line, len) in lines.iter().zip(&lengths) {
            self.out.push_newline(true);
            self.out.push(syntax.before_text_line);
            self.tokens(line);
            if !syntax.after_text_line.is_empty() {
                self.out.push(&" ".repeat(max_length - len));
                self.out.push(syntax.after_text_line);
            }
        }
        self.out.level -= 1;
    }

    fn tokens(&mut self, tokens: &[Value]) {
        let mut largest: Option<usize> = None;
        for token in tokens {
            match token {
                Value::Text(text) => self.out.push(text),
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
}

fn caret() -> Value {
    Value::Field(Field {
        index: 0,
        name: String::new(),
    })
}

/// Split value tokens into lines; fields stay on the line they appear in.
fn split_by_lines(value: &[Value]) -> Vec<Vec<Value>> {
    let mut lines = vec![Vec::new()];
    for token in value {
        match token {
            Value::Text(text) => {
                for (i, part) in crate::output::split_lines(text).into_iter().enumerate() {
                    if i > 0 {
                        lines.push(Vec::new());
                    }
                    if !part.is_empty() {
                        if let Some(line) = lines.last_mut() {
                            line.push(Value::from(part));
                        }
                    }
                }
            }
            field => {
                if let Some(line) = lines.last_mut() {
                    line.push(field.clone());
                }
            }
        }
    }
    lines
}

fn value_length(line: &[Value]) -> usize {
    line.iter()
        .map(|token| match token {
            Value::Text(text) => text.chars().count(),
            Value::Field(field) => field.name.chars().count(),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_config, UserConfig};
    use crate::resolve::resolve_snippets;
    use crate::transform::transform;
    use expando_parser::{parse_abbreviation, ParseOptions};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render(source: &str, syntax: &str) -> String {
        render_with(source, syntax, ParseOptions::default())
    }

    fn render_with(source: &str, syntax: &str, options: ParseOptions) -> String {
        let config = resolve_config(&UserConfig {
            syntax: Some(syntax.into()),
            ..Default::default()
        });
        let mut abbr = parse_abbreviation(source, &options).unwrap();
        resolve_snippets(&mut abbr, &config);
        transform(&mut abbr, &config);
        let delimiters = IndentSyntax::for_syntax(syntax, &config).unwrap();
        stringify(&abbr, &config, &delimiters)
    }

    #[test]
    fn test_haml_nesting() {
        assert_eq!(render("ul>li*2", "haml"), "%ul\n\t%li ${1}\n\t%li ${2}");
    }

    #[test]
    fn test_haml_selector_attributes() {
        assert_eq!(render("div#a.b.c", "haml"), "#a.b.c ${1}");
        assert_eq!(render("p.x[title=t]", "haml"), "%p.x(title=\"t\") ${1}");
    }

    #[test]
    fn test_haml_boolean_and_self_closing() {
        assert_eq!(render("b[disabled]", "haml"), "%b(disabled=true) ${1}");
        assert_eq!(render("br", "haml"), "%br/");
    }

    #[test]
    fn test_slim_attributes() {
        assert_eq!(
            render("a[href=x title=y]{go}", "slim"),
            "a href=\"x\" title=\"y\" go"
        );
        assert_eq!(render("b[disabled]", "slim"), "b disabled ${1}");
    }

    #[test]
    fn test_pug_attributes_and_text() {
        assert_eq!(render("a[href=x title=y]{go}", "pug"), "a(href=\"x\", title=\"y\") go");
        assert_eq!(render("img", "pug"), "img(src=\"${1}\", alt=\"${2}\")");
    }

    #[test]
    fn test_inline_value() {
        assert_eq!(render("p{hi}", "pug"), "p hi");
        assert_eq!(render("ul>li{x}", "slim"), "ul\n\tli x");
    }

    #[rstest]
    #[case("haml", "%p\n\ta  |\n\tbb |")]
    #[case("slim", "p\n\t| a\n\t| bb")]
    #[case("pug", "p\n\t| a\n\t| bb")]
    fn test_multiline_text(#[case] syntax: &str, #[case] expected: &str) {
        let options = ParseOptions {
            text: Some("a\nbb".into()),
            ..Default::default()
        };
        assert_eq!(render_with("p", syntax, options), expected);
    }

    #[test]
    fn test_multiline_text_nested() {
        let options = ParseOptions {
            text: Some("one\ntwo".into()),
            ..Default::default()
        };
        assert_eq!(
            render_with("div>p", "slim", options),
            "div\n\tp\n\t\t| one\n\t\t| two"
        );
    }

    #[test]
    fn test_split_by_lines_keeps_fields() {
        let value = vec![
            Value::from("a\nb "),
            Value::Field(Field {
                index: 1,
                name: "x".into(),
            }),
        ];
        let lines = split_by_lines(&value);
        assert_eq!(lines.len(), 2);
        assert_eq!(value_length(&lines[1]), 3);
    }
}

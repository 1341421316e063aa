//! Output stream shared by the markup stringifiers.
//!
//! Tracks accumulated text with its offset, line and column, and the
//! current indentation level. Fields are emitted through the configured
//! `output.field` hook.

use expando_parser::{AbbreviationNode, Attribute, ValueType};

use crate::config::{AttributeQuotes, Config, OutputOptions};

pub struct OutputStream<'a> {
    pub value: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    /// May go negative for nodes that skip formatting.
    pub level: i32,
    options: &'a OutputOptions,
}

impl<'a> OutputStream<'a> {
    pub fn new(options: &'a OutputOptions, level: i32) -> Self {
        Self {
            value: String::new(),
            offset: 0,
            line: 0,
            column: 0,
            level,
            options,
        }
    }

    /// Push text through the `output.text` hook.
    pub fn push(&mut self, text: &str) {
        match &self.options.text {
            Some(hook) => {
                let processed = hook(text);
                self.push_raw(&processed);
            }
            None => self.push_raw(text),
        }
    }

    fn push_raw(&mut self, text: &str) {
        let len = text.chars().count();
        self.value.push_str(text);
        self.offset += len;
        self.column += len;
    }

    /// Push multi-line text, re-indenting every line after the first.
    pub fn push_string(&mut self, text: &str) {
        for (i, line) in split_lines(text).into_iter().enumerate() {
            if i > 0 {
                self.push_newline(true);
            }
            self.push(line);
        }
    }

    /// Line break followed by `output.baseIndent`, then the current level
    /// of indentation when `indent` is set.
    pub fn push_newline(&mut self, indent: bool) {
        let options = self.options;
        self.push_raw(&options.newline);
        self.push_raw(&options.base_indent);
        self.line += 1;
        self.column = options.base_indent.chars().count();
        if indent {
            self.push_indent(self.level);
        }
    }

    pub fn push_indent(&mut self, size: i32) {
        let indent = self.options.indent.repeat(size.max(0) as usize);
        self.push_raw(&indent);
    }

    pub fn push_field(&mut self, index: usize, placeholder: &str) {
        let field = match &self.options.field {
            Some(hook) => hook(index, placeholder),
            None => default_field(index, placeholder),
        };
        self.push_raw(&field);
    }
}

/// TextMate-style tabstop.
pub fn default_field(index: usize, placeholder: &str) -> String {
    if placeholder.is_empty() {
        format!("${{{index}}}")
    } else {
        format!("${{{index}:{placeholder}}}")
    }
}

pub fn split_lines(text: &str) -> Vec<&str> {
    text.split("\r\n")
        .flat_map(|part| part.split(['\r', '\n']))
        .collect()
}

pub fn tag_name(name: &str, config: &Config) -> String {
    config.options.output.tag_case.apply(name)
}

pub fn attr_name(name: &str, config: &Config) -> String {
    config.options.output.attribute_case.apply(name)
}

/// Opening or closing quote for an attribute value.
pub fn attr_quote(attr: &Attribute, config: &Config, is_open: bool) -> &'static str {
    if attr.value_type == ValueType::Expression {
        return if is_open { "{" } else { "}" };
    }
    match config.options.output.attribute_quotes {
        AttributeQuotes::Single => "'",
        AttributeQuotes::Double => "\"",
    }
}

pub fn is_boolean_attribute(attr: &Attribute, config: &Config) -> bool {
    attr.boolean
        || attr.name.as_deref().is_some_and(|name| {
            let name = name.to_lowercase();
            config
                .options
                .output
                .boolean_attributes
                .iter()
                .any(|known| *known == name)
        })
}

/// Inline-level node: a known inline element, or bare text.
pub fn is_inline(node: &AbbreviationNode, config: &Config) -> bool {
    match &node.name {
        Some(name) => is_inline_element(name, config),
        None => !node.value.is_empty() && node.attributes.is_empty(),
    }
}

pub fn is_inline_element(name: &str, config: &Config) -> bool {
    let name = name.to_lowercase();
    config.options.inline_elements.iter().any(|el| *el == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_push_tracks_position() {
        let options = OutputOptions::default();
        let mut out = OutputStream::new(&options, 1);
        out.push("<p>");
        assert_eq!(out.column, 3);
        out.push_newline(true);
        out.push("x");
        assert_eq!(out.value, "<p>\n\tx");
        assert_eq!(out.line, 1);
        assert_eq!(out.column, 2);
        assert_eq!(out.offset, 6);
    }

    #[test]
    fn test_push_string_reindents() {
        let options = OutputOptions {
            indent: "  ".into(),
            ..Default::default()
        };
        let mut out = OutputStream::new(&options, 2);
        out.push_string("a\nb\r\nc");
        assert_eq!(out.value, "a\n    b\n    c");
    }

    #[test]
    fn test_negative_level_does_not_indent() {
        let options = OutputOptions::default();
        let mut out = OutputStream::new(&options, -1);
        out.push_newline(true);
        assert_eq!(out.value, "\n");
    }

    #[test]
    fn test_field_hook() {
        let options = OutputOptions {
            field: Some(Arc::new(|index: usize, placeholder: &str| format!("[{index}:{placeholder}]"))),
            ..Default::default()
        };
        let mut out = OutputStream::new(&options, 0);
        out.push_field(2, "x");
        assert_eq!(out.value, "[2:x]");

        let defaults = OutputOptions::default();
        let mut out = OutputStream::new(&defaults, 0);
        out.push_field(1, "");
        out.push_field(2, "name");
        assert_eq!(out.value, "${1}${2:name}");
    }

    #[test]
    fn test_text_hook() {
        let options = OutputOptions {
            text: Some(Arc::new(|text: &str| text.replace('<', "&lt;"))),
            ..Default::default()
        };
        let mut out = OutputStream::new(&options, 0);
        out.push("<b>");
        assert_eq!(out.value, "&lt;b>");
    }
}

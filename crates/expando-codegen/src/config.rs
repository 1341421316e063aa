//! Expansion configuration.
//!
//! A [`UserConfig`] is what callers write (JSON, JS objects or plain Rust):
//! every field optional, options addressed by dotted keys such as
//! `output.selfClosingStyle`. [`resolve_config`] merges it over the
//! per-type and per-syntax defaults into a fully populated [`Config`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use expando_parser::Text;
use serde::Deserialize;

use crate::snippets;

/// Output field hook: `(index, placeholder) -> text`.
pub type FieldHook = Arc<dyn Fn(usize, &str) -> String + Send + Sync>;
/// Output text hook applied to every pushed text chunk.
pub type TextHook = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxType {
    #[default]
    Markup,
    Stylesheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfClosingStyle {
    /// `<br>`
    #[default]
    Html,
    /// `<br />`
    Xhtml,
    /// `<br/>`
    Xml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeQuotes {
    Single,
    #[default]
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    #[default]
    #[serde(rename = "")]
    Preserve,
    Lower,
    Upper,
}

impl Case {
    pub fn apply(self, text: &str) -> String {
        match self {
            Case::Preserve => text.to_string(),
            Case::Lower => text.to_lowercase(),
            Case::Upper => text.to_uppercase(),
        }
    }
}

/// Where the abbreviation is expanded, e.g. the CSS property whose value is
/// being typed or the parent element of markup.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Context {
    pub name: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

// =============================================================================
// Options
// =============================================================================

#[derive(Clone)]
pub struct OutputOptions {
    pub indent: String,
    pub base_indent: String,
    pub newline: String,
    pub tag_case: Case,
    pub attribute_case: Case,
    pub attribute_quotes: AttributeQuotes,
    pub format: bool,
    pub format_leaf_node: bool,
    pub format_skip: Vec<String>,
    pub format_force: Vec<String>,
    pub inline_break: usize,
    pub compact_boolean: bool,
    pub boolean_attributes: Vec<String>,
    pub reverse_attributes: bool,
    pub self_closing_style: SelfClosingStyle,
    pub field: Option<FieldHook>,
    pub text: Option<TextHook>,
}

impl fmt::Debug for OutputOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hook = |set: bool| if set { "<fn>" } else { "None" };
        f.debug_struct("OutputOptions")
            .field("indent", &self.indent)
            .field("base_indent", &self.base_indent)
            .field("newline", &self.newline)
            .field("tag_case", &self.tag_case)
            .field("attribute_case", &self.attribute_case)
            .field("attribute_quotes", &self.attribute_quotes)
            .field("format", &self.format)
            .field("format_leaf_node", &self.format_leaf_node)
            .field("format_skip", &self.format_skip)
            .field("format_force", &self.format_force)
            .field("inline_break", &self.inline_break)
            .field("compact_boolean", &self.compact_boolean)
            .field("boolean_attributes", &self.boolean_attributes)
            .field("reverse_attributes", &self.reverse_attributes)
            .field("self_closing_style", &self.self_closing_style)
            .field("field", &hook(self.field.is_some()))
            .field("text", &hook(self.text.is_some()))
            .finish()
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            indent: "\t".into(),
            base_indent: String::new(),
            newline: "\n".into(),
            tag_case: Case::Preserve,
            attribute_case: Case::Preserve,
            attribute_quotes: AttributeQuotes::Double,
            format: true,
            format_leaf_node: false,
            format_skip: strings(&["html"]),
            format_force: strings(&["body"]),
            inline_break: 3,
            compact_boolean: false,
            boolean_attributes: strings(&[
                "contenteditable", "seamless", "async", "autofocus", "autoplay", "checked",
                "controls", "defer", "disabled", "formnovalidate", "hidden", "ismap", "loop",
                "multiple", "muted", "novalidate", "readonly", "required", "reversed",
                "selected", "typemustmatch",
            ]),
            reverse_attributes: false,
            self_closing_style: SelfClosingStyle::Html,
            field: None,
            text: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkupOptions {
    /// Fill `href` of links wrapped around URLs or e-mails.
    pub href: bool,
    /// Attribute renames; `name*` keys apply to `..name` shorthands.
    pub attributes: HashMap<String, String>,
    /// Expression prefixes for attribute values, keyed like `attributes`.
    pub value_prefix: HashMap<String, String>,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            href: true,
            attributes: HashMap::new(),
            value_prefix: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentOptions {
    pub enabled: bool,
    /// Attributes that must be present for a comment to be emitted.
    pub trigger: Vec<String>,
    pub before: String,
    pub after: String,
}

impl Default for CommentOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger: strings(&["id", "class"]),
            before: String::new(),
            after: "\n<!-- /[#ID][.CLASS] -->".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BemOptions {
    pub enabled: bool,
    pub element: String,
    pub modifier: String,
}

impl Default for BemOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            element: "__".into(),
            modifier: "_".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StylesheetOptions {
    /// Global value keywords available to every property.
    pub keywords: Vec<String>,
    pub keyword_aliases: HashMap<String, String>,
    pub unitless: Vec<String>,
    pub unit_aliases: HashMap<String, String>,
    pub int_unit: String,
    pub float_unit: String,
    pub short_hex: bool,
    pub between: String,
    pub after: String,
    pub json: bool,
    pub json_double_quotes: bool,
    pub fuzzy_search_min_score: f64,
    pub strict_match: bool,
}

impl Default for StylesheetOptions {
    fn default() -> Self {
        Self {
            keywords: strings(&["auto", "inherit", "unset", "none"]),
            keyword_aliases: pairs(&[
                ("a", "auto"),
                ("i", "inherit"),
                ("s", "solid"),
                ("da", "dashed"),
                ("do", "dotted"),
                ("t", "transparent"),
            ]),
            unitless: strings(&[
                "z-index", "line-height", "opacity", "font-weight", "zoom", "flex",
                "flex-grow", "flex-shrink",
            ]),
            unit_aliases: pairs(&[("e", "em"), ("p", "%"), ("x", "ex"), ("r", "rem")]),
            int_unit: "px".into(),
            float_unit: "em".into(),
            short_hex: true,
            between: ": ".into(),
            after: ";".into(),
            json: false,
            json_double_quotes: false,
            fuzzy_search_min_score: 0.0,
            strict_match: false,
        }
    }
}

/// Fully resolved options.
#[derive(Debug, Clone)]
pub struct Options {
    pub inline_elements: Vec<String>,
    pub output: OutputOptions,
    pub markup: MarkupOptions,
    pub comment: CommentOptions,
    pub bem: BemOptions,
    pub jsx: bool,
    pub stylesheet: StylesheetOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            inline_elements: strings(&[
                "a", "abbr", "acronym", "applet", "b", "basefont", "bdo", "big", "br", "button",
                "cite", "code", "del", "dfn", "em", "font", "i", "iframe", "img", "input", "ins",
                "kbd", "label", "map", "object", "q", "s", "samp", "select", "small", "span",
                "strike", "strong", "sub", "sup", "textarea", "tt", "u", "var",
            ]),
            output: OutputOptions::default(),
            markup: MarkupOptions::default(),
            comment: CommentOptions::default(),
            bem: BemOptions::default(),
            jsx: false,
            stylesheet: StylesheetOptions::default(),
        }
    }
}

// =============================================================================
// User-facing configuration
// =============================================================================

/// Caller text: a single string or one entry per line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Single(String),
    Lines(Vec<String>),
}

impl From<TextInput> for Text {
    fn from(input: TextInput) -> Self {
        match input {
            TextInput::Single(text) => Text::Single(text),
            TextInput::Lines(lines) => Text::Lines(lines),
        }
    }
}

/// Caller overrides. Unset fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    #[serde(rename = "type")]
    pub kind: Option<SyntaxType>,
    pub syntax: Option<String>,
    pub variables: HashMap<String, String>,
    pub snippets: HashMap<String, String>,
    pub options: UserOptions,
    pub text: Option<TextInput>,
    pub max_repeat: Option<usize>,
    pub context: Option<Context>,
}

/// Option overrides addressed by dotted keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserOptions {
    #[serde(rename = "inlineElements")]
    pub inline_elements: Option<Vec<String>>,
    #[serde(rename = "output.indent")]
    pub output_indent: Option<String>,
    #[serde(rename = "output.baseIndent")]
    pub output_base_indent: Option<String>,
    #[serde(rename = "output.newline")]
    pub output_newline: Option<String>,
    #[serde(rename = "output.tagCase")]
    pub output_tag_case: Option<Case>,
    #[serde(rename = "output.attributeCase")]
    pub output_attribute_case: Option<Case>,
    #[serde(rename = "output.attributeQuotes")]
    pub output_attribute_quotes: Option<AttributeQuotes>,
    #[serde(rename = "output.format")]
    pub output_format: Option<bool>,
    #[serde(rename = "output.formatLeafNode")]
    pub output_format_leaf_node: Option<bool>,
    #[serde(rename = "output.formatSkip")]
    pub output_format_skip: Option<Vec<String>>,
    #[serde(rename = "output.formatForce")]
    pub output_format_force: Option<Vec<String>>,
    #[serde(rename = "output.inlineBreak")]
    pub output_inline_break: Option<usize>,
    #[serde(rename = "output.compactBoolean")]
    pub output_compact_boolean: Option<bool>,
    #[serde(rename = "output.booleanAttributes")]
    pub output_boolean_attributes: Option<Vec<String>>,
    #[serde(rename = "output.reverseAttributes")]
    pub output_reverse_attributes: Option<bool>,
    #[serde(rename = "output.selfClosingStyle")]
    pub output_self_closing_style: Option<SelfClosingStyle>,
    #[serde(rename = "markup.href")]
    pub markup_href: Option<bool>,
    #[serde(rename = "markup.attributes")]
    pub markup_attributes: Option<HashMap<String, String>>,
    #[serde(rename = "markup.valuePrefix")]
    pub markup_value_prefix: Option<HashMap<String, String>>,
    #[serde(rename = "comment.enabled")]
    pub comment_enabled: Option<bool>,
    #[serde(rename = "comment.trigger")]
    pub comment_trigger: Option<Vec<String>>,
    #[serde(rename = "comment.before")]
    pub comment_before: Option<String>,
    #[serde(rename = "comment.after")]
    pub comment_after: Option<String>,
    #[serde(rename = "bem.enabled")]
    pub bem_enabled: Option<bool>,
    #[serde(rename = "bem.element")]
    pub bem_element: Option<String>,
    #[serde(rename = "bem.modifier")]
    pub bem_modifier: Option<String>,
    #[serde(rename = "jsx.enabled")]
    pub jsx_enabled: Option<bool>,
    #[serde(rename = "stylesheet.keywords")]
    pub stylesheet_keywords: Option<Vec<String>>,
    #[serde(rename = "stylesheet.keywordAliases")]
    pub stylesheet_keyword_aliases: Option<HashMap<String, String>>,
    #[serde(rename = "stylesheet.unitless")]
    pub stylesheet_unitless: Option<Vec<String>>,
    #[serde(rename = "stylesheet.unitAliases")]
    pub stylesheet_unit_aliases: Option<HashMap<String, String>>,
    #[serde(rename = "stylesheet.intUnit")]
    pub stylesheet_int_unit: Option<String>,
    #[serde(rename = "stylesheet.floatUnit")]
    pub stylesheet_float_unit: Option<String>,
    #[serde(rename = "stylesheet.shortHex")]
    pub stylesheet_short_hex: Option<bool>,
    #[serde(rename = "stylesheet.between")]
    pub stylesheet_between: Option<String>,
    #[serde(rename = "stylesheet.after")]
    pub stylesheet_after: Option<String>,
    #[serde(rename = "stylesheet.json")]
    pub stylesheet_json: Option<bool>,
    #[serde(rename = "stylesheet.jsonDoubleQuotes")]
    pub stylesheet_json_double_quotes: Option<bool>,
    #[serde(rename = "stylesheet.fuzzySearchMinScore")]
    pub stylesheet_fuzzy_search_min_score: Option<f64>,
    #[serde(rename = "stylesheet.strictMatch")]
    pub stylesheet_strict_match: Option<bool>,
}

macro_rules! apply {
    ($($src:expr => $dst:expr),* $(,)?) => {
        $(if let Some(value) = $src.clone() {
            $dst = value;
        })*
    };
}

impl UserOptions {
    /// Copy every set override into `options`.
    pub fn apply_to(&self, options: &mut Options) {
        let out = &mut options.output;
        let css = &mut options.stylesheet;
        apply! {
            self.inline_elements => options.inline_elements,
            self.output_indent => out.indent,
            self.output_base_indent => out.base_indent,
            self.output_newline => out.newline,
            self.output_tag_case => out.tag_case,
            self.output_attribute_case => out.attribute_case,
            self.output_attribute_quotes => out.attribute_quotes,
            self.output_format => out.format,
            self.output_format_leaf_node => out.format_leaf_node,
            self.output_format_skip => out.format_skip,
            self.output_format_force => out.format_force,
            self.output_inline_break => out.inline_break,
            self.output_compact_boolean => out.compact_boolean,
            self.output_boolean_attributes => out.boolean_attributes,
            self.output_reverse_attributes => out.reverse_attributes,
            self.output_self_closing_style => out.self_closing_style,
            self.markup_href => options.markup.href,
            self.markup_attributes => options.markup.attributes,
            self.markup_value_prefix => options.markup.value_prefix,
            self.comment_enabled => options.comment.enabled,
            self.comment_trigger => options.comment.trigger,
            self.comment_before => options.comment.before,
            self.comment_after => options.comment.after,
            self.bem_enabled => options.bem.enabled,
            self.bem_element => options.bem.element,
            self.bem_modifier => options.bem.modifier,
            self.jsx_enabled => options.jsx,
            self.stylesheet_keywords => css.keywords,
            self.stylesheet_keyword_aliases => css.keyword_aliases,
            self.stylesheet_unitless => css.unitless,
            self.stylesheet_unit_aliases => css.unit_aliases,
            self.stylesheet_int_unit => css.int_unit,
            self.stylesheet_float_unit => css.float_unit,
            self.stylesheet_short_hex => css.short_hex,
            self.stylesheet_between => css.between,
            self.stylesheet_after => css.after,
            self.stylesheet_json => css.json,
            self.stylesheet_json_double_quotes => css.json_double_quotes,
            self.stylesheet_fuzzy_search_min_score => css.fuzzy_search_min_score,
            self.stylesheet_strict_match => css.strict_match,
        }
    }
}

// =============================================================================
// Resolved configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub kind: SyntaxType,
    pub syntax: String,
    pub variables: HashMap<String, String>,
    pub snippets: HashMap<String, String>,
    pub options: Options,
    pub text: Option<Text>,
    pub max_repeat: Option<usize>,
    pub context: Option<Context>,
}

impl Default for Config {
    fn default() -> Self {
        resolve_config(&UserConfig::default())
    }
}

impl Config {
    pub fn is_markup(&self) -> bool {
        self.kind == SyntaxType::Markup
    }
}

const MARKUP_SYNTAXES: &[&str] = &["html", "xhtml", "xml", "xsl", "jsx", "haml", "slim", "pug"];
const STYLESHEET_SYNTAXES: &[&str] = &["css", "scss", "less", "sass", "sss", "stylus"];

/// Merge caller overrides over type and syntax defaults.
pub fn resolve_config(user: &UserConfig) -> Config {
    let kind = user.kind.unwrap_or_else(|| match user.syntax.as_deref() {
        Some(syntax) if STYLESHEET_SYNTAXES.contains(&syntax) => SyntaxType::Stylesheet,
        _ => SyntaxType::Markup,
    });

    let known = match kind {
        SyntaxType::Markup => MARKUP_SYNTAXES,
        SyntaxType::Stylesheet => STYLESHEET_SYNTAXES,
    };
    let syntax = match user.syntax.as_deref() {
        Some(syntax) if known.contains(&syntax) => syntax.to_string(),
        _ => known[0].to_string(),
    };

    let mut options = Options::default();
    apply_syntax_defaults(&syntax, &mut options);
    user.options.apply_to(&mut options);

    let mut variables = pairs(&[("charset", "UTF-8"), ("lang", "en"), ("locale", "en-US")]);
    variables.extend(user.variables.clone());

    let mut snippets = snippets::builtin(kind, &syntax);
    snippets.extend(user.snippets.clone());

    Config {
        kind,
        syntax,
        variables,
        snippets,
        options,
        text: user.text.clone().map(Text::from),
        max_repeat: user.max_repeat,
        context: user.context.clone(),
    }
}

fn apply_syntax_defaults(syntax: &str, options: &mut Options) {
    match syntax {
        "xhtml" => options.output.self_closing_style = SelfClosingStyle::Xhtml,
        "xml" | "xsl" => options.output.self_closing_style = SelfClosingStyle::Xml,
        "jsx" => {
            options.jsx = true;
            options.output.self_closing_style = SelfClosingStyle::Xhtml;
            options.markup.attributes = pairs(&[
                ("class", "className"),
                ("class*", "styleName"),
                ("for", "htmlFor"),
            ]);
            options.markup.value_prefix = pairs(&[("class*", "styles")]);
        }
        "sass" | "sss" => {
            options.stylesheet.between = ": ".into();
            options.stylesheet.after = String::new();
        }
        "stylus" => {
            options.stylesheet.between = " ".into();
            options.stylesheet.after = String::new();
        }
        _ => {}
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> HashMap<String, String> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.kind, SyntaxType::Markup);
        assert_eq!(config.syntax, "html");
        assert_eq!(config.options.output.indent, "\t");
        assert_eq!(config.variables["charset"], "UTF-8");
        assert!(config.snippets.contains_key("a"));
    }

    #[test]
    fn test_stylesheet_syntax_implies_type() {
        let config = resolve_config(&UserConfig {
            syntax: Some("stylus".into()),
            ..Default::default()
        });
        assert_eq!(config.kind, SyntaxType::Stylesheet);
        assert_eq!(config.options.stylesheet.between, " ");
        assert_eq!(config.options.stylesheet.after, "");
    }

    #[test]
    fn test_unknown_syntax_falls_back() {
        let config = resolve_config(&UserConfig {
            kind: Some(SyntaxType::Stylesheet),
            syntax: Some("nope".into()),
            ..Default::default()
        });
        assert_eq!(config.syntax, "css");
    }

    #[test]
    fn test_jsx_defaults() {
        let config = resolve_config(&UserConfig {
            syntax: Some("jsx".into()),
            ..Default::default()
        });
        assert!(config.options.jsx);
        assert_eq!(config.options.markup.attributes["class"], "className");
    }

    #[test]
    fn test_deserialize_dotted_options() {
        let user: UserConfig = serde_json::from_str(
            r#"{
                "syntax": "xhtml",
                "text": ["a", "b"],
                "variables": { "lang": "fr" },
                "options": {
                    "output.indent": "  ",
                    "output.selfClosingStyle": "xml",
                    "output.tagCase": "upper",
                    "bem.enabled": true
                }
            }"#,
        )
        .unwrap();
        let config = resolve_config(&user);
        assert_eq!(config.options.output.indent, "  ");
        assert_eq!(config.options.output.self_closing_style, SelfClosingStyle::Xml);
        assert_eq!(config.options.output.tag_case, Case::Upper);
        assert!(config.options.bem.enabled);
        assert_eq!(config.variables["lang"], "fr");
        assert_eq!(config.variables["locale"], "en-US");
        assert_eq!(config.text, Some(Text::Lines(vec!["a".into(), "b".into()])));
    }

    #[test]
    fn test_user_snippets_override_builtin() {
        let mut snippets = HashMap::new();
        snippets.insert("a".to_string(), "a[href=#]".to_string());
        let config = resolve_config(&UserConfig {
            snippets,
            ..Default::default()
        });
        assert_eq!(config.snippets["a"], "a[href=#]");
    }
}

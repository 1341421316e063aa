//! Stylesheet output.
//!
//! Writes resolved declarations as `name: value;` lines, or as CSS-in-JS
//! object entries (`borderTop: '1px',`) with `stylesheet.json`.

use expando_lexer::stylesheet::Color;
use expando_parser::{CssValue, CssValueToken};

use crate::config::Config;
use crate::output::OutputStream;
use crate::stylesheet::ResolvedProperty;

pub fn stringify(properties: &[ResolvedProperty], config: &Config) -> String {
    let mut writer = CssWriter::new(config);
    let format = config.options.output.format;
    let section = config
        .context
        .as_ref()
        .is_some_and(|ctx| ctx.name == "@@section");

    let properties = properties.iter().filter(|p| !section || p.matched);
    for (i, resolved) in properties.enumerate() {
        if format && i != 0 {
            writer.out.push_newline(true);
        }
        writer.property(resolved);
        writer.next_declaration();
    }
    writer.out.value
}

/// Text of a single token, fields included.
pub fn token_text(token: &CssValueToken, config: &Config) -> String {
    let mut writer = CssWriter::new(config);
    writer.token(token);
    writer.out.value
}

struct CssWriter<'a> {
    out: OutputStream<'a>,
    config: &'a Config,
    /// Offset added to field indexes of the current declaration.
    field_index: usize,
    /// Largest field index written in the current declaration.
    largest: Option<usize>,
}

impl<'a> CssWriter<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            out: OutputStream::new(&config.options.output, 0),
            config,
            field_index: 0,
            largest: None,
        }
    }

    /// Move past the fields of the declaration just written.
    fn next_declaration(&mut self) {
        if let Some(largest) = self.largest.take() {
            self.field_index += largest + 1;
        }
    }

    fn field(&mut self, index: usize, name: &str) {
        self.out.push_field(self.field_index + index, name);
        self.largest = self.largest.max(Some(index));
    }

    fn property(&mut self, resolved: &ResolvedProperty) {
        let config = self.config;
        let options = &config.options.stylesheet;
        let node = &resolved.property;

        let Some(name) = &node.name else {
            if resolved.raw {
                for token in node.value.iter().flat_map(|v| &v.value) {
                    self.token(token);
                }
            } else {
                self.values(&node.value);
            }
            self.important(node.important, !node.value.is_empty());
            return;
        };

        let name = if options.json {
            camel_case(name)
        } else {
            name.clone()
        };
        self.out.push(&format!("{name}{}", options.between));

        if node.value.is_empty() {
            self.field(0, "");
        } else if options.json {
            self.json_value(&node.value);
        } else {
            self.values(&node.value);
        }

        if options.json {
            self.out.push(",");
        } else {
            self.important(node.important, true);
            self.out.push(&options.after);
        }
    }

    fn json_value(&mut self, value: &[CssValue]) {
        let config = self.config;
        let options = &config.options.stylesheet;
        if let [single] = value {
            if let [CssValueToken::Number { value, unit, .. }] = single.value.as_slice() {
                if unit.is_empty() || unit == "px" {
                    self.out.push(&number(*value));
                    return;
                }
            }
        }

        let quote = if options.json_double_quotes { "\"" } else { "'" };
        self.out.push(quote);
        self.values(value);
        self.out.push(quote);
    }

    fn important(&mut self, important: bool, separator: bool) {
        if important {
            if separator {
                self.out.push(" ");
            }
            self.out.push("!important");
        }
    }

    /// Comma-separated value fragments.
    fn values(&mut self, value: &[CssValue]) {
        for (i, fragment) in value.iter().enumerate() {
            if i != 0 {
                self.out.push(", ");
            }
            self.value(fragment);
        }
    }

    fn value(&mut self, value: &CssValue) {
        for (i, token) in value.value.iter().enumerate() {
            let glued = matches!(token, CssValueToken::Field { glued: true, .. });
            if i != 0 && !glued {
                self.out.push(" ");
            }
            self.token(token);
        }
    }

    fn token(&mut self, token: &CssValueToken) {
        match token {
            CssValueToken::Color(value) => {
                self.out.push(&color(value, self.config.options.stylesheet.short_hex));
            }
            CssValueToken::Literal(value) | CssValueToken::CustomProperty(value) => {
                self.out.push_string(value);
            }
            CssValueToken::Number { value, unit, .. } => {
                self.out.push(&format!("{}{unit}", number(*value)));
            }
            CssValueToken::String { value, single } => {
                let quote = if *single { '\'' } else { '"' };
                self.out.push(&format!("{quote}{value}{quote}"));
            }
            CssValueToken::Field { index, name, .. } => self.field(index.unwrap_or(0), name),
            CssValueToken::Function(call) => {
                self.out.push(&format!("{}(", call.name));
                for (i, argument) in call.arguments.iter().enumerate() {
                    if i != 0 {
                        self.out.push(", ");
                    }
                    self.value(argument);
                }
                self.out.push(")");
            }
        }
    }
}

/// Number rounded to 4 decimals, without trailing zeros.
pub fn number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let text = format!("{rounded:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" => "0".to_string(),
        text => text.to_string(),
    }
}

pub fn color(color: &Color, short_hex: bool) -> String {
    if color.r == 0 && color.g == 0 && color.b == 0 && color.a == 0.0 {
        return "transparent".into();
    }
    if color.a == 1.0 {
        let short = short_hex && [color.r, color.g, color.b].iter().all(|c| c % 17 == 0);
        return if short {
            format!("#{:x}{:x}{:x}", color.r >> 4, color.g >> 4, color.b >> 4)
        } else {
            format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
        };
    }
    format!("rgba({}, {}, {}, {})", color.r, color.g, color.b, number(color.a))
}

fn camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '-' {
            upper = true;
        } else if upper {
            result.extend(ch.to_uppercase());
            upper = false;
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_config, SyntaxType, UserConfig};
    use crate::stylesheet::{resolve, value_scope, SnippetDatabase};
    use expando_parser::parse_stylesheet;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn config_with(update: impl FnOnce(&mut UserConfig)) -> Config {
        let mut user = UserConfig {
            kind: Some(SyntaxType::Stylesheet),
            ..Default::default()
        };
        update(&mut user);
        resolve_config(&user)
    }

    fn render(abbr: &str, config: &Config) -> String {
        let db = SnippetDatabase::from_config(config);
        let props = parse_stylesheet(abbr, value_scope(config).is_some()).unwrap();
        stringify(&resolve(props, &db, config), config)
    }

    #[rstest]
    #[case("bd1-s#f00", "border: 1px solid #f00;")]
    #[case("dib", "display: inline-block;")]
    #[case("m10-20", "margin: 10px 20px;")]
    #[case("p", "padding: ${0};")]
    #[case("pos", "position: ${1:relative};")]
    #[case("lh1.5", "line-height: 1.5;")]
    #[case("w100p", "width: 100%;")]
    #[case("c#fc0", "color: #fc0;")]
    #[case("bg#t", "background: transparent;")]
    #[case("c#abc.5", "color: rgba(170, 187, 204, 0.5);")]
    #[case("m-a", "margin: auto;")]
    #[case("p10!", "padding: 10px !important;")]
    fn test_properties(#[case] abbr: &str, #[case] expected: &str) {
        let config = config_with(|_| {});
        assert_eq!(render(abbr, &config), expected);
    }

    #[test]
    fn test_siblings_on_separate_lines() {
        let config = config_with(|_| {});
        assert_eq!(render("p10+m5", &config), "padding: 10px;\nmargin: 5px;");
    }

    #[test]
    fn test_raw_snippet() {
        let config = config_with(|_| {});
        assert_eq!(render("@m", &config), "@media ${1:screen} {\n\t${0}\n}");
    }

    #[test]
    fn test_gradient() {
        let config = config_with(|_| {});
        assert_eq!(
            render("lg(to right, #0, #f00.5)", &config),
            "background-image: linear-gradient(to right, #000, rgba(255, 0, 0, 0.5));"
        );
    }

    #[test]
    fn test_fields_unique_across_declarations() {
        let config = config_with(|_| {});
        assert_eq!(render("p+m", &config), "padding: ${0};\nmargin: ${1};");
        assert_eq!(
            render("@m+@m", &config),
            "@media ${1:screen} {\n\t${0}\n}\n@media ${3:screen} {\n\t${2}\n}"
        );
        assert_eq!(
            render("pos+p", &config),
            "position: ${1:relative};\npadding: ${2};"
        );
    }

    #[test]
    fn test_long_hex() {
        let config = config_with(|u| u.options.stylesheet_short_hex = Some(false));
        assert_eq!(render("c#fff", &config), "color: #ffffff;");
    }

    #[test]
    fn test_json_output() {
        let config = config_with(|u| u.options.stylesheet_json = Some(true));
        assert_eq!(render("bdt1", &config), "borderTop: 1,");
        assert_eq!(render("m1e", &config), "margin: '1em',");

        let config = config_with(|u| {
            u.options.stylesheet_json = Some(true);
            u.options.stylesheet_json_double_quotes = Some(true);
        });
        assert_eq!(render("d-n", &config), "display: \"none\",");
    }

    #[test]
    fn test_stylus_format() {
        let config = config_with(|u| u.syntax = Some("stylus".into()));
        assert_eq!(render("m10", &config), "margin 10px");
    }

    #[test]
    fn test_adjacent_fields_stay_glued() {
        let config = config_with(|u| {
            u.snippets.insert("sh".into(), "box-shadow:${1:inset }${2:x}".into());
        });
        assert_eq!(render("sh", &config), "box-shadow: ${1:inset }${2:x};");
    }

    #[rstest]
    #[case(1.0, "1")]
    #[case(0.5, "0.5")]
    #[case(1.23456, "1.2346")]
    #[case(-10.0, "-10")]
    fn test_number_format(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(number(value), expected);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("border-top-width"), "borderTopWidth");
        assert_eq!(camel_case("color"), "color");
    }
}

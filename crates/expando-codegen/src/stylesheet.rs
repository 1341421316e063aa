//! Stylesheet snippet database and property resolver.
//!
//! Snippets are either properties (`display:block|none|flex`) or raw text
//! (`@media ${1:screen} {...}`). A parsed declaration is matched against
//! snippet keys with the fuzzy scorer; its values are then matched against
//! the keywords of the chosen property.

use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use expando_parser::{parse_stylesheet, CssProperty, CssValue, CssValueToken, FunctionCall};
use regex::Regex;

use crate::config::Config;
use crate::css;
use crate::score::find_best_match;

static PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z-]+)(?:\s*:\s*([^\n\r;]+?);*)?$").expect("valid property regex")
});
static RAW_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\d+)(:[^}]+)?\}").expect("valid field regex"));

// =============================================================================
// Snippet database
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySnippet {
    pub key: String,
    pub property: String,
    /// Value alternatives; the first one is the default.
    pub value: Vec<Vec<CssValue>>,
    /// Keywords available for the value, in definition order.
    pub keywords: Vec<(String, CssValueToken)>,
    /// Indexes of more specific properties (`border` → `border-top`).
    pub dependencies: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssSnippet {
    Property(PropertySnippet),
    Raw { key: String, value: String },
}

impl CssSnippet {
    pub fn key(&self) -> &str {
        match self {
            CssSnippet::Property(snippet) => &snippet.key,
            CssSnippet::Raw { key, .. } => key,
        }
    }
}

/// Parsed stylesheet snippets, sorted by key.
///
/// Building is a pure function of the snippet table, so a database can be
/// built once and shared between expansions with the same snippets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetDatabase {
    snippets: Vec<CssSnippet>,
}

impl SnippetDatabase {
    pub fn build(table: &HashMap<String, String>) -> Self {
        let mut snippets: Vec<CssSnippet> = table
            .iter()
            .map(|(key, value)| create_snippet(key, value))
            .collect();
        snippets.sort_by(|a, b| a.key().cmp(b.key()));
        nest(&mut snippets);
        tracing::debug!(count = snippets.len(), "built stylesheet snippet database");
        Self { snippets }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::build(&config.snippets)
    }

    pub fn snippets(&self) -> &[CssSnippet] {
        &self.snippets
    }

    pub fn property(&self, name: &str) -> Option<&PropertySnippet> {
        self.snippets.iter().find_map(|snippet| match snippet {
            CssSnippet::Property(p) if p.property == name => Some(p),
            _ => None,
        })
    }

    fn property_at(&self, index: usize) -> Option<&PropertySnippet> {
        match self.snippets.get(index) {
            Some(CssSnippet::Property(p)) => Some(p),
            _ => None,
        }
    }
}

fn create_snippet(key: &str, value: &str) -> CssSnippet {
    let Some(caps) = PROPERTY.captures(value) else {
        return CssSnippet::Raw {
            key: key.to_string(),
            value: value.to_string(),
        };
    };

    let alternatives: Vec<Vec<CssValue>> = caps
        .get(2)
        .map(|m| {
            m.as_str()
                .split('|')
                .filter_map(|alternative| match parse_stylesheet(alternative.trim(), true) {
                    Ok(mut props) if !props.is_empty() => Some(props.swap_remove(0).value),
                    Ok(_) => None,
                    Err(err) => {
                        tracing::warn!(key, error = %err, "unable to parse snippet value");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let mut keywords = Vec::new();
    for value in alternatives.iter().flatten() {
        collect_keywords(value, &mut keywords);
    }

    CssSnippet::Property(PropertySnippet {
        key: key.to_string(),
        property: caps[1].to_string(),
        value: alternatives,
        keywords,
        dependencies: Vec::new(),
    })
}

fn collect_keywords(value: &CssValue, dest: &mut Vec<(String, CssValueToken)>) {
    let mut add = |name: String, token: CssValueToken| {
        if !dest.iter().any(|(existing, _)| *existing == name) {
            dest.push((name, token));
        }
    };
    for token in &value.value {
        match token {
            CssValueToken::Literal(name) => add(name.clone(), token.clone()),
            CssValueToken::Function(call) => add(call.name.clone(), token.clone()),
            CssValueToken::Field { name, .. } => {
                let name = name.trim();
                if !name.is_empty() {
                    add(name.to_string(), CssValueToken::literal(name));
                }
            }
            _ => {}
        }
    }
}

/// Link each shorthand property to its more specific variants, e.g.
/// `background` → `background-position` → `background-position-x`.
fn nest(snippets: &mut [CssSnippet]) {
    let mut stack: Vec<usize> = Vec::new();

    for cur in 0..snippets.len() {
        let CssSnippet::Property(current) = &snippets[cur] else {
            continue;
        };
        let property = current.property.clone();

        while let Some(&prev) = stack.last() {
            let parent = match &snippets[prev] {
                CssSnippet::Property(p) => p.property.as_str(),
                CssSnippet::Raw { .. } => "",
            };
            let nested = property.len() > parent.len()
                && property.starts_with(parent)
                && property.as_bytes()[parent.len()] == b'-';
            if nested {
                if let CssSnippet::Property(p) = &mut snippets[prev] {
                    p.dependencies.push(cur);
                }
                stack.push(cur);
                break;
            }
            stack.pop();
        }

        if stack.is_empty() {
            stack.push(cur);
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// A declaration after snippet resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProperty {
    pub property: CssProperty,
    /// Tokens come from a raw snippet and are written without separators.
    pub raw: bool,
    /// A snippet was found for the declaration.
    pub matched: bool,
}

pub fn resolve(
    properties: Vec<CssProperty>,
    db: &SnippetDatabase,
    config: &Config,
) -> Vec<ResolvedProperty> {
    properties
        .into_iter()
        .map(|property| resolve_property(property, db, config))
        .collect()
}

/// Property name the abbreviation is expanded inside of, if any.
pub fn value_scope(config: &Config) -> Option<&str> {
    config
        .context
        .as_ref()
        .map(|ctx| ctx.name.as_str())
        .filter(|name| !name.is_empty() && !name.starts_with("@@"))
}

fn resolve_property(mut node: CssProperty, db: &SnippetDatabase, config: &Config) -> ResolvedProperty {
    let options = &config.options.stylesheet;
    let mut raw = false;
    let mut matched = resolve_gradient(&mut node, config);

    if !matched {
        let min_score = options.fuzzy_search_min_score;
        if let Some(scope) = value_scope(config) {
            let snippet = db.property(scope);
            resolve_value_keywords(&mut node, config, db, snippet, min_score);
            matched = snippet.is_some();
        } else if let Some(name) = node.name.clone() {
            let best = find_best_match(
                db.snippets.iter(),
                &name,
                |snippet| snippet.key(),
                min_score,
                !options.strict_match,
            );
            match best {
                Some((CssSnippet::Property(snippet), score)) => {
                    tracing::trace!(abbreviation = name.as_str(), key = snippet.key.as_str(), score, "matched property");
                    matched = resolve_as_property(&mut node, snippet, db, config);
                }
                Some((CssSnippet::Raw { key, value }, score)) => {
                    tracing::trace!(abbreviation = name.as_str(), key = key.as_str(), score, "matched raw snippet");
                    resolve_as_snippet(&mut node, value);
                    raw = true;
                    matched = true;
                }
                None => tracing::debug!(abbreviation = name.as_str(), min_score, "no snippet matched"),
            }
        }
    }

    if node.name.is_some() || config.context.is_some() {
        resolve_numeric_value(&mut node, config);
    }

    ResolvedProperty {
        property: node,
        raw,
        matched,
    }
}

/// `lg(...)` → `background-image: linear-gradient(...)`.
fn resolve_gradient(node: &mut CssProperty, config: &Config) -> bool {
    let call = match node.value.as_slice() {
        [single] => match single.value.as_slice() {
            [CssValueToken::Function(call)] if call.name == "lg" => Some(call.clone()),
            _ => None,
        },
        _ => None,
    };

    if call.is_none() && node.name.as_deref() != Some("lg") {
        return false;
    }

    let gradient = match call {
        Some(call) => FunctionCall {
            name: "linear-gradient".into(),
            arguments: call.arguments,
        },
        None => FunctionCall {
            name: "linear-gradient".into(),
            arguments: vec![CssValue::new(vec![field(0, "")])],
        },
    };
    if config.context.is_none() {
        node.name = Some("background-image".into());
    }
    node.value = vec![CssValue::new(vec![CssValueToken::Function(gradient)])];
    true
}

fn resolve_as_property(
    node: &mut CssProperty,
    snippet: &PropertySnippet,
    db: &SnippetDatabase,
    config: &Config,
) -> bool {
    let abbr = node.name.clone().unwrap_or_default();
    let inline = unmatched_part(&abbr, &snippet.key);

    if !inline.is_empty() {
        // `dib`: `d` matched, `ib` must be a keyword of the property
        if !node.value.is_empty() {
            tracing::debug!(
                abbreviation = abbr.as_str(),
                key = snippet.key.as_str(),
                "explicit value rejects inline keyword"
            );
            return false;
        }
        let Some(keyword) = resolve_keyword(&inline, config, db, Some(snippet), 0.0) else {
            tracing::debug!(abbreviation = abbr.as_str(), inline = inline.as_str(), "inline keyword not found");
            return false;
        };
        node.value.push(CssValue::new(vec![keyword]));
    }

    node.name = Some(snippet.property.clone());

    if !node.value.is_empty() {
        resolve_value_keywords(node, config, db, Some(snippet), 0.0);
    } else if let Some(default) = snippet.value.first() {
        node.value = if snippet.value.len() == 1 || default.iter().any(has_field) {
            default.clone()
        } else {
            default.iter().map(|value| wrap_with_field(value, config)).collect()
        };
    }

    true
}

/// Substitute raw snippet fields with given values, in order.
fn resolve_as_snippet(node: &mut CssProperty, snippet: &str) {
    let mut input: VecDeque<CssValueToken> = node
        .value
        .first()
        .map(|value| value.value.iter().cloned().collect())
        .unwrap_or_default();
    let mut output = Vec::new();
    let mut offset = 0;

    for caps in RAW_FIELD.captures_iter(snippet) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if offset != whole.start() {
            output.push(CssValueToken::literal(&snippet[offset..whole.start()]));
        }
        offset = whole.end();

        match input.pop_front() {
            Some(token) => output.push(token),
            None => {
                let index = caps[1].parse().unwrap_or(0);
                let name = caps.get(2).map_or("", |m| &m.as_str()[1..]);
                output.push(field(index, name));
            }
        }
    }
    if offset < snippet.len() {
        output.push(CssValueToken::literal(&snippet[offset..]));
    }

    node.name = None;
    node.value = vec![CssValue::new(output)];
}

fn resolve_value_keywords(
    node: &mut CssProperty,
    config: &Config,
    db: &SnippetDatabase,
    snippet: Option<&PropertySnippet>,
    min_score: f64,
) {
    for value in &mut node.value {
        for token in &mut value.value {
            match token {
                CssValueToken::Literal(text) => {
                    if let Some(keyword) = resolve_keyword(text, config, db, snippet, min_score) {
                        *token = keyword;
                    }
                }
                CssValueToken::Function(call) => {
                    let keyword = resolve_keyword(&call.name, config, db, snippet, min_score);
                    if let Some(CssValueToken::Function(matched)) = keyword {
                        let mut arguments = std::mem::take(&mut call.arguments);
                        arguments.extend(matched.arguments.into_iter().skip(arguments.len()));
                        *call = FunctionCall {
                            name: matched.name,
                            arguments,
                        };
                    }
                }
                _ => {}
            }
        }
    }
}

fn resolve_keyword(
    keyword: &str,
    config: &Config,
    db: &SnippetDatabase,
    snippet: Option<&PropertySnippet>,
    min_score: f64,
) -> Option<CssValueToken> {
    let options = &config.options.stylesheet;

    if let Some(snippet) = snippet {
        if let Some(token) = match_keyword(&snippet.keywords, keyword, min_score) {
            return Some(token);
        }
        for dep in snippet.dependencies.iter().filter_map(|&ix| db.property_at(ix)) {
            if let Some(token) = match_keyword(&dep.keywords, keyword, min_score) {
                return Some(token);
            }
        }
    }

    if let Some(alias) = options.keyword_aliases.get(keyword) {
        return Some(CssValueToken::literal(alias));
    }

    find_best_match(options.keywords.iter(), keyword, |k| k.as_str(), min_score, false)
        .map(|(k, _)| CssValueToken::literal(k))
}

fn match_keyword(
    keywords: &[(String, CssValueToken)],
    keyword: &str,
    min_score: f64,
) -> Option<CssValueToken> {
    find_best_match(keywords.iter(), keyword, |entry| entry.0.as_str(), min_score, false)
        .map(|(entry, _)| entry.1.clone())
}

/// Part of `abbr` left over after matching its characters in order
/// against `key`.
fn unmatched_part(abbr: &str, key: &str) -> String {
    let key: Vec<char> = key.chars().collect();
    let mut last_pos = 0;
    for (i, ch) in abbr.chars().enumerate() {
        match key.iter().skip(last_pos).position(|c| *c == ch) {
            Some(pos) => last_pos += pos + 1,
            None => return abbr.chars().skip(i).collect(),
        }
    }
    String::new()
}

fn resolve_numeric_value(node: &mut CssProperty, config: &Config) {
    let options = &config.options.stylesheet;
    let property = node
        .name
        .as_deref()
        .or_else(|| config.context.as_ref().map(|ctx| ctx.name.as_str()))
        .unwrap_or_default();
    let unitless = options.unitless.iter().any(|name| name == property);

    for value in &mut node.value {
        for token in &mut value.value {
            let CssValueToken::Number { value, raw, unit } = token else {
                continue;
            };
            if !unit.is_empty() {
                if let Some(alias) = options.unit_aliases.get(unit.as_str()) {
                    *unit = alias.clone();
                }
            } else if *value != 0.0 && !unitless {
                *unit = if raw.contains('.') {
                    options.float_unit.clone()
                } else {
                    options.int_unit.clone()
                };
            }
        }
    }
}

fn has_field(value: &CssValue) -> bool {
    value
        .value
        .iter()
        .any(|token| matches!(token, CssValueToken::Field { .. }))
}

/// Turn every token of a default value into a tabstop so the editor can
/// select it.
fn wrap_with_field(value: &CssValue, config: &Config) -> CssValue {
    let short_hex = config.options.stylesheet.short_hex;
    let tokens = value
        .value
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let index = i + 1;
            match token {
                CssValueToken::Color(color) => field(index, &css::color(color, short_hex)),
                CssValueToken::Literal(text) => field(index, text),
                CssValueToken::Number { value, unit, .. } => {
                    field(index, &format!("{}{unit}", css::number(*value)))
                }
                CssValueToken::String { value, single } => {
                    let quote = if *single { '\'' } else { '"' };
                    field(index, &format!("{quote}{value}{quote}"))
                }
                CssValueToken::Function(_) => {
                    field(index, &css::token_text(token, config))
                }
                other => other.clone(),
            }
        })
        .collect();
    CssValue::new(tokens)
}

fn field(index: usize, name: &str) -> CssValueToken {
    CssValueToken::Field {
        index: Some(index),
        name: name.to_string(),
        glued: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_config, Context, SyntaxType, UserConfig};
    use pretty_assertions::assert_eq;

    fn stylesheet_config() -> Config {
        resolve_config(&UserConfig {
            kind: Some(SyntaxType::Stylesheet),
            ..Default::default()
        })
    }

    fn resolve_one(abbr: &str, config: &Config) -> ResolvedProperty {
        let db = SnippetDatabase::from_config(config);
        let props = parse_stylesheet(abbr, value_scope(config).is_some()).unwrap();
        resolve(props, &db, config).remove(0)
    }

    fn name(resolved: &ResolvedProperty) -> Option<&str> {
        resolved.property.name.as_deref()
    }

    // =========================================================================
    // Database
    // =========================================================================

    #[test]
    fn test_property_snippet_keywords() {
        let db = SnippetDatabase::from_config(&stylesheet_config());
        let display = db.property("display").unwrap();
        assert_eq!(display.key, "d");
        assert_eq!(display.value.len(), display.keywords.len());
        assert_eq!(display.keywords[0].0, "block");

        let border = db.property("border").unwrap();
        let names: Vec<&str> = border.keywords.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["1px", "solid", "#000"]);
    }

    #[test]
    fn test_raw_snippets_and_sorting() {
        let db = SnippetDatabase::from_config(&stylesheet_config());
        let keys: Vec<&str> = db.snippets().iter().map(CssSnippet::key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(db
            .snippets()
            .iter()
            .any(|s| matches!(s, CssSnippet::Raw { key, .. } if key == "@m")));
    }

    #[test]
    fn test_dependencies() {
        let table: HashMap<String, String> = [
            ("bg", "background"),
            ("bgp", "background-position"),
            ("bgpx", "background-position-x:left|right"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let db = SnippetDatabase::build(&table);
        let bg = db.property("background").unwrap();
        assert_eq!(bg.dependencies, vec![1]);
        let bgp = db.property("background-position").unwrap();
        assert_eq!(bgp.dependencies, vec![2]);
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    #[test]
    fn test_exact_key() {
        let resolved = resolve_one("bd1-s#f00", &stylesheet_config());
        assert_eq!(name(&resolved), Some("border"));
        assert!(resolved.matched);
        let tokens = &resolved.property.value[0].value;
        assert_eq!(tokens[1], CssValueToken::literal("solid"));
    }

    #[test]
    fn test_inline_keyword() {
        let resolved = resolve_one("dib", &stylesheet_config());
        assert_eq!(name(&resolved), Some("display"));
        assert_eq!(
            resolved.property.value[0].value,
            vec![CssValueToken::literal("inline-block")]
        );
    }

    #[test]
    fn test_inline_keyword_rejected_with_value() {
        let resolved = resolve_one("dib10", &stylesheet_config());
        assert_eq!(name(&resolved), Some("dib"));
        assert!(!resolved.matched);
    }

    #[test]
    fn test_unmatched_below_min_score() {
        let mut user = UserConfig {
            kind: Some(SyntaxType::Stylesheet),
            ..Default::default()
        };
        user.options.stylesheet_fuzzy_search_min_score = Some(0.9);
        let resolved = resolve_one("dzq", &resolve_config(&user));
        assert_eq!(name(&resolved), Some("dzq"));
        assert!(!resolved.matched);
    }

    #[test]
    fn test_numeric_units() {
        let resolved = resolve_one("m10-1.5-0-2e", &stylesheet_config());
        let units: Vec<String> = resolved.property.value[0]
            .value
            .iter()
            .map(|t| match t {
                CssValueToken::Number { unit, .. } => unit.clone(),
                _ => String::from("?"),
            })
            .collect();
        assert_eq!(units, vec!["px", "em", "", "em"]);

        let resolved = resolve_one("z10", &stylesheet_config());
        assert!(matches!(
            &resolved.property.value[0].value[0],
            CssValueToken::Number { unit, .. } if unit.is_empty()
        ));
    }

    #[test]
    fn test_raw_snippet_fields() {
        let resolved = resolve_one("@m", &stylesheet_config());
        assert!(resolved.raw);
        assert_eq!(resolved.property.name, None);
        assert_eq!(
            resolved.property.value[0].value[1],
            field(1, "screen")
        );
    }

    #[test]
    fn test_gradient() {
        let resolved = resolve_one("lg(to right, #0, #f00)", &stylesheet_config());
        assert_eq!(name(&resolved), Some("background-image"));
        assert!(matches!(
            &resolved.property.value[0].value[0],
            CssValueToken::Function(call) if call.name == "linear-gradient" && call.arguments.len() == 3
        ));
    }

    #[test]
    fn test_default_values_wrapped_in_fields() {
        let resolved = resolve_one("pos", &stylesheet_config());
        assert_eq!(name(&resolved), Some("position"));
        assert_eq!(resolved.property.value[0].value, vec![field(1, "relative")]);

        let resolved = resolve_one("bd", &stylesheet_config());
        assert!(has_field(&resolved.property.value[0]));
    }

    #[test]
    fn test_value_scope_context() {
        let mut user = UserConfig {
            kind: Some(SyntaxType::Stylesheet),
            ..Default::default()
        };
        user.context = Some(Context {
            name: "display".into(),
            attributes: Default::default(),
        });
        let resolved = resolve_one("ib", &resolve_config(&user));
        assert_eq!(resolved.property.name, None);
        assert_eq!(
            resolved.property.value[0].value,
            vec![CssValueToken::literal("inline-block")]
        );
    }

    #[test]
    fn test_unmatched_part() {
        assert_eq!(unmatched_part("dib", "d"), "ib");
        assert_eq!(unmatched_part("bd", "bd"), "");
        assert_eq!(unmatched_part("bdt", "bd"), "t");
    }
}

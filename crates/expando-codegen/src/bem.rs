//! BEM class name expansion.
//!
//! `.b>.-e` becomes `b` and `b__e`. A leading run of `-` addresses an
//! element of the block found that many levels up; a leading run of `_`
//! adds a modifier to the current element or block.

use std::sync::LazyLock;

use expando_parser::{AbbreviationNode, Attribute, Value};
use regex::Regex;

use crate::config::Config;
use crate::transform::Ancestor;

static ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(-+)([a-z0-9]+[a-z0-9-]*)").expect("valid element regex"));
static MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(_+)([a-z0-9]+[a-z0-9-_]*)").expect("valid modifier regex"));
static BLOCK_WITH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]-").expect("valid block regex"));
static BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[a-z]").expect("valid block regex"));

/// Class names of a node after the first expansion step, and the block
/// they define.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BemData {
    pub class_names: Vec<String>,
    pub block: Option<String>,
}

impl BemData {
    fn parse(class_value: &str) -> Self {
        let class_names: Vec<String> = class_value.split_whitespace().map(String::from).collect();
        let block = find_block_name(&class_names);
        Self { class_names, block }
    }
}

pub fn bem(node: &mut AbbreviationNode, ancestors: &[Ancestor], config: &Config) -> BemData {
    let data = expand_class_names(node, config);
    expand_short_notation(node, &data, ancestors, config);
    data
}

/// Split `block_mod` into `block _mod` and record the block name.
/// Names already in `block__element` form are kept whole.
pub fn expand_class_names(node: &mut AbbreviationNode, config: &Config) -> BemData {
    let element = config.options.bem.element.as_str();
    let mut data = BemData::parse(&class_value(node, config));
    let mut class_names = Vec::new();

    for class in &data.class_names {
        let expanded = element.contains('_') && class.find(element).is_some_and(|ix| ix > 0);
        match class.find('_') {
            Some(ix) if ix > 0 && !class.starts_with('-') && !expanded => {
                class_names.push(class[..ix].to_string());
                class_names.push(class[ix..].to_string());
            }
            _ => class_names.push(class.clone()),
        }
    }

    if !class_names.is_empty() {
        data.class_names = unique(class_names);
        data.block = find_block_name(&data.class_names);
        update_class(node, &data.class_names.join(" "), config);
    }

    data
}

fn expand_short_notation(
    node: &mut AbbreviationNode,
    data: &BemData,
    ancestors: &[Ancestor],
    config: &Config,
) {
    let options = &config.options.bem;
    let path: Vec<&BemData> = ancestors.iter().map(|a| &a.bem).chain([data]).collect();
    let mut class_names = Vec::new();

    for original in &data.class_names {
        let mut class = original.as_str();
        let mut prefix = String::new();

        if let Some(caps) = ELEMENT.captures(class) {
            prefix = format!(
                "{}{}{}",
                block_name(&path, caps[1].len(), config),
                options.element,
                &caps[2]
            );
            class_names.push(prefix.clone());
            class = &class[caps[0].len()..];
        }

        if let Some(caps) = MODIFIER.captures(class) {
            if prefix.is_empty() {
                prefix = block_name(&path, caps[1].len(), config);
                class_names.push(prefix.clone());
            }
            class_names.push(format!("{prefix}{}{}", options.modifier, &caps[2]));
            class = &class[caps[0].len()..];
        }

        if class == original {
            class_names.push(original.clone());
        }
    }

    let class_names = unique(class_names);
    if !class_names.is_empty() {
        update_class(node, &class_names.join(" "), config);
    }
}

/// Nearest block at or above `depth` levels from the end of `path`,
/// falling back to the context element's class.
fn block_name(path: &[&BemData], depth: usize, config: &Config) -> String {
    let start = path.len().saturating_sub(depth);
    for data in path.iter().take(start + 1).rev() {
        if let Some(block) = &data.block {
            return block.clone();
        }
    }

    config
        .context
        .as_ref()
        .and_then(|ctx| ctx.attributes.get("class"))
        .and_then(|class| BemData::parse(class).block)
        .unwrap_or_default()
}

fn find_block_name(class_names: &[String]) -> Option<String> {
    find(class_names, &BLOCK_WITH_PREFIX).or_else(|| find(class_names, &BLOCK))
}

fn find(class_names: &[String], filter: &Regex) -> Option<String> {
    for class in class_names {
        if ELEMENT.is_match(class) || MODIFIER.is_match(class) {
            break;
        }
        if filter.is_match(class) {
            return Some(class.clone());
        }
    }
    None
}

fn unique(class_names: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(class_names.len());
    for class in class_names {
        if !result.contains(&class) {
            result.push(class);
        }
    }
    result
}

/// Attribute holding class names, possibly already renamed by
/// `markup.attributes` (`className` in JSX).
fn is_class_attribute(attr: &Attribute, config: &Config) -> bool {
    attr.is_named("class")
        || config
            .options
            .markup
            .attributes
            .get("class")
            .is_some_and(|renamed| attr.is_named(renamed))
}

fn class_value(node: &AbbreviationNode, config: &Config) -> String {
    node.attributes
        .iter()
        .find(|attr| is_class_attribute(attr, config))
        .and_then(|attr| attr.value.as_deref())
        .map(expando_parser::ast::value_to_string)
        .unwrap_or_default()
}

fn update_class(node: &mut AbbreviationNode, value: &str, config: &Config) {
    if let Some(attr) = node
        .attributes
        .iter_mut()
        .find(|attr| is_class_attribute(attr, config))
    {
        attr.value = Some(vec![Value::from(value)]);
    }
}

//! Tree transforms applied after snippet resolution.
//!
//! Nodes are visited top-down. Each transform sees the node being visited
//! and a stack of snapshots of its ancestors, outermost first.

use std::collections::HashMap;

use expando_parser::{Abbreviation, AbbreviationNode, Attribute, Repeater, Value, ValueType};

use crate::bem::{self, BemData};
use crate::config::Config;
use crate::lorem;
use crate::output::is_inline_element;

/// What the transforms need to know about an enclosing node.
#[derive(Debug, Clone, Default)]
pub struct Ancestor {
    pub name: Option<String>,
    pub repeat: Option<Repeater>,
    pub bem: BemData,
}

pub fn transform(abbr: &mut Abbreviation, config: &Config) {
    let mut ancestors = Vec::new();
    walk(&mut abbr.children, &mut ancestors, config);
}

fn walk(children: &mut [AbbreviationNode], ancestors: &mut Vec<Ancestor>, config: &Config) {
    for node in children.iter_mut() {
        let bem = transform_node(node, ancestors, config);
        ancestors.push(Ancestor {
            name: node.name.clone(),
            repeat: node.repeat,
            bem,
        });
        walk(&mut node.children, ancestors, config);
        ancestors.pop();
    }
}

fn transform_node(node: &mut AbbreviationNode, ancestors: &[Ancestor], config: &Config) -> BemData {
    if node.name.is_none() && !node.attributes.is_empty() {
        resolve_implicit_tag(node, ancestors, config);
    }
    merge_attributes(node, config);
    lorem::lorem(node, ancestors, config);
    if config.syntax == "xsl" {
        xsl(node);
    }
    rename_attributes(node, config);
    if config.options.bem.enabled {
        bem::bem(node, ancestors, config)
    } else {
        BemData::default()
    }
}

// =============================================================================
// Implicit tags
// =============================================================================

/// Give a nameless node the tag its parent implies: `ul>.item` → `li`.
pub fn resolve_implicit_tag(node: &mut AbbreviationNode, ancestors: &[Ancestor], config: &Config) {
    let parent = ancestors
        .iter()
        .rev()
        .find_map(|a| a.name.as_deref())
        .or_else(|| config.context.as_ref().map(|c| c.name.as_str()))
        .unwrap_or_default();
    node.name = Some(implicit_tag(parent, config).to_string());
}

fn implicit_tag(parent: &str, config: &Config) -> &'static str {
    match parent.to_lowercase().as_str() {
        "p" => "span",
        "ul" | "ol" => "li",
        "table" | "tbody" | "thead" | "tfoot" => "tr",
        "tr" => "td",
        "colgroup" => "col",
        "select" | "optgroup" => "option",
        "audio" | "video" => "source",
        "object" => "param",
        "map" => "area",
        name if !name.is_empty() && is_inline_element(name, config) => "span",
        _ => "div",
    }
}

// =============================================================================
// Attribute merging
// =============================================================================

/// Collapse repeated attributes into one. Class names accumulate, other
/// attributes are overwritten by later occurrences.
pub fn merge_attributes(node: &mut AbbreviationNode, config: &Config) {
    if node.attributes.len() < 2 {
        return;
    }

    let mut merged: Vec<Attribute> = Vec::with_capacity(node.attributes.len());
    let mut lookup: HashMap<String, usize> = HashMap::new();

    for attr in std::mem::take(&mut node.attributes) {
        let Some(key) = attr.name.as_deref().map(str::to_lowercase) else {
            merged.push(attr);
            continue;
        };
        match lookup.get(&key) {
            Some(&ix) if key == "class" => {
                let prev = &mut merged[ix];
                prev.value = merge_value(prev.value.take(), attr.value, " ");
            }
            Some(&ix) => merge_declarations(&mut merged[ix], attr, config),
            None => {
                lookup.insert(key, merged.len());
                merged.push(attr);
            }
        }
    }

    node.attributes = merged;
}

fn merge_value(prev: Option<Vec<Value>>, next: Option<Vec<Value>>, glue: &str) -> Option<Vec<Value>> {
    match (prev, next) {
        (Some(mut prev), Some(next)) => {
            if !prev.is_empty() {
                expando_parser::ast::push_value(&mut prev, Value::from(glue));
            }
            for token in next {
                expando_parser::ast::push_value(&mut prev, token);
            }
            Some(prev)
        }
        (prev, next) => prev.or(next),
    }
}

fn merge_declarations(dest: &mut Attribute, src: Attribute, config: &Config) {
    dest.name = src.name;
    if !config.options.output.reverse_attributes {
        dest.value = src.value;
    }
    dest.implied |= src.implied;
    dest.boolean |= src.boolean;
    if dest.value_type != ValueType::Expression {
        dest.value_type = src.value_type;
    }
}

// =============================================================================
// XSL and attribute renaming
// =============================================================================

/// `xsl:variable` and `xsl:with-param` with content must not keep `select`.
fn xsl(node: &mut AbbreviationNode) {
    let Some(name) = node.name.as_deref() else {
        return;
    };
    let matches = matches!(name.to_lowercase().as_str(), "xsl:variable" | "xsl:with-param");
    if matches && (!node.children.is_empty() || !node.value.is_empty()) {
        node.attributes.retain(|attr| !attr.is_named("select"));
    }
}

/// Apply `markup.attributes` renames and `markup.valuePrefix` expressions.
/// Keys ending with `*` match attributes written with a doubled prefix
/// (`..name`).
fn rename_attributes(node: &mut AbbreviationNode, config: &Config) {
    let markup = &config.options.markup;
    if markup.attributes.is_empty() && markup.value_prefix.is_empty() {
        return;
    }

    for attr in node.attributes.iter_mut() {
        let Some(name) = attr.name.as_deref() else {
            continue;
        };
        let key = if attr.multiple {
            format!("{name}*")
        } else {
            name.to_string()
        };

        if let Some(prefix) = markup.value_prefix.get(&key) {
            if let Some(value) = attr.value.as_mut() {
                let mut prefixed = vec![Value::Text(format!("{prefix}."))];
                for token in value.drain(..) {
                    expando_parser::ast::push_value(&mut prefixed, token);
                }
                *value = prefixed;
                attr.value_type = ValueType::Expression;
            }
        }

        if let Some(renamed) = markup.attributes.get(&key) {
            attr.name = Some(renamed.clone());
        }
    }
}

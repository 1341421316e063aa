//! Markup snippet resolution.
//!
//! Every node whose name is a snippet key is replaced by the parsed
//! snippet. The caller node contributes its attributes, value, repeat and
//! self-closing flag to each top-level node of the snippet, and its
//! children are appended to the snippet's deepest node. A snippet that is
//! already being resolved further up is left as-is, so `a` → `a[href]`
//! does not recurse.

use expando_parser::{parse_abbreviation, Abbreviation, AbbreviationNode, ParseOptions};

use crate::config::Config;

struct Resolver<'a> {
    config: &'a Config,
    options: ParseOptions,
    /// Snippet sources currently being resolved.
    stack: Vec<String>,
}

/// Replace snippet references in `abbr` with their expansions.
pub fn resolve_snippets(abbr: &mut Abbreviation, config: &Config) {
    let mut resolver = Resolver {
        config,
        options: ParseOptions {
            jsx: config.options.jsx,
            text: None,
            variables: config.variables.clone(),
            max_repeat: config.max_repeat,
            href: config.options.markup.href,
        },
        stack: Vec::new(),
    };
    let children = std::mem::take(&mut abbr.children);
    abbr.children = resolver.walk(children);
}

impl Resolver<'_> {
    fn walk(&mut self, children: Vec<AbbreviationNode>) -> Vec<AbbreviationNode> {
        let mut result = Vec::with_capacity(children.len());

        for mut child in children {
            let own_children = std::mem::take(&mut child.children);
            match self.resolve(&child) {
                Some(mut resolved) => {
                    let nested = self.walk(own_children);
                    if let Some(last) = resolved.children.last_mut() {
                        last.deepest_mut().children.extend(nested);
                    }
                    result.append(&mut resolved.children);
                }
                None => {
                    child.children = self.walk(own_children);
                    result.push(child);
                }
            }
        }

        result
    }

    fn resolve(&mut self, child: &AbbreviationNode) -> Option<Abbreviation> {
        let config = self.config;
        let name = child.name.as_deref()?;
        let snippet = config.snippets.get(name)?;

        if self.stack.contains(snippet) {
            tracing::trace!(name, snippet = snippet.as_str(), "circular snippet reference");
            return None;
        }

        let mut abbr = match parse_abbreviation(snippet, &self.options) {
            Ok(abbr) => abbr,
            Err(err) => {
                tracing::warn!(name, error = %err, "unable to parse snippet");
                return None;
            }
        };
        tracing::trace!(name, snippet = snippet.as_str(), "resolved snippet");

        self.stack.push(snippet.clone());
        let children = std::mem::take(&mut abbr.children);
        abbr.children = self.walk(children);
        self.stack.pop();

        let reversed = config.options.output.reverse_attributes;
        for top in &mut abbr.children {
            if !child.attributes.is_empty() {
                let own = std::mem::take(&mut top.attributes);
                let caller = child.attributes.clone();
                top.attributes = if reversed {
                    caller.into_iter().chain(own).collect()
                } else {
                    own.into_iter().chain(caller).collect()
                };
            }
            merge_nodes(child, top);
        }

        Some(abbr)
    }
}

fn merge_nodes(from: &AbbreviationNode, to: &mut AbbreviationNode) {
    if from.self_closing {
        to.self_closing = true;
    }
    if !from.value.is_empty() {
        to.value = from.value.clone();
    }
    if from.repeat.is_some() {
        to.repeat = from.repeat;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve_config, UserConfig};
    use expando_parser::Value;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn resolve(source: &str, snippets: &[(&str, &str)]) -> Abbreviation {
        let mut user = UserConfig::default();
        user.snippets = snippets
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        let config = resolve_config(&user);
        let mut abbr = parse_abbreviation(source, &ParseOptions::default()).unwrap();
        resolve_snippets(&mut abbr, &config);
        abbr
    }

    fn attr_names(node: &AbbreviationNode) -> Vec<String> {
        node.attributes
            .iter()
            .filter_map(|a| a.name.clone())
            .collect()
    }

    #[test]
    fn test_self_reference_is_not_recursive() {
        let abbr = resolve("a", &[]);
        assert_eq!(abbr.children[0].name.as_deref(), Some("a"));
        assert_eq!(attr_names(&abbr.children[0]), vec!["href"]);
    }

    #[test]
    fn test_caller_attributes_appended() {
        let abbr = resolve("a.btn", &[]);
        assert_eq!(attr_names(&abbr.children[0]), vec!["href", "class"]);
    }

    #[test]
    fn test_self_closing_snippet() {
        let abbr = resolve("img", &[]);
        assert!(abbr.children[0].self_closing);
        assert_eq!(attr_names(&abbr.children[0]), vec!["src", "alt"]);
    }

    #[test]
    fn test_children_go_to_deepest_node() {
        let abbr = resolve("box>span", &[("box", "div.outer>div.inner")]);
        let outer = &abbr.children[0];
        assert_eq!(outer.children[0].children[0].name.as_deref(), Some("span"));
    }

    #[test]
    fn test_nested_snippets_and_value() {
        let abbr = resolve("tx{hi}", &[("tx", "inp[type=text]")]);
        let node = &abbr.children[0];
        assert_eq!(node.name.as_deref(), Some("input"));
        assert_eq!(attr_names(node), vec!["type", "name", "id", "type"]);
        assert_eq!(node.value, vec![Value::from("hi")]);
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let abbr = resolve("x", &[("x", "y"), ("y", "x")]);
        assert_eq!(abbr.children.len(), 1);
    }

    #[test]
    fn test_unparsable_snippet_left_as_is() {
        let abbr = resolve("bad", &[("bad", "a)")]);
        assert_eq!(abbr.children[0].name.as_deref(), Some("bad"));
    }
}

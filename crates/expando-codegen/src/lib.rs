//! Expando Code Generator
//!
//! Resolves parsed abbreviations against snippets and writes them out.
//! Markup goes through snippet resolution, the transform pipeline and one
//! of the markup stringifiers; stylesheet declarations are matched against
//! the property snippet database and written as CSS.
//!
//! ```text
//! markup:     parse → resolve_snippets() → transform() → html / indent
//! stylesheet: parse → stylesheet::resolve() → css::stringify()
//! ```

pub mod bem;
pub mod config;
pub mod css;
pub mod html;
pub mod indent;
pub mod lorem;
pub mod output;
pub mod resolve;
pub mod score;
pub mod snippets;
pub mod stylesheet;
pub mod transform;

pub use config::{resolve_config, Config, Context, SyntaxType, TextInput, UserConfig};
pub use score::score_match;
pub use stylesheet::SnippetDatabase;

use expando_parser::{Abbreviation, CssProperty, ParseError, ParseOptions};

use crate::indent::IndentSyntax;

/// Expansion error. Only parsing can fail; unresolved snippets and
/// unmatched abbreviations are left as written.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpandError {
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ExpandError {
    /// Abbreviation with a caret under the failing position.
    pub fn ruler(&self) -> String {
        match self {
            Self::Parse(err) => err.ruler(),
        }
    }
}

/// Expand `abbreviation` with options given as a [`UserConfig`].
pub fn expand(abbreviation: &str, user: &UserConfig) -> Result<String, ExpandError> {
    expand_with(abbreviation, &resolve_config(user), None)
}

/// Expand with a resolved config. Stylesheet expansion uses `db` when
/// given and builds a database from `config.snippets` otherwise.
pub fn expand_with(
    abbreviation: &str,
    config: &Config,
    db: Option<&SnippetDatabase>,
) -> Result<String, ExpandError> {
    let _span = tracing::debug_span!(
        "expand",
        syntax = config.syntax.as_str(),
        kind = ?config.kind
    )
    .entered();

    match config.kind {
        SyntaxType::Markup => {
            let mut abbr = parse_markup(abbreviation, config)?;
            resolve::resolve_snippets(&mut abbr, config);
            transform::transform(&mut abbr, config);
            Ok(stringify_markup(&abbr, config))
        }
        SyntaxType::Stylesheet => {
            let properties = parse_stylesheet(abbreviation, config)?;
            let owned;
            let db = match db {
                Some(db) => db,
                None => {
                    owned = SnippetDatabase::from_config(config);
                    &owned
                }
            };
            let resolved = stylesheet::resolve(properties, db, config);
            Ok(css::stringify(&resolved, config))
        }
    }
}

/// Parse and unroll a markup abbreviation with the parser options taken
/// from `config`.
pub fn parse_markup(abbreviation: &str, config: &Config) -> Result<Abbreviation, ParseError> {
    let options = ParseOptions {
        jsx: config.options.jsx,
        text: config.text.clone(),
        variables: config.variables.clone(),
        max_repeat: config.max_repeat,
        href: config.options.markup.href,
    };
    expando_parser::parse_abbreviation(abbreviation, &options)
}

/// Parse a stylesheet abbreviation; inside a property value the whole
/// input is parsed as that value.
pub fn parse_stylesheet(abbreviation: &str, config: &Config) -> Result<Vec<CssProperty>, ParseError> {
    expando_parser::parse_stylesheet(abbreviation, stylesheet::value_scope(config).is_some())
}

fn stringify_markup(abbr: &Abbreviation, config: &Config) -> String {
    match IndentSyntax::for_syntax(&config.syntax, config) {
        Some(syntax) => indent::stringify(abbr, config, &syntax),
        None => html::stringify(abbr, config),
    }
}

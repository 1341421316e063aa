//! WASM bindings for the expando abbreviation expander.
//!
//! Exposes `expand()` to JavaScript via wasm-bindgen. Options are passed as
//! a plain JS object with the same keys as the JSON options file.

use expando_codegen::UserConfig;
use wasm_bindgen::prelude::*;

/// Expand an abbreviation.
///
/// `config` is an optional object such as
/// `{ syntax: "css", options: { "stylesheet.shortHex": false } }`.
/// Throws a JS error with the abbreviation and a caret under the failing
/// position when the abbreviation is invalid.
#[wasm_bindgen]
pub fn expand(abbreviation: &str, config: JsValue) -> Result<String, JsError> {
    let user: UserConfig = if config.is_undefined() || config.is_null() {
        UserConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&format!("Invalid options: {e}")))?
    };
    run(abbreviation, &user).map_err(|message| JsError::new(&message))
}

/// Get the expander version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn run(abbreviation: &str, user: &UserConfig) -> Result<String, String> {
    expando_codegen::expand(abbreviation, user).map_err(|e| format!("{e}\n{}", e.ruler()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use expando_codegen::TextInput;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Native tests (non-WASM): the same pipeline the binding calls
    // =========================================================================

    fn native_expand(abbreviation: &str, user: &UserConfig) -> String {
        run(abbreviation, user).unwrap()
    }

    #[test]
    fn test_markup() {
        assert_eq!(
            native_expand("ul>li*2", &UserConfig::default()),
            "<ul>\n\t<li>${1}</li>\n\t<li>${2}</li>\n</ul>"
        );
    }

    #[test]
    fn test_stylesheet() {
        let user = UserConfig {
            syntax: Some("css".into()),
            ..Default::default()
        };
        assert_eq!(native_expand("bd1-s#f00", &user), "border: 1px solid #f00;");
    }

    #[test]
    fn test_options_from_json() {
        let user: UserConfig = serde_json::from_str(
            r#"{ "syntax": "css", "options": { "stylesheet.shortHex": false } }"#,
        )
        .unwrap();
        assert_eq!(native_expand("c#fff", &user), "color: #ffffff;");
    }

    #[test]
    fn test_wrap_text() {
        let user = UserConfig {
            text: Some(TextInput::Single("hello".into())),
            ..Default::default()
        };
        assert_eq!(native_expand("p", &user), "<p>hello</p>");
    }

    #[test]
    fn test_error_message_has_ruler() {
        let message = run("a)", &UserConfig::default()).unwrap_err();
        assert!(message.ends_with("a)\n ^"));
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }

    #[test]
    fn test_independent_expansions() {
        let user = UserConfig {
            syntax: Some("xhtml".into()),
            ..Default::default()
        };
        assert_eq!(native_expand("br", &user), "<br />");
        assert_eq!(native_expand("br", &UserConfig::default()), "<br>");
    }
}

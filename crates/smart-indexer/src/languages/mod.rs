pub mod javascript;
pub mod typescript;

use crate::parse::LanguageParser;

/// Route a URI to the `LanguageParser` that understands its extension, or
/// `None` if the extension isn't TS/JS/TSX/JSX.
pub fn parser_for_uri(uri: &str) -> Option<Box<dyn LanguageParser>> {
    let ext = uri.rsplit('.').next()?;
    match ext {
        "ts" | "tsx" => Some(Box::new(typescript::TypeScriptParser)),
        "js" | "jsx" | "mjs" | "cjs" => Some(Box::new(javascript::JavaScriptParser)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_extensions() {
        assert!(parser_for_uri("file:///a.ts").is_some());
        assert!(parser_for_uri("file:///a.tsx").is_some());
        assert!(parser_for_uri("file:///a.js").is_some());
        assert!(parser_for_uri("file:///a.jsx").is_some());
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert!(parser_for_uri("file:///a.py").is_none());
        assert!(parser_for_uri("file:///a").is_none());
    }
}

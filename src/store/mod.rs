//! Scoped SQLite access.
//!
//! [`Scope`] owns the connection lifecycle. [`Source`] and [`Sink`] keep all
//! SQL text in one place, implemented directly on [`rusqlite::Connection`]
//! so they work inside a scope's transaction through deref.
mod scope;
mod sink;
mod source;

pub use scope::*;
pub use sink::*;
pub use source::*;

/// Quotes an identifier for interpolation into SQL text.
pub fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quotes and comma-joins a list of identifiers.
pub fn quotes<S: AsRef<str>>(idents: &[S]) -> String {
    idents
        .iter()
        .map(|ident| quote(ident.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_escapes_embedded_quotes() {
        assert_eq!(quote("id"), "\"id\"");
        assert_eq!(quote("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quotes(&["a", "b"]), "\"a\", \"b\"");
    }
}

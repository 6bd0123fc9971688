//! `${name}` binding autocomplete over free text.
//!
//! Cursors are byte offsets into the text.

use crate::registry::{VariableRegistry, VariableSymbol};

pub const BINDING_OPEN: &str = "${";
pub const BINDING_CLOSE: char = '}';

/// An unclosed binding before the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionQuery<'a> {
    /// The text the query was made over.
    pub text: &'a str,
    /// Offset of the opening `${`.
    pub start: usize,
    pub cursor: usize,
    /// Text typed after `${`, used as the lookup key.
    pub prefix: &'a str,
}

/// Text and cursor after accepting a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub cursor: usize,
}

/// Finds the binding being typed at `cursor`, if any.
///
/// Returns `None` when the cursor is out of range or inside a character,
/// when there is no `${` before it, or when that binding is already closed.
pub fn query(text: &str, cursor: usize) -> Option<CompletionQuery<'_>> {
    let before = text.get(..cursor)?;
    let start = before.rfind(BINDING_OPEN)?;
    let prefix = &before[start + BINDING_OPEN.len()..];
    if prefix.contains(BINDING_CLOSE) {
        return None;
    }
    Some(CompletionQuery {
        text,
        start,
        cursor,
        prefix,
    })
}

impl CompletionQuery<'_> {
    /// Replaces `${prefix` with `${name}` and places the cursor after it.
    pub fn accept(&self, name: &str) -> Completion {
        let reference = format!("{BINDING_OPEN}{name}{BINDING_CLOSE}");
        let mut out = String::with_capacity(self.text.len() + reference.len());
        out.push_str(&self.text[..self.start]);
        out.push_str(&reference);
        out.push_str(&self.text[self.cursor..]);
        Completion {
            text: out,
            cursor: self.start + reference.len(),
        }
    }
}

impl VariableRegistry {
    /// Symbols matching the binding being typed at `cursor`.
    pub fn suggest(&self, text: &str, cursor: usize) -> Vec<&VariableSymbol> {
        query(text, cursor)
            .map(|query| self.lookup(query.prefix))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_open_binding_before_cursor() {
        let text = "select * from T where ID=${My_Ac";
        let query = query(text, text.len()).unwrap();
        assert_eq!(query.prefix, "My_Ac");
        assert_eq!(&text[query.start..query.start + 2], "${");
    }

    #[test]
    fn closed_binding_offers_nothing() {
        let text = "${My_A} and more";
        assert!(query(text, text.len()).is_none());
        assert!(query(text, 6).is_some());
        assert!(query("no binding", 4).is_none());
    }

    #[test]
    fn bad_cursor_offers_nothing() {
        assert!(query("${x", 10).is_none());
        let text = "${é";
        assert!(query(text, 3).is_none());
        assert!(query(text, 4).is_some());
    }

    #[test]
    fn accept_replaces_through_cursor() {
        let text = "id=${My_Ac tail";
        let cursor = "id=${My_Ac".len();
        let completion = query(text, cursor).unwrap().accept("My_AcctId");
        assert_eq!(completion.text, "id=${My_AcctId} tail");
        assert_eq!(completion.cursor, "id=${My_AcctId}".len());
    }

    #[test]
    fn accept_uses_the_queried_text() {
        let text = String::from("é ${Ac");
        let pending = query(&text, text.len()).unwrap();
        assert_eq!(pending.text, text);
        let completion = pending.accept("My_Acct");
        assert_eq!(completion.text, "é ${My_Acct}");
        assert_eq!(completion.cursor, completion.text.len());
    }

    #[test]
    fn nearest_open_token_wins() {
        let text = "${A}-${B";
        assert_eq!(query(text, text.len()).unwrap().prefix, "B");
    }
}

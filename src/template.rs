//! Placeholder token substitution engine.
//!
//! Template files and paths carry literal double-bracketed tokens such as
//! `[[service-name]]` or `[[DomainClass]]`. A [`TokenMap`] pairs each token
//! with its replacement value; [`substitute`] rewrites a string in a single
//! left-to-right pass with non-overlapping match semantics:
//!
//! - At each position the longest matching token wins.
//! - Replacement values are never rescanned, so a value containing another
//!   token's text is left alone.
//!
//! The engine makes no idempotence promise. Re-running a substitution is a
//! no-op only because no token occurrences remain in the output, which is a
//! consequence of totality, not a guarantee.

use std::collections::HashMap;

/// Opening delimiter of a placeholder token.
pub const TOKEN_OPEN: &str = "[[";
/// Closing delimiter of a placeholder token.
pub const TOKEN_CLOSE: &str = "]]";

/// An ordered mapping from placeholder token to replacement value.
///
/// Tokens are stored with their delimiters (`[[key]]`). Lookup order during
/// substitution is longest-token-first, so a map containing both
/// `[[database]]` and `[[database-url]]` resolves the longer token at a
/// position where both match.
#[derive(Debug, Clone, Default)]
pub struct TokenMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token under `key` (delimiters are added here). Inserting an
    /// existing key overwrites its value.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let token = format!("{}{}{}", TOKEN_OPEN, key, TOKEN_CLOSE);
        let value = value.into();
        if let Some(&pos) = self.index.get(&token) {
            self.entries[pos].1 = value;
        } else {
            self.index.insert(token.clone(), self.entries.len());
            self.entries.push((token, value));
        }
    }

    /// Declared tokens, with delimiters.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries sorted longest-token-first, the order the scanner tries them.
    fn scan_order(&self) -> Vec<(&str, &str)> {
        let mut ordered: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(t, v)| (t.as_str(), v.as_str()))
            .collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
        ordered
    }
}

/// Result of a substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The rewritten string.
    pub output: String,
    /// Number of token occurrences replaced.
    pub replaced: usize,
}

/// Replace every token occurrence in `input` with its mapped value.
///
/// Single pass, left to right. Text that is not part of a token is copied
/// through unchanged, including stray `[[` sequences that do not form a
/// declared token.
pub fn substitute(input: &str, tokens: &TokenMap) -> Substitution {
    if tokens.is_empty() {
        return Substitution {
            output: input.to_string(),
            replaced: 0,
        };
    }

    let ordered = tokens.scan_order();
    let mut output = String::with_capacity(input.len());
    let mut replaced = 0;
    let mut rest = input;

    'outer: while !rest.is_empty() {
        // Tokens all start with the open delimiter; skip ahead to the next
        // candidate position instead of testing every byte.
        let Some(open) = rest.find(TOKEN_OPEN) else {
            output.push_str(rest);
            break;
        };
        output.push_str(&rest[..open]);
        rest = &rest[open..];

        for (token, value) in &ordered {
            if rest.starts_with(token) {
                output.push_str(value);
                rest = &rest[token.len()..];
                replaced += 1;
                continue 'outer;
            }
        }

        // Not a declared token; emit the delimiter literally and move on.
        output.push_str(TOKEN_OPEN);
        rest = &rest[TOKEN_OPEN.len()..];
    }

    Substitution { output, replaced }
}

/// Returns the first declared token occurring in `input`, if any.
///
/// Used to assert totality after composition: a finished tree must contain
/// zero occurrences of any declared token.
pub fn find_token<'a>(input: &str, tokens: &'a TokenMap) -> Option<&'a str> {
    tokens.tokens().find(|token| input.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> TokenMap {
        let mut m = TokenMap::new();
        for (k, v) in pairs {
            m.insert(k, *v);
        }
        m
    }

    #[test]
    fn simple_substitution() {
        let tokens = map(&[("service-name", "currency-service"), ("port", "8082")]);
        let result = substitute("name: [[service-name]]\nport: [[port]]\n", &tokens);
        assert_eq!(result.output, "name: currency-service\nport: 8082\n");
        assert_eq!(result.replaced, 2);
    }

    #[test]
    fn no_tokens_in_input() {
        let tokens = map(&[("domain", "currency")]);
        let result = substitute("plain text, no placeholders", &tokens);
        assert_eq!(result.output, "plain text, no placeholders");
        assert_eq!(result.replaced, 0);
    }

    #[test]
    fn empty_input() {
        let tokens = map(&[("domain", "currency")]);
        let result = substitute("", &tokens);
        assert_eq!(result.output, "");
        assert_eq!(result.replaced, 0);
    }

    #[test]
    fn empty_map_is_identity() {
        let result = substitute("[[anything]] goes", &TokenMap::new());
        assert_eq!(result.output, "[[anything]] goes");
        assert_eq!(result.replaced, 0);
    }

    #[test]
    fn undeclared_token_passes_through() {
        let tokens = map(&[("domain", "currency")]);
        let result = substitute("[[unknown]] and [[domain]]", &tokens);
        assert_eq!(result.output, "[[unknown]] and currency");
        assert_eq!(result.replaced, 1);
    }

    #[test]
    fn multiple_occurrences_all_replaced() {
        let tokens = map(&[("domain", "currency")]);
        let result = substitute("[[domain]]/[[domain]]/[[domain]]", &tokens);
        assert_eq!(result.output, "currency/currency/currency");
        assert_eq!(result.replaced, 3);
    }

    #[test]
    fn adjacent_tokens() {
        let tokens = map(&[("a", "X"), ("b", "Y")]);
        let result = substitute("[[a]][[b]]", &tokens);
        assert_eq!(result.output, "XY");
        assert_eq!(result.replaced, 2);
    }

    #[test]
    fn longest_token_wins() {
        let tokens = map(&[("database", "db"), ("database-url", "jdbc:postgresql://x")]);
        // "[[database-url]]" starts with the text of "[[database" but must
        // resolve as the longer token.
        let result = substitute("url: [[database-url]]", &tokens);
        assert_eq!(result.output, "url: jdbc:postgresql://x");
        assert_eq!(result.replaced, 1);
    }

    #[test]
    fn replacement_value_is_not_rescanned() {
        let tokens = map(&[("a", "[[b]]"), ("b", "never")]);
        let result = substitute("[[a]]", &tokens);
        // The emitted value still reads "[[b]]"; it is not resolved again.
        assert_eq!(result.output, "[[b]]");
        assert_eq!(result.replaced, 1);
    }

    #[test]
    fn second_pass_is_a_no_op_once_tokens_are_gone() {
        let tokens = map(&[("service-name", "currency-service")]);
        let first = substitute("app: [[service-name]]", &tokens);
        let second = substitute(&first.output, &tokens);
        assert_eq!(second.output, first.output);
        assert_eq!(second.replaced, 0);
    }

    #[test]
    fn overwriting_a_key_keeps_one_entry() {
        let mut tokens = TokenMap::new();
        tokens.insert("port", "1111");
        tokens.insert("port", "2222");
        assert_eq!(tokens.len(), 1);
        let result = substitute("[[port]]", &tokens);
        assert_eq!(result.output, "2222");
    }

    #[test]
    fn find_token_reports_remaining_occurrences() {
        let tokens = map(&[("domain", "currency"), ("port", "8082")]);
        assert_eq!(find_token("port is [[port]]", &tokens), Some("[[port]]"));
        assert_eq!(find_token("all substituted", &tokens), None);
    }

    #[test]
    fn unicode_content_is_preserved() {
        let tokens = map(&[("domain", "währung")]);
        let result = substitute("domäne: [[domain]] 🎉", &tokens);
        assert_eq!(result.output, "domäne: währung 🎉");
    }

    #[test]
    fn lone_open_delimiter_at_end() {
        let tokens = map(&[("domain", "currency")]);
        let result = substitute("trailing [[", &tokens);
        assert_eq!(result.output, "trailing [[");
        assert_eq!(result.replaced, 0);
    }
}

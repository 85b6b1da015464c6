/// Tokenize text for TEXT field indexing and lookup: lowercase with
/// locale-insensitive case folding, split on any codepoint that is not a
/// letter or digit, drop empty tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fold a single query term the same way indexed tokens are folded.
pub fn fold_term(term: &str) -> String {
    term.trim().to_lowercase()
}

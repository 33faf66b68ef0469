/// Lower-cased word tokens. Apostrophes inside words are kept so that
/// contractions like `don't` survive as one token.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|word| {
            word.trim_matches(|c: char| c == '\'' || c == '\u{2019}')
                .replace('\u{2019}', "'")
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Rejects empty or whitespace-only input.
pub(crate) fn require_text(text: &str) -> Result<&str, crate::SentimentError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(crate::SentimentError::InvalidInput);
    }
    Ok(trimmed)
}

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s']").unwrap());
static APOSTROPHE_TRIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'+|'+$").unwrap());

/// Tokenize text into lowercase words.
/// Preserves apostrophes within words (e.g., "don't").
/// No stemming, no stop-word removal.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned = NON_WORD.replace_all(text, " ");
    cleaned
        .to_lowercase()
        .split_whitespace()
        .map(|t| APOSTROPHE_TRIM.replace_all(t, "").to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Character trigrams of a word padded with `^` and `$` boundary markers.
/// Words shorter than one character produce nothing.
pub fn char_trigrams(word: &str) -> Vec<String> {
    let padded: Vec<char> = std::iter::once('^')
        .chain(word.chars())
        .chain(std::iter::once('$'))
        .collect();
    if padded.len() < 3 {
        return Vec::new();
    }
    padded.windows(3).map(|w| w.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
    }

    #[test]
    fn test_tokenize_apostrophes() {
        assert_eq!(tokenize("don't 'quoted'"), vec!["don't", "quoted"]);
    }

    #[test]
    fn test_tokenize_paths_and_symbols() {
        assert_eq!(
            tokenize("JWT-based auth/v2"),
            vec!["jwt", "based", "auth", "v2"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,;: ").is_empty());
    }

    #[test]
    fn test_char_trigrams() {
        assert_eq!(char_trigrams("auth"), vec!["^au", "aut", "uth", "th$"]);
        assert_eq!(char_trigrams("a"), vec!["^a$"]);
        assert!(char_trigrams("").is_empty());
    }
}

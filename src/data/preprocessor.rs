// ============================================================
// Layer 4 — Line Preprocessor
// ============================================================
// Turns one raw corpus line into the token list the vocabulary
// and indexer work on.
//
// Steps (applied in order):
//   1. Trim
//   2. Lowercase
//   3. Split on Unicode whitespace
//   4. Keep at most max_length tokens
//
// Characters that are not whitespace (zero-width space, BOM,
// control codes) stay inside their token.
// Dropping tokens past max_length is truncation, not an error.
//
// Reference: Rust Book §8 (Strings in Rust)

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    /// Maximum number of tokens kept per line
    max_length: usize,
}

impl Preprocessor {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Normalise and tokenise a single line.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        line.trim()
            .to_lowercase()
            .split_whitespace()
            .take(self.max_length)
            .map(str::to_string)
            .collect()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits() {
        let p = Preprocessor::new(10);
        assert_eq!(p.tokenize("  The Cat  SAT "), vec!["the", "cat", "sat"]);
    }

    #[test]
    fn test_truncates_to_max_length() {
        let p = Preprocessor::new(2);
        assert_eq!(p.tokenize("a b c d"), vec!["a", "b"]);
    }

    #[test]
    fn test_only_whitespace_separates_tokens() {
        let p = Preprocessor::new(10);
        assert_eq!(p.tokenize("a\u{200B}b\u{0001}c"), vec!["a\u{200B}b\u{0001}c"]);
        assert_eq!(p.tokenize("\u{FEFF}Word"), vec!["\u{FEFF}word"]);
        assert_eq!(p.tokenize("a\tb\u{00A0}c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_line() {
        let p = Preprocessor::new(10);
        assert!(p.tokenize("").is_empty());
        assert!(p.tokenize("   ").is_empty());
    }

    #[test]
    fn test_zero_max_length() {
        let p = Preprocessor::new(0);
        assert!(p.tokenize("a b").is_empty());
    }
}

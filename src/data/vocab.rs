// ============================================================
// Layer 4 — Vocabulary Builder
// ============================================================
// Turns tokenised corpora into a bounded, deterministic
// token ↔ index mapping.
//
// Algorithm:
//   1. Flatten every token of every document of every group
//   2. Count occurrences
//   3. Sort (count, token) pairs in DESCENDING order:
//        higher count first; on equal counts the token that
//        compares greater (byte-wise, i.e. by code point) first
//   4. Prepend <sos> <eos> <unk> <pad>
//   5. Truncate to max_vocab_size
//   6. Enumerate positions into both directions
//
// The tie-break decides which tokens survive truncation, so the
// ordering must be reproduced exactly:
//
//   counts {b: 2, a: 2, c: 1} → [<sos>, <eos>, <unk>, <pad>, b, a, c]
//
// Reference: Rust Book §8 (HashMap), std::cmp::Ordering

use anyhow::{bail, Result};
use std::{cmp::Reverse, collections::HashMap};

use crate::domain::special_tokens::{special_token_list, SpecialToken, SPECIAL_TOKEN_COUNT};

/// Bijective token ↔ index mapping over `[0, size)`.
/// The four special tokens always occupy indices 0..4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    idx2token: Vec<String>,
    token2idx: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from an already ordered token list.
    ///
    /// Fails if the list does not start with the special tokens
    /// or contains a duplicate.
    pub fn from_tokens(idx2token: Vec<String>) -> Result<Self> {
        if idx2token.len() < SPECIAL_TOKEN_COUNT {
            bail!(
                "vocabulary has {} tokens, fewer than the {} special tokens",
                idx2token.len(),
                SPECIAL_TOKEN_COUNT
            );
        }
        for special in SpecialToken::ALL {
            if idx2token[special.index()] != special.as_str() {
                bail!(
                    "expected '{}' at index {}, found '{}'",
                    special.as_str(),
                    special.index(),
                    idx2token[special.index()]
                );
            }
        }

        let mut token2idx = HashMap::with_capacity(idx2token.len());
        for (idx, token) in idx2token.iter().enumerate() {
            if token2idx.insert(token.clone(), idx).is_some() {
                bail!("duplicate vocabulary token '{}'", token);
            }
        }

        Ok(Self { idx2token, token2idx })
    }

    /// Number of tokens, special tokens included
    pub fn size(&self) -> usize {
        self.idx2token.len()
    }

    /// Index of `token`, or `None` if out of vocabulary
    pub fn token_to_idx(&self, token: &str) -> Option<usize> {
        self.token2idx.get(token).copied()
    }

    /// Index of `token`, falling back to `<unk>`
    pub fn idx_or_unk(&self, token: &str) -> usize {
        self.token_to_idx(token).unwrap_or(self.unk_idx())
    }

    /// Token at `idx`, or `None` if the index is past the vocabulary
    pub fn idx_to_token(&self, idx: usize) -> Option<&str> {
        self.idx2token.get(idx).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token2idx.contains_key(token)
    }

    /// Ordered token list (the idx → token direction)
    pub fn idx2token(&self) -> &[String] {
        &self.idx2token
    }

    /// The token → idx direction
    pub fn token2idx(&self) -> &HashMap<String, usize> {
        &self.token2idx
    }

    pub fn sos_idx(&self) -> usize { SpecialToken::Sos.index() }
    pub fn eos_idx(&self) -> usize { SpecialToken::Eos.index() }
    pub fn unk_idx(&self) -> usize { SpecialToken::Unk.index() }
    pub fn pad_idx(&self) -> usize { SpecialToken::Pad.index() }
}

/// Build a vocabulary from groups of tokenised documents.
///
/// `text` is a list of groups (e.g. the source side and the target
/// side of the training split); each group is a list of documents,
/// each document a list of tokens.
///
/// `max_vocab_size` is raised to the number of special tokens if it
/// is smaller, so the reserved indices always exist. Corpus tokens
/// spelled like a special token are not counted a second time.
pub fn build_vocab<G: AsRef<[Vec<String>]>>(text: &[G], max_vocab_size: usize) -> Vocabulary {
    // ── Step 1: Count every token ────────────────────────────────────────────
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for group in text {
        for doc in group.as_ref() {
            for word in doc {
                if SpecialToken::from_token(word).is_none() {
                    *counts.entry(word.as_str()).or_insert(0) += 1;
                }
            }
        }
    }

    // ── Step 2: Sort (count, token) descending ───────────────────────────────
    let mut token_count: Vec<(usize, &str)> = counts
        .into_iter()
        .map(|(token, count)| (count, token))
        .collect();
    token_count.sort_unstable_by_key(|&pair| Reverse(pair));

    // ── Step 3: Prepend specials, truncate ───────────────────────────────────
    let max_vocab_size = max_vocab_size.max(SPECIAL_TOKEN_COUNT);
    let mut tokens = special_token_list();
    tokens.extend(
        token_count
            .into_iter()
            .take(max_vocab_size - SPECIAL_TOKEN_COUNT)
            .map(|(_, token)| token.to_string()),
    );

    tracing::debug!("Built vocabulary with {} tokens", tokens.len());

    let token2idx = tokens
        .iter()
        .enumerate()
        .map(|(idx, token)| (token.clone(), idx))
        .collect();
    Vocabulary { idx2token: tokens, token2idx }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn docs(lines: &[&str]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.split_whitespace().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_specials_come_first() {
        let vocab = build_vocab(&[docs(&["a b c"])], 100);
        assert_eq!(&vocab.idx2token()[..4], &["<sos>", "<eos>", "<unk>", "<pad>"]);
        assert_eq!(vocab.sos_idx(), 0);
        assert_eq!(vocab.eos_idx(), 1);
        assert_eq!(vocab.unk_idx(), 2);
        assert_eq!(vocab.pad_idx(), 3);
    }

    #[test]
    fn test_frequency_then_descending_token_order() {
        // b:2 a:2 c:1 d:3
        let vocab = build_vocab(&[docs(&["a b d", "b a d c d"])], 100);
        assert_eq!(&vocab.idx2token()[4..], &["d", "b", "a", "c"]);
    }

    #[test]
    fn test_tie_break_is_codepoint_descending() {
        // uppercase sorts before lowercase by code point, so on a tie
        // the lowercase token is ranked higher
        let vocab = build_vocab(&[docs(&["B a b A"])], 100);
        assert_eq!(&vocab.idx2token()[4..], &["b", "a", "B", "A"]);
    }

    #[test]
    fn test_truncation_keeps_top_tokens() {
        let vocab = build_vocab(&[docs(&["x x x y y z"]), docs(&["w"])], 6);
        assert_eq!(vocab.size(), 6);
        assert_eq!(&vocab.idx2token()[4..], &["x", "y"]);
        assert!(!vocab.contains("z"));
        assert!(!vocab.contains("w"));
    }

    #[test]
    fn test_tie_at_cut_keeps_highest_token() {
        // b:1 a:1 c:1, one slot left after the specials
        let vocab = build_vocab(&[docs(&["b a c"])], 5);
        assert_eq!(&vocab.idx2token()[4..], &["c"]);
        assert!(!vocab.contains("a"));
        assert!(!vocab.contains("b"));
    }

    #[test]
    fn test_groups_are_counted_together() {
        let src = docs(&["cat"]);
        let tgt = docs(&["dog dog"]);
        let vocab = build_vocab(&[&src, &tgt], 100);
        assert_eq!(&vocab.idx2token()[4..], &["dog", "cat"]);
    }

    #[test]
    fn test_size_is_min_of_limit_and_distinct_plus_specials() {
        let corpus = [docs(&["a b c"])];
        assert_eq!(build_vocab(&corpus, 100).size(), 7);
        assert_eq!(build_vocab(&corpus, 5).size(), 5);
    }

    #[test]
    fn test_specials_survive_tiny_limit() {
        let vocab = build_vocab(&[docs(&["a b"])], 1);
        assert_eq!(vocab.size(), 4);
        assert_eq!(vocab.idx_to_token(2), Some("<unk>"));
    }

    #[test]
    fn test_empty_corpus_gives_only_specials() {
        let empty: Vec<Vec<String>> = Vec::new();
        let vocab = build_vocab(&[empty], 50);
        assert_eq!(vocab.size(), 4);
    }

    #[test]
    fn test_special_spelling_in_corpus_not_duplicated() {
        let vocab = build_vocab(&[docs(&["<unk> <unk> cat"])], 50);
        assert_eq!(vocab.size(), 5);
        assert_eq!(vocab.token_to_idx("<unk>"), Some(2));
    }

    #[test]
    fn test_deterministic_and_bijective() {
        let corpus = [docs(&["the cat sat on the mat", "a dog sat on a log", "the end"])];
        let v1 = build_vocab(&corpus, 9);
        let v2 = build_vocab(&corpus, 9);
        assert_eq!(v1, v2);
        for token in v1.idx2token() {
            let idx = v1.token_to_idx(token).unwrap();
            assert_eq!(v1.idx_to_token(idx), Some(token.as_str()));
        }
        assert_eq!(v1.token2idx().len(), v1.size());
    }

    #[test]
    fn test_idx_or_unk() {
        let vocab = build_vocab(&[docs(&["cat"])], 50);
        assert_eq!(vocab.idx_or_unk("cat"), 4);
        assert_eq!(vocab.idx_or_unk("fox"), vocab.unk_idx());
    }

    #[test]
    fn test_from_tokens_rejects_bad_lists() {
        assert!(Vocabulary::from_tokens(vec!["<sos>".into()]).is_err());

        let mut wrong_order = special_token_list();
        wrong_order.swap(0, 1);
        assert!(Vocabulary::from_tokens(wrong_order).is_err());

        let mut dup = special_token_list();
        dup.push("a".into());
        dup.push("a".into());
        assert!(Vocabulary::from_tokens(dup).is_err());
    }

    #[test]
    fn test_from_tokens_matches_builder() {
        let built = build_vocab(&[docs(&["a b b"])], 10);
        let rebuilt = Vocabulary::from_tokens(built.idx2token().to_vec()).unwrap();
        assert_eq!(built, rebuilt);
    }
}

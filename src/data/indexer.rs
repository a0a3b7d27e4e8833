// ============================================================
// Layer 4 — Indexer
// ============================================================
// Converts parallel source/target token sequences into
// IndexedExamples using a fixed vocabulary.
//
// Standard mode:
//   every token → vocab index, or <unk> if missing
//
// Generation (copy) mode additionally computes, per example:
//
//   article2ids   source tokens → extended ids + OOV list
//   abstract2ids  target tokens → ids that may point into the
//                 source's OOV list
//
// Worked example (vocab_size = 6, fox is OOV):
//
//   vocab   {<sos>:0 <eos>:1 <unk>:2 <pad>:3 cat:4 dog:5}
//   source  [cat, fox]  → extended [4, 6], oovs [fox]
//   target  [dog, fox]  → output   [5, 6, 1]
//
// A target OOV token that never appears in the source stays
// <unk>: the decoder can only copy what the source contains.
//
// Reference: See et al. (2017) Get To The Point

use crate::data::vocab::Vocabulary;
use crate::domain::example::{IndexedExample, OovExtension};

// ─── OovRegistry ──────────────────────────────────────────────────────────────
/// Ordered set of one example's out-of-vocabulary tokens, keyed by
/// first occurrence. The k-th distinct token gets `vocab_size + k`.
///
/// Lookups scan the list, which is quadratic in the number of distinct
/// OOV tokens of a single example. OOV lists are short (bounded by the
/// source length), so a hash index is not kept alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OovRegistry {
    tokens: Vec<String>,
}

impl OovRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `token`, registering it first if unseen
    pub fn position_or_insert(&mut self, token: &str) -> usize {
        match self.position(token) {
            Some(pos) => pos,
            None => {
                self.tokens.push(token.to_string());
                self.tokens.len() - 1
            }
        }
    }

    /// Position of `token` if already registered
    pub fn position(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}

/// Map source tokens to extended ids.
///
/// Returns `(extended_ids, oovs)`: in-vocabulary tokens keep their
/// index; each OOV token maps to `vocab_size + position in oovs`.
pub fn article2ids(article_words: &[String], vocab: &Vocabulary) -> (Vec<usize>, Vec<String>) {
    let mut oovs = OovRegistry::new();
    let ids = article_words
        .iter()
        .map(|w| match vocab.token_to_idx(w) {
            Some(i) => i,
            None => vocab.size() + oovs.position_or_insert(w),
        })
        .collect();
    (ids, oovs.into_tokens())
}

/// Map target tokens to ids that may copy from the source's OOV list.
pub fn abstract2ids(abstract_words: &[String], article_oovs: &[String], vocab: &Vocabulary) -> Vec<usize> {
    abstract_words
        .iter()
        .map(|w| match vocab.token_to_idx(w) {
            Some(i) => i,
            None => match article_oovs.iter().position(|o| o == w) {
                Some(pos) => vocab.size() + pos,
                None => vocab.unk_idx(),
            },
        })
        .collect()
}

/// Index a parallel corpus.
///
/// Pairs are zipped, so a longer side is cut to the shorter one.
pub fn text2idx(
    source_text: &[Vec<String>],
    target_text: &[Vec<String>],
    vocab:       &Vocabulary,
    is_gen:      bool,
) -> Vec<IndexedExample> {
    let sos_idx = vocab.sos_idx();
    let eos_idx = vocab.eos_idx();

    source_text
        .iter()
        .zip(target_text)
        .map(|(source_sent, target_sent)| {
            let source_idx: Vec<usize> = source_sent.iter().map(|w| vocab.idx_or_unk(w)).collect();

            let mut input_target_idx = Vec::with_capacity(target_sent.len() + 1);
            input_target_idx.push(sos_idx);
            input_target_idx.extend(target_sent.iter().map(|w| vocab.idx_or_unk(w)));

            let (mut output_target_idx, extension) = if is_gen {
                let (extended_source_idx, oovs) = article2ids(source_sent, vocab);
                let output = abstract2ids(target_sent, &oovs, vocab);
                (output, Some(OovExtension { extended_source_idx, oovs }))
            } else {
                let output = target_sent.iter().map(|w| vocab.idx_or_unk(w)).collect();
                (output, None)
            };
            output_target_idx.push(eos_idx);

            IndexedExample {
                source_length: source_idx.len(),
                target_length: input_target_idx.len(),
                source_idx,
                input_target_idx,
                output_target_idx,
                extension,
            }
        })
        .collect()
}

/// Map (possibly extended) ids back to tokens.
///
/// Ids past the vocabulary resolve through `oovs`; anything still
/// unresolved becomes `<unk>`.
pub fn decode_ids(ids: &[usize], vocab: &Vocabulary, oovs: &[String]) -> Vec<String> {
    let unk = vocab.idx2token()[vocab.unk_idx()].as_str();
    ids.iter()
        .map(|&i| {
            vocab
                .idx_to_token(i)
                .or_else(|| i.checked_sub(vocab.size()).and_then(|k| oovs.get(k)).map(String::as_str))
                .unwrap_or(unk)
                .to_string()
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    /// {<sos>:0, <eos>:1, <unk>:2, <pad>:3, cat:4, dog:5}
    fn cat_dog_vocab() -> Vocabulary {
        let mut tokens = crate::domain::special_tokens::special_token_list();
        tokens.push("cat".into());
        tokens.push("dog".into());
        Vocabulary::from_tokens(tokens).unwrap()
    }

    #[test]
    fn test_cat_dog_fox_example() {
        let vocab = cat_dog_vocab();
        let out = text2idx(&[toks("cat fox")], &[toks("dog fox")], &vocab, true);
        let ex = &out[0];
        let ext = ex.extension.as_ref().unwrap();
        assert_eq!(ext.extended_source_idx, vec![4, 6]);
        assert_eq!(ext.oovs, vec!["fox"]);
        assert_eq!(ex.output_target_idx, vec![5, 6, 1]);
        assert_eq!(ex.source_idx, vec![4, 2]);
        assert_eq!(ex.input_target_idx, vec![0, 5, 2]);
    }

    #[test]
    fn test_repeated_oov_reuses_index() {
        let vocab = cat_dog_vocab();
        let (ids, oovs) = article2ids(&toks("a b a c"), &vocab);
        assert_eq!(ids, vec![6, 7, 6, 8]);
        assert_eq!(oovs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_in_vocab_tokens_keep_index_between_oovs() {
        let vocab = cat_dog_vocab();
        let (ids, oovs) = article2ids(&toks("x cat y dog x"), &vocab);
        assert_eq!(ids, vec![6, 4, 7, 5, 6]);
        assert_eq!(oovs.len(), 2);
    }

    #[test]
    fn test_target_oov_copy_or_unk() {
        let vocab = cat_dog_vocab();
        let oovs = toks("fox owl");
        let ids = abstract2ids(&toks("owl hen cat fox"), &oovs, &vocab);
        assert_eq!(ids, vec![7, 2, 4, 6]);
    }

    #[test]
    fn test_standard_mode_uses_unk() {
        let vocab = cat_dog_vocab();
        let out = text2idx(&[toks("cat fox")], &[toks("dog fox")], &vocab, false);
        let ex = &out[0];
        assert!(ex.extension.is_none());
        assert_eq!(ex.output_target_idx, vec![5, 2, 1]);
        assert!(ex.oovs().is_empty());
    }

    #[test]
    fn test_lengths() {
        let vocab = cat_dog_vocab();
        let out = text2idx(&[toks("cat dog cat")], &[toks("dog")], &vocab, true);
        let ex = &out[0];
        assert_eq!(ex.source_length, 3);
        assert_eq!(ex.target_length, 2);
        assert_eq!(ex.input_target_idx.len(), ex.target_length);
        assert_eq!(ex.output_target_idx.len(), ex.target_length);
    }

    #[test]
    fn test_standard_roundtrip_without_oov() {
        let vocab = cat_dog_vocab();
        let src = toks("dog cat cat dog");
        let out = text2idx(&[src.clone()], &[src.clone()], &vocab, false);
        let ex = &out[0];
        assert_eq!(decode_ids(&ex.source_idx, &vocab, &[]), src);
        assert_eq!(decode_ids(&ex.input_target_idx[1..], &vocab, &[]), src);
        let n = ex.output_target_idx.len();
        assert_eq!(decode_ids(&ex.output_target_idx[..n - 1], &vocab, &[]), src);
    }

    #[test]
    fn test_decode_extended_ids() {
        let vocab = cat_dog_vocab();
        let oovs = toks("fox");
        assert_eq!(decode_ids(&[5, 6, 1], &vocab, &oovs), toks("dog fox <eos>"));
        assert_eq!(decode_ids(&[7], &vocab, &oovs), toks("<unk>"));
    }

    #[test]
    fn test_oov_registry_is_example_scoped() {
        let vocab = cat_dog_vocab();
        let out = text2idx(
            &[toks("fox"), toks("owl fox")],
            &[toks("fox"), toks("fox")],
            &vocab,
            true,
        );
        assert_eq!(out[0].extension.as_ref().unwrap().extended_source_idx, vec![6]);
        assert_eq!(out[1].extension.as_ref().unwrap().extended_source_idx, vec![6, 7]);
        assert_eq!(out[1].output_target_idx, vec![7, 1]);
    }

    #[test]
    fn test_registry_positions() {
        let mut reg = OovRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.position_or_insert("a"), 0);
        assert_eq!(reg.position_or_insert("b"), 1);
        assert_eq!(reg.position_or_insert("a"), 0);
        assert_eq!(reg.position("b"), Some(1));
        assert_eq!(reg.position("z"), None);
        assert_eq!(reg.len(), 2);
    }
}

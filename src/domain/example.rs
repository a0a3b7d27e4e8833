// ============================================================
// Layer 3 — Indexed Example Domain Type
// ============================================================
// One source/target pair after conversion from tokens to
// vocabulary indices.
//
//   source:  ["the", "cat", "sat"]
//   target:  ["cat", "sat"]
//
//   source_idx        = [idx(the), idx(cat), idx(sat)]
//   input_target_idx  = [<sos>, idx(cat), idx(sat)]     decoder input
//   output_target_idx = [idx(cat), idx(sat), <eos>]     decoder labels
//   target_length     = 3
//
// In generation (copy) mode every example also carries an
// extended source sequence in which out-of-vocabulary source
// tokens get example-local indices past the end of the
// vocabulary, plus the list of those tokens.
//
// Reference: See et al. (2017) Get To The Point (pointer-generator)

use serde::{Deserialize, Serialize};

/// Copy-mode fields of an indexed example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OovExtension {
    /// Source indices where the k-th distinct OOV token maps to
    /// `vocab_size + k` instead of `<unk>`
    pub extended_source_idx: Vec<usize>,

    /// Distinct OOV source tokens in first-occurrence order
    pub oovs: Vec<String>,
}

/// A fully indexed source/target pair. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedExample {
    pub source_idx:        Vec<usize>,
    pub source_length:     usize,
    pub input_target_idx:  Vec<usize>,
    pub output_target_idx: Vec<usize>,
    /// Length of `input_target_idx` (equal to `output_target_idx`'s)
    pub target_length:     usize,
    /// Present only when the corpus was indexed in generation mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension:         Option<OovExtension>,
}

impl IndexedExample {
    /// OOV tokens of this example (empty outside generation mode)
    pub fn oovs(&self) -> &[String] {
        self.extension
            .as_ref()
            .map(|e| e.oovs.as_slice())
            .unwrap_or(&[])
    }

    /// True if this example was indexed in generation mode
    pub fn is_gen(&self) -> bool {
        self.extension.is_some()
    }
}

// ============================================================
// Layer 3 — Special Tokens
// ============================================================
// Every vocabulary starts with the same four reserved symbols,
// always in this order:
//
//   index 0  <sos>  start of sequence (prepended to decoder input)
//   index 1  <eos>  end of sequence   (appended to decoder output)
//   index 2  <unk>  unknown token     (fallback for vocabulary misses)
//   index 3  <pad>  padding           (fills batch tensors on the right)
//
// Because the builder prepends them before truncation, a token's
// enum discriminant IS its vocabulary index.

use serde::{Deserialize, Serialize};

/// Number of reserved symbols at the start of every vocabulary.
pub const SPECIAL_TOKEN_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialToken {
    Sos = 0,
    Eos = 1,
    Unk = 2,
    Pad = 3,
}

impl SpecialToken {
    /// All special tokens in vocabulary order.
    pub const ALL: [SpecialToken; SPECIAL_TOKEN_COUNT] = [
        SpecialToken::Sos,
        SpecialToken::Eos,
        SpecialToken::Unk,
        SpecialToken::Pad,
    ];

    /// Surface form written into vocabulary files and decoded text
    pub fn as_str(self) -> &'static str {
        match self {
            SpecialToken::Sos => "<sos>",
            SpecialToken::Eos => "<eos>",
            SpecialToken::Unk => "<unk>",
            SpecialToken::Pad => "<pad>",
        }
    }

    /// Fixed vocabulary index of this token
    pub fn index(self) -> usize {
        self as usize
    }

    /// Reverse lookup from surface form
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == token)
    }
}

/// The special tokens as owned strings, ready to be prepended
/// to a frequency-sorted token list.
pub fn special_token_list() -> Vec<String> {
    SpecialToken::ALL.iter().map(|s| s.as_str().to_string()).collect()
}

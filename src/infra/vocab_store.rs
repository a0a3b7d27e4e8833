// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Saves and loads a Vocabulary so preprocessing, training and
// generation all use the exact same index assignment.
//
// On disk the vocabulary is the ordered idx → token list:
//
//   <dir>/vocab.json
//   ["<sos>", "<eos>", "<unk>", "<pad>", "the", "a", ...]
//
// token → idx is rebuilt on load by enumeration.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::vocab::Vocabulary;

pub const VOCAB_FILE: &str = "vocab.json";

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(VOCAB_FILE)
    }

    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.path();
        let json = serde_json::to_string_pretty(vocab.idx2token())?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write vocabulary to '{}'", path.display()))?;

        tracing::info!("Vocabulary of {} tokens saved to '{}'", vocab.size(), path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Vocabulary> {
        let path = self.path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read vocabulary from '{}'", path.display()))?;
        let tokens: Vec<String> = serde_json::from_str(&json)
            .with_context(|| format!("Malformed vocabulary file '{}'", path.display()))?;
        Vocabulary::from_tokens(tokens)
            .with_context(|| format!("Invalid vocabulary in '{}'", path.display()))
    }
}

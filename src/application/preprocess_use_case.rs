// ============================================================
// Layer 2 — PreprocessUseCase
// ============================================================
// Turns the raw parallel corpus into indexed examples:
//
//   Step 1: Load train/valid/test .src/.tgt   (Layer 4 - data)
//   Step 2: Build vocabulary from train       (Layer 4 - data)
//   Step 3: Index every split                 (Layer 4 - data)
//   Step 4: Persist vocab + indexed splits    (Layer 6 - infra)
//
// The vocabulary only ever sees the TRAIN source and target
// text. Validation and test words it has never seen become
// <unk> (or, in copy mode, extended OOV indices).
//
// Output files in <output_dir>:
//   vocab.json        ordered idx2token list
//   train.idx.json    Vec<IndexedExample>
//   valid.idx.json
//   test.idx.json
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::config::RunConfig;
use crate::data::{
    indexer::text2idx,
    loader::{load_split, DatasetSplit, ParallelCorpus},
    vocab::{build_vocab, Vocabulary},
};
use crate::domain::example::IndexedExample;
use crate::infra::vocab_store::VocabStore;

/// One indexed split plus the target text it was indexed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitData {
    pub examples:  Vec<IndexedExample>,
    /// Target token sequences, aligned with `examples`
    pub reference: Vec<Vec<String>>,
}

impl SplitData {
    fn index(corpus: ParallelCorpus, vocab: &Vocabulary, is_gen: bool) -> Self {
        let examples = text2idx(&corpus.source, &corpus.target, vocab, is_gen);
        let mut reference = corpus.target;
        reference.truncate(examples.len());
        Self { examples, reference }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Everything training needs from the corpus.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub vocab: Vocabulary,
    pub train: SplitData,
    pub valid: SplitData,
    pub test:  SplitData,
}

impl PreparedData {
    pub fn split(&self, split: DatasetSplit) -> &SplitData {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Valid => &self.valid,
            DatasetSplit::Test => &self.test,
        }
    }
}

// ─── PreprocessUseCase ────────────────────────────────────────────────────────
pub struct PreprocessUseCase {
    config: RunConfig,
}

impl PreprocessUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Load the corpus and build a fresh vocabulary from it.
    pub fn prepare(&self) -> Result<PreparedData> {
        let [train, valid, test] = self.load_splits()?;
        let vocab = build_vocab(&[&train.source, &train.target], self.config.max_vocab_size);
        tracing::info!("Built vocabulary of {} tokens", vocab.size());
        Ok(self.index_all(vocab, train, valid, test))
    }

    /// Full pipeline with persistence. The vocabulary is rebuilt from
    /// this corpus on every run and overwrites any vocab.json in
    /// `output_dir`.
    pub fn execute(&self) -> Result<PreparedData> {
        let cfg = &self.config;

        // ── Steps 1-3: Load, build vocabulary, index ─────────────────────────
        let prepared = self.prepare()?;

        // ── Step 4: Persist vocabulary and indexed splits ────────────────────
        VocabStore::new(&cfg.output_dir).save(&prepared.vocab)?;
        for split in DatasetSplit::ALL {
            let path = save_examples(&cfg.output_dir, split, &prepared.split(split).examples)?;
            tracing::info!(
                "Saved {} {} examples to '{}'",
                prepared.split(split).len(),
                split,
                path.display()
            );
        }

        Ok(prepared)
    }

    fn load_splits(&self) -> Result<[ParallelCorpus; 3]> {
        let cfg = &self.config;
        tracing::info!("Loading dataset from '{}'", cfg.dataset_dir.display());

        let load = |split| {
            load_split(&cfg.dataset_dir, split, cfg.max_source_length, cfg.max_target_length)
        };
        let splits = [load(DatasetSplit::Train)?, load(DatasetSplit::Valid)?, load(DatasetSplit::Test)?];

        tracing::info!(
            "Loaded {} train, {} valid, {} test pairs",
            splits[0].len(),
            splits[1].len(),
            splits[2].len()
        );
        Ok(splits)
    }

    fn index_all(
        &self,
        vocab: Vocabulary,
        train: ParallelCorpus,
        valid: ParallelCorpus,
        test:  ParallelCorpus,
    ) -> PreparedData {
        let is_gen = self.config.is_gen;
        PreparedData {
            train: SplitData::index(train, &vocab, is_gen),
            valid: SplitData::index(valid, &vocab, is_gen),
            test:  SplitData::index(test, &vocab, is_gen),
            vocab,
        }
    }
}

/// `<dir>/<split>.idx.json`
pub fn examples_path(dir: &Path, split: DatasetSplit) -> PathBuf {
    dir.join(format!("{split}.idx.json"))
}

pub fn save_examples(dir: &Path, split: DatasetSplit, examples: &[IndexedExample]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Cannot create '{}'", dir.display()))?;
    let path = examples_path(dir, split);
    let json = serde_json::to_string(examples)?;
    fs::write(&path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
    Ok(path)
}

pub fn load_examples(dir: &Path, split: DatasetSplit) -> Result<Vec<IndexedExample>> {
    let path = examples_path(dir, split);
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read indexed split '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Malformed indexed split '{}'", path.display()))
}

// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads plain-text parallel corpora from a dataset directory:
//
//   <dataset_dir>/
//     train.src   train.tgt
//     valid.src   valid.tgt
//     test.src    test.tgt
//
// One example per line; line i of `.src` pairs with line i of
// `.tgt`. Every line goes through the Preprocessor (lowercase,
// whitespace split, truncation to the side's max length).
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::data::preprocessor::Preprocessor;

/// Which portion of the dataset a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSplit {
    Train,
    Valid,
    Test,
}

impl DatasetSplit {
    pub const ALL: [DatasetSplit; 3] = [DatasetSplit::Train, DatasetSplit::Valid, DatasetSplit::Test];

    pub fn name(self) -> &'static str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Valid => "valid",
            DatasetSplit::Test => "test",
        }
    }
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tokenised source and target sides of one split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelCorpus {
    pub source: Vec<Vec<String>>,
    pub target: Vec<Vec<String>>,
}

impl ParallelCorpus {
    /// Number of aligned pairs
    pub fn len(&self) -> usize {
        self.source.len().min(self.target.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load one tokenised text file, truncating every line to `max_length`.
pub fn load_data(dataset_path: &Path, max_length: usize) -> Result<Vec<Vec<String>>> {
    let file = File::open(dataset_path)
        .with_context(|| format!("Cannot open dataset file '{}'", dataset_path.display()))?;

    let preprocessor = Preprocessor::new(max_length);
    let mut text = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line
            .with_context(|| format!("Cannot read line from '{}'", dataset_path.display()))?;
        text.push(preprocessor.tokenize(&line));
    }

    tracing::debug!("Loaded {} lines from '{}'", text.len(), dataset_path.display());
    Ok(text)
}

/// Load the `.src`/`.tgt` pair of `split` from `dataset_dir`.
pub fn load_split(
    dataset_dir:       &Path,
    split:             DatasetSplit,
    max_source_length: usize,
    max_target_length: usize,
) -> Result<ParallelCorpus> {
    let source = load_data(&dataset_dir.join(format!("{split}.src")), max_source_length)?;
    let target = load_data(&dataset_dir.join(format!("{split}.tgt")), max_target_length)?;

    if source.len() != target.len() {
        tracing::warn!(
            "{} split has {} source lines but {} target lines; extra lines are ignored",
            split,
            source.len(),
            target.len()
        );
    }

    Ok(ParallelCorpus { source, target })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_data_lowercases_and_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.src");
        fs::write(&path, "The Cat sat down\n\nA DOG\n").unwrap();

        let text = load_data(&path, 3).unwrap();
        assert_eq!(text.len(), 3);
        assert_eq!(text[0], vec!["the", "cat", "sat"]);
        assert!(text[1].is_empty());
        assert_eq!(text[2], vec!["a", "dog"]);
    }

    #[test]
    fn test_load_split_uses_side_limits() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("valid.src"), "a b c d\n").unwrap();
        fs::write(dir.path().join("valid.tgt"), "e f g h\n").unwrap();

        let corpus = load_split(dir.path(), DatasetSplit::Valid, 4, 2).unwrap();
        assert_eq!(corpus.source[0].len(), 4);
        assert_eq!(corpus.target[0], vec!["e", "f"]);
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_split(dir.path(), DatasetSplit::Test, 10, 10).unwrap_err();
        assert!(format!("{err:#}").contains("test.src"));
    }

    #[test]
    fn test_split_names() {
        let names: Vec<&str> = DatasetSplit::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["train", "valid", "test"]);
    }
}

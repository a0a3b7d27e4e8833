// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `vocab` and `preprocess`, and
// their flags. Every flag is optional: when given it overrides
// the value from --config (or the built-in default).
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::config::RunConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the vocabulary from the training split and save it
    Vocab(VocabArgs),

    /// Build the vocabulary and index train/valid/test
    Preprocess(PreprocessArgs),
}

/// Flags shared by both subcommands
#[derive(Args, Debug, Default)]
pub struct DataArgs {
    /// JSON run config; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory with {train,valid,test}.{src,tgt}
    #[arg(long)]
    pub dataset_dir: Option<PathBuf>,

    /// Where vocab.json (and indexed splits) are written
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Largest vocabulary, special tokens included
    #[arg(long)]
    pub max_vocab_size: Option<usize>,

    /// Tokens kept per source line
    #[arg(long)]
    pub max_source_length: Option<usize>,

    /// Tokens kept per target line
    #[arg(long)]
    pub max_target_length: Option<usize>,
}

impl DataArgs {
    /// Apply the given flags on top of `config`.
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(dir) = &self.dataset_dir {
            config.dataset_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(n) = self.max_vocab_size {
            config.max_vocab_size = n;
        }
        if let Some(n) = self.max_source_length {
            config.max_source_length = n;
        }
        if let Some(n) = self.max_target_length {
            config.max_target_length = n;
        }
    }
}

#[derive(Args, Debug)]
pub struct VocabArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// How many of the most frequent tokens to print
    #[arg(long, default_value_t = 10)]
    pub show: usize,
}

#[derive(Args, Debug)]
pub struct PreprocessArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Also build the OOV extension used by copy-mode generation
    #[arg(long)]
    pub is_gen: bool,
}

// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `vocab`      — build + save the vocabulary, show its head
//   2. `preprocess` — vocabulary plus indexed train/valid/test
//
// Training needs a concrete model and is driven from code
// through application::train_use_case::TrainUseCase.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PreprocessArgs, VocabArgs};

use crate::application::{config::RunConfig, preprocess_use_case::PreprocessUseCase};
use crate::data::{
    loader::{load_split, DatasetSplit},
    vocab::build_vocab,
};
use crate::domain::special_tokens::SPECIAL_TOKEN_COUNT;
use crate::infra::vocab_store::VocabStore;

#[derive(Parser, Debug)]
#[command(
    name = "seq2seq-prep",
    version,
    about = "Build vocabularies and indexed datasets for seq2seq text generation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Vocab(args) => run_vocab(args),
            Commands::Preprocess(args) => run_preprocess(args),
        }
    }
}

/// Handles the `vocab` subcommand.
fn run_vocab(args: VocabArgs) -> Result<()> {
    let mut config = RunConfig::load(args.data.config.as_deref())?;
    args.data.apply(&mut config);

    let train = load_split(
        &config.dataset_dir,
        DatasetSplit::Train,
        config.max_source_length,
        config.max_target_length,
    )?;
    let vocab = build_vocab(&[&train.source, &train.target], config.max_vocab_size);
    let store = VocabStore::new(&config.output_dir);
    store.save(&vocab)?;

    println!("Vocabulary size: {}", vocab.size());
    let head = vocab.idx2token().iter().enumerate().skip(SPECIAL_TOKEN_COUNT).take(args.show);
    for (idx, token) in head {
        println!("  {idx:>6}  {token}");
    }
    println!("Saved to {}", store.path().display());
    Ok(())
}

/// Handles the `preprocess` subcommand.
fn run_preprocess(args: PreprocessArgs) -> Result<()> {
    let mut config = RunConfig::load(args.data.config.as_deref())?;
    args.data.apply(&mut config);
    if args.is_gen {
        config.is_gen = true;
    }
    let output_dir = config.output_dir.clone();

    let prepared = PreprocessUseCase::new(config).execute()?;

    println!("Vocabulary size: {}", prepared.vocab.size());
    for split in DatasetSplit::ALL {
        println!("  {:<5} {} examples", split.name(), prepared.split(split).len());
    }
    println!("Written to {}", output_dir.display());
    Ok(())
}

// ============================================================
// seq2seq-prep
// ============================================================
// Data preparation and a resumable, early-stopping training
// loop for sequence-to-sequence text generation.
//
// Layers (each only calls the ones below it):
//
//   1  cli          clap front end (vocab, preprocess)
//   2  application  run config and use cases
//   3  domain       special tokens, indexed examples, the
//                   model / optimizer / evaluator traits
//   4  data         loading, vocabulary, indexing, padding,
//                   Burn Dataset + Batcher
//   5  ml           early stopping, optimizers, trainer
//   6  infra        checkpoints, vocab files, generated text,
//                   metrics CSV

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
pub mod ml;

// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw text files to padded tensor batches.
//
//   train/valid/test .src/.tgt files
//       │
//       ▼
//   loader + preprocessor  → lowercased, truncated token lists
//       │
//       ▼
//   vocab                  → deterministic token ↔ index mapping
//       │
//       ▼
//   indexer                → IndexedExamples (+ OOV extension)
//       │
//       ▼
//   dataset                → Burn Dataset over examples
//       │
//       ▼
//   batcher (+ padding)    → padded tensor batches
//       │
//       ▼
//   DataLoader             → feeds batches to the trainer
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads `<split>.src` / `<split>.tgt` files
pub mod loader;

/// Normalises and tokenises a single line
pub mod preprocessor;

/// Frequency-sorted vocabulary construction
pub mod vocab;

/// Token → index conversion with copy-mode OOV extension
pub mod indexer;

/// Right padding and extra-vocabulary buffers
pub mod padding;

/// Burn Dataset over indexed examples
pub mod dataset;

/// Burn Batcher producing padded tensors
pub mod batcher;

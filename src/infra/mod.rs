// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by the other layers:
//
//   checkpoint.rs      — one JSON record per run holding epoch,
//                        early-stopping counters, model and
//                        optimizer state; written atomically
//
//   vocab_store.rs     — vocabulary persistence so every stage
//                        uses the same index assignment
//
//   generated_text.rs  — generated corpus, one line per example
//
//   metrics.rs         — per-epoch loss / perplexity CSV
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Trainer checkpoint record and atomic save/load
pub mod checkpoint;

/// Vocabulary save/load
pub mod vocab_store;

/// Generated corpus writer
pub mod generated_text;

/// Training metrics CSV logger
pub mod metrics;

// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal per use case (preparing a corpus, training a model).
//
// Rules for this layer:
//   - No indexing or training math here (Layers 4 and 5)
//   - No argument parsing or printing (Layer 1)
//   - File formats belong to Layer 6; this layer only decides
//     WHEN things are loaded and saved
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// Run configuration: defaults, JSON file, persistence
pub mod config;

/// Corpus → vocabulary → indexed splits
pub mod preprocess_use_case;

/// Loaders → trainer → fit → test-set evaluation
pub mod train_use_case;

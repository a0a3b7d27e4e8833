// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that name the core concepts of
// the system: the reserved vocabulary symbols, the indexed
// training example, and the capabilities the trainer expects
// from its collaborators (model, optimizer, evaluator, data).
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The four reserved symbols at the low end of every vocabulary
pub mod special_tokens;

// An example after text → index conversion
pub mod example;

// Collaborator capabilities (model, optimizer, evaluator, batch source)
pub mod traits;

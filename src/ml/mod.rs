// ============================================================
// Layer 5 — Training Layer
// ============================================================
// Everything that decides HOW a model learns, without knowing
// WHAT the model is. The network itself stays behind the
// Seq2SeqModel trait (domain/traits.rs): this layer only calls
// forward_loss / valid_loss / generate and moves opaque state
// dictionaries in and out of checkpoints.
//
// What's in this layer:
//
//   early_stopping.rs — the lower-is-better stopping policy
//                       (best score, patience counter, flags)
//
//   optimizer.rs      — fixed-rate and warm-up-scheduled
//                       optimizer variants behind one enum
//
//   trainer.rs        — the epoch loop: train, evaluate every
//                       eval_step epochs, checkpoint on
//                       improvement, stop early, resume, and
//                       generate + score on held-out data
//
// Reference: Burn Book §5 (Training)
//            Prechelt (1998) Early Stopping — But When?

/// Early-stopping decision function
pub mod early_stopping;

/// Optimizer variants and the learning-rate schedule
pub mod optimizer;

/// Epoch loop, checkpointing and evaluation
pub mod trainer;

// ============================================================
// Layer 3 — Core Traits (Collaborator Capabilities)
// ============================================================
// The trainer never sees a concrete network, optimizer, metric
// or data pipeline. It only sees these capabilities:
//
//   Seq2SeqModel     loss / validation loss / generate / state
//   ParamOptimizer   zero-grad / step / learning rate / state
//   Evaluator        score(generated, reference)
//   BatchSource      re-iterable stream of batches
//
// Any architecture that implements Seq2SeqModel plugs into the
// trainer without changing it.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::collections::BTreeMap;

/// Opaque serialisable parameter/optimizer state.
/// Implementations choose the layout; the checkpoint only stores it.
pub type StateDict = serde_json::Value;

/// Metric name → value, as returned by an [`Evaluator`].
pub type ScoreMap = BTreeMap<String, f64>;

// ─── Seq2SeqModel ─────────────────────────────────────────────────────────────
/// A sequence-to-sequence network seen as a set of capabilities.
pub trait Seq2SeqModel {
    /// The batch type this model consumes
    type Batch;

    /// Training forward pass. Returns the scalar loss and leaves the
    /// gradients of that loss accumulated on the parameters.
    fn forward_loss(&mut self, batch: &Self::Batch) -> Result<f64>;

    /// Validation loss: no gradient tracking, no parameter change.
    fn valid_loss(&self, batch: &Self::Batch) -> Result<f64>;

    /// Generate one token sequence per example in the batch, in order.
    fn generate(&self, batch: &Self::Batch) -> Result<Vec<Vec<String>>>;

    /// Rescale accumulated gradients so their global norm is at most
    /// `max_norm`. Returns the norm before clipping.
    fn clip_grad_norm(&mut self, max_norm: f64) -> f64;

    /// Switch between training mode (dropout etc.) and evaluation mode.
    fn set_training(&mut self, _training: bool) {}

    /// Export parameter state.
    fn state_dict(&self) -> Result<StateDict>;

    /// Import parameter state previously produced by `state_dict`.
    fn load_state_dict(&mut self, state: &StateDict) -> Result<()>;
}

// ─── ParamOptimizer ───────────────────────────────────────────────────────────
/// A gradient-based optimizer over the parameters of model `M`.
pub trait ParamOptimizer<M> {
    /// Clear accumulated gradients
    fn zero_grad(&mut self, model: &mut M);

    /// Apply one update using the accumulated gradients
    fn step(&mut self, model: &mut M) -> Result<()>;

    fn learning_rate(&self) -> f64;

    fn set_learning_rate(&mut self, lr: f64);

    fn state_dict(&self) -> Result<StateDict>;

    fn load_state_dict(&mut self, state: &StateDict) -> Result<()>;
}

// ─── Evaluator ────────────────────────────────────────────────────────────────
/// Scores a generated corpus against a reference corpus.
pub trait Evaluator {
    fn evaluate(&self, generated: &[Vec<String>], reference: &[Vec<String>]) -> Result<ScoreMap>;
}

// ─── BatchSource ──────────────────────────────────────────────────────────────
/// A collection of batches that can be walked once per epoch.
pub trait BatchSource {
    type Batch;

    /// Iterate over all batches, in order
    fn batches(&self) -> Box<dyn Iterator<Item = Self::Batch> + '_>;

    /// Number of batches, when cheaply known (drives the progress bar)
    fn num_batches(&self) -> Option<usize> {
        None
    }
}

impl<T: Clone> BatchSource for Vec<T> {
    type Batch = T;

    fn batches(&self) -> Box<dyn Iterator<Item = T> + '_> {
        Box::new(self.iter().cloned())
    }

    fn num_batches(&self) -> Option<usize> {
        Some(self.len())
    }
}

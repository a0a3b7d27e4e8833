// ============================================================
// Layer 5 — Optimizer Strategy
// ============================================================
// The trainer drives one of two optimizer variants, chosen by
// configuration (`learner`) when the trainer is constructed:
//
//   "adam"      → Learner::Plain      the adaptive-gradient
//                                     optimizer at a fixed lr
//   "schedule"  → Learner::Scheduled  the same optimizer with
//                                     its lr recomputed before
//                                     every step
//
// Schedule (inverse square root with linear warm-up):
//
//   lr(n) = init_lr · d_model^-0.5 · min(n^-0.5, n · warmup^-1.5)
//
//   rises linearly for `warmup` steps, then decays as 1/√n.
//   n counts optimizer steps from 1 and is part of the exported
//   state, so a resumed run continues the curve where it left.
//
// Reference: Vaswani et al. (2017) Attention Is All You Need §5.3

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::traits::{ParamOptimizer, StateDict};

/// Which optimizer variant the trainer builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearnerKind {
    #[default]
    Adam,
    Schedule,
}

// ─── ScheduledOptimizer ───────────────────────────────────────────────────────
/// Wraps an optimizer and sets its learning rate from the schedule.
#[derive(Debug, Clone)]
pub struct ScheduledOptimizer<O> {
    inner:        O,
    init_lr:      f64,
    d_model:      usize,
    warmup_steps: usize,
    n_steps:      u64,
}

impl<O> ScheduledOptimizer<O> {
    pub fn new(inner: O, init_lr: f64, d_model: usize, warmup_steps: usize) -> Result<Self> {
        if d_model == 0 {
            bail!("scheduled optimizer needs d_model > 0");
        }
        Ok(Self { inner, init_lr, d_model, warmup_steps, n_steps: 0 })
    }

    /// Learning-rate multiplier for step `n` (n >= 1)
    pub fn lr_scale(&self, n: u64) -> f64 {
        let n = n as f64;
        let warmup_term = n * (self.warmup_steps as f64).powf(-1.5);
        (self.d_model as f64).powf(-0.5) * n.powf(-0.5).min(warmup_term)
    }

    /// Steps taken so far
    pub fn n_steps(&self) -> u64 {
        self.n_steps
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<M, O: ParamOptimizer<M>> ParamOptimizer<M> for ScheduledOptimizer<O> {
    fn zero_grad(&mut self, model: &mut M) {
        self.inner.zero_grad(model);
    }

    fn step(&mut self, model: &mut M) -> Result<()> {
        self.n_steps += 1;
        let lr = self.init_lr * self.lr_scale(self.n_steps);
        ParamOptimizer::<M>::set_learning_rate(&mut self.inner, lr);
        self.inner.step(model)
    }

    fn learning_rate(&self) -> f64 {
        ParamOptimizer::<M>::learning_rate(&self.inner)
    }

    /// Replaces the schedule's base learning rate
    fn set_learning_rate(&mut self, lr: f64) {
        self.init_lr = lr;
    }

    fn state_dict(&self) -> Result<StateDict> {
        Ok(json!({
            "n_steps": self.n_steps,
            "inner":   ParamOptimizer::<M>::state_dict(&self.inner)?,
        }))
    }

    fn load_state_dict(&mut self, state: &StateDict) -> Result<()> {
        self.n_steps = state["n_steps"]
            .as_u64()
            .context("scheduled optimizer state is missing 'n_steps'")?;
        ParamOptimizer::<M>::load_state_dict(&mut self.inner, &state["inner"])
    }
}

// ─── Learner ──────────────────────────────────────────────────────────────────
/// The optimizer variant selected by [`LearnerKind`].
#[derive(Debug, Clone)]
pub enum Learner<O> {
    Plain(O),
    Scheduled(ScheduledOptimizer<O>),
}

impl<O> Learner<O> {
    pub fn kind(&self) -> LearnerKind {
        match self {
            Learner::Plain(_) => LearnerKind::Adam,
            Learner::Scheduled(_) => LearnerKind::Schedule,
        }
    }
}

impl<M, O: ParamOptimizer<M>> ParamOptimizer<M> for Learner<O> {
    fn zero_grad(&mut self, model: &mut M) {
        match self {
            Learner::Plain(o) => o.zero_grad(model),
            Learner::Scheduled(o) => o.zero_grad(model),
        }
    }

    fn step(&mut self, model: &mut M) -> Result<()> {
        match self {
            Learner::Plain(o) => o.step(model),
            Learner::Scheduled(o) => o.step(model),
        }
    }

    fn learning_rate(&self) -> f64 {
        match self {
            Learner::Plain(o) => ParamOptimizer::<M>::learning_rate(o),
            Learner::Scheduled(o) => ParamOptimizer::<M>::learning_rate(o),
        }
    }

    fn set_learning_rate(&mut self, lr: f64) {
        match self {
            Learner::Plain(o) => ParamOptimizer::<M>::set_learning_rate(o, lr),
            Learner::Scheduled(o) => ParamOptimizer::<M>::set_learning_rate(o, lr),
        }
    }

    fn state_dict(&self) -> Result<StateDict> {
        match self {
            Learner::Plain(o) => ParamOptimizer::<M>::state_dict(o),
            Learner::Scheduled(o) => ParamOptimizer::<M>::state_dict(o),
        }
    }

    fn load_state_dict(&mut self, state: &StateDict) -> Result<()> {
        match self {
            Learner::Plain(o) => ParamOptimizer::<M>::load_state_dict(o, state),
            Learner::Scheduled(o) => ParamOptimizer::<M>::load_state_dict(o, state),
        }
    }
}

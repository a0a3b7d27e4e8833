// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Drives epochs over an opaque model, applies early stopping,
// persists/restores checkpoints and runs evaluation-time
// generation.
//
// State machine:
//
//        ┌──────────────┐ train epoch ┌───────────────┐
//   ┌───►│     Idle     │────────────►│ TrainingEpoch │
//   │    └──────────────┘◄────────────└───────────────┘
//   │       │ every eval_step epochs
//   │       ▼
//   │    ┌──────────────┐  improved   ┌──────────────┐
//   │    │  Evaluating  │────────────►│ Checkpointed │
//   │    └──────────────┘             └──────────────┘
//   │       │ no stop                    │
//   └───────┴────────────────────────────┘
//           │ cur_step >= stopping_step, or epochs exhausted
//           ▼
//        ┌──────────────┐
//        │   Stopped    │
//        └──────────────┘
//
// Resuming from a checkpoint restores start_epoch (= saved
// epoch + 1), cur_step, best_valid_score, model and optimizer
// state, so a resumed run continues exactly where it stopped.
//
// Reference: Prechelt (1998) Early Stopping — But When?

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::domain::traits::{BatchSource, Evaluator, ParamOptimizer, ScoreMap, Seq2SeqModel};
use crate::infra::{
    checkpoint::{Checkpoint, CheckpointManager},
    generated_text::save_generated_text,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    early_stopping::{early_stopping, INITIAL_BEST_SCORE},
    optimizer::{Learner, LearnerKind, ScheduledOptimizer},
};

// ─── Trainer Configuration ───────────────────────────────────────────────────
/// Settings of one training run. Missing keys in a config file
/// fall back to [`TrainerConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Epoch budget
    pub epochs:             usize,
    /// Optimizer variant
    pub learner:            LearnerKind,
    /// Fixed lr (adam) or schedule base lr (schedule)
    pub learning_rate:      f64,
    /// Evaluate every `eval_step` epochs
    pub eval_step:          usize,
    /// Stop after this many evaluations without improvement
    pub stopping_step:      usize,
    /// Maximum global gradient norm
    pub grad_clip:          f64,
    /// Write per-epoch metrics to `<metrics_dir>/<run_name>/metrics.csv`
    pub plot:               bool,
    /// Draw a progress bar over training batches
    pub show_progress:      bool,
    pub checkpoint_dir:     PathBuf,
    pub generated_text_dir: PathBuf,
    pub metrics_dir:        PathBuf,
    /// Names the checkpoint and generated text files
    pub run_name:           String,
    /// Model width, used by the schedule
    pub d_model:            usize,
    /// Warm-up steps of the schedule
    pub warmup_steps:       usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs:             50,
            learner:            LearnerKind::Adam,
            learning_rate:      1e-3,
            eval_step:          1,
            stopping_step:      2,
            grad_clip:          2.0,
            plot:               false,
            show_progress:      true,
            checkpoint_dir:     PathBuf::from("checkpoints"),
            generated_text_dir: PathBuf::from("generated"),
            metrics_dir:        PathBuf::from("runs"),
            run_name:           default_run_name(),
            d_model:            512,
            warmup_steps:       4000,
        }
    }
}

/// `run-<unix seconds>`, unique per launch.
pub fn default_run_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("run-{secs}")
}

// ─── Trainer State ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    TrainingEpoch,
    Evaluating,
    Checkpointed,
    Stopped,
}

/// Result of [`Trainer::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    /// Lowest validation loss seen (1e9 if never evaluated)
    pub best_valid_score:  f64,
    /// Perplexity of the best evaluation
    pub best_valid_result: Option<f64>,
    /// True if early stopping ended the run
    pub stopped_early:     bool,
    /// Number of epochs trained by this call
    pub epochs_run:        usize,
}

// ─── Trainer ─────────────────────────────────────────────────────────────────
pub struct Trainer<M, O, E> {
    config:              TrainerConfig,
    model:               M,
    optimizer:           Learner<O>,
    evaluator:           E,
    checkpoints:         CheckpointManager,
    generated_text_file: PathBuf,
    metrics:             Option<MetricsLogger>,
    eval_step:           usize,

    start_epoch:         usize,
    cur_step:            usize,
    best_valid_score:    f64,
    best_valid_result:   Option<f64>,
    state:               TrainerState,
}

impl<M, O, E> Trainer<M, O, E>
where
    M: Seq2SeqModel,
    O: ParamOptimizer<M>,
    E: Evaluator,
{
    /// Build a trainer. Creates the checkpoint and generated-text
    /// directories, and the metrics CSV when `plot` is set.
    pub fn new(config: TrainerConfig, model: M, base_optimizer: O, evaluator: E) -> Result<Self> {
        let optimizer = Self::build_optimizer(&config, base_optimizer)?;
        let checkpoints = CheckpointManager::new(&config.checkpoint_dir, &config.run_name)?;

        fs::create_dir_all(&config.generated_text_dir).with_context(|| {
            format!("Cannot create '{}'", config.generated_text_dir.display())
        })?;
        let generated_text_file = config.generated_text_dir.join(format!("{}.txt", config.run_name));

        let metrics = if config.plot {
            Some(MetricsLogger::new(&config.metrics_dir, &config.run_name)?)
        } else {
            None
        };

        // An eval_step of 0 would never evaluate; treat it as every epoch.
        let eval_step = config.eval_step.min(config.epochs).max(1);

        Ok(Self {
            config,
            model,
            optimizer,
            evaluator,
            checkpoints,
            generated_text_file,
            metrics,
            eval_step,
            start_epoch:       0,
            cur_step:          0,
            best_valid_score:  INITIAL_BEST_SCORE,
            best_valid_result: None,
            state:             TrainerState::Idle,
        })
    }

    fn build_optimizer(config: &TrainerConfig, mut base: O) -> Result<Learner<O>> {
        match config.learner {
            LearnerKind::Adam => {
                base.set_learning_rate(config.learning_rate);
                Ok(Learner::Plain(base))
            }
            LearnerKind::Schedule => Ok(Learner::Scheduled(ScheduledOptimizer::new(
                base,
                config.learning_rate,
                config.d_model,
                config.warmup_steps,
            )?)),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────
    pub fn config(&self) -> &TrainerConfig { &self.config }
    pub fn model(&self) -> &M { &self.model }
    pub fn model_mut(&mut self) -> &mut M { &mut self.model }
    pub fn optimizer(&self) -> &Learner<O> { &self.optimizer }
    pub fn start_epoch(&self) -> usize { self.start_epoch }
    pub fn cur_step(&self) -> usize { self.cur_step }
    pub fn best_valid_score(&self) -> f64 { self.best_valid_score }
    pub fn best_valid_result(&self) -> Option<f64> { self.best_valid_result }
    pub fn state(&self) -> TrainerState { self.state }
    pub fn eval_step(&self) -> usize { self.eval_step }
    pub fn checkpoint_file(&self) -> &Path { self.checkpoints.path() }
    pub fn generated_text_file(&self) -> &Path { &self.generated_text_file }

    // ── One training epoch ───────────────────────────────────────────────────
    /// Run every training batch once. Returns the mean batch loss.
    fn train_epoch<S>(&mut self, train_data: &S) -> Result<f64>
    where
        S: BatchSource<Batch = M::Batch> + ?Sized,
    {
        self.state = TrainerState::TrainingEpoch;
        self.model.set_training(true);

        let pbar = self.progress_bar(train_data.num_batches());
        let mut total_loss = 0.0f64;
        let mut num_batches = 0usize;

        for batch in train_data.batches() {
            self.optimizer.zero_grad(&mut self.model);
            let loss = self.model.forward_loss(&batch)?;
            total_loss += loss;
            num_batches += 1;

            self.model.clip_grad_norm(self.config.grad_clip);
            self.optimizer.step(&mut self.model)?;

            pbar.inc(1);
            pbar.set_message(format!("loss {loss:.4}"));
        }
        pbar.finish_and_clear();

        self.state = TrainerState::Idle;
        Ok(mean_loss(total_loss, num_batches, "training"))
    }

    // ── Validation ───────────────────────────────────────────────────────────
    /// Mean validation loss and its perplexity. No parameter updates.
    fn valid_epoch<S>(&mut self, valid_data: &S) -> Result<(f64, f64)>
    where
        S: BatchSource<Batch = M::Batch> + ?Sized,
    {
        self.state = TrainerState::Evaluating;
        self.model.set_training(false);

        let mut total_loss = 0.0f64;
        let mut num_batches = 0usize;
        for batch in valid_data.batches() {
            total_loss += self.model.valid_loss(&batch)?;
            num_batches += 1;
        }

        let valid_loss = mean_loss(total_loss, num_batches, "validation");
        Ok((valid_loss, valid_loss.exp()))
    }

    // ── Checkpoints ──────────────────────────────────────────────────────────
    fn save_checkpoint(&mut self, epoch: i64) -> Result<()> {
        let checkpoint = Checkpoint {
            epoch,
            cur_step:         self.cur_step,
            best_valid_score: self.best_valid_score,
            state_dict:       self.model.state_dict()?,
            optimizer:        ParamOptimizer::<M>::state_dict(&self.optimizer)?,
        };
        self.checkpoints.save(&checkpoint)?;
        self.state = TrainerState::Checkpointed;
        Ok(())
    }

    /// Restore a run from `resume_file`. Training continues at the
    /// epoch after the saved one with the saved counters.
    pub fn resume_checkpoint(&mut self, resume_file: &Path) -> Result<()> {
        let checkpoint = Checkpoint::load(resume_file)?;

        self.start_epoch = usize::try_from(checkpoint.epoch + 1).with_context(|| {
            format!("Checkpoint '{}' has invalid epoch {}", resume_file.display(), checkpoint.epoch)
        })?;
        self.cur_step = checkpoint.cur_step;
        self.best_valid_score = checkpoint.best_valid_score;
        self.model
            .load_state_dict(&checkpoint.state_dict)
            .context("Cannot restore model parameters")?;
        ParamOptimizer::<M>::load_state_dict(&mut self.optimizer, &checkpoint.optimizer)
            .context("Cannot restore optimizer state")?;
        self.state = TrainerState::Idle;

        tracing::info!("Checkpoint loaded. Resume training from epoch {}", self.start_epoch);
        Ok(())
    }

    // ── Fit ──────────────────────────────────────────────────────────────────
    /// Train from `start_epoch` until the epoch budget runs out or
    /// early stopping fires. With `saved`, every improvement is
    /// checkpointed.
    pub fn fit<T, V>(&mut self, train_data: &T, valid_data: &V, saved: bool) -> Result<FitSummary>
    where
        T: BatchSource<Batch = M::Batch> + ?Sized,
        V: BatchSource<Batch = M::Batch> + ?Sized,
    {
        let epochs = self.config.epochs;
        if self.start_epoch >= epochs || epochs == 0 {
            self.save_checkpoint(-1)?;
            tracing::info!("No epochs left to run; saved untrained checkpoint");
        }

        let mut stopped_early = false;
        let mut epochs_run = 0usize;

        for epoch_idx in self.start_epoch..epochs {
            // ── Training phase ────────────────────────────────────────────────
            let training_start = Instant::now();
            let train_loss = self.train_epoch(train_data)?;
            epochs_run += 1;
            tracing::info!(
                "epoch {} training [time: {:.2}s, train_loss: {:.4}]",
                epoch_idx,
                training_start.elapsed().as_secs_f64(),
                train_loss
            );

            let mut row = EpochMetrics::new(epoch_idx, train_loss);

            // ── Evaluation phase ──────────────────────────────────────────────
            if (epoch_idx + 1) % self.eval_step == 0 {
                let valid_start = Instant::now();
                let (valid_score, valid_result) = self.valid_epoch(valid_data)?;
                let decision = early_stopping(
                    valid_score,
                    self.best_valid_score,
                    self.cur_step,
                    self.config.stopping_step,
                );
                self.best_valid_score = decision.best_valid_score;
                self.cur_step = decision.cur_step;

                tracing::info!(
                    "epoch {} evaluating [time: {:.2}s, valid_loss: {:.6}]",
                    epoch_idx,
                    valid_start.elapsed().as_secs_f64(),
                    valid_score
                );
                tracing::info!("valid ppl: {}", valid_result);
                row = row.with_validation(valid_score, valid_result);

                if decision.update_flag {
                    if saved {
                        self.save_checkpoint(epoch_idx as i64)?;
                        tracing::info!("Saving current best: {}", self.checkpoints.path().display());
                    }
                    self.best_valid_result = Some(valid_result);
                }

                if decision.stop_flag {
                    self.log_metrics(&row)?;
                    tracing::info!(
                        "Finished training, best eval result in epoch {}",
                        epoch_idx.saturating_sub(self.cur_step * self.eval_step)
                    );
                    stopped_early = true;
                    break;
                }
                self.state = TrainerState::Idle;
            }

            self.log_metrics(&row)?;
        }

        self.state = TrainerState::Stopped;
        Ok(FitSummary {
            best_valid_score:  self.best_valid_score,
            best_valid_result: self.best_valid_result,
            stopped_early,
            epochs_run,
        })
    }

    fn log_metrics(&self, row: &EpochMetrics) -> Result<()> {
        match &self.metrics {
            Some(logger) => logger.log(row),
            None => Ok(()),
        }
    }

    // ── Evaluate ─────────────────────────────────────────────────────────────
    /// Load `model_file` (or this run's checkpoint), generate for every
    /// batch, save the generated corpus and score it against `reference`.
    pub fn evaluate<S>(
        &mut self,
        eval_data: &S,
        reference: &[Vec<String>],
        model_file: Option<&Path>,
    ) -> Result<ScoreMap>
    where
        S: BatchSource<Batch = M::Batch> + ?Sized,
    {
        let checkpoint_file = model_file.unwrap_or_else(|| self.checkpoints.path()).to_path_buf();
        let checkpoint = Checkpoint::load(&checkpoint_file)?;
        self.model
            .load_state_dict(&checkpoint.state_dict)
            .context("Cannot load model parameters for evaluation")?;
        tracing::info!("Loading model structure and parameters from {}", checkpoint_file.display());

        self.model.set_training(false);

        let pbar = self.progress_bar(eval_data.num_batches());
        let mut generated_corpus = Vec::new();
        for batch in eval_data.batches() {
            generated_corpus.extend(self.model.generate(&batch)?);
            pbar.inc(1);
        }
        pbar.finish_and_clear();

        save_generated_text(&self.generated_text_file, &generated_corpus)?;
        let result = self.evaluator.evaluate(&generated_corpus, reference)?;

        tracing::info!("Evaluation result: {:?}", result);
        Ok(result)
    }

    fn progress_bar(&self, len: Option<usize>) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pbar = match len {
            Some(n) => ProgressBar::new(n as u64),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pbar.set_style(style.progress_chars("=>-"));
        }
        pbar
    }
}

fn mean_loss(total: f64, batches: usize, phase: &str) -> f64 {
    if batches == 0 {
        tracing::warn!("No {} batches; loss is NaN", phase);
        return f64::NAN;
    }
    total / batches as f64
}

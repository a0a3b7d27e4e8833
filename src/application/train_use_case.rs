// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run over already prepared data:
//
//   Step 1: Build Burn data loaders         (Layer 4 - data)
//   Step 2: Save the resolved config        (Layer 2 - config)
//   Step 3: Build the trainer, maybe resume (Layer 5 - ml)
//   Step 4: Fit with early stopping         (Layer 5 - ml)
//   Step 5: Generate + score on test split  (Layer 5 - ml)
//
// The network, its optimizer and the metric are supplied by the
// caller: any Seq2SeqModel whose batch type is Seq2SeqBatch<B>
// plugs in here without this layer knowing what it computes.
//
// Reference: Burn Book §5 (Training)
//            Rust Book §10 (Generic Types, Traits)

use anyhow::Result;
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};
use std::path::{Path, PathBuf};

use crate::application::{
    config::RunConfig,
    preprocess_use_case::{PreparedData, SplitData},
};
use crate::data::{
    batcher::{BatchedLoader, Seq2SeqBatch, Seq2SeqBatcher},
    dataset::Seq2SeqDataset,
};
use crate::domain::traits::{Evaluator, ParamOptimizer, ScoreMap, Seq2SeqModel};
use crate::ml::trainer::{FitSummary, Trainer};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub fit:         FitSummary,
    /// Evaluator scores on the test split
    pub test_result: ScoreMap,
    pub checkpoint:  PathBuf,
    pub config_file: PathBuf,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: RunConfig,
}

impl TrainUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Train `model` on `data.train`, early-stop on `data.valid`,
    /// then score generations on `data.test`.
    pub fn execute<B, M, O, E>(
        &self,
        device:    B::Device,
        data:      &PreparedData,
        model:     M,
        optimizer: O,
        evaluator: E,
        resume:    Option<&Path>,
    ) -> Result<TrainReport>
    where
        B: Backend,
        M: Seq2SeqModel<Batch = Seq2SeqBatch<B>>,
        O: ParamOptimizer<M>,
        E: Evaluator,
    {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Data loaders ─────────────────────────────────────────────
        // Only the training set is shuffled. The test loader stays on a
        // single thread so generations line up with the reference corpus.
        let train_loader = self.loader::<B>(&device, &data.train, true, cfg.num_workers);
        let valid_loader = self.loader::<B>(&device, &data.valid, false, cfg.num_workers);
        let test_loader = self.loader::<B>(&device, &data.test, false, 0);
        tracing::info!(
            "Training on {} examples, validating on {}, testing on {}",
            data.train.len(),
            data.valid.len(),
            data.test.len()
        );

        // ── Step 2: Save config ──────────────────────────────────────────────
        let config_file = cfg.save()?;
        tracing::info!("Run config saved to '{}'", config_file.display());

        // ── Step 3: Trainer ──────────────────────────────────────────────────
        let mut trainer = Trainer::new(cfg.trainer.clone(), model, optimizer, evaluator)?;
        if let Some(resume_file) = resume {
            trainer.resume_checkpoint(resume_file)?;
        }

        // ── Step 4: Fit ──────────────────────────────────────────────────────
        let fit = trainer.fit(&train_loader, &valid_loader, true)?;

        // ── Step 5: Test-set evaluation ──────────────────────────────────────
        let test_result = trainer.evaluate(&test_loader, &data.test.reference, None)?;

        Ok(TrainReport {
            fit,
            test_result,
            checkpoint: trainer.checkpoint_file().to_path_buf(),
            config_file,
        })
    }

    fn loader<B: Backend>(
        &self,
        device:      &B::Device,
        split:       &SplitData,
        shuffle:     bool,
        num_workers: usize,
    ) -> BatchedLoader<Seq2SeqBatch<B>> {
        let mut builder = DataLoaderBuilder::new(Seq2SeqBatcher::<B>::new(device.clone()))
            .batch_size(self.config.batch_size);
        if shuffle {
            builder = builder.shuffle(self.config.seed);
        }
        if num_workers > 0 {
            builder = builder.num_workers(num_workers);
        }
        let loader = builder.build(Seq2SeqDataset::new(split.examples.clone()));
        BatchedLoader::new(loader, self.config.batch_size)
    }
}

// ============================================================
// Layer 2 — Run Configuration
// ============================================================
// Every knob of a preprocess or training run, in one struct.
//
// Resolution order (later wins):
//
//   1. RunConfig::default()
//   2. keys present in the JSON file given with --config
//   3. flags given on the command line
//
// Missing keys fall back to the defaults, so a config file only
// needs the values it changes:
//
//   { "dataset_dir": "data/cnndm", "epochs": 20, "is_gen": true }
//
// Trainer settings are flattened into the same JSON object.
// The resolved config of a training run is written next to its
// checkpoint as <checkpoint_dir>/<run_name>.config.json.
//
// Reference: Rust Book §9 (Error Handling)
//            serde docs — #[serde(default)], #[serde(flatten)]

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::trainer::TrainerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Holds {train,valid,test}.{src,tgt}
    pub dataset_dir:       PathBuf,
    /// Where vocab.json and the indexed splits are written
    pub output_dir:        PathBuf,
    pub max_source_length: usize,
    pub max_target_length: usize,
    pub max_vocab_size:    usize,
    /// Build the OOV extension for copy-mode generation
    pub is_gen:            bool,
    pub batch_size:        usize,
    /// Parallel batch loading threads (0 = load on the caller's thread)
    pub num_workers:       usize,
    /// Seed of the training-set shuffle
    pub seed:              u64,

    #[serde(flatten)]
    pub trainer:           TrainerConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset_dir:       PathBuf::from("dataset"),
            output_dir:        PathBuf::from("prepared"),
            max_source_length: 400,
            max_target_length: 100,
            max_vocab_size:    50_000,
            is_gen:            false,
            batch_size:        32,
            num_workers:       0,
            seed:              42,
            trainer:           TrainerConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load `path` on top of the defaults, or the defaults alone.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config '{}'", path.display()))?;

        tracing::info!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    /// Reject values no run can work with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.trainer.run_name.trim().is_empty() {
            bail!("run_name must not be empty");
        }
        if self.trainer.grad_clip <= 0.0 {
            bail!("grad_clip must be positive, got {}", self.trainer.grad_clip);
        }
        Ok(())
    }

    /// `<checkpoint_dir>/<run_name>.config.json`
    pub fn saved_path(&self) -> PathBuf {
        self.trainer
            .checkpoint_dir
            .join(format!("{}.config.json", self.trainer.run_name))
    }

    /// Write the resolved config next to the run's checkpoint.
    pub fn save(&self) -> Result<PathBuf> {
        let path = self.saved_path();
        fs::create_dir_all(&self.trainer.checkpoint_dir).with_context(|| {
            format!("Cannot create '{}'", self.trainer.checkpoint_dir.display())
        })?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        Ok(path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::optimizer::LearnerKind;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        fs::write(
            &path,
            r#"{ "dataset_dir": "data/cnndm", "epochs": 7, "learner": "schedule", "is_gen": true }"#,
        )
        .unwrap();

        let config = RunConfig::load(Some(&path)).unwrap();
        assert_eq!(config.dataset_dir, PathBuf::from("data/cnndm"));
        assert!(config.is_gen);
        assert_eq!(config.trainer.epochs, 7);
        assert_eq!(config.trainer.learner, LearnerKind::Schedule);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.trainer.stopping_step, 2);
    }

    #[test]
    fn test_no_file_means_defaults() {
        let config = RunConfig::load(None).unwrap();
        assert_eq!(config.max_vocab_size, 50_000);
        assert!(config.trainer.run_name.starts_with("run-"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(RunConfig::load(Some(&path)).is_err());
        assert!(RunConfig::load(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn test_save_writes_flat_json_next_to_checkpoint() {
        let dir = TempDir::new().unwrap();
        let mut config = RunConfig::default();
        config.trainer.checkpoint_dir = dir.path().join("ckpt");
        config.trainer.run_name = "exp1".into();

        let path = config.save().unwrap();
        assert_eq!(path, dir.path().join("ckpt/exp1.config.json"));

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["run_name"], "exp1");
        assert_eq!(raw["batch_size"], 32);

        assert_eq!(RunConfig::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = RunConfig { batch_size: 0, ..RunConfig::default() };
        assert!(config.validate().is_err());
        assert!(RunConfig::default().validate().is_ok());
    }
}

// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists and restores the trainer's full state as ONE record:
//
//   epoch              last finished epoch (-1 = untrained)
//   cur_step           consecutive non-improving evaluations
//   best_valid_score   lowest validation loss so far
//   state_dict         model parameters (opaque)
//   optimizer          optimizer state (opaque)
//
// File naming convention:
//   <checkpoint_dir>/<run_name>.pth           the record (JSON)
//   <checkpoint_dir>/<run_name>.pth.tmp       in-flight write
//
// A save writes the temp file and renames it over the target,
// so readers see either the previous or the new snapshot,
// never a half-written one. One trainer per run name.
//
// Reference: Rust Book §9 (Error Handling)
//            std::fs::rename

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::traits::StateDict;

/// Full snapshot of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch:            i64,
    pub cur_step:         usize,
    pub best_valid_score: f64,
    pub state_dict:       StateDict,
    pub optimizer:        StateDict,
}

impl Checkpoint {
    /// Read a checkpoint record from any path.
    /// Missing or unparsable files are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read checkpoint '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Corrupt checkpoint '{}'", path.display()))
    }
}

/// Owns the checkpoint location of one run.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    /// `<checkpoint_dir>/<run_name>.pth`
    path: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>, run_name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { path: dir.join(format!("{run_name}.pth")) })
    }

    /// Where this run's checkpoint lives
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the run's checkpoint with `checkpoint`.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let json = serde_json::to_string(checkpoint).context("Cannot serialise checkpoint")?;

        let tmp_path = self.path.with_extension("pth.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Cannot write checkpoint '{}'", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Cannot move checkpoint into '{}'", self.path.display()))?;

        tracing::debug!("Saved checkpoint (epoch {}) to '{}'", checkpoint.epoch, self.path.display());
        Ok(())
    }

    /// Load this run's checkpoint.
    pub fn load(&self) -> Result<Checkpoint> {
        Checkpoint::load(&self.path)
    }

    /// Whether a checkpoint has been written for this run
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample(epoch: i64) -> Checkpoint {
        Checkpoint {
            epoch,
            cur_step: 2,
            best_valid_score: 1.25,
            state_dict: json!({"weight": [0.5, -1.0]}),
            optimizer: json!({"steps": 10}),
        }
    }

    #[test]
    fn test_path_uses_run_name() {
        let dir = TempDir::new().unwrap();
        let mgr = CheckpointManager::new(dir.path().join("ckpt"), "run-a").unwrap();
        assert_eq!(mgr.path(), dir.path().join("ckpt").join("run-a.pth"));
        assert!(dir.path().join("ckpt").is_dir());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mgr = CheckpointManager::new(dir.path(), "run").unwrap();
        assert!(!mgr.exists());

        mgr.save(&sample(3)).unwrap();
        assert!(mgr.exists());
        assert!(!dir.path().join("run.pth.tmp").exists());
        assert_eq!(mgr.load().unwrap(), sample(3));
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let mgr = CheckpointManager::new(dir.path(), "run").unwrap();
        mgr.save(&sample(1)).unwrap();
        mgr.save(&sample(-1)).unwrap();
        assert_eq!(mgr.load().unwrap().epoch, -1);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mgr = CheckpointManager::new(dir.path(), "nothing").unwrap();
        assert!(mgr.load().is_err());
    }

    #[test]
    fn test_corrupt_checkpoint_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mgr = CheckpointManager::new(dir.path(), "run").unwrap();
        fs::write(mgr.path(), b"corrupted").unwrap();
        let err = mgr.load().unwrap_err();
        assert!(format!("{err:#}").contains("Corrupt checkpoint"));
    }
}

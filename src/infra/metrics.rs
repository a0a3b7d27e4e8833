// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch training curves to a CSV file when the run
// is configured with `plot = true`.
//
// Output file: <metrics_dir>/<run_name>/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,valid_loss,valid_ppl
//   0,5.123400,,
//   1,4.890100,4.854300,128.290000
//   ...
//
// Validation columns stay empty on epochs that are not
// evaluation epochs (see eval_step).
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of the training curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:      usize,
    /// Mean loss over all training batches
    pub train_loss: f64,
    /// Mean validation loss (evaluation epochs only)
    pub valid_loss: Option<f64>,
    /// exp(valid_loss)
    pub valid_ppl:  Option<f64>,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64) -> Self {
        Self { epoch, train_loss, valid_loss: None, valid_ppl: None }
    }

    pub fn with_validation(mut self, valid_loss: f64, valid_ppl: f64) -> Self {
        self.valid_loss = Some(valid_loss);
        self.valid_ppl = Some(valid_ppl);
        self
    }
}

/// Appends epoch metrics to a CSV file.
#[derive(Debug)]
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create `<dir>/<run_name>/metrics.csv`, writing the header if new.
    pub fn new(dir: impl AsRef<Path>, run_name: &str) -> Result<Self> {
        let run_dir = dir.as_ref().join(run_name);
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Cannot create metrics dir '{}'", run_dir.display()))?;

        let csv_path = run_dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,valid_loss,valid_ppl")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's row
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let fmt_opt = |v: Option<f64>| v.map(|x| format!("{x:.6}")).unwrap_or_default();
        writeln!(
            f,
            "{},{:.6},{},{}",
            m.epoch,
            m.train_loss,
            fmt_opt(m.valid_loss),
            fmt_opt(m.valid_ppl),
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let logger = MetricsLogger::new(dir.path(), "run").unwrap();
        logger.log(&EpochMetrics::new(0, 2.5)).unwrap();
        logger.log(&EpochMetrics::new(1, 2.0).with_validation(1.0, 1.0_f64.exp())).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,valid_loss,valid_ppl");
        assert_eq!(lines[1], "0,2.500000,,");
        assert_eq!(lines[2], "1,2.000000,1.000000,2.718282");
    }

    #[test]
    fn test_reopening_appends() {
        let dir = TempDir::new().unwrap();
        MetricsLogger::new(dir.path(), "run").unwrap().log(&EpochMetrics::new(0, 1.0)).unwrap();
        let logger = MetricsLogger::new(dir.path(), "run").unwrap();
        logger.log(&EpochMetrics::new(1, 0.5)).unwrap();
        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}

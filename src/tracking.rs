//! Best-effort experiment tracking.
//!
//! Every retrain appends one JSON object to a run log. The tracker is
//! a sink, not a dependency: any I/O failure is logged at `warn` and
//! training carries on — a retrain must never fail because the
//! tracking directory is unavailable.
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

pub const RUN_LOG_FILENAME: &str = "mlruns.jsonl";

/// Parameters recorded for one retraining run.
#[derive(Debug, Clone, Serialize)]
pub struct RunParams {
    pub model_type: String,
    pub scenario: String,
    pub cv_folds: usize,
    pub n_samples: usize,
    pub n_features: usize,
}

/// Scored metrics recorded for one retraining run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub f1_mean: f64,
    pub f1_std: f64,
    pub recall_mean: f64,
    pub recall_std: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run_name: String,
    pub timestamp: String,
    pub params: RunParams,
    pub metrics: RunMetrics,
    /// Artifact path, filled in after the model is persisted.
    pub artifact: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunTracker {
    log_path: Option<PathBuf>,
}

impl RunTracker {
    /// Track runs under `dir` (created on first write).
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        RunTracker {
            log_path: Some(dir.into().join(RUN_LOG_FILENAME)),
        }
    }

    /// A tracker that drops everything; useful in tests.
    pub fn disabled() -> Self {
        RunTracker { log_path: None }
    }

    /// Append one run record. Best-effort by design.
    pub fn log_run(&self, record: &RunRecord) {
        let Some(path) = &self.log_path else {
            return;
        };
        if let Err(err) = self.append(path, record) {
            log::warn!(
                "Experiment tracker unavailable ({}): run '{}' not recorded",
                err,
                record.run_name
            );
        }
    }

    fn append(&self, path: &std::path::Path, record: &RunRecord) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

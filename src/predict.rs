//! Single-record prediction serving with audit logging.
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dataset::{Frame, Value};
use crate::registry::ModelRegistry;
use crate::schema::{self, Scenario};

/// What the caller gets back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: i32,
    pub mode: String,
    pub interpretation: String,
}

/// One append-only audit entry, written as a JSON line per prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: String,
    pub session_id: String,
    pub endpoint: String,
    pub model: String,
    pub prediction: i32,
}

/// Append-only JSON-lines audit sink. Like the experiment tracker it
/// is best-effort: a prediction is never refused because the audit
/// file cannot be written, but the failure is logged.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        AuditLog { path: path.into() }
    }

    pub fn append(&self, record: &PredictionRecord) {
        if let Err(err) = self.try_append(record) {
            log::warn!(
                "Audit log unavailable ({}): prediction for session {} not recorded",
                err,
                record.session_id
            );
        }
    }

    fn try_append(&self, record: &PredictionRecord) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }
}

/// Applies loaded pipelines to single records.
pub struct PredictionService {
    registry: ModelRegistry,
    audit: AuditLog,
}

impl PredictionService {
    pub fn new(registry: ModelRegistry, audit: AuditLog) -> Self {
        PredictionService { registry, audit }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.registry
    }

    /// Predict one record under `scenario`.
    ///
    /// All schema columns are required inputs here — serving drops
    /// nothing, unlike training-time preparation. Extra keys are
    /// ignored. A categorical value never seen in training still
    /// predicts (it one-hot encodes to zeros).
    pub fn predict(
        &self,
        scenario: Scenario,
        record: &BTreeMap<String, Value>,
        session_id: Option<String>,
    ) -> Result<PredictionResponse> {
        schema::check_required_columns(scenario, record.keys().map(String::as_str))?;

        let frame = Frame::from_record(scenario, record);
        let label = self.registry.get(scenario).predict_one(&frame)?;

        let session_id = session_id.unwrap_or_else(generate_session_id);
        log::info!(
            "Prediction ({}) session={}: {}",
            scenario,
            session_id,
            label
        );

        self.audit.append(&PredictionRecord {
            timestamp: Utc::now().to_rfc3339(),
            session_id,
            endpoint: format!("/predict-{}", scenario.tag().replace('_', "-")),
            model: scenario.tag().to_string(),
            prediction: label,
        });

        Ok(PredictionResponse {
            prediction: label,
            mode: scenario.tag().to_string(),
            interpretation: interpret(label).to_string(),
        })
    }
}

fn interpret(label: i32) -> &'static str {
    if label == 1 {
        "Likely to succeed"
    } else {
        "At risk of failing"
    }
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

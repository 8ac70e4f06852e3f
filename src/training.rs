//! The retraining orchestrator: prepare, cross-validate, track, fit,
//! persist.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, TrainerConfig};
use crate::dataset::{self, Dataset, Frame};
use crate::metrics;
use crate::pipeline::PipelineBuilder;
use crate::schema::Scenario;
use crate::tracking::{RunMetrics, RunParams, RunRecord, RunTracker};

/// Immutable summary of one retraining invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRun {
    pub scenario: String,
    pub n_samples: usize,
    pub n_features: usize,
    pub cv_folds: usize,
    pub f1_mean: f64,
    pub f1_std: f64,
    pub recall_mean: f64,
    pub recall_std: f64,
    pub model_path: String,
}

pub struct Trainer {
    model: ModelConfig,
    trainer: TrainerConfig,
    tracker: RunTracker,
}

impl Trainer {
    pub fn new(model: ModelConfig, trainer: TrainerConfig, tracker: RunTracker) -> Self {
        Trainer {
            model,
            trainer,
            tracker,
        }
    }

    /// Default configs, supplied tracker.
    pub fn with_tracker(tracker: RunTracker) -> Self {
        Trainer::new(ModelConfig::default(), TrainerConfig::default(), tracker)
    }

    /// Retrain the scenario's model from scratch on `dataset`.
    ///
    /// Cross-validation folds are diagnostic only; the deployed model
    /// is always refit on 100% of the prepared rows. Nothing is
    /// persisted until preparation and cross-validation have both
    /// succeeded, so a failed retrain leaves the previously deployed
    /// artifact intact.
    pub fn retrain(
        &self,
        dataset: &Dataset,
        scenario: Scenario,
        models_dir: &Path,
    ) -> Result<TrainingRun> {
        let (frame, labels) = dataset::prepare(dataset, scenario, &self.trainer)?;
        let n_samples = frame.nrows();
        let n_features = frame.ncols();
        let cv_folds = self.trainer.max_folds.min(n_samples);

        log::info!(
            "Retraining scenario {}: {} samples, {} features, {}-fold CV",
            scenario,
            n_samples,
            n_features,
            cv_folds
        );

        let builder = PipelineBuilder::new(self.model.clone());
        let (f1_scores, recall_scores) =
            cross_validate(&builder, &frame, &labels, cv_folds, self.model.seed)?;

        let f1_mean = metrics::mean(&f1_scores);
        let recall_mean = metrics::mean(&recall_scores);
        log::info!(
            "CV scores for {}: f1 {:.3} +/- {:.3}, recall {:.3} +/- {:.3}",
            scenario,
            f1_mean,
            metrics::std(&f1_scores),
            recall_mean,
            metrics::std(&recall_scores)
        );

        // Final fit on the full dataset, then atomic persist.
        let pipeline = builder.fit(&frame, &labels)?;
        let artifact_path = artifact_path(models_dir, scenario);
        fs::create_dir_all(models_dir)
            .with_context(|| format!("Failed to create models dir {}", models_dir.display()))?;
        pipeline.save_atomic(&artifact_path)?;
        log::info!("Persisted {} model to {}", scenario, artifact_path.display());

        let run = TrainingRun {
            scenario: scenario.tag().to_string(),
            n_samples,
            n_features,
            cv_folds,
            f1_mean,
            f1_std: metrics::std(&f1_scores),
            recall_mean,
            recall_std: metrics::std(&recall_scores),
            model_path: artifact_path.display().to_string(),
        };

        self.tracker.log_run(&run_record(&run));
        Ok(run)
    }
}

/// Fixed scenario-keyed artifact location under `models_dir`.
pub fn artifact_path(models_dir: &Path, scenario: Scenario) -> PathBuf {
    models_dir.join(scenario.artifact_filename())
}

/// K-fold cross-validation scoring F1 and recall per fold.
///
/// Fold membership comes from a seeded shuffle of the row indices, so
/// repeated retrains on the same upload score the same folds.
fn cross_validate(
    builder: &PipelineBuilder,
    frame: &Frame,
    labels: &[i32],
    folds: usize,
    seed: u64,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = frame.nrows();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut f1_scores = Vec::with_capacity(folds);
    let mut recall_scores = Vec::with_capacity(folds);

    let base = n / folds;
    let extra = n % folds;
    let mut start = 0usize;

    for fold in 0..folds {
        let size = base + usize::from(fold < extra);
        let test_idx = &indices[start..start + size];
        let train_idx: Vec<usize> = indices[..start]
            .iter()
            .chain(&indices[start + size..])
            .copied()
            .collect();
        start += size;

        let train_frame = frame.select_rows(&train_idx);
        let train_labels: Vec<i32> = train_idx.iter().map(|&i| labels[i]).collect();
        let test_frame = frame.select_rows(test_idx);
        let test_labels: Vec<i32> = test_idx.iter().map(|&i| labels[i]).collect();

        let fitted = builder
            .fit(&train_frame, &train_labels)
            .with_context(|| format!("Cross-validation fold {} failed to fit", fold + 1))?;
        let predictions = fitted.predict(&test_frame)?;

        f1_scores.push(metrics::f1(&test_labels, &predictions));
        recall_scores.push(metrics::recall(&test_labels, &predictions));
    }

    Ok((f1_scores, recall_scores))
}

fn run_record(run: &TrainingRun) -> RunRecord {
    let now = Utc::now();
    RunRecord {
        run_name: format!("retrain_{}_{}", run.scenario, now.format("%Y%m%dT%H%M%SZ")),
        timestamp: now.to_rfc3339(),
        params: RunParams {
            model_type: "LogisticRegression".to_string(),
            scenario: run.scenario.clone(),
            cv_folds: run.cv_folds,
            n_samples: run.n_samples,
            n_features: run.n_features,
        },
        metrics: RunMetrics {
            f1_mean: run.f1_mean,
            f1_std: run.f1_std,
            recall_mean: run.recall_mean,
            recall_std: run.recall_std,
        },
        artifact: Some(run.model_path.clone()),
    }
}

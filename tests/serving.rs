//! Registry loading and prediction serving with audit records.
mod common;

use std::fs;
use std::path::Path;

use reussite::dataset::Value;
use reussite::error::CoreError;
use reussite::predict::{AuditLog, PredictionService};
use reussite::registry::ModelRegistry;
use reussite::schema::Scenario;
use reussite::tracking::RunTracker;
use reussite::training::Trainer;

use common::{dummy_dataset, dummy_record};

fn train_both(models_dir: &Path) {
    let trainer = Trainer::with_tracker(RunTracker::disabled());
    let ds = dummy_dataset(20);
    trainer.retrain(&ds, Scenario::Early, models_dir).unwrap();
    trainer.retrain(&ds, Scenario::Full, models_dir).unwrap();
}

#[test]
fn registry_requires_both_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let err = ModelRegistry::load(dir.path()).unwrap_err();
    match err {
        CoreError::ModelUnavailable { path, .. } => {
            assert!(path.ends_with("model_without_g2.bin"));
        }
        other => panic!("expected ModelUnavailable, got {other}"),
    }
}

#[test]
fn corrupt_artifact_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    train_both(dir.path());
    fs::write(dir.path().join("model_with_g2.bin"), b"garbage").unwrap();
    assert!(matches!(
        ModelRegistry::load(dir.path()),
        Err(CoreError::ModelUnavailable { .. })
    ));
}

#[test]
fn predict_returns_label_mode_and_interpretation() {
    let models = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();
    train_both(models.path());

    let registry = ModelRegistry::load(models.path()).unwrap();
    let service = PredictionService::new(
        registry,
        AuditLog::new(logs.path().join("predictions.jsonl")),
    );

    let response = service
        .predict(Scenario::Full, &dummy_record(true), None)
        .unwrap();
    assert_eq!(response.mode, "with_g2");
    // the fixture's "mat" row is a clear success case
    assert_eq!(response.prediction, 1);
    assert_eq!(response.interpretation, "Likely to succeed");
}

#[test]
fn predict_missing_fields_fails_with_schema_error() {
    let models = tempfile::tempdir().unwrap();
    train_both(models.path());

    let registry = ModelRegistry::load(models.path()).unwrap();
    let service = PredictionService::new(
        registry,
        AuditLog::new(models.path().join("predictions.jsonl")),
    );

    // early record lacks G2, so the full scenario must reject it
    let err = service
        .predict(Scenario::Full, &dummy_record(false), None)
        .unwrap_err();
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::Schema { missing }) => assert_eq!(missing, &vec!["G2".to_string()]),
        other => panic!("expected Schema error, got {other:?}"),
    }
}

#[test]
fn unseen_category_is_tolerated_at_serve_time() {
    let models = tempfile::tempdir().unwrap();
    train_both(models.path());

    let registry = ModelRegistry::load(models.path()).unwrap();
    let service = PredictionService::new(
        registry,
        AuditLog::new(models.path().join("predictions.jsonl")),
    );

    let mut record = dummy_record(false);
    record.insert("source".to_string(), Value::Cat("exchange".to_string()));
    let response = service.predict(Scenario::Early, &record, None).unwrap();
    assert!(response.prediction == 0 || response.prediction == 1);
}

#[test]
fn audit_log_appends_one_json_line_per_prediction() {
    let models = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();
    let audit_path = logs.path().join("predictions.jsonl");
    train_both(models.path());

    let registry = ModelRegistry::load(models.path()).unwrap();
    let service = PredictionService::new(registry, AuditLog::new(&audit_path));

    service
        .predict(Scenario::Early, &dummy_record(false), Some("abc123".to_string()))
        .unwrap();
    service
        .predict(Scenario::Full, &dummy_record(true), None)
        .unwrap();

    let log = fs::read_to_string(&audit_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["session_id"], "abc123");
    assert_eq!(first["endpoint"], "/predict-without-g2");
    assert_eq!(first["model"], "without_g2");
    assert!(first["prediction"] == 0 || first["prediction"] == 1);
    assert!(first["timestamp"].as_str().unwrap().contains('T'));

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["session_id"].as_str().unwrap().len(), 16);
}

#[test]
fn reload_picks_up_a_retrained_model() {
    let models = tempfile::tempdir().unwrap();
    train_both(models.path());

    let mut registry = ModelRegistry::load(models.path()).unwrap();
    // retrain on a different upload, then reload explicitly
    let trainer = Trainer::with_tracker(RunTracker::disabled());
    trainer
        .retrain(&dummy_dataset(10), Scenario::Early, models.path())
        .unwrap();
    registry.reload_scenario(Scenario::Early).unwrap();

    // registry still serves both scenarios after the swap
    assert!(!registry.get(Scenario::Early).input_columns().contains(&"G2"));
    assert!(registry.get(Scenario::Full).input_columns().contains(&"G2"));
}

#[test]
fn extra_fields_in_a_record_are_ignored() {
    let models = tempfile::tempdir().unwrap();
    train_both(models.path());

    let registry = ModelRegistry::load(models.path()).unwrap();
    let service = PredictionService::new(
        registry,
        AuditLog::new(models.path().join("predictions.jsonl")),
    );

    let mut record = dummy_record(true);
    record.insert("nickname".to_string(), Value::Cat("momo".to_string()));
    assert!(service.predict(Scenario::Full, &record, None).is_ok());
}

//! Pipeline builder and artifact round-trips.
mod common;

use reussite::config::{ModelConfig, TrainerConfig};
use reussite::dataset::{self, Column, Frame, Value};
use reussite::pipeline::{Pipeline, PipelineBuilder};
use reussite::schema::Scenario;

use common::{dummy_dataset, dummy_record};

fn fitted_pipeline(scenario: Scenario) -> (Pipeline, Frame) {
    let ds = dummy_dataset(20);
    let (frame, labels) = dataset::prepare(&ds, scenario, &TrainerConfig::default()).unwrap();
    let pipeline = PipelineBuilder::new(ModelConfig::default())
        .fit(&frame, &labels)
        .unwrap();
    (pipeline, frame)
}

#[test]
fn predictions_are_binary_and_aligned() {
    let (pipeline, frame) = fitted_pipeline(Scenario::Full);
    let preds = pipeline.predict(&frame).unwrap();
    assert_eq!(preds.len(), frame.nrows());
    assert!(preds.iter().all(|&p| p == 0 || p == 1));
}

#[test]
fn separable_fixture_is_learned() {
    let (pipeline, frame) = fitted_pipeline(Scenario::Full);
    let preds = pipeline.predict(&frame).unwrap();
    // fixture rows alternate success/failure and are linearly separable
    for (i, &p) in preds.iter().enumerate() {
        assert_eq!(p, ((i + 1) % 2) as i32, "row {} misclassified", i);
    }
}

#[test]
fn early_pipeline_never_sees_g2() {
    let (pipeline, _) = fitted_pipeline(Scenario::Early);
    assert!(!pipeline.input_columns().contains(&"G2"));
    assert_eq!(
        pipeline.input_columns().len(),
        Scenario::Early.features().len()
    );
}

#[test]
fn unseen_category_still_predicts() {
    let (pipeline, _) = fitted_pipeline(Scenario::Full);
    let mut record = dummy_record(true);
    record.insert("famsize".to_string(), Value::Cat("XXL".to_string()));
    let frame = Frame::from_record(Scenario::Full, &record);
    let label = pipeline.predict_one(&frame).unwrap();
    assert!(label == 0 || label == 1);
}

#[test]
fn persisted_pipeline_round_trips() {
    let (pipeline, frame) = fitted_pipeline(Scenario::Full);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_with_g2.bin");

    pipeline.save_atomic(&path).unwrap();
    let reloaded = Pipeline::load(&path).unwrap();

    assert_eq!(
        pipeline.predict(&frame).unwrap(),
        reloaded.predict(&frame).unwrap()
    );
}

#[test]
fn save_atomic_leaves_no_temp_file() {
    let (pipeline, _) = fitted_pipeline(Scenario::Early);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_without_g2.bin");
    pipeline.save_atomic(&path).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "stray temp files: {leftovers:?}");
}

#[test]
fn corrupt_artifact_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model_with_g2.bin");
    std::fs::write(&path, b"not a model").unwrap();
    assert!(Pipeline::load(&path).is_err());
}

#[test]
fn numeric_looking_string_is_accepted_in_numeric_column() {
    let (pipeline, _) = fitted_pipeline(Scenario::Early);
    let mut record = dummy_record(false);
    record.insert("absences".to_string(), Value::Cat("3".to_string()));
    let frame = Frame::from_record(Scenario::Early, &record);
    assert!(pipeline.predict_one(&frame).is_ok());
}

#[test]
fn non_numeric_value_in_numeric_column_is_an_error() {
    let (pipeline, _) = fitted_pipeline(Scenario::Early);
    let mut record = dummy_record(false);
    record.insert("absences".to_string(), Value::Cat("lots".to_string()));
    let frame = Frame::from_record(Scenario::Early, &record);
    assert!(pipeline.predict_one(&frame).is_err());
}

#[test]
fn builder_is_scenario_agnostic() {
    // same builder fits frames of different shapes
    let builder = PipelineBuilder::new(ModelConfig::default());
    let ds = dummy_dataset(10);
    for scenario in [Scenario::Early, Scenario::Full] {
        let (frame, labels) =
            dataset::prepare(&ds, scenario, &TrainerConfig::default()).unwrap();
        let pipeline = builder.fit(&frame, &labels).unwrap();
        assert_eq!(pipeline.input_columns().len(), scenario.features().len());
    }
    // a frame with only one column kind also works
    let frame = Frame::new(
        vec![Column::numeric("absences", vec![0.0, 1.0, 2.0, 3.0])],
        4,
    );
    assert!(builder.fit(&frame, &[0, 0, 1, 1]).is_ok());
}

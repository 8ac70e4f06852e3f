//! The composed preprocessing + classifier pipeline and its on-disk form.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::dataset::Frame;
use crate::models::LogisticRegression;
use crate::preprocessing::ColumnTransformer;

/// Builds pipelines from a frame's declared column kinds; reusable
/// across scenarios because nothing in here names a column.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: ModelConfig,
}

impl PipelineBuilder {
    pub fn new(config: ModelConfig) -> Self {
        PipelineBuilder { config }
    }

    /// Fit the full pipeline on a frame: encodings first, classifier
    /// on the encoded matrix.
    pub fn fit(&self, frame: &Frame, y: &[i32]) -> Result<Pipeline> {
        let transformer = ColumnTransformer::fit(frame)?;
        let x = transformer.transform(frame)?;
        let mut classifier = LogisticRegression::new(&self.config);
        classifier.fit(&x, y)?;
        Ok(Pipeline {
            transformer,
            classifier,
        })
    }
}

/// A fitted transform + classifier. Opaque to callers: feed it rows,
/// get hard 0/1 labels back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    transformer: ColumnTransformer,
    classifier: LogisticRegression,
}

impl Pipeline {
    pub fn predict(&self, frame: &Frame) -> Result<Vec<i32>> {
        let x = self.transformer.transform(frame)?;
        self.classifier.predict(&x)
    }

    /// Predict a single-row frame.
    pub fn predict_one(&self, frame: &Frame) -> Result<i32> {
        anyhow::ensure!(
            frame.nrows() == 1,
            "predict_one expects exactly one row, got {}",
            frame.nrows()
        );
        Ok(self.predict(frame)?[0])
    }

    /// Source columns the pipeline was fitted on.
    pub fn input_columns(&self) -> Vec<&str> {
        self.transformer.input_columns()
    }

    /// Serialize to `path` atomically: write a sibling temp file, then
    /// rename over the target so a crash mid-write can never leave a
    /// half-written artifact servable.
    pub fn save_atomic<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .context("Failed to serialize pipeline")?;

        let tmp = path.with_extension("bin.tmp");
        fs::write(&tmp, &bytes)
            .with_context(|| format!("Failed to write temp artifact {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move artifact into place at {}", path.display()))?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Pipeline> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let (pipeline, _) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .with_context(|| format!("Corrupt artifact {}", path.display()))?;
        Ok(pipeline)
    }
}

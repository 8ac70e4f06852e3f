//! Init-once registry of loaded scenario pipelines.
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::pipeline::Pipeline;
use crate::schema::Scenario;
use crate::training::artifact_path;

/// Holds one loaded pipeline per scenario.
///
/// Constructed once at process start; serving cannot begin without
/// both artifacts. The loaded models never change under a caller's
/// feet — after a successful retrain the owner calls [`reload`] (or
/// [`reload_scenario`]) explicitly.
///
/// [`reload`]: ModelRegistry::reload
/// [`reload_scenario`]: ModelRegistry::reload_scenario
#[derive(Debug)]
pub struct ModelRegistry {
    models_dir: PathBuf,
    early: Pipeline,
    full: Pipeline,
}

impl ModelRegistry {
    /// Load both scenario artifacts from `models_dir`.
    pub fn load<P: AsRef<Path>>(models_dir: P) -> Result<Self, CoreError> {
        let models_dir = models_dir.as_ref().to_path_buf();
        let early = load_artifact(&models_dir, Scenario::Early)?;
        let full = load_artifact(&models_dir, Scenario::Full)?;
        log::info!("Loaded both scenario models from {}", models_dir.display());
        Ok(ModelRegistry {
            models_dir,
            early,
            full,
        })
    }

    pub fn get(&self, scenario: Scenario) -> &Pipeline {
        match scenario {
            Scenario::Early => &self.early,
            Scenario::Full => &self.full,
        }
    }

    /// Re-read both artifacts, e.g. after retraining both scenarios.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.reload_scenario(Scenario::Early)?;
        self.reload_scenario(Scenario::Full)
    }

    /// Re-read one scenario's artifact after a successful retrain.
    pub fn reload_scenario(&mut self, scenario: Scenario) -> Result<(), CoreError> {
        let pipeline = load_artifact(&self.models_dir, scenario)?;
        match scenario {
            Scenario::Early => self.early = pipeline,
            Scenario::Full => self.full = pipeline,
        }
        log::info!("Reloaded {} model", scenario);
        Ok(())
    }
}

fn load_artifact(models_dir: &Path, scenario: Scenario) -> Result<Pipeline, CoreError> {
    let path = artifact_path(models_dir, scenario);
    Pipeline::load(&path).map_err(|err| CoreError::ModelUnavailable {
        path,
        reason: format!("{:#}", err),
    })
}

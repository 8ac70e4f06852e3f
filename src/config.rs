use serde::{Deserialize, Serialize};

/// Hyper-parameters for the logistic regression classifier.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ModelConfig {
    pub learning_rate: f32,
    /// Iteration cap for gradient descent.
    pub max_iter: usize,
    /// L2 penalty strength.
    pub l2: f32,
    /// Seed for cross-validation fold shuffling.
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 1000,
            l2: 1.0,
            seed: 42,
        }
    }
}

/// Dataset-level training policy.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TrainerConfig {
    /// A raw G3 score at or above this counts as success.
    pub pass_threshold: f64,
    /// Minimum usable rows before retraining is allowed.
    pub min_samples: usize,
    /// Fold count is min(max_folds, n_samples).
    pub max_folds: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 10.0,
            min_samples: 5,
            max_folds: 5,
        }
    }
}

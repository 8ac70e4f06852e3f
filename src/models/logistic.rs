//! L2-regularized logistic regression trained by batch gradient descent.
//!
//! The inputs are already standardized by the column transformer, so
//! plain full-batch gradient descent with zero-initialized weights is
//! stable and deterministic. Fitted state is plain data and serializes
//! with the pipeline.
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::math::Array2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    learning_rate: f32,
    max_iter: usize,
    l2: f32,
    weights: Vec<f32>,
    bias: f32,
}

impl LogisticRegression {
    pub fn new(config: &ModelConfig) -> Self {
        LogisticRegression {
            learning_rate: config.learning_rate,
            max_iter: config.max_iter,
            l2: config.l2,
            weights: Vec::new(),
            bias: 0.0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Fit on an encoded matrix; `y` holds 0/1 labels aligned by row.
    pub fn fit(&mut self, x: &Array2<f32>, y: &[i32]) -> Result<()> {
        let (nrows, ncols) = x.shape();
        anyhow::ensure!(nrows > 0 && ncols > 0, "Cannot fit on an empty matrix");
        anyhow::ensure!(
            y.len() == nrows,
            "Label vector length {} does not match {} rows",
            y.len(),
            nrows
        );

        let mut weights = vec![0.0f32; ncols];
        let mut bias = 0.0f32;
        let n = nrows as f32;

        for _ in 0..self.max_iter {
            let mut grad_w = vec![0.0f32; ncols];
            let mut grad_b = 0.0f32;

            for row in 0..nrows {
                let features = x.row_slice(row);
                let z = dot(features, &weights) + bias;
                let err = sigmoid(z) - y[row] as f32;
                for (g, &f) in grad_w.iter_mut().zip(features) {
                    *g += err * f;
                }
                grad_b += err;
            }

            let mut max_step = 0.0f32;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                let step = self.learning_rate * (g / n + self.l2 * *w / n);
                *w -= step;
                max_step = max_step.max(step.abs());
            }
            let step_b = self.learning_rate * grad_b / n;
            bias -= step_b;
            max_step = max_step.max(step_b.abs());

            if max_step < 1e-6 {
                break;
            }
        }

        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    /// Hard 0/1 labels at the 0.5 probability boundary.
    pub fn predict(&self, x: &Array2<f32>) -> Result<Vec<i32>> {
        anyhow::ensure!(self.is_fitted(), "Model has not been fitted");
        anyhow::ensure!(
            x.ncols() == self.weights.len(),
            "Input has {} features, model was fitted on {}",
            x.ncols(),
            self.weights.len()
        );

        let mut labels = Vec::with_capacity(x.nrows());
        for row in 0..x.nrows() {
            let z = dot(x.row_slice(row), &self.weights) + self.bias;
            labels.push((z >= 0.0) as i32);
        }
        Ok(labels)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

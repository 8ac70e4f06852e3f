//! Column preprocessing: standardization and one-hot encoding.
//!
//! The transformer is built from a frame's declared column kinds, not
//! from hardcoded column names, so the same code serves both
//! scenarios. Fitted state is plain data and serializes with the rest
//! of the pipeline.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::dataset::{Column, ColumnKind, ColumnValues, Frame};
use crate::math::Array2;

/// Minimum stddev to avoid division by zero when transforming.
const MIN_STD: f32 = 1e-6;

/// Fitted per-column encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColumnOp {
    /// Zero mean, unit variance, statistics from the training frame.
    Standardize { mean: f32, std: f32 },
    /// One indicator per training-time category, in sorted order.
    /// A category never seen in training encodes as all zeros.
    OneHot { categories: Vec<String> },
}

impl ColumnOp {
    fn width(&self) -> usize {
        match self {
            ColumnOp::Standardize { .. } => 1,
            ColumnOp::OneHot { categories } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedColumn {
    name: String,
    op: ColumnOp,
}

/// Composed numeric/categorical transform over named columns.
///
/// Numeric columns come first in the encoded output, categorical
/// blocks after, each group keeping schema order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    columns: Vec<FittedColumn>,
}

impl ColumnTransformer {
    /// Fit encodings from the training frame's declared column kinds.
    pub fn fit(frame: &Frame) -> Result<ColumnTransformer> {
        anyhow::ensure!(frame.nrows() > 0, "Cannot fit a transformer on an empty frame");

        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for col in &frame.columns {
            match col.kind() {
                ColumnKind::Numeric => numeric.push(fit_numeric(col)),
                ColumnKind::Categorical => categorical.push(fit_categorical(col)),
            }
        }

        let mut columns = numeric;
        columns.append(&mut categorical);
        Ok(ColumnTransformer { columns })
    }

    /// Number of encoded output features.
    pub fn n_output_features(&self) -> usize {
        self.columns.iter().map(|c| c.op.width()).sum()
    }

    /// Names of the source columns this transformer was fitted on.
    pub fn input_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Encode a frame into a dense matrix, one row per input row.
    ///
    /// The fitted transformer is authoritative: a column is encoded
    /// the way it was encoded in training regardless of how the
    /// incoming value is typed.
    pub fn transform(&self, frame: &Frame) -> Result<Array2<f32>> {
        let nrows = frame.nrows();
        let ncols = self.n_output_features();
        let mut out = Vec::with_capacity(nrows * ncols);

        for row in 0..nrows {
            for fitted in &self.columns {
                let column = frame
                    .column(&fitted.name)
                    .ok_or_else(|| anyhow!("Column '{}' missing at transform time", fitted.name))?;
                let value = column.value_at(row);
                match &fitted.op {
                    ColumnOp::Standardize { mean, std } => {
                        let v = value.as_f64().ok_or_else(|| {
                            anyhow!(
                                "Non-numeric value '{}' in numeric column '{}'",
                                value.as_category(),
                                fitted.name
                            )
                        })?;
                        out.push((v as f32 - mean) / std);
                    }
                    ColumnOp::OneHot { categories } => {
                        let key = value.as_category();
                        let hit = categories.iter().position(|c| *c == key);
                        for idx in 0..categories.len() {
                            out.push(if hit == Some(idx) { 1.0 } else { 0.0 });
                        }
                    }
                }
            }
        }

        Array2::from_shape_vec((nrows, ncols), out).map_err(|e| anyhow!(e))
    }
}

fn fit_numeric(col: &Column) -> FittedColumn {
    let values: Vec<f32> = match &col.values {
        ColumnValues::Num(v) => v.iter().map(|&x| x as f32).collect(),
        // a categorical column never reaches here; kinds are declared
        ColumnValues::Cat(_) => unreachable!("fit_numeric on categorical column"),
    };
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    FittedColumn {
        name: col.name.clone(),
        op: ColumnOp::Standardize {
            mean,
            std: var.sqrt().max(MIN_STD),
        },
    }
}

fn fit_categorical(col: &Column) -> FittedColumn {
    let mut categories: Vec<String> = match &col.values {
        ColumnValues::Cat(v) => v.clone(),
        ColumnValues::Num(v) => v.iter().map(|x| x.to_string()).collect(),
    };
    categories.sort();
    categories.dedup();
    FittedColumn {
        name: col.name.clone(),
        op: ColumnOp::OneHot { categories },
    }
}

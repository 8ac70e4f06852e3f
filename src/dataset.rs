//! Typed tabular data and the dataset preparer.
//!
//! A `Dataset` is column-major: every column is wholly numeric or
//! wholly categorical, decided once when the data is parsed. The
//! preparer turns a raw upload into a schema-ordered feature `Frame`
//! plus an aligned binary label vector.
use std::collections::BTreeMap;

use crate::config::TrainerConfig;
use crate::error::CoreError;
use crate::schema::{self, Scenario};

/// A single cell value from a CSV upload or an API record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Cat(String),
}

impl Value {
    /// Numeric view; numeric-looking strings are accepted so that a
    /// serve-time record may carry "12" for an integer field.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Num(v) => Some(*v),
            Value::Cat(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Stringified view used as a one-hot category key.
    pub fn as_category(&self) -> String {
        match self {
            Value::Num(v) => {
                if v.fract() == 0.0 {
                    format!("{}", *v as i64)
                } else {
                    format!("{}", v)
                }
            }
            Value::Cat(s) => s.clone(),
        }
    }
}

/// Declared type of a column, fixed at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Num(Vec<f64>),
    Cat(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric<S: Into<String>>(name: S, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            values: ColumnValues::Num(values),
        }
    }

    pub fn categorical<S: Into<String>>(name: S, values: Vec<String>) -> Self {
        Column {
            name: name.into(),
            values: ColumnValues::Cat(values),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Num(_) => ColumnKind::Numeric,
            ColumnValues::Cat(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Num(v) => v.len(),
            ColumnValues::Cat(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value_at(&self, row: usize) -> Value {
        match &self.values {
            ColumnValues::Num(v) => Value::Num(v[row]),
            ColumnValues::Cat(v) => Value::Cat(v[row].clone()),
        }
    }
}

/// A raw uploaded table. Never persisted beyond the training call.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    nrows: usize,
}

impl Dataset {
    pub fn from_columns(columns: Vec<Column>) -> anyhow::Result<Self> {
        let nrows = columns.first().map(Column::len).unwrap_or(0);
        for col in &columns {
            anyhow::ensure!(
                col.len() == nrows,
                "Column '{}' has {} rows, expected {}",
                col.name,
                col.len(),
                nrows
            );
        }
        Ok(Dataset { columns, nrows })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Schema-ordered projection of a dataset: the feature matrix before
/// encoding. Row order matches the source dataset.
#[derive(Debug, Clone)]
pub struct Frame {
    pub columns: Vec<Column>,
    nrows: usize,
}

impl Frame {
    pub fn new(columns: Vec<Column>, nrows: usize) -> Self {
        Frame { columns, nrows }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Keep only the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let values = match &col.values {
                    ColumnValues::Num(v) => {
                        ColumnValues::Num(indices.iter().map(|&i| v[i]).collect())
                    }
                    ColumnValues::Cat(v) => {
                        ColumnValues::Cat(indices.iter().map(|&i| v[i].clone()).collect())
                    }
                };
                Column {
                    name: col.name.clone(),
                    values,
                }
            })
            .collect();
        Frame {
            columns,
            nrows: indices.len(),
        }
    }

    /// Build a one-row frame from a serve-time record, in schema order.
    pub fn from_record(scenario: Scenario, record: &BTreeMap<String, Value>) -> Frame {
        let columns = scenario
            .features()
            .iter()
            .filter_map(|name| record.get(*name).map(|value| (name, value)))
            .map(|(name, value)| match value.as_f64() {
                Some(v) if matches!(value, Value::Num(_)) => Column::numeric(*name, vec![v]),
                _ => Column::categorical(*name, vec![value.as_category()]),
            })
            .collect();
        Frame { columns, nrows: 1 }
    }
}

/// Prepare a raw dataset for training: validate the schema, derive the
/// label, and select exactly the allowed feature columns.
///
/// Column selection is strict on the schema side (all required columns
/// must exist) and tolerant on the drop side: the raw score, the
/// explicit label, sensitive attributes and any stray column simply
/// never make it into the frame. With `Scenario::Early` that includes
/// G2 even when the upload carries it.
pub fn prepare(
    dataset: &Dataset,
    scenario: Scenario,
    trainer: &TrainerConfig,
) -> Result<(Frame, Vec<i32>), CoreError> {
    schema::check_required_columns(scenario, dataset.column_names())?;

    let labels = derive_labels(dataset, trainer)?;

    if dataset.nrows() < trainer.min_samples {
        return Err(CoreError::InsufficientData {
            rows: dataset.nrows(),
            min: trainer.min_samples,
        });
    }

    let columns: Vec<Column> = scenario
        .features()
        .iter()
        .map(|name| {
            dataset
                .column(name)
                .cloned()
                // check_required_columns already guaranteed presence
                .unwrap_or_else(|| panic!("schema column '{}' vanished", name))
        })
        .collect();

    log::debug!(
        "Prepared dataset: {} rows, {} features, scenario {}",
        dataset.nrows(),
        columns.len(),
        scenario
    );

    Ok((Frame::new(columns, dataset.nrows()), labels))
}

/// Exactly one derivation rule: use the explicit `target` column when
/// present, otherwise `G3 >= pass_threshold`.
fn derive_labels(dataset: &Dataset, trainer: &TrainerConfig) -> Result<Vec<i32>, CoreError> {
    if let Some(col) = dataset.column(schema::LABEL_COLUMN) {
        if let ColumnValues::Num(values) = &col.values {
            return Ok(values.iter().map(|&v| (v != 0.0) as i32).collect());
        }
    }

    match dataset.column(schema::RAW_SCORE_COLUMN) {
        Some(Column {
            values: ColumnValues::Num(scores),
            ..
        }) => Ok(scores
            .iter()
            .map(|&g3| (g3 >= trainer.pass_threshold) as i32)
            .collect()),
        _ => Err(CoreError::MissingLabelSource),
    }
}

//! Readers for training CSVs and serve-time JSON records.
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::dataset::{Column, Dataset, Value};

/// Read a `;`-delimited training CSV into a typed `Dataset`.
///
/// Column types are inferred once per file: a column is numeric iff
/// every cell in it parses as a float, otherwise it is categorical.
pub fn read_student_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let file = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {}", path.as_ref().display()))?;
    read_student_csv_from(file)
}

/// Same as [`read_student_csv`] but from any reader (uploads, tests).
pub fn read_student_csv_from<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(anyhow!("CSV has no header columns"));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        if record.len() != headers.len() {
            return Err(anyhow!(
                "Row {} has {} fields, expected {}",
                row_idx + 1,
                record.len(),
                headers.len()
            ));
        }
        for (col, field) in record.iter().enumerate() {
            cells[col].push(field.trim().to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| make_typed_column(name, raw))
        .collect();

    Dataset::from_columns(columns)
}

fn make_typed_column(name: String, raw: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = raw
        .iter()
        .map(|cell| cell.parse::<f64>().ok())
        .collect();
    match parsed {
        Some(values) if !raw.is_empty() => Column::numeric(name, values),
        _ => Column::categorical(name, raw),
    }
}

/// Parse a serve-time record from a JSON object: numbers stay numeric,
/// everything else becomes a categorical string.
pub fn record_from_json(value: &serde_json::Value) -> Result<BTreeMap<String, Value>> {
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("Prediction record must be a JSON object"))?;

    let mut record = BTreeMap::new();
    for (key, field) in object {
        let value = match field {
            serde_json::Value::Number(n) => Value::Num(
                n.as_f64()
                    .ok_or_else(|| anyhow!("Non-finite number in field '{}'", key))?,
            ),
            serde_json::Value::String(s) => Value::Cat(s.clone()),
            serde_json::Value::Bool(b) => Value::Cat(b.to_string()),
            other => {
                return Err(anyhow!(
                    "Unsupported value for field '{}': {}",
                    key,
                    other
                ))
            }
        };
        record.insert(key.clone(), value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnKind;

    #[test]
    fn csv_columns_are_typed_per_column() {
        let data = "source;absences;G1\nmat;4;12\npor;0;9\n";
        let ds = read_student_csv_from(data.as_bytes()).unwrap();
        assert_eq!(ds.nrows(), 2);
        assert_eq!(ds.column("source").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(ds.column("absences").unwrap().kind(), ColumnKind::Numeric);
    }

    #[test]
    fn mixed_cells_force_categorical() {
        let data = "grade\n10\nabs\n";
        let ds = read_student_csv_from(data.as_bytes()).unwrap();
        assert_eq!(ds.column("grade").unwrap().kind(), ColumnKind::Categorical);
    }

    #[test]
    fn record_rejects_non_object() {
        let err = record_from_json(&serde_json::json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }
}

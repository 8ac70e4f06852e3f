use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the model lifecycle core.
///
/// All variants are recoverable by the caller and carry enough detail
/// to name the offending columns, counts or paths.
#[derive(Debug)]
pub enum CoreError {
    /// Required columns are missing from a dataset or record.
    Schema { missing: Vec<String> },
    /// No explicit label column and no raw score column to derive one from.
    MissingLabelSource,
    /// Too few rows for meaningful cross-validation.
    InsufficientData { rows: usize, min: usize },
    /// A model artifact is missing or unreadable at load time.
    ModelUnavailable { path: PathBuf, reason: String },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::Schema { missing } => {
                write!(f, "Missing required columns: {}", missing.join(", "))
            }
            CoreError::MissingLabelSource => {
                write!(f, "No 'target' column and no 'G3' column to derive it from")
            }
            CoreError::InsufficientData { rows, min } => {
                write!(f, "Dataset has {} usable rows, need at least {}", rows, min)
            }
            CoreError::ModelUnavailable { path, reason } => {
                write!(f, "Model artifact {} unavailable: {}", path.display(), reason)
            }
        }
    }
}

impl Error for CoreError {}

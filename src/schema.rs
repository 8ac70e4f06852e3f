//! Fixed feature schemas for the two prediction scenarios.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Features used in production, shared by both scenarios and ordered.
pub const EARLY_FEATURES: [&str; 12] = [
    "source",
    "famsize",
    "studytime",
    "failures",
    "activities",
    "higher",
    "internet",
    "famrel",
    "freetime",
    "goout",
    "absences",
    "G1",
];

/// Second-trimester grade, only available late in the year.
pub const LATE_FEATURE: &str = "G2";

/// Raw final score the binary label is derived from.
pub const RAW_SCORE_COLUMN: &str = "G3";

/// Explicit binary label column, when the upload already carries one.
pub const LABEL_COLUMN: &str = "target";

/// Columns never fed to a model, independent of scenario.
pub const DISALLOWED_COLUMNS: [&str; 3] = ["sex", "age", "address"];

/// Prediction context: with or without the late-arriving G2 grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Early in the year, G2 not yet known.
    Early,
    /// G2 available.
    Full,
}

impl Scenario {
    /// Tag used in run names, API responses and audit records.
    pub fn tag(&self) -> &'static str {
        match self {
            Scenario::Early => "without_g2",
            Scenario::Full => "with_g2",
        }
    }

    /// Fixed artifact filename for this scenario.
    pub fn artifact_filename(&self) -> &'static str {
        match self {
            Scenario::Early => "model_without_g2.bin",
            Scenario::Full => "model_with_g2.bin",
        }
    }

    /// The exact ordered list of required input columns.
    pub fn features(&self) -> Vec<&'static str> {
        let mut cols: Vec<&'static str> = EARLY_FEATURES.to_vec();
        if matches!(self, Scenario::Full) {
            cols.push(LATE_FEATURE);
        }
        cols
    }

    pub fn includes_g2(&self) -> bool {
        matches!(self, Scenario::Full)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "early" | "without_g2" | "without-g2" => Ok(Scenario::Early),
            "full" | "with_g2" | "with-g2" => Ok(Scenario::Full),
            _ => Err(format!(
                "Unknown scenario: {}. Expected 'with_g2' or 'without_g2'",
                s
            )),
        }
    }
}

/// First validation gate: every schema column must be present before
/// any label derivation or transformation happens.
pub fn check_required_columns<'a, I>(scenario: Scenario, present: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<&str> = present.into_iter().collect();
    let missing: Vec<String> = scenario
        .features()
        .iter()
        .filter(|name| !present.contains(*name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Schema { missing })
    }
}

//! Shared fixtures: a 20-row synthetic student dataset and records.
#![allow(dead_code)]
use std::collections::BTreeMap;

use reussite::dataset::{Column, Dataset, Value};

fn repeat_cat(pair: [&str; 2], rows: usize) -> Vec<String> {
    (0..rows).map(|i| pair[i % 2].to_string()).collect()
}

fn repeat_num(pair: [f64; 2], rows: usize) -> Vec<f64> {
    (0..rows).map(|i| pair[i % 2]).collect()
}

/// Alternating-row dataset with all production columns plus G3.
pub fn dummy_dataset(rows: usize) -> Dataset {
    Dataset::from_columns(vec![
        Column::categorical("source", repeat_cat(["mat", "por"], rows)),
        Column::categorical("famsize", repeat_cat(["GT3", "LE3"], rows)),
        Column::numeric("studytime", repeat_num([2.0, 3.0], rows)),
        Column::numeric("failures", repeat_num([0.0, 1.0], rows)),
        Column::categorical("activities", repeat_cat(["yes", "no"], rows)),
        Column::categorical("higher", repeat_cat(["yes", "yes"], rows)),
        Column::categorical("internet", repeat_cat(["yes", "no"], rows)),
        Column::numeric("famrel", repeat_num([4.0, 3.0], rows)),
        Column::numeric("freetime", repeat_num([3.0, 2.0], rows)),
        Column::numeric("goout", repeat_num([2.0, 4.0], rows)),
        Column::numeric("absences", repeat_num([1.0, 5.0], rows)),
        Column::numeric("G1", repeat_num([12.0, 8.0], rows)),
        Column::numeric("G2", repeat_num([11.0, 7.0], rows)),
        Column::numeric("G3", repeat_num([13.0, 6.0], rows)),
    ])
    .expect("fixture columns are aligned")
}

/// The same dataset as a `;`-delimited CSV string.
pub fn dummy_csv(rows: usize) -> String {
    let mut out = String::from(
        "source;famsize;studytime;failures;activities;higher;internet;famrel;freetime;goout;absences;G1;G2;G3\n",
    );
    for i in 0..rows {
        if i % 2 == 0 {
            out.push_str("mat;GT3;2;0;yes;yes;yes;4;3;2;1;12;11;13\n");
        } else {
            out.push_str("por;LE3;3;1;no;yes;no;3;2;4;5;8;7;6\n");
        }
    }
    out
}

/// A valid serve-time record with every early-scenario field.
pub fn dummy_record(include_g2: bool) -> BTreeMap<String, Value> {
    let mut record = BTreeMap::new();
    record.insert("source".to_string(), Value::Cat("mat".to_string()));
    record.insert("famsize".to_string(), Value::Cat("GT3".to_string()));
    record.insert("studytime".to_string(), Value::Num(2.0));
    record.insert("failures".to_string(), Value::Num(0.0));
    record.insert("activities".to_string(), Value::Cat("yes".to_string()));
    record.insert("higher".to_string(), Value::Cat("yes".to_string()));
    record.insert("internet".to_string(), Value::Cat("yes".to_string()));
    record.insert("famrel".to_string(), Value::Num(4.0));
    record.insert("freetime".to_string(), Value::Num(3.0));
    record.insert("goout".to_string(), Value::Num(2.0));
    record.insert("absences".to_string(), Value::Num(1.0));
    record.insert("G1".to_string(), Value::Num(12.0));
    if include_g2 {
        record.insert("G2".to_string(), Value::Num(11.0));
    }
    record
}

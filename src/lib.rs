//! reussite: model lifecycle for student academic success prediction.
//!
//! This crate covers the full retrain-and-serve loop for two binary
//! classification scenarios: an "early" model trained without the
//! second-trimester grade (G2) and a "full" model trained with it.
//! It provides dataset validation and preparation, dynamic
//! numeric/categorical preprocessing, cross-validated training of a
//! logistic regression pipeline, atomic model persistence, a registry
//! loaded once at startup, and single-record prediction with audit
//! logging.
//!
//! The HTTP layer and UI live elsewhere; everything here is callable
//! as a library and exercised by the bundled CLI.
pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod predict;
pub mod preprocessing;
pub mod registry;
pub mod schema;
pub mod tracking;
pub mod training;

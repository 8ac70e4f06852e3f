use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;

use reussite::io;
use reussite::predict::{AuditLog, PredictionService};
use reussite::registry::ModelRegistry;
use reussite::schema::Scenario;
use reussite::tracking::RunTracker;
use reussite::training::Trainer;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("REUSSITE_LOG", "error,reussite=info"))
        .init();

    let matches = Command::new("reussite")
        .version(clap::crate_version!())
        .about("Train and serve student academic success classifiers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("retrain")
                .about("Retrain a scenario model from a ;-delimited CSV")
                .arg(
                    Arg::new("csv")
                        .help("Path to the training CSV")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("scenario")
                        .short('s')
                        .long("scenario")
                        .help("Prediction scenario: 'with_g2' or 'without_g2'")
                        .required(true),
                )
                .arg(
                    Arg::new("models_dir")
                        .short('m')
                        .long("models-dir")
                        .help("Directory holding the scenario model artifacts")
                        .default_value("models")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("tracking_dir")
                        .short('t')
                        .long("tracking-dir")
                        .help("Directory for the experiment run log")
                        .default_value("mlruns")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict a single student record from a JSON file")
                .arg(
                    Arg::new("record")
                        .help("Path to a JSON object with the schema fields")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("scenario")
                        .short('s')
                        .long("scenario")
                        .help("Prediction scenario: 'with_g2' or 'without_g2'")
                        .required(true),
                )
                .arg(
                    Arg::new("models_dir")
                        .short('m')
                        .long("models-dir")
                        .help("Directory holding the scenario model artifacts")
                        .default_value("models")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("audit")
                        .short('a')
                        .long("audit")
                        .help("Append-only prediction audit log")
                        .default_value("logs/predictions.jsonl")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("session")
                        .long("session")
                        .help("Caller-supplied session identifier"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("retrain", sub)) => run_retrain(sub),
        Some(("predict", sub)) => run_predict(sub),
        _ => unreachable!("subcommand is required"),
    }
}

fn parse_scenario(matches: &ArgMatches) -> Result<Scenario> {
    let raw: &String = matches
        .get_one("scenario")
        .expect("scenario is a required arg");
    Scenario::from_str(raw).map_err(anyhow::Error::msg)
}

fn run_retrain(matches: &ArgMatches) -> Result<()> {
    let csv: &PathBuf = matches.get_one("csv").expect("csv is required");
    let models_dir: &PathBuf = matches.get_one("models_dir").expect("has default");
    let tracking_dir: &PathBuf = matches.get_one("tracking_dir").expect("has default");
    let scenario = parse_scenario(matches)?;

    let dataset = io::read_student_csv(csv)?;
    let trainer = Trainer::with_tracker(RunTracker::new(tracking_dir));
    let run = trainer.retrain(&dataset, scenario, models_dir)?;

    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}

fn run_predict(matches: &ArgMatches) -> Result<()> {
    let record_path: &PathBuf = matches.get_one("record").expect("record is required");
    let models_dir: &PathBuf = matches.get_one("models_dir").expect("has default");
    let audit_path: &PathBuf = matches.get_one("audit").expect("has default");
    let session = matches.get_one::<String>("session").cloned();
    let scenario = parse_scenario(matches)?;

    let raw = std::fs::read_to_string(record_path)
        .with_context(|| format!("Failed to read record file {}", record_path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&raw).context("Record file is not valid JSON")?;
    let record = io::record_from_json(&json)?;

    let registry = ModelRegistry::load(models_dir)?;
    let service = PredictionService::new(registry, AuditLog::new(audit_path));
    let response = service.predict(scenario, &record, session)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

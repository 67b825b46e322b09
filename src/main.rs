//! House Expense Estimator - Main Entry Point
//!
//! Trains the expense model from the dataset and serves single estimates
//! from the persisted artifacts.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use house_expense_estimator::{
    bucketing::{AgeBand, ChildrenBand, CosmeticBand},
    config::AppConfig,
    logging,
    types::input::{parse_yes_no, Coverage, Ownership, PolicyInput, Region},
    ArtifactStore, Predictor, Trainer,
};
use std::path::PathBuf;
use tracing::{error, info};

/// Estimate the insurance expense of a house from a few categorical answers
#[derive(Parser, Debug)]
#[command(name = "house-expense-estimator", version, about)]
struct Args {
    /// Configuration file (built-in defaults when absent)
    #[arg(short, long, default_value = house_expense_estimator::config::DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the model and write the artifacts
    Train {
        /// Dataset path (overrides data.dataset_path)
        #[arg(short, long)]
        dataset: Option<PathBuf>,
    },
    /// Estimate the expense for one house
    Predict {
        /// owner | tenant
        #[arg(long)]
        ownership: Ownership,
        /// yes | no
        #[arg(long, value_parser = parse_yes_no, action = ArgAction::Set)]
        pet: bool,
        /// west | central-black-sea | mediterranean-aegean | east-southeast
        #[arg(long)]
        region: Region,
        /// 0-9, 10-19, ..., 90-99, 100+
        #[arg(long)]
        age_band: AgeBand,
        /// High | Normal | Low
        #[arg(long)]
        children_band: ChildrenBand,
        /// Good | Normal | Bad
        #[arg(long)]
        cosmetic_band: CosmeticBand,
        /// Coverage amount, at least 1000 in steps of 1000
        #[arg(long)]
        coverage: Coverage,
        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the allowed values of every input
    Options,
}

fn main() {
    if let Err(e) = run() {
        error!(error = %e, "Command failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    logging::init(&config.logging)?;

    match args.command {
        Command::Train { dataset } => train(&config, dataset),
        Command::Predict {
            ownership,
            pet,
            region,
            age_band,
            children_band,
            cosmetic_band,
            coverage,
            json,
        } => {
            let input = PolicyInput {
                ownership,
                pet_owner: pet,
                region,
                age_band,
                children_band,
                cosmetic_band,
            };
            predict(&config, &input, coverage, json)
        }
        Command::Options => {
            print_options();
            Ok(())
        }
    }
}

fn train(config: &AppConfig, dataset: Option<PathBuf>) -> Result<()> {
    let dataset = dataset.unwrap_or_else(|| config.data.dataset_path.clone());
    info!(dataset = %dataset.display(), "Starting training");

    let store = ArtifactStore::from_config(&config.artifacts);
    let report = Trainer::new(config).run(&dataset, &store)?;

    let meta = &report.bundle.metadata;
    println!("Model {} trained on {} rows ({} held out)", meta.model_id, meta.train_rows, meta.test_rows);
    println!("Features: {}", report.schema.len());
    println!("Test R²: {:.4}  explained variance: {:.4}", meta.metrics.r2, meta.metrics.explained_variance);
    println!("Model written to {}", store.model_path().display());
    println!("Schema written to {}", store.schema_path().display());
    Ok(())
}

fn predict(config: &AppConfig, input: &PolicyInput, coverage: Coverage, json: bool) -> Result<()> {
    let predictor = Predictor::from_config(config).map_err(|e| {
        if e.is_artifact_missing() {
            anyhow::anyhow!("{e}. Run `house-expense-estimator train` first")
        } else {
            e.into()
        }
    })?;
    let estimate = predictor.predict(input, coverage)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!("{estimate}");
    }
    Ok(())
}

fn print_options() {
    println!("ownership:");
    for o in Ownership::ALL {
        println!("  {:<8} {}", o.key(), o.label());
    }
    println!("pet:\n  yes\n  no");
    println!("region:");
    for r in Region::ALL {
        println!("  {:<22} {}", r.key(), r.label());
    }
    println!("age-band:");
    for band in AgeBand::all() {
        println!("  {band}");
    }
    println!("children-band:");
    for band in ChildrenBand::ALL {
        println!("  {band}");
    }
    println!("cosmetic-band:");
    for band in CosmeticBand::ALL {
        println!("  {band}");
    }
    println!("coverage:\n  1000, 2000, 3000, ...");
}

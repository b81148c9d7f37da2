use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use fluxnirv_core::config::PipelineConfig;
use fluxnirv_core::pipeline;
use fluxnirv_model::plot::scatter_plot;
use fluxnirv_model::trainer::{train_and_evaluate, TrainReport, TrainerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Flux-tower / EPIC dataset pipeline and NIRV regression tooling",
    long_about = None
)]
struct Cli {
    /// Pipeline configuration TOML; defaults reproduce the US-Var deployment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the raw flux-tower site file
    CleanSite,
    /// Clean the raw EPIC file and compute the derived index
    CleanEpic,
    /// Run the full data pipeline: clean both inputs and assemble the dataset
    Assemble,
    /// Train and evaluate the random-forest model on the assembled dataset
    Train(TrainArgs),
    /// Run the data pipeline and the model stage end to end
    Run(TrainArgs),
}

#[derive(Args, Debug, Default)]
struct TrainArgs {
    /// Write the predicted-vs-actual scatter plot to this PNG path
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Write the evaluation report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::CleanSite => {
            pipeline::clean_site_stage(&config).context("site cleaning failed")?;
            Ok(())
        }
        Command::CleanEpic => {
            pipeline::clean_epic_stage(&config).context("EPIC cleaning failed")?;
            Ok(())
        }
        Command::Assemble => handle_assemble(&config),
        Command::Train(args) => handle_train(&config, &args),
        Command::Run(args) => {
            handle_assemble(&config)?;
            handle_train(&config, &args)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            info!(config = %path.display(), "loading pipeline configuration");
            PipelineConfig::load(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn handle_assemble(config: &PipelineConfig) -> Result<()> {
    let summary = pipeline::run(config).context("data pipeline failed")?;
    println!(
        "Merged {} rows into {} ({} EPIC points and {} site intervals left unmatched).",
        summary.merge.merged_rows,
        config.paths.dataset.display(),
        summary.merge.unmatched_points,
        summary.merge.unmatched_intervals,
    );
    Ok(())
}

fn handle_train(config: &PipelineConfig, args: &TrainArgs) -> Result<()> {
    let trainer = TrainerConfig {
        dataset_path: config.paths.dataset.clone(),
        ..TrainerConfig::default()
    };
    let outcome = train_and_evaluate(&trainer).context("model training failed")?;

    print_report(&outcome.report);

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&outcome.report)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Wrote evaluation report to {}", path.display());
    }

    if let Some(path) = &args.plot {
        scatter_plot(
            path,
            &outcome.actual,
            &outcome.predicted,
            outcome.report.test_rmse,
            outcome.report.test_r2,
        )
        .context("failed to render scatter plot")?;
        println!("Wrote scatter plot to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &TrainReport) {
    let cv_mean = if report.cv_mae.is_empty() {
        0.0
    } else {
        report.cv_mae.iter().sum::<f64>() / report.cv_mae.len() as f64
    };

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Training rows".to_string(), report.n_train.to_string()]);
    table.add_row(vec!["Test rows".to_string(), report.n_test.to_string()]);
    table.add_row(vec![
        "Best max_depth".to_string(),
        report.best_max_depth.to_string(),
    ]);
    table.add_row(vec![
        "Best n_estimators".to_string(),
        report.best_n_trees.to_string(),
    ]);
    table.add_row(vec!["CV MAE (mean)".to_string(), format!("{cv_mean:.4}")]);
    table.add_row(vec![
        "Test RMSE".to_string(),
        format!("{:.4}", report.test_rmse),
    ]);
    table.add_row(vec![
        "Test R2".to_string(),
        format!("{:.4}", report.test_r2),
    ]);
    println!("{table}");

    let folds: Vec<String> = report
        .cv_mae
        .iter()
        .map(|score| format!("{score:.4}"))
        .collect();
    println!("Cross-validated MAE per fold: [{}]", folds.join(", "));

    for entry in &report.feature_importances {
        println!("  {}: {:.4}", entry.feature, entry.importance);
    }
}

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

use clap::{Parser, Subcommand};
use commands::chart::ChartArgs;
use commands::classifier::{ClassifyArgs, ModelAction};
use config::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

pub use error::AppError;
pub use models::chart_types::{BarGeometry, ChartDimensions, ChartLayout, FontMetrics};
pub use models::classify_types::{Prediction, PredictionSet};
pub use services::chart::layout::{chart, layout, layout_with};
pub use services::classifier::encoder::{encode, encode_with, ChannelOrder, EncoderOptions, Tensor};
pub use services::classifier::inference::InferenceEngine;
pub use services::classifier::labels::SCENE_LABELS;
pub use services::classifier::ranking::top_k;
pub use services::pipeline::Classifier;

/// Classify scene photos and chart the most likely categories.
#[derive(Debug, Parser)]
#[command(name = "scene-lens", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify image files or directories
    Classify(ClassifyArgs),
    /// Lay out a chart from a raw score vector
    Chart(ChartArgs),
    /// Inspect or fetch the classifier model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = AppConfig::from_file(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Classify(args) => commands::classifier::classify(config, args),
        Command::Chart(args) => commands::chart::chart(config, args),
        Command::Model { action } => commands::classifier::model(config, action),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

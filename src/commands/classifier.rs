use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::chart_types::{ChartStyle, FontMetrics};
use crate::models::classify_types::ClassifyResult;
use crate::services::chart::layout::{chart, format_percent};
use crate::services::chart::svg::render_svg;
use crate::services::classifier::model_manager::{DownloadPolicy, ModelManager};
use crate::services::fs_service;
use crate::services::pipeline::Classifier;
use clap::{Args, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Image files or directories to classify
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Number of predictions to keep per image
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
    /// Write one SVG chart per image into this directory
    #[arg(long)]
    pub svg_dir: Option<PathBuf>,
    /// Do not download the remote model
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Subcommand)]
pub enum ModelAction {
    /// Show which model would be used
    Status,
    /// Download the remote model into the cache if permitted
    Fetch,
}

fn runtime() -> Result<tokio::runtime::Runtime, AppError> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

pub fn classify(config: AppConfig, args: ClassifyArgs) -> Result<(), AppError> {
    let mut config = config;
    if args.offline {
        config.model.download = DownloadPolicy::Never;
    }
    let top_k = args.top_k.unwrap_or(config.ranking.top_k);
    if top_k == 0 {
        return Err(AppError::Config("top-k must be at least 1".to_string()));
    }

    let mut paths = Vec::new();
    for path in &args.paths {
        paths.extend(fs_service::list_image_files(path)?);
    }
    if paths.is_empty() {
        return Err("No images found".into());
    }

    let model_manager = ModelManager::from_config(&config.model);
    let engine = runtime()?.block_on(async {
        let resolved = model_manager.resolve().await?;
        info!("Using {:?} model {}", resolved.origin, resolved.path.display());
        model_manager
            .load(&resolved, config.model.session_options(), config.model.activation)
            .await
    })?;

    let mut classifier = Classifier::new(engine, &config).with_top_k(top_k);
    let results = classifier.classify_paths(&paths);

    if let Some(dir) = &args.svg_dir {
        write_charts(dir, &results, &config)?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&results)
            .map_err(|e| AppError::Message(format!("Failed to serialize results: {}", e)))?;
        println!("{}", json);
    } else {
        for result in &results {
            print_result(result);
        }
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    if failed == results.len() {
        return Err(format!("All {} images failed to classify", failed).into());
    }
    Ok(())
}

fn print_result(result: &ClassifyResult) {
    println!("{}", result.file_path);
    match &result.error {
        Some(e) => println!("  error: {}", e),
        None => {
            for p in &result.predictions {
                println!("  {:<10} {:>8}", p.label, format_percent(p.probability));
            }
        }
    }
}

fn write_charts(dir: &Path, results: &[ClassifyResult], config: &AppConfig) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)?;
    let metrics = FontMetrics::for_text_size(config.chart.text_size);
    let style = ChartStyle {
        text_size: config.chart.text_size,
        ..ChartStyle::default()
    };

    let mut used = HashSet::new();
    for result in results.iter().filter(|r| r.error.is_none()) {
        let layout = chart(&result.predictions, &config.chart.dimensions(), &metrics);
        let dest = dir.join(chart_file_name(&result.file_name, &mut used));
        std::fs::write(&dest, render_svg(&layout, &style))?;
        info!("Wrote chart {}", dest.display());
    }
    Ok(())
}

/// `<stem>.svg`, suffixed `-2`, `-3`, ... when an earlier image in the same
/// run already took the name.
fn chart_file_name(file_name: &str, used: &mut HashSet<String>) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());

    let mut candidate = format!("{}.svg", stem);
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{}-{}.svg", stem, n);
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

pub fn model(config: AppConfig, action: ModelAction) -> Result<(), AppError> {
    let model_manager = ModelManager::from_config(&config.model);
    match action {
        ModelAction::Status => {
            let status = model_manager.status();
            let json = serde_json::to_string_pretty(&status)
                .map_err(|e| AppError::Message(format!("Failed to serialize status: {}", e)))?;
            println!("{}", json);
        }
        ModelAction::Fetch => {
            let resolved = runtime()?.block_on(model_manager.resolve())?;
            println!("{:?} {}", resolved.origin, resolved.path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classify_types::Prediction;

    fn result(dir: &str, file_name: &str, label: &str) -> ClassifyResult {
        ClassifyResult {
            file_name: file_name.to_string(),
            file_path: format!("{}/{}", dir, file_name),
            predictions: vec![Prediction::new(label, 0.9)],
            error: None,
        }
    }

    #[test]
    fn chart_names_never_repeat() {
        let mut used = HashSet::new();
        assert_eq!(chart_file_name("a.jpg", &mut used), "a.svg");
        assert_eq!(chart_file_name("a.png", &mut used), "a-2.svg");
        assert_eq!(chart_file_name("a-2.jpg", &mut used), "a-2-2.svg");
        assert_eq!(chart_file_name("a.webp", &mut used), "a-3.svg");
    }

    #[test]
    fn same_named_images_get_separate_charts() {
        let out = tempfile::tempdir().unwrap();
        let results = vec![
            result("trip/day1", "a.jpg", "Sea"),
            result("trip/day2", "a.jpg", "Forest"),
            result("trip/day2", "a.png", "Street"),
        ];
        write_charts(out.path(), &results, &AppConfig::default()).unwrap();

        let first = std::fs::read_to_string(out.path().join("a.svg")).unwrap();
        let second = std::fs::read_to_string(out.path().join("a-2.svg")).unwrap();
        let third = std::fs::read_to_string(out.path().join("a-3.svg")).unwrap();
        assert!(first.contains(">Sea</text>"));
        assert!(second.contains(">Forest</text>"));
        assert!(third.contains(">Street</text>"));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 3);
    }
}

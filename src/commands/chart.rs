use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::chart_types::{ChartLayout, ChartStyle, FontMetrics};
use crate::services::chart::layout::chart as layout_chart;
use crate::services::chart::svg::render_svg;
use crate::services::classifier::labels::{predictions_from_scores, SCENE_LABELS};
use crate::services::classifier::ranking::top_k;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// One score per scene label, comma separated, in catalog order
    #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    pub scores: Vec<f32>,
    /// Number of bars to draw
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
    /// Print the layout as JSON
    #[arg(long, conflicts_with = "svg")]
    pub json: bool,
    /// Write the chart as SVG to this file
    #[arg(long)]
    pub svg: Option<PathBuf>,
}

pub fn build_chart(config: &AppConfig, scores: &[f32], k: usize) -> Result<ChartLayout, AppError> {
    let predictions = predictions_from_scores(&SCENE_LABELS, scores)?;
    let ranked = top_k(&predictions, k);
    let metrics = FontMetrics::for_text_size(config.chart.text_size);
    Ok(layout_chart(&ranked, &config.chart.dimensions(), &metrics))
}

pub fn chart(config: AppConfig, args: ChartArgs) -> Result<(), AppError> {
    let k = args.top_k.unwrap_or(config.ranking.top_k);
    let layout = build_chart(&config, &args.scores, k)?;

    if let Some(path) = &args.svg {
        let style = ChartStyle {
            text_size: config.chart.text_size,
            ..ChartStyle::default()
        };
        std::fs::write(path, render_svg(&layout, &style))?;
        return Ok(());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&layout)
            .map_err(|e| AppError::Message(format!("Failed to serialize layout: {}", e)))?;
        println!("{}", json);
    } else {
        for bar in &layout.bars {
            println!(
                "{:<10} {:>8}  x {:.1}..{:.1}  y {:.1}..{:.1}",
                bar.label_text, bar.percent_text, bar.bar_start_x, bar.bar_end_x, bar.bar_top_y, bar.bar_bottom_y
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_default_scene_chart() {
        let layout = build_chart(&AppConfig::default(), &[0.05, 0.10, 0.60, 0.05, 0.15, 0.05], 3).unwrap();
        assert_eq!(layout.bars.len(), 3);
        assert_eq!(layout.bars[0].label_text, "Glacier");
        assert!((layout.bars[0].bar_end_x - 572.0).abs() < 1e-3);
        assert_eq!(layout.bars[0].percent_text, "60.00%");
    }

    #[test]
    fn rejects_short_score_vectors() {
        assert!(build_chart(&AppConfig::default(), &[0.5, 0.5], 3).is_err());
    }
}

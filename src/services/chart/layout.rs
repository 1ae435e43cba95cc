use crate::models::chart_types::{AxisLine, BarGeometry, ChartDimensions, ChartLayout, FontMetrics};
use crate::models::classify_types::Prediction;

/// Gap between a bar and the row edges.
const ROW_INSET: f32 = 10.0;
/// Gap between the axis and the right edge of a label.
const LABEL_GUTTER: f32 = 10.0;
/// Gap between the end of a bar and its percentage text.
const PERCENT_GUTTER: f32 = 10.0;

pub fn layout(
    predictions: &[Prediction],
    chart_width: f32,
    chart_height: f32,
    left_padding: f32,
    right_padding: f32,
) -> Vec<BarGeometry> {
    layout_with(
        predictions,
        chart_width,
        chart_height,
        left_padding,
        right_padding,
        &FontMetrics::default(),
    )
}

/// One horizontal bar per prediction, top to bottom, each in an equal share
/// of `chart_height`.
pub fn layout_with(
    predictions: &[Prediction],
    chart_width: f32,
    chart_height: f32,
    left_padding: f32,
    right_padding: f32,
    metrics: &FontMetrics,
) -> Vec<BarGeometry> {
    if predictions.is_empty() {
        return Vec::new();
    }

    let row_height = chart_height / predictions.len() as f32;
    let plot_width = chart_width - left_padding - right_padding;
    let text_offset = metrics.center_offset();

    predictions
        .iter()
        .enumerate()
        .map(|(i, prediction)| {
            let i = i as f32;
            let center_y = row_height / 2.0 + row_height * i;
            let bar_end_x = left_padding + plot_width * prediction.probability;
            BarGeometry {
                label_text: prediction.label.clone(),
                label_anchor_x: left_padding - LABEL_GUTTER,
                label_anchor_y: center_y - text_offset,
                bar_start_x: left_padding,
                bar_end_x,
                bar_top_y: row_height * i + ROW_INSET,
                bar_bottom_y: row_height * (i + 1.0) - ROW_INSET,
                percent_text: format_percent(prediction.probability),
                percent_anchor_x: bar_end_x + PERCENT_GUTTER,
                percent_anchor_y: center_y - text_offset,
            }
        })
        .collect()
}

pub fn chart(predictions: &[Prediction], dims: &ChartDimensions, metrics: &FontMetrics) -> ChartLayout {
    let bars = layout_with(
        predictions,
        dims.width,
        dims.height,
        dims.left_padding,
        dims.right_padding,
        metrics,
    );
    let axis = (!bars.is_empty()).then(|| AxisLine {
        x: dims.left_padding,
        top_y: 0.0,
        bottom_y: (dims.height / bars.len() as f32) * bars.len() as f32,
    });

    ChartLayout {
        width: dims.width,
        height: dims.height,
        bars,
        axis,
    }
}

pub fn format_percent(probability: f32) -> String {
    format!("{:.2}%", probability * 100.0)
}

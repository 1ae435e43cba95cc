use crate::models::chart_types::{ChartLayout, ChartStyle};

/// Serializes a chart layout as a standalone SVG document. Geometry is
/// written as-is; text anchors are baselines.
pub fn render_svg(chart: &ChartLayout, style: &ChartStyle) -> String {
    let mut lines = vec![format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = chart.width,
        h = chart.height,
    )];

    for bar in &chart.bars {
        lines.push(format!(
            r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}"/>"#,
            bar.bar_start_x,
            bar.bar_top_y,
            (bar.bar_end_x - bar.bar_start_x).max(0.0),
            (bar.bar_bottom_y - bar.bar_top_y).max(0.0),
            style.bar_color,
            r = style.corner_radius,
        ));
        lines.push(format!(
            r#"  <text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="start">{}</text>"#,
            bar.percent_anchor_x,
            bar.percent_anchor_y,
            style.text_size,
            style.accent_color,
            escape(&bar.percent_text),
        ));
    }

    if let Some(axis) = chart.axis {
        lines.push(format!(
            r#"  <line x1="{x}" y1="{}" x2="{x}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            axis.top_y,
            axis.bottom_y,
            style.accent_color,
            style.axis_stroke_width,
            x = axis.x,
        ));
    }

    for bar in &chart.bars {
        lines.push(format!(
            r#"  <text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="end">{}</text>"#,
            bar.label_anchor_x,
            bar.label_anchor_y,
            style.text_size,
            style.accent_color,
            escape(&bar.label_text),
        ));
    }

    lines.push("</svg>\n".to_string());
    lines.join("\n")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chart_types::{ChartDimensions, FontMetrics};
    use crate::models::classify_types::Prediction;
    use crate::services::chart::layout::chart;

    #[test]
    fn draws_one_bar_and_two_texts_per_prediction() {
        let preds = vec![Prediction::new("Sea", 0.75), Prediction::new("Forest", 0.25)];
        let layout = chart(&preds, &ChartDimensions::default(), &FontMetrics::default());
        let svg = render_svg(&layout, &ChartStyle::default());

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert_eq!(svg.matches("<text").count(), 4);
        assert_eq!(svg.matches("<line").count(), 1);
        assert!(svg.contains(">75.00%</text>"));
        assert!(svg.contains(">Forest</text>"));
        assert_eq!(svg.lines().count(), 9);
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn empty_chart_has_no_shapes() {
        let layout = chart(&[], &ChartDimensions::default(), &FontMetrics::default());
        let svg = render_svg(&layout, &ChartStyle::default());
        assert!(!svg.contains("<rect"));
        assert!(!svg.contains("<line"));
        assert_eq!(svg.lines().count(), 2);
    }

    #[test]
    fn label_text_is_escaped() {
        assert_eq!(escape("Sea & <Sky>"), "Sea &amp; &lt;Sky&gt;");
    }
}

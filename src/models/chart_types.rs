use serde::Serialize;

// Roboto's vertical metrics, in units of the text size.
const ASCENT_RATIO: f32 = -0.927_734_4;
const DESCENT_RATIO: f32 = 0.244_140_63;

pub const DEFAULT_TEXT_SIZE: f32 = 25.0;

/// Text metrics as reported by 2D text renderers: `ascent` is negative
/// (above the baseline), `descent` positive.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl FontMetrics {
    pub fn for_text_size(size: f32) -> Self {
        Self {
            ascent: ASCENT_RATIO * size,
            descent: DESCENT_RATIO * size,
        }
    }

    /// Offset that moves a baseline so the text is centered on a line.
    pub fn center_offset(&self) -> f32 {
        (self.descent + self.ascent) / 2.0
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::for_text_size(DEFAULT_TEXT_SIZE)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    pub width: f32,
    pub height: f32,
    pub left_padding: f32,
    pub right_padding: f32,
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 300.0,
            left_padding: 140.0,
            right_padding: 120.0,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BarGeometry {
    pub label_text: String,
    pub label_anchor_x: f32,
    pub label_anchor_y: f32,
    pub bar_start_x: f32,
    pub bar_end_x: f32,
    pub bar_top_y: f32,
    pub bar_bottom_y: f32,
    pub percent_text: String,
    pub percent_anchor_x: f32,
    pub percent_anchor_y: f32,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct AxisLine {
    pub x: f32,
    pub top_y: f32,
    pub bottom_y: f32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f32,
    pub height: f32,
    pub bars: Vec<BarGeometry>,
    pub axis: Option<AxisLine>,
}

/// Colors and strokes used when drawing a [`ChartLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub bar_color: String,
    pub accent_color: String,
    pub text_size: f32,
    pub corner_radius: f32,
    pub axis_stroke_width: f32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            bar_color: "#ffffff".to_string(),
            accent_color: "#ffb74d".to_string(),
            text_size: DEFAULT_TEXT_SIZE,
            corner_radius: 10.0,
            axis_stroke_width: 10.0,
        }
    }
}

use crate::error::AppError;
use crate::models::chart_types::{ChartDimensions, DEFAULT_TEXT_SIZE};
use crate::services::classifier::encoder::{ChannelOrder, EncoderOptions, IMAGE_MEAN, IMAGE_STD};
use crate::services::classifier::inference::{OutputActivation, SessionOptions};
use crate::services::classifier::model_manager::DownloadPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_SIZE: u32 = 224;
pub const DEFAULT_TOP_K: usize = 3;
const LOCAL_MODEL_FILE: &str = "assets/scene_classification.onnx";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub encoder: EncoderConfig,
    pub ranking: RankingConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub remote_url: Option<String>,
    pub local_path: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub download: DownloadPolicy,
    pub activation: OutputActivation,
    pub use_gpu: bool,
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            local_path: PathBuf::from(LOCAL_MODEL_FILE),
            cache_dir: None,
            download: DownloadPolicy::WhenOnline,
            activation: OutputActivation::Probabilities,
            use_gpu: false,
            intra_threads: 4,
        }
    }
}

impl ModelConfig {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            use_gpu: self.use_gpu,
            intra_threads: self.intra_threads,
        }
    }

    /// Configured cache directory, else the platform cache dir, else
    /// `.scene-lens` in the working directory.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "scene-lens")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".scene-lens"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    pub input_width: u32,
    pub input_height: u32,
    pub channel_order: ChannelOrder,
    pub mean: f32,
    pub std: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            input_width: DEFAULT_INPUT_SIZE,
            input_height: DEFAULT_INPUT_SIZE,
            channel_order: ChannelOrder::Rgb,
            mean: IMAGE_MEAN,
            std: IMAGE_STD,
        }
    }
}

impl EncoderConfig {
    pub fn options(&self) -> EncoderOptions {
        EncoderOptions {
            channel_order: self.channel_order,
            mean: self.mean,
            std: self.std,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub width: f32,
    pub height: f32,
    pub left_padding: f32,
    pub right_padding: f32,
    pub text_size: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        let dims = ChartDimensions::default();
        Self {
            width: dims.width,
            height: dims.height,
            left_padding: dims.left_padding,
            right_padding: dims.right_padding,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }
}

impl ChartConfig {
    pub fn dimensions(&self) -> ChartDimensions {
        ChartDimensions {
            width: self.width,
            height: self.height,
            left_padding: self.left_padding,
            right_padding: self.right_padding,
        }
    }
}

impl AppConfig {
    /// Loads and validates `path`, or returns the defaults when no path is
    /// given.
    pub fn from_file(path: Option<&Path>) -> Result<Self, AppError> {
        let config: Self = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&contents)
                    .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(contents).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.encoder.input_width == 0 || self.encoder.input_height == 0 {
            return Err(AppError::Config("encoder input size must be positive".to_string()));
        }
        if self.encoder.std == 0.0 || !self.encoder.std.is_finite() {
            return Err(AppError::Config("encoder std must be a non-zero number".to_string()));
        }
        if self.ranking.top_k == 0 {
            return Err(AppError::Config("ranking top_k must be at least 1".to_string()));
        }
        if self.chart.height <= 0.0 || self.chart.text_size <= 0.0 {
            return Err(AppError::Config("chart height and text size must be positive".to_string()));
        }
        if self.chart.width <= self.chart.left_padding + self.chart.right_padding {
            return Err(AppError::Config(format!(
                "chart width {} leaves no room between paddings {} and {}",
                self.chart.width, self.chart.left_padding, self.chart.right_padding
            )));
        }
        if self.model.intra_threads == 0 {
            return Err(AppError::Config("model intra_threads must be at least 1".to_string()));
        }
        Ok(())
    }
}

use crate::error::AppError;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Ranked predictions for a single classification. Replaced wholesale by the
/// next result.
pub type PredictionSet = Vec<Prediction>;

#[derive(Debug, Serialize)]
pub struct ClassifyResult {
    pub file_name: String,
    pub file_path: String,
    pub predictions: PredictionSet,
    pub error: Option<AppError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelOrigin {
    Remote,
    Local,
}

#[derive(Debug, Serialize, Clone)]
pub struct ModelStatus {
    pub cached: bool,
    pub origin: Option<ModelOrigin>,
    pub path: Option<PathBuf>,
}

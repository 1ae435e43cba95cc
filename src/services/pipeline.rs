use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::classify_types::{ClassifyResult, PredictionSet};
use crate::services::classifier::encoder::{encode_with, EncoderOptions, Tensor};
use crate::services::classifier::inference::InferenceEngine;
use crate::services::classifier::labels::{predictions_from_scores, SCENE_LABELS};
use crate::services::classifier::ranking::top_k;
use crate::services::fs_service;
use image::DynamicImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Runs image → tensor → engine → ranked predictions.
pub struct Classifier<E> {
    engine: E,
    labels: Vec<&'static str>,
    input_width: u32,
    input_height: u32,
    encoder: EncoderOptions,
    top_k: usize,
    batch_size: usize,
}

impl<E: InferenceEngine> Classifier<E> {
    pub fn new(engine: E, config: &AppConfig) -> Self {
        Self {
            engine,
            labels: SCENE_LABELS.to_vec(),
            input_width: config.encoder.input_width,
            input_height: config.encoder.input_height,
            encoder: config.encoder.options(),
            top_k: config.ranking.top_k,
            batch_size: rayon::current_num_threads().max(1),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Number of images decoded and encoded in parallel before they are
    /// handed to the engine. Defaults to the rayon pool size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn encode(&self, image: &DynamicImage) -> Result<Tensor, AppError> {
        encode_with(image, self.input_width, self.input_height, &self.encoder)
    }

    pub fn classify(&mut self, image: &DynamicImage) -> Result<PredictionSet, AppError> {
        let tensor = self.encode(image)?;
        self.rank(&tensor)
    }

    pub fn classify_path(&mut self, path: &Path) -> Result<PredictionSet, AppError> {
        let image = fs_service::open_image(path)?;
        self.classify(&image)
    }

    /// Classifies every file in `paths`. Each chunk of `batch_size` files is
    /// decoded and encoded in parallel, then run through the engine one image
    /// at a time; its tensors are dropped before the next chunk is read. A
    /// failing file is reported in its result, the rest of the batch continues.
    pub fn classify_paths(&mut self, paths: &[PathBuf]) -> Vec<ClassifyResult> {
        let (width, height, options) = (self.input_width, self.input_height, self.encoder);
        let mut results = Vec::with_capacity(paths.len());

        for chunk in paths.chunks(self.batch_size) {
            let start = Instant::now();
            let tensors: Vec<Result<Tensor, AppError>> = chunk
                .par_iter()
                .map(|path| {
                    fs_service::open_image(path).and_then(|img| encode_with(&img, width, height, &options))
                })
                .collect();
            debug!(
                count = chunk.len(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "encoded chunk"
            );

            for (path, tensor) in chunk.iter().zip(tensors) {
                let file_name = path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                let (predictions, error) = match tensor.and_then(|t| self.rank(&t)) {
                    Ok(predictions) => (predictions, None),
                    Err(e) => {
                        warn!("Failed to classify {}: {}", file_name, e);
                        (Vec::new(), Some(e))
                    }
                };
                results.push(ClassifyResult {
                    file_name,
                    file_path: path.to_string_lossy().to_string(),
                    predictions,
                    error,
                });
            }
        }

        results
    }

    fn rank(&mut self, tensor: &Tensor) -> Result<PredictionSet, AppError> {
        let scores = self.engine.infer(tensor)?;
        let predictions = predictions_from_scores(&self.labels, &scores)?;
        Ok(top_k(&predictions, self.top_k))
    }
}

use crate::error::AppError;
use crate::services::classifier::encoder::Tensor;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Black-box classifier: one input tensor in, one score per label out.
pub trait InferenceEngine {
    fn infer(&mut self, input: &Tensor) -> Result<Vec<f32>, AppError>;
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn infer(&mut self, input: &Tensor) -> Result<Vec<f32>, AppError> {
        (**self).infer(input)
    }
}

/// What the model's output vector holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
    #[default]
    Probabilities,
    Logits,
}

#[derive(Clone, Copy, Debug)]
pub struct SessionOptions {
    pub use_gpu: bool,
    pub intra_threads: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            use_gpu: false,
            intra_threads: 4,
        }
    }
}

pub struct OrtEngine {
    session: Session,
    activation: OutputActivation,
}

impl OrtEngine {
    pub fn new(session: Session, activation: OutputActivation) -> Self {
        Self { session, activation }
    }

    pub fn from_file(path: &Path, options: SessionOptions, activation: OutputActivation) -> Result<Self, AppError> {
        let _ = ort::init().with_name("scene-lens").commit();

        let mut builder = Session::builder()
            .map_err(|e| AppError::Model(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::Model(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(options.intra_threads)
            .map_err(|e| AppError::Model(format!("Failed to set intra threads: {}", e)))?;

        if options.use_gpu {
            builder = builder.with_execution_providers([
                ort::ep::DirectML::default().build(),
                ort::ep::CoreML::default().build(),
                ort::ep::CUDA::default().build(),
                ort::ep::CPU::default().build(),
            ])
            .map_err(|e| AppError::Model(format!("Failed to register GPU execution providers: {}", e)))?;
        } else {
            builder = builder.with_execution_providers([
                ort::ep::CPU::default().build(),
            ])
            .map_err(|e| AppError::Model(format!("Failed to register CPU execution provider: {}", e)))?;
        }

        let session = builder.commit_from_file(path).map_err(|e| {
            AppError::Model(format!("Failed to load ONNX model {}: {}", path.display(), e))
        })?;

        Ok(Self::new(session, activation))
    }
}

impl InferenceEngine for OrtEngine {
    fn infer(&mut self, input: &Tensor) -> Result<Vec<f32>, AppError> {
        let start = Instant::now();
        let input_name = self
            .session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| AppError::Inference("Model declares no inputs".to_string()))?;

        let input_tensor = Value::from_array(input.to_array()?)?;
        let outputs = self
            .session
            .run(ort::inputs![input_name.as_str() => input_tensor])?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| AppError::Inference("Model produced no outputs".to_string()))?;

        let (_, data) = output_value.try_extract_tensor::<f32>()?;
        let scores: Vec<f32> = data.to_vec();
        debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "inference finished");

        drop(outputs);

        Ok(match self.activation {
            OutputActivation::Probabilities => scores,
            OutputActivation::Logits => softmax(&scores),
        })
    }
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
    logits.iter().map(|&x| (x - max_logit).exp() / exp_sum).collect()
}

use crate::error::AppError;
use crate::models::classify_types::Prediction;

/// Index-aligned with the scene model's output vector.
pub const SCENE_LABELS: [&str; 6] = ["Buildings", "Forest", "Glacier", "Mountain", "Sea", "Street"];

pub fn predictions_from_scores(labels: &[&str], scores: &[f32]) -> Result<Vec<Prediction>, AppError> {
    if labels.len() != scores.len() {
        return Err(AppError::Inference(format!(
            "Model produced {} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    }

    Ok(labels
        .iter()
        .zip(scores)
        .map(|(label, &probability)| Prediction::new(*label, probability))
        .collect())
}

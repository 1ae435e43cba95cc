use crate::models::classify_types::Prediction;
use std::cmp::Ordering;

/// Returns the `k` most probable predictions, highest first. Equal
/// probabilities keep their input order; NaN ranks last.
pub fn top_k(predictions: &[Prediction], k: usize) -> Vec<Prediction> {
    let mut ranked: Vec<&Prediction> = predictions.iter().collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| descending(a.probability, b.probability));
    ranked.into_iter().take(k).cloned().collect()
}

fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::classifier::labels::{predictions_from_scores, SCENE_LABELS};

    fn p(label: &str, probability: f32) -> Prediction {
        Prediction::new(label, probability)
    }

    #[test]
    fn ties_keep_original_order() {
        let preds = vec![p("A", 0.5), p("B", 0.5), p("C", 0.9)];
        assert_eq!(top_k(&preds, 2), vec![p("C", 0.9), p("A", 0.5)]);
    }

    #[test]
    fn already_ranked_input_is_unchanged() {
        let preds = predictions_from_scores(&SCENE_LABELS, &[0.2, 0.1, 0.3, 0.1, 0.2, 0.1]).unwrap();
        let once = top_k(&preds, 3);
        assert_eq!(top_k(&once, 3), once);
    }

    #[test]
    fn k_larger_than_input_returns_everything() {
        let preds = vec![p("A", 0.1), p("B", 0.7)];
        assert_eq!(top_k(&preds, 10), vec![p("B", 0.7), p("A", 0.1)]);
        assert!(top_k(&preds, 0).is_empty());
        assert!(top_k(&[], 3).is_empty());
    }

    #[test]
    fn input_is_not_reordered() {
        let preds = vec![p("A", 0.1), p("B", 0.7), p("C", 0.2)];
        let _ = top_k(&preds, 2);
        assert_eq!(preds[0], p("A", 0.1));
    }

    #[test]
    fn nan_ranks_last() {
        let preds = vec![p("A", f32::NAN), p("B", 0.1), p("C", 0.2)];
        let ranked = top_k(&preds, 3);
        assert_eq!(ranked[0].label, "C");
        assert_eq!(ranked[1].label, "B");
        assert_eq!(ranked[2].label, "A");
    }

    #[test]
    fn scene_scores_pick_glacier_sea_forest() {
        let preds = predictions_from_scores(&SCENE_LABELS, &[0.05, 0.10, 0.60, 0.05, 0.15, 0.05]).unwrap();
        assert_eq!(
            top_k(&preds, 3),
            vec![p("Glacier", 0.60), p("Sea", 0.15), p("Forest", 0.10)]
        );
    }
}

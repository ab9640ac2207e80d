use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;

use crate::labels::{self, ClassLabels};

/// One ranked entry of a classification result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction
{
    pub class_id: String,
    pub label: String,
    pub score: f32,
}

impl Prediction
{
    pub fn display_label(&self) -> String
    {
        labels::display_label(&self.label)
    }
}

/// Ranks every row of `scores` (one row per image in the batch) against the label table,
/// keeping the `top` highest-scoring classes of each row in descending order.
///
/// The caller must ensure the row length matches the number of labels.
pub fn decode_predictions(scores: ArrayView2<f32>, class_labels: &ClassLabels, top: usize) -> Vec<Vec<Prediction>>
{
    scores.outer_iter().map(|row| {
        let mut ranked: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
        // Stable sort: ties keep the lower class index first.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked.into_iter()
            .take(top)
            .filter_map(|(idx, score)| {
                class_labels.get(idx).map(|class_label| Prediction {
                    class_id: class_label.class_id.clone(),
                    label: class_label.name.clone(),
                    score,
                })
            })
            .collect()
    }).collect()
}

/// Converts each row of raw logits into a probability distribution, in place.
pub fn softmax_rows(logits: &mut Array2<f32>)
{
    logits.axis_iter_mut(Axis(0)).for_each(|mut row| {
        let max = row.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        if sum == 0.0 || !sum.is_finite() {
            return;
        }
        row /= sum;
    });
}

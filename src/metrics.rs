use crate::model_instance::Loss;

const PROBABILITY_EPSILON: f64 = 1e-15;

pub fn logloss(prediction: f64, label: i32) -> f64 {
    let p = prediction
        .max(PROBABILITY_EPSILON)
        .min(1.0 - PROBABILITY_EPSILON);
    if label == 1 {
        -p.ln()
    } else {
        -(1.0 - p).ln()
    }
}

/// 1 / rank of the single positive row. Ties are counted against the positive.
/// `None` if the group doesn't have exactly one positive.
pub fn reciprocal_rank(scores: &[f64], labels: &[i32]) -> Option<f64> {
    let mut positives = labels.iter().enumerate().filter(|(_, l)| **l == 1);
    let (positive, _) = positives.next()?;
    if positives.next().is_some() {
        return None;
    }
    let s_pos = scores[positive];
    let rank = 1 + labels
        .iter()
        .zip(scores)
        .filter(|(l, s)| **l != 1 && **s >= s_pos)
        .count();
    Some(1.0 / rank as f64)
}

/// Running average of the loss-appropriate metric over predictions made before updates.
#[derive(Clone, Debug)]
pub struct ProgressiveMetric {
    loss: Loss,
    sum: f64,
    count: u64,
}

impl ProgressiveMetric {
    pub fn new(loss: Loss) -> ProgressiveMetric {
        ProgressiveMetric {
            loss,
            sum: 0.0,
            count: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.loss {
            Loss::Logistic => "average logloss",
            Loss::LambdaRank => "mean reciprocal rank",
        }
    }

    pub fn add_group(&mut self, predictions: &[f64], labels: &[i32]) {
        match self.loss {
            Loss::Logistic => {
                for (p, l) in predictions.iter().zip(labels) {
                    self.sum += logloss(*p, *l);
                    self.count += 1;
                }
            }
            Loss::LambdaRank => {
                if let Some(rr) = reciprocal_rank(predictions, labels) {
                    self.sum += rr;
                    self.count += 1;
                }
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

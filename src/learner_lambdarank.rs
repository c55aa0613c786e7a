use crate::errors::LearnerError;
use crate::learner::{LearnerCore, LearnerTrait};
use crate::model_instance::ModelInstance;

/// Pairwise ranking over groups with exactly one positive row.
/// Predictions are raw scores, only comparable inside a group.
#[derive(Clone, Debug)]
pub struct LambdaRankLearner {
    core: LearnerCore,
}

// How strongly the positive should still be pushed above this negative
#[inline(always)]
pub fn pairwise_gradient(positive_score: f64, negative_score: f64) -> f64 {
    1.0 / (1.0 + (positive_score - negative_score).exp())
}

fn positive_index(labels: &[i32]) -> Result<usize, LearnerError> {
    let mut positive = None;
    let mut positives = 0;
    for (i, label) in labels.iter().enumerate() {
        match *label {
            0 => {}
            1 => {
                positives += 1;
                positive = Some(i);
            }
            other => {
                return Err(LearnerError::InvalidInput(format!(
                    "Ranking labels have to be 0 or 1, got {} at row {}",
                    other, i
                )))
            }
        }
    }
    match positive {
        Some(i) if positives == 1 => Ok(i),
        _ => Err(LearnerError::MissingPositiveLabel { positives }),
    }
}

impl LambdaRankLearner {
    pub fn new(mi: &ModelInstance) -> LambdaRankLearner {
        LambdaRankLearner {
            core: LearnerCore::new(mi),
        }
    }
}

impl LearnerTrait for LambdaRankLearner {
    fn predict<R, T>(
        &mut self,
        rows: &[R],
        override_weights: Option<&[f64]>,
    ) -> Result<Vec<f64>, LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>,
    {
        self.core.scores(rows, override_weights)
    }

    fn update<R, T>(
        &mut self,
        rows: &[R],
        predictions: &[f64],
        labels: &[i32],
    ) -> Result<Vec<f64>, LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>,
    {
        self.core.check_lengths(rows, predictions, labels)?;
        let positive = positive_index(labels)?;
        self.core.validate_rows(rows)?;

        let s_pos = predictions[positive];
        let mut gradients = vec![0.0; rows.len()];
        let mut negatives_sum = 0.0;
        for (i, row) in rows.iter().enumerate() {
            if i == positive {
                continue;
            }
            let gradient = pairwise_gradient(s_pos, predictions[i]);
            self.core.apply_row_gradient(row.as_ref(), gradient)?;
            gradients[i] = gradient;
            negatives_sum += gradient;
        }

        // The positive takes all pairwise gradients with opposite sign, the group sums to zero
        let grad_pos = -negatives_sum;
        self.core.apply_row_gradient(rows[positive].as_ref(), grad_pos)?;
        gradients[positive] = grad_pos;
        log::trace!("Ranking update, positive row {} gradient {}", positive, grad_pos);
        Ok(gradients)
    }

    fn core(&self) -> &LearnerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LearnerCore {
        &mut self.core
    }
}

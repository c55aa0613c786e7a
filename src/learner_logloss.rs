use crate::consts;
use crate::errors::LearnerError;
use crate::learner::{LearnerCore, LearnerTrait};
use crate::model_instance::ModelInstance;

#[inline(always)]
pub fn logistic(t: f64) -> f64 {
    (1.0 + (-t).exp()).recip()
}

/// Binary classification with logistic loss. Predictions are probabilities.
#[derive(Clone, Debug)]
pub struct LogLossLearner {
    core: LearnerCore,
}

impl LogLossLearner {
    pub fn new(mi: &ModelInstance) -> LogLossLearner {
        LogLossLearner {
            core: LearnerCore::new(mi),
        }
    }
}

impl LearnerTrait for LogLossLearner {
    fn predict<R, T>(
        &mut self,
        rows: &[R],
        override_weights: Option<&[f64]>,
    ) -> Result<Vec<f64>, LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>,
    {
        let scores = self.core.scores(rows, override_weights)?;
        let probabilities = scores
            .into_iter()
            .map(|wsum| {
                if wsum.is_nan() {
                    log::warn!("NAN prediction, forcing 0.0");
                    logistic(0.0)
                } else {
                    let clamped =
                        wsum.max(-consts::LOGISTIC_SCORE_CLAMP).min(consts::LOGISTIC_SCORE_CLAMP);
                    logistic(clamped)
                }
            })
            .collect();
        Ok(probabilities)
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
        self.core.validate_rows(rows)?;

        let mut gradients = Vec::with_capacity(rows.len());
        for ((row, prediction), label) in rows.iter().zip(predictions).zip(labels) {
            // d(logloss)/d(wTx), shared by every feature of the row
            let gradient = prediction - *label as f64;
            self.core.apply_row_gradient(row.as_ref(), gradient)?;
            gradients.push(gradient);
        }
        Ok(gradients)
    }

    fn core(&self) -> &LearnerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LearnerCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_instance::Loss;

    fn mi(l1: f64) -> ModelInstance {
        let mut mi = ModelInstance::new_empty().unwrap();
        mi.hash_space = 10;
        mi.alpha = 0.1;
        mi.beta = 1.0;
        mi.l1 = l1;
        mi.l2 = 0.0;
        mi.loss = Loss::Logistic;
        mi
    }

    fn touched_slots(learner: &LogLossLearner, row: &[&str]) -> Vec<usize> {
        let mut slots = vec![0];
        for token in row {
            slots.push(learner.core().indexer().slot(token));
        }
        slots
    }

    #[test]
    fn test_logistic() {
        assert_eq!(logistic(0.0), 0.5);
        assert!(logistic(35.0) < 1.0);
        assert!(logistic(-35.0) > 0.0);
    }

    #[test]
    fn test_sparsity_with_l1() {
        let mut learner = LogLossLearner::new(&mi(1.0));
        let rows = vec![vec!["a", "b"]];
        let p = learner.predict(&rows, None).unwrap();
        assert_eq!(p, vec![0.5]);
        let g = learner.update(&rows, &p, &[1]).unwrap();
        assert_eq!(g, vec![-0.5]);

        for slot in touched_slots(&learner, &rows[0]) {
            assert!(learner.core().store().accumulators(slot).z.abs() <= 1.0);
            assert_eq!(learner.core().store().weight(slot), 0.0);
        }
        assert!(learner.weights().iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_learning_without_l1() {
        let mut learner = LogLossLearner::new(&mi(0.0));
        let rows = vec![vec!["a", "b"]];
        let p = learner.predict(&rows, None).unwrap();
        learner.update(&rows, &p, &[1]).unwrap();

        for slot in touched_slots(&learner, &rows[0]) {
            assert!(learner.core().store().weight(slot) > 0.0);
        }
        let p2 = learner.predict(&rows, None).unwrap();
        assert!(p2[0] > p[0]);
    }

    #[test]
    fn test_negative_label_pushes_down() {
        let mut m = mi(0.0);
        m.alpha = 1.0;
        let mut learner = LogLossLearner::new(&m);
        let rows = vec![vec!["x"]];
        for _ in 0..20 {
            let p = learner.predict(&rows, None).unwrap();
            learner.update(&rows, &p, &[0]).unwrap();
        }
        let p = learner.predict(&rows, None).unwrap();
        assert!(p[0] < 0.2);
    }

    #[test]
    fn test_length_mismatch_leaves_model_untouched() {
        let mut learner = LogLossLearner::new(&mi(0.0));
        let rows = vec![vec!["a"], vec!["b"]];
        let before = learner.core().store().entries().to_vec();
        match learner.update(&rows, &[0.5, 0.5], &[1]) {
            Err(LearnerError::InvalidInput(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        match learner.update(&rows, &[0.5], &[1, 0]) {
            Err(LearnerError::InvalidInput(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(learner.core().store().entries(), &before[..]);
    }

    #[test]
    fn test_malformed_row_leaves_model_untouched() {
        let mut m = mi(0.0);
        m.interaction = true;
        let mut learner = LogLossLearner::new(&m);
        // first row is fine, second one can't be parsed; nothing may be applied
        let rows = vec![vec!["1:a", "2:b"], vec!["1:a", "x:b"]];
        let before = learner.core().store().entries().to_vec();
        match learner.update(&rows, &[0.5, 0.5], &[1, 0]) {
            Err(LearnerError::MalformedRecord(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(learner.core().store().entries(), &before[..]);
    }

    #[test]
    fn test_predict_with_snapshot_does_not_mutate() {
        let mut learner = LogLossLearner::new(&mi(0.0));
        let rows = vec![vec!["a", "b"]];
        let p = learner.predict(&rows, None).unwrap();
        learner.update(&rows, &p, &[1]).unwrap();

        let before = learner.core().store().entries().to_vec();
        let snapshot = vec![0.0; 10];
        let p = learner.predict(&rows, Some(snapshot.as_slice())).unwrap();
        assert_eq!(p, vec![0.5]);
        assert_eq!(learner.core().store().entries(), &before[..]);
    }

    #[test]
    fn test_extreme_scores_stay_inside_unit_interval() {
        let mut learner = LogLossLearner::new(&mi(0.0));
        let rows = vec![vec!["a"]];
        let snapshot = vec![1000.0; 10];
        let p = learner.predict(&rows, Some(snapshot.as_slice())).unwrap();
        assert!(p[0] < 1.0 && p[0] > 0.0);
        let snapshot = vec![-1000.0; 10];
        let p = learner.predict(&rows, Some(snapshot.as_slice())).unwrap();
        assert!(p[0] < 1.0 && p[0] > 0.0);
    }
}

use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::errors::LearnerError;
use crate::feature_indexer::FeatureIndexer;
use crate::learner_lambdarank::LambdaRankLearner;
use crate::learner_logloss::LogLossLearner;
use crate::model_instance::{Loss, ModelInstance};
use crate::optimizer::{FtrlData, OptimizerFtrl};
use crate::weight_store::WeightStore;

/// What every learner offers. Rows are sequences of feature tokens, a group is a slice of rows.
pub trait LearnerTrait {
    /// Scores every row of the group. With `override_weights` the given snapshot is used instead
    /// of the learned weights. Accumulators are never touched.
    fn predict<R, T>(
        &mut self,
        rows: &[R],
        override_weights: Option<&[f64]>,
    ) -> Result<Vec<f64>, LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>;

    /// Learns from one group. Returns the gradient applied to each row.
    /// Either the whole group is applied or, on error, nothing is.
    fn update<R, T>(
        &mut self,
        rows: &[R],
        predictions: &[f64],
        labels: &[i32],
    ) -> Result<Vec<f64>, LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>;

    fn core(&self) -> &LearnerCore;
    fn core_mut(&mut self) -> &mut LearnerCore;

    fn weights(&self) -> Vec<f64> {
        self.core().weights()
    }

    fn model_instance(&self) -> &ModelInstance {
        &self.core().mi
    }
}

/// State shared by both learners: hashing, FTRL weights and the random source for
/// interaction dropout.
#[derive(Clone, Debug)]
pub struct LearnerCore {
    pub mi: ModelInstance,
    indexer: FeatureIndexer,
    store: WeightStore,
    rng: Xoshiro256PlusPlus,
}

impl LearnerCore {
    pub fn new(mi: &ModelInstance) -> LearnerCore {
        LearnerCore {
            mi: mi.clone(),
            indexer: FeatureIndexer::from_model_instance(mi),
            store: WeightStore::new(mi.hash_space, OptimizerFtrl::from_model_instance(mi)),
            rng: Xoshiro256PlusPlus::seed_from_u64(mi.random_seed),
        }
    }

    pub fn set_rng(&mut self, rng: Xoshiro256PlusPlus) {
        self.rng = rng;
    }

    pub fn indexer(&self) -> &FeatureIndexer {
        &self.indexer
    }

    pub fn store(&self) -> &WeightStore {
        &self.store
    }

    pub fn weights(&self) -> Vec<f64> {
        self.store.weights()
    }

    pub fn restore_accumulators(&mut self, data: &[FtrlData]) -> Result<(), String> {
        self.store.restore_accumulators(data)
    }

    pub fn check_lengths<R>(
        &self,
        rows: &[R],
        predictions: &[f64],
        labels: &[i32],
    ) -> Result<(), LearnerError> {
        if rows.len() != predictions.len() || rows.len() != labels.len() {
            return Err(LearnerError::InvalidInput(format!(
                "Group has {} rows, {} predictions and {} labels",
                rows.len(),
                predictions.len(),
                labels.len()
            )));
        }
        Ok(())
    }

    pub fn validate_rows<R, T>(&self, rows: &[R]) -> Result<(), LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>,
    {
        for row in rows {
            self.indexer.validate_row(row.as_ref())?;
        }
        Ok(())
    }

    /// Raw scores (sum of weights over all slots of a row) for the whole group.
    pub fn scores<R, T>(
        &mut self,
        rows: &[R],
        override_weights: Option<&[f64]>,
    ) -> Result<Vec<f64>, LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>,
    {
        if let Some(w) = override_weights {
            if w.len() != self.store.len() {
                return Err(LearnerError::InvalidInput(format!(
                    "Weight snapshot has {} entries, model has {} slots",
                    w.len(),
                    self.store.len()
                )));
            }
        }
        self.validate_rows(rows)?;

        let indexer = &self.indexer;
        let store = &self.store;
        let rng = &mut self.rng;
        let mut scores = Vec::with_capacity(rows.len());
        for row in rows {
            let slots = indexer.indices(row.as_ref(), rng)?;
            let wsum: f64 = match override_weights {
                Some(w) => slots.map(|slot| w[slot]).sum(),
                None => slots.map(|slot| store.weight(slot)).sum(),
            };
            scores.push(wsum);
        }
        Ok(scores)
    }

    /// Applies the same gradient to every slot of the row. Rows must have been validated.
    pub fn apply_row_gradient<T: AsRef<str>>(
        &mut self,
        row: &[T],
        gradient: f64,
    ) -> Result<(), LearnerError> {
        let store = &mut self.store;
        for slot in self.indexer.indices(row, &mut self.rng)? {
            store.apply_gradient(slot, gradient);
        }
        Ok(())
    }
}

/// Learner picked at runtime from the configured loss.
pub enum Learner {
    LogLoss(LogLossLearner),
    LambdaRank(LambdaRankLearner),
}

impl Learner {
    pub fn new(mi: &ModelInstance) -> Learner {
        log::info!(
            "Learner: loss={:?}, optimizer={}, alpha={}, beta={}, l1={}, l2={}, hash_space={}, interaction={} (dropout {})",
            mi.loss,
            OptimizerFtrl::get_name(),
            mi.alpha,
            mi.beta,
            mi.l1,
            mi.l2,
            mi.hash_space,
            mi.interaction,
            mi.interaction_dropout
        );
        match mi.loss {
            Loss::Logistic => Learner::LogLoss(LogLossLearner::new(mi)),
            Loss::LambdaRank => Learner::LambdaRank(LambdaRankLearner::new(mi)),
        }
    }
}

impl LearnerTrait for Learner {
    fn predict<R, T>(
        &mut self,
        rows: &[R],
        override_weights: Option<&[f64]>,
    ) -> Result<Vec<f64>, LearnerError>
    where
        R: AsRef<[T]>,
        T: AsRef<str>,
    {
        match self {
            Learner::LogLoss(l) => l.predict(rows, override_weights),
            Learner::LambdaRank(l) => l.predict(rows, override_weights),
        }
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
        match self {
            Learner::LogLoss(l) => l.update(rows, predictions, labels),
            Learner::LambdaRank(l) => l.update(rows, predictions, labels),
        }
    }

    fn core(&self) -> &LearnerCore {
        match self {
            Learner::LogLoss(l) => l.core(),
            Learner::LambdaRank(l) => l.core(),
        }
    }

    fn core_mut(&mut self) -> &mut LearnerCore {
        match self {
            Learner::LogLoss(l) => l.core_mut(),
            Learner::LambdaRank(l) => l.core_mut(),
        }
    }
}

use crate::optimizer::{FtrlData, OptimizerFtrl};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightAndOptimizerData {
    pub weight: f64,
    pub optimizer_data: FtrlData,
}

/// Hashed weight space: one weight plus FTRL accumulators per slot.
/// The weight is never written directly, it always follows from the accumulators.
#[derive(Clone, Debug)]
pub struct WeightStore {
    weights: Vec<WeightAndOptimizerData>,
    optimizer: OptimizerFtrl,
}

impl WeightStore {
    pub fn new(hash_space: usize, optimizer: OptimizerFtrl) -> WeightStore {
        let initial = WeightAndOptimizerData {
            weight: 0.0,
            optimizer_data: optimizer.initial_data(),
        };
        WeightStore {
            weights: vec![initial; hash_space],
            optimizer,
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline(always)]
    pub fn apply_gradient(&mut self, slot: usize, gradient: f64) {
        let optimizer = &self.optimizer;
        let entry = &mut self.weights[slot];
        entry.weight = optimizer.calculate_update(gradient, entry.weight, &mut entry.optimizer_data);
    }

    #[inline(always)]
    pub fn weight(&self, slot: usize) -> f64 {
        self.weights[slot].weight
    }

    pub fn accumulators(&self, slot: usize) -> FtrlData {
        self.weights[slot].optimizer_data
    }

    /// Snapshot of all weights, index = slot.
    pub fn weights(&self) -> Vec<f64> {
        self.weights.iter().map(|w| w.weight).collect()
    }

    pub fn entries(&self) -> &[WeightAndOptimizerData] {
        &self.weights
    }

    /// Replaces the whole state, used when loading a saved model. Weights are recomputed from
    /// the accumulators so they can never disagree with them.
    pub fn restore_accumulators(&mut self, data: &[FtrlData]) -> Result<(), String> {
        if data.len() != self.weights.len() {
            return Err(format!(
                "Expected {} accumulators, got {}",
                self.weights.len(),
                data.len()
            ));
        }
        for (entry, d) in self.weights.iter_mut().zip(data.iter()) {
            entry.optimizer_data = *d;
            entry.weight = self.optimizer.weight(d);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(l1: f64) -> WeightStore {
        WeightStore::new(10, OptimizerFtrl::new(0.1, 1.0, l1, 0.0))
    }

    #[test]
    fn test_new_is_zero() {
        let ws = store(1.0);
        assert_eq!(ws.len(), 10);
        assert!(ws.weights().iter().all(|w| *w == 0.0));
        assert_eq!(ws.accumulators(3), FtrlData { n: 0.0, z: 0.0 });
    }

    #[test]
    fn test_apply_gradient_only_touches_slot() {
        let mut ws = store(0.0);
        ws.apply_gradient(4, -0.5);
        assert!(ws.weight(4) > 0.0);
        for slot in (0..10).filter(|s| *s != 4) {
            assert_eq!(ws.weight(slot), 0.0);
            assert_eq!(ws.accumulators(slot), FtrlData::default());
        }
    }

    #[test]
    fn test_zero_gradient_unchanged() {
        let mut ws = store(0.1);
        ws.apply_gradient(2, 0.7);
        ws.apply_gradient(2, -1.9);
        let before = ws.entries()[2];
        ws.apply_gradient(2, 0.0);
        assert_eq!(ws.entries()[2], before);
    }

    #[test]
    fn test_sparsity_invariant() {
        let mut ws = store(0.8);
        let gradients = [0.3, -0.2, 0.9, -1.5, 0.05, 0.0, 2.0, -0.7, -0.7, 0.4];
        for (i, g) in gradients.iter().enumerate() {
            ws.apply_gradient(i % 3, *g);
            for slot in 0..ws.len() {
                let acc = ws.accumulators(slot);
                if acc.z.abs() <= 0.8 {
                    assert_eq!(ws.weight(slot), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_n_non_decreasing() {
        let mut ws = store(0.0);
        let mut last = 0.0;
        for g in [0.1, -0.4, 0.0, 3.0, -0.01].iter() {
            ws.apply_gradient(1, *g);
            let n = ws.accumulators(1).n;
            assert!(n >= last);
            last = n;
        }
    }

    #[test]
    fn test_restore_accumulators() {
        let mut ws = store(0.0);
        ws.apply_gradient(1, -0.5);
        ws.apply_gradient(7, 0.25);
        let saved: Vec<FtrlData> = ws.entries().iter().map(|e| e.optimizer_data).collect();

        let mut ws2 = store(0.0);
        ws2.restore_accumulators(&saved).unwrap();
        assert_eq!(ws2.weights(), ws.weights());
        assert!(ws2.restore_accumulators(&saved[..3]).is_err());
    }
}

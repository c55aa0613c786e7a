use crate::model_instance::ModelInstance;

/******************* FTRL-Proximal **************************/
// Per-coordinate adaptive learning rate with elastic net regularization
// (McMahan et al., "Ad Click Prediction: a View from the Trenches").
// Only n and z are state, the weight is derived from them on every update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptimizerFtrl {
    alpha: f64,
    beta: f64,
    l1: f64,
    l2: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FtrlData {
    pub n: f64, // sum of squared gradients
    pub z: f64, // adjusted gradient sum
}

impl OptimizerFtrl {
    pub fn new(alpha: f64, beta: f64, l1: f64, l2: f64) -> OptimizerFtrl {
        debug_assert!(alpha > 0.0);
        OptimizerFtrl { alpha, beta, l1, l2 }
    }

    pub fn from_model_instance(mi: &ModelInstance) -> OptimizerFtrl {
        OptimizerFtrl::new(mi.alpha, mi.beta, mi.l1, mi.l2)
    }

    pub fn get_name() -> &'static str {
        "FTRL-Proximal"
    }

    pub fn initial_data(&self) -> FtrlData {
        FtrlData::default()
    }

    /// Closed form weight for the given accumulators.
    #[inline(always)]
    pub fn weight(&self, data: &FtrlData) -> f64 {
        let abs_z = data.z.abs();
        if abs_z <= self.l1 {
            0.0
        } else {
            let sign = if data.z < 0.0 { -1.0 } else { 1.0 };
            -(data.z - sign * self.l1) / ((self.beta + data.n.sqrt()) / self.alpha + self.l2)
        }
    }

    /// Folds gradient into the accumulators and returns the new weight.
    /// `weight` has to be the weight before this update.
    #[inline(always)]
    pub fn calculate_update(&self, gradient: f64, weight: f64, data: &mut FtrlData) -> f64 {
        let gradient_squared = gradient * gradient;
        let sigma = ((data.n + gradient_squared).sqrt() - data.n.sqrt()) / self.alpha;
        data.z += gradient - sigma * weight;
        data.n += gradient_squared;
        self.weight(data)
    }
}

use std::error::Error;
use std::io::Error as IOError;
use std::io::ErrorKind;

use serde::{Deserialize, Serialize};

use crate::consts;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Copy)]
pub enum Loss {
    Logistic = 1,
    LambdaRank = 2,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelInstance {
    pub alpha: f64,
    pub beta: f64,
    pub l1: f64,
    pub l2: f64,
    pub hash_space: usize,
    pub interaction: bool,
    #[serde(default = "default_interaction_dropout")]
    pub interaction_dropout: f64,
    #[serde(default = "default_u32_zero")]
    pub hash_seed: u32,
    #[serde(default = "default_u64_zero")]
    pub random_seed: u64,
    #[serde(default = "default_loss_logistic")]
    pub loss: Loss,
}

fn default_u32_zero() -> u32 {
    0
}
fn default_u64_zero() -> u64 {
    0
}
fn default_interaction_dropout() -> f64 {
    consts::DEFAULT_INTERACTION_DROPOUT
}
fn default_loss_logistic() -> Loss {
    Loss::Logistic
}

fn config_error(msg: String) -> Box<dyn Error> {
    Box::new(IOError::new(ErrorKind::Other, msg))
}

impl ModelInstance {
    pub fn new_empty() -> Result<ModelInstance, Box<dyn Error>> {
        let mi = ModelInstance {
            alpha: 0.1,
            beta: 1.0,
            l1: 1.0,
            l2: 1.0,
            hash_space: consts::DEFAULT_HASH_SPACE,
            interaction: false,
            interaction_dropout: consts::DEFAULT_INTERACTION_DROPOUT,
            hash_seed: 0,
            random_seed: 0,
            loss: Loss::Logistic,
        };
        Ok(mi)
    }

    pub fn new_from_cmdline<'a>(cl: &clap::ArgMatches<'a>) -> Result<ModelInstance, Box<dyn Error>> {
        let mut mi = ModelInstance::new_empty()?;

        if let Some(val) = cl.value_of("loss") {
            mi.loss = match val {
                "logistic" => Loss::Logistic,
                "lambdarank" => Loss::LambdaRank,
                _ => {
                    return Err(config_error(format!(
                        "--loss supports 'logistic' or 'lambdarank', got '{}'",
                        val
                    )))
                }
            };
        }

        if let Some(val) = cl.value_of("alpha") {
            mi.alpha = val.parse()?;
        }
        if let Some(val) = cl.value_of("beta") {
            mi.beta = val.parse()?;
        }
        if let Some(val) = cl.value_of("l1") {
            mi.l1 = val.parse()?;
        }
        if let Some(val) = cl.value_of("l2") {
            mi.l2 = val.parse()?;
        }
        if let Some(val) = cl.value_of("hash_space") {
            mi.hash_space = val.parse()?;
        }
        if cl.is_present("interactions") {
            mi.interaction = true;
        }
        if let Some(val) = cl.value_of("interaction_dropout") {
            mi.interaction_dropout = val.parse()?;
        }
        if let Some(val) = cl.value_of("hash_seed") {
            mi.hash_seed = val.parse()?;
        }
        if let Some(val) = cl.value_of("random_seed") {
            mi.random_seed = val.parse()?;
        }

        mi.validate()?;
        Ok(mi)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !(self.alpha > 0.0) || !self.alpha.is_finite() {
            return Err(config_error(format!("alpha has to be > 0, got {}", self.alpha)));
        }
        if !(self.beta >= 0.0) || !self.beta.is_finite() {
            return Err(config_error(format!("beta has to be >= 0, got {}", self.beta)));
        }
        if !(self.l1 >= 0.0) || !(self.l2 >= 0.0) {
            return Err(config_error(format!(
                "l1 and l2 have to be >= 0, got {} and {}",
                self.l1, self.l2
            )));
        }
        if self.hash_space == 0 {
            return Err(config_error("hash_space has to be > 0".to_string()));
        }
        if !(self.interaction_dropout >= 0.0 && self.interaction_dropout < 1.0) {
            return Err(config_error(format!(
                "interaction_dropout has to be in [0, 1), got {}",
                self.interaction_dropout
            )));
        }
        Ok(())
    }
}

// Slot 0 of every model is the constant (bias) feature
pub const BIAS_SLOT: usize = 0;

// A pair of tokens is interacted only if the field id of the second one is below this
pub const INTERACTION_FIELD_LIMIT: i64 = 4;

// Raw scores are clamped before the logistic function so probabilities stay inside (0, 1)
pub const LOGISTIC_SCORE_CLAMP: f64 = 35.0;

pub const DEFAULT_HASH_SPACE: usize = 1 << 20;
pub const DEFAULT_INTERACTION_DROPOUT: f64 = 0.25;

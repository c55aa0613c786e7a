use std::num::IntErrorKind;

use rand::Rng;

use crate::consts;
use crate::errors::LearnerError;
use crate::model_instance::ModelInstance;
use crate::murmur;

const INTERACTION_SEPARATOR: u8 = b'_';

/// Maps feature tokens of a row to slots of a fixed size weight space (hashing trick).
/// Optionally adds hashed pairwise interactions between tokens of different fields.
#[derive(Clone, Debug)]
pub struct FeatureIndexer {
    hash_space: usize,
    interaction: bool,
    interaction_dropout: f64,
    hash_seed: u32,
}

// Field id is whatever comes before the first ':', "12:abc" -> 12.
// Integers too large for i64 saturate; they are outside the interaction range either way.
pub fn parse_field_id(token: &str) -> Result<i64, LearnerError> {
    let field = token.split(':').next().unwrap_or(token);
    match field.parse::<i64>() {
        Ok(field_id) => Ok(field_id),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(LearnerError::MalformedRecord(format!(
                "Cannot parse field id of feature \"{}\", expected <field-id>:<rest>",
                token
            ))),
        },
    }
}

impl FeatureIndexer {
    pub fn new(
        hash_space: usize,
        interaction: bool,
        interaction_dropout: f64,
        hash_seed: u32,
    ) -> FeatureIndexer {
        assert!(hash_space > 0);
        FeatureIndexer {
            hash_space,
            interaction,
            interaction_dropout,
            hash_seed,
        }
    }

    pub fn from_model_instance(mi: &ModelInstance) -> FeatureIndexer {
        FeatureIndexer::new(
            mi.hash_space,
            mi.interaction,
            mi.interaction_dropout,
            mi.hash_seed,
        )
    }

    #[inline(always)]
    pub fn slot(&self, token: &str) -> usize {
        murmur::hash32_with_seed(token.as_bytes(), self.hash_seed) as usize % self.hash_space
    }

    #[inline(always)]
    pub fn interaction_slot(&self, left: &str, right: &str) -> usize {
        murmur::hash32_joined_with_seed(
            left.as_bytes(),
            INTERACTION_SEPARATOR,
            right.as_bytes(),
            self.hash_seed,
        ) as usize
            % self.hash_space
    }

    // Interactions are only formed when there are at least two tokens
    fn needs_field_ids(&self, row_len: usize) -> bool {
        self.interaction && row_len >= 2
    }

    /// Checks that `indices()` will succeed on this row, without drawing any randomness.
    pub fn validate_row<T: AsRef<str>>(&self, row: &[T]) -> Result<(), LearnerError> {
        if self.needs_field_ids(row.len()) {
            for token in row {
                parse_field_id(token.as_ref())?;
            }
        }
        Ok(())
    }

    /// Lazily yields the slots of a row: bias, then every token, then the sampled interactions.
    /// Field ids are parsed before anything is yielded, so the iterator itself cannot fail.
    pub fn indices<'a, 'r, T: AsRef<str>, R: Rng>(
        &'a self,
        row: &'a [T],
        rng: &'r mut R,
    ) -> Result<SlotIter<'a, 'r, T, R>, LearnerError> {
        let mut sorted: Vec<(&'a str, i64)> = Vec::new();
        if self.needs_field_ids(row.len()) {
            sorted.reserve(row.len());
            for token in row {
                let token = token.as_ref();
                sorted.push((token, parse_field_id(token)?));
            }
            // Sorted by token string, not by field
            sorted.sort_by(|a, b| a.0.cmp(b.0));
        }
        Ok(SlotIter {
            indexer: self,
            row,
            sorted,
            rng,
            stage: Stage::Bias,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Bias,
    Tokens(usize),
    Pairs(usize, usize),
    Done,
}

pub struct SlotIter<'a, 'r, T, R> {
    indexer: &'a FeatureIndexer,
    row: &'a [T],
    sorted: Vec<(&'a str, i64)>,
    rng: &'r mut R,
    stage: Stage,
}

impl<'a, 'r, T: AsRef<str>, R: Rng> Iterator for SlotIter<'a, 'r, T, R> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            match self.stage {
                Stage::Bias => {
                    self.stage = Stage::Tokens(0);
                    return Some(consts::BIAS_SLOT);
                }
                Stage::Tokens(i) => {
                    if i < self.row.len() {
                        self.stage = Stage::Tokens(i + 1);
                        return Some(self.indexer.slot(self.row[i].as_ref()));
                    }
                    self.stage = Stage::Pairs(0, 1);
                }
                Stage::Pairs(i, j) => {
                    let len = self.sorted.len();
                    if i + 1 >= len {
                        self.stage = Stage::Done;
                        continue;
                    }
                    if j >= len {
                        self.stage = Stage::Pairs(i + 1, i + 2);
                        continue;
                    }
                    self.stage = Stage::Pairs(i, j + 1);

                    // one draw per candidate pair, whether or not the fields qualify
                    let sample: f64 = self.rng.gen();
                    if sample < self.indexer.interaction_dropout {
                        continue;
                    }
                    let (left, left_field) = self.sorted[i];
                    let (right, right_field) = self.sorted[j];
                    if left_field != right_field
                        && right_field >= 0
                        && right_field < consts::INTERACTION_FIELD_LIMIT
                    {
                        return Some(self.indexer.interaction_slot(left, right));
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

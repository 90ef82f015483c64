//! Damage pipeline errors
//!
//! Vetoed hits are not errors; they come back as `Outcome::Vetoed`.

use thiserror::Error;

use super::source::DamageKind;

#[derive(Debug, Error)]
pub enum DamageError {
    #[error("invalid damage amount: {0}")]
    InvalidAmount(f64),

    #[error("{0} damage requires an attacking entity")]
    MissingAttacker(DamageKind),

    #[error("no modifier step at index {0}")]
    UnknownModifier(usize),

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl DamageError {
    /// Whether the caller passed a malformed hit
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DamageError::InvalidAmount(_) | DamageError::MissingAttacker(_)
        )
    }
}

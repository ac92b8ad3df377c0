//! Unit equivalence model: one cached conversion factor per
//! `(food, origin unit, destination unit)` key.
//!
//! # Responsibility
//! - Define the persisted equivalence entry and its write invariants.
//!
//! # Invariants
//! - `origin_unit` and `destination_unit` are trimmed, lowercased tokens;
//!   the store matches them case-sensitively.
//! - `factor` is finite and strictly positive (grams per one origin unit).
//! - Key uniqueness is enforced by the store, not here: concurrent writers
//!   are arbitrated by the storage constraint.

use crate::model::food::FoodId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a persisted equivalence entry.
pub type EquivalenceId = Uuid;

/// Cached conversion factor for one `(food, origin unit)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEquivalence {
    /// Stable ID assigned on creation, never client-supplied.
    pub uuid: EquivalenceId,
    /// Owning catalog food.
    pub food_id: FoodId,
    /// Normalized lowercase origin token.
    pub origin_unit: String,
    /// Normalized lowercase destination token (canonically `grams`).
    pub destination_unit: String,
    /// Grams per one `origin_unit` of the food.
    pub factor: f64,
}

impl UnitEquivalence {
    /// Creates an entry with a generated stable ID.
    pub fn new(
        food_id: FoodId,
        origin_unit: impl Into<String>,
        destination_unit: impl Into<String>,
        factor: f64,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), food_id, origin_unit, destination_unit, factor)
    }

    /// Creates an entry with a caller-provided stable ID.
    pub fn with_id(
        uuid: EquivalenceId,
        food_id: FoodId,
        origin_unit: impl Into<String>,
        destination_unit: impl Into<String>,
        factor: f64,
    ) -> Self {
        Self {
            uuid,
            food_id,
            origin_unit: origin_unit.into(),
            destination_unit: destination_unit.into(),
            factor,
        }
    }

    /// Checks write invariants before persistence.
    pub fn validate(&self) -> Result<(), EquivalenceValidationError> {
        validate_unit_token("origin_unit", &self.origin_unit)?;
        validate_unit_token("destination_unit", &self.destination_unit)?;
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(EquivalenceValidationError::NonPositiveFactor(self.factor));
        }
        Ok(())
    }
}

fn validate_unit_token(field: &'static str, value: &str) -> Result<(), EquivalenceValidationError> {
    if value.trim().is_empty() {
        return Err(EquivalenceValidationError::EmptyUnit(field));
    }
    if value != value.trim().to_lowercase() {
        return Err(EquivalenceValidationError::UnnormalizedUnit {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validation failure for equivalence entries.
#[derive(Debug)]
pub enum EquivalenceValidationError {
    /// Unit token is empty or whitespace.
    EmptyUnit(&'static str),
    /// Unit token was not normalized before reaching the model.
    UnnormalizedUnit { field: &'static str, value: String },
    /// Factor is zero, negative, NaN or infinite.
    NonPositiveFactor(f64),
}

impl Display for EquivalenceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUnit(field) => write!(f, "equivalence {field} must not be empty"),
            Self::UnnormalizedUnit { field, value } => {
                write!(f, "equivalence {field} `{value}` must be trimmed lowercase")
            }
            Self::NonPositiveFactor(value) => {
                write!(f, "conversion factor must be a positive finite number, got {value}")
            }
        }
    }
}

impl Error for EquivalenceValidationError {}

#[cfg(test)]
mod tests {
    use super::{EquivalenceValidationError, UnitEquivalence};
    use uuid::Uuid;

    fn entry(origin: &str, destination: &str, factor: f64) -> UnitEquivalence {
        UnitEquivalence::new(Uuid::new_v4(), origin, destination, factor)
    }

    #[test]
    fn valid_entry_passes() {
        assert!(entry("cup", "grams", 240.0).validate().is_ok());
        assert!(entry("porción", "grams", 85.5).validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_unnormalized_units() {
        assert!(matches!(
            entry(" ", "grams", 1.0).validate(),
            Err(EquivalenceValidationError::EmptyUnit("origin_unit"))
        ));
        assert!(matches!(
            entry("Cup", "grams", 1.0).validate(),
            Err(EquivalenceValidationError::UnnormalizedUnit { field: "origin_unit", .. })
        ));
        assert!(matches!(
            entry("cup", "Grams", 1.0).validate(),
            Err(EquivalenceValidationError::UnnormalizedUnit {
                field: "destination_unit",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_positive_factors() {
        for factor in [0.0, -2.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                entry("cup", "grams", factor).validate(),
                Err(EquivalenceValidationError::NonPositiveFactor(_))
            ));
        }
    }
}

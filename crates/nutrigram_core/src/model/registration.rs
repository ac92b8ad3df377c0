//! Consumption record model and the ephemeral normalization result.
//!
//! # Responsibility
//! - Define the persisted food registration, which stores the normalized
//!   quantity and the user-entered original side by side.
//! - Define `NormalizedQuantity`, the per-call result handed to callers.
//!
//! # Invariants
//! - The original quantity/unit pair is never discarded: it is required for
//!   user-facing display and for re-derivation when a factor is corrected.
//! - `quantity_g` is always expressed in the canonical destination unit.

use crate::model::food::FoodId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a persisted consumption record.
pub type RegistrationId = Uuid;

/// Identifier issued by the external identity system. Opaque to this core.
pub type UserId = i64;

const MS_PER_DAY: i64 = 86_400_000;

/// Result of normalizing one user-supplied quantity. Not persisted by the
/// normalizer itself; consumed immediately by registration persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedQuantity {
    /// Quantity converted to the canonical unit.
    pub quantity_g: f64,
    /// Quantity exactly as the user entered it.
    pub original_quantity: f64,
    /// Normalized lowercase token the user entered.
    pub original_unit: String,
}

/// Persisted record of one food consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRegistration {
    /// Stable ID assigned on creation.
    pub uuid: RegistrationId,
    /// Consuming user, owned by the external identity system.
    pub user_id: UserId,
    /// Consumed catalog food.
    pub food_id: FoodId,
    /// Normalized quantity in grams.
    pub quantity_g: f64,
    /// User-entered quantity, kept verbatim.
    pub original_quantity: f64,
    /// User-entered unit, normalized lowercase.
    pub original_unit: String,
    /// Meal slot label (`desayuno`, `almuerzo`, ...). Free-form.
    pub meal_moment: Option<String>,
    /// Consumption timestamp, Unix epoch milliseconds.
    pub consumed_at_ms: i64,
}

impl FoodRegistration {
    /// Creates a registration from a normalization result.
    pub fn new(
        user_id: UserId,
        food_id: FoodId,
        normalized: &NormalizedQuantity,
        meal_moment: Option<String>,
        consumed_at_ms: i64,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            user_id,
            food_id,
            quantity_g: normalized.quantity_g,
            original_quantity: normalized.original_quantity,
            original_unit: normalized.original_unit.clone(),
            meal_moment,
            consumed_at_ms,
        }
    }

    /// UTC day index of the consumption, used by statistics triggers.
    pub fn epoch_day(&self) -> i64 {
        self.consumed_at_ms.div_euclid(MS_PER_DAY)
    }

    /// Checks write invariants before persistence.
    pub fn validate(&self) -> Result<(), RegistrationValidationError> {
        if !self.quantity_g.is_finite() || self.quantity_g <= 0.0 {
            return Err(RegistrationValidationError::NonPositiveQuantity(
                self.quantity_g,
            ));
        }
        if !self.original_quantity.is_finite() || self.original_quantity <= 0.0 {
            return Err(RegistrationValidationError::NonPositiveQuantity(
                self.original_quantity,
            ));
        }
        if self.original_unit.trim().is_empty() {
            return Err(RegistrationValidationError::EmptyOriginalUnit);
        }
        Ok(())
    }
}

/// Validation failure for consumption records.
#[derive(Debug)]
pub enum RegistrationValidationError {
    /// Stored or original quantity is zero, negative, NaN or infinite.
    NonPositiveQuantity(f64),
    /// Original unit token is empty.
    EmptyOriginalUnit,
}

impl Display for RegistrationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveQuantity(value) => {
                write!(f, "registration quantity must be positive, got {value}")
            }
            Self::EmptyOriginalUnit => write!(f, "registration original unit must not be empty"),
        }
    }
}

impl Error for RegistrationValidationError {}

#[cfg(test)]
mod tests {
    use super::{FoodRegistration, NormalizedQuantity, RegistrationValidationError};
    use uuid::Uuid;

    fn normalized() -> NormalizedQuantity {
        NormalizedQuantity {
            quantity_g: 2000.0,
            original_quantity: 2.0,
            original_unit: "kg".to_string(),
        }
    }

    #[test]
    fn registration_keeps_original_next_to_normalized() {
        let registration =
            FoodRegistration::new(7, Uuid::new_v4(), &normalized(), None, 1_722_000_000_000);
        assert_eq!(registration.quantity_g, 2000.0);
        assert_eq!(registration.original_quantity, 2.0);
        assert_eq!(registration.original_unit, "kg");
    }

    #[test]
    fn epoch_day_is_floor_division_of_milliseconds() {
        let mut registration =
            FoodRegistration::new(7, Uuid::new_v4(), &normalized(), None, 86_400_000);
        assert_eq!(registration.epoch_day(), 1);

        registration.consumed_at_ms = 86_399_999;
        assert_eq!(registration.epoch_day(), 0);

        // Pre-epoch timestamps floor toward negative days, never toward zero.
        registration.consumed_at_ms = -1;
        assert_eq!(registration.epoch_day(), -1);
    }

    #[test]
    fn validate_rejects_corrupt_quantities() {
        let mut registration =
            FoodRegistration::new(7, Uuid::new_v4(), &normalized(), None, 1_722_000_000_000);
        registration.quantity_g = 0.0;
        assert!(matches!(
            registration.validate(),
            Err(RegistrationValidationError::NonPositiveQuantity(_))
        ));

        registration.quantity_g = 2000.0;
        registration.original_unit = String::new();
        assert!(matches!(
            registration.validate(),
            Err(RegistrationValidationError::EmptyOriginalUnit)
        ));
    }
}

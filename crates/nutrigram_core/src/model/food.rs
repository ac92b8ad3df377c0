//! Food catalog model.
//!
//! # Responsibility
//! - Define the food entity consumed by factor resolution.
//! - Apply the base-quantity fallback rule in exactly one place.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another food.
//! - `base_quantity_g` is a hint, not a guarantee: absent or non-positive
//!   values are usable through `effective_base_quantity_g`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a catalog food.
pub type FoodId = Uuid;

/// Grams assumed for one natural unit when a food carries no usable hint.
pub const FALLBACK_BASE_QUANTITY_G: f64 = 100.0;

/// Catalog food referenced by equivalences and consumption records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    /// Stable global ID used for linking and auditing.
    pub uuid: FoodId,
    /// Display name as entered in the catalog.
    pub name: String,
    /// Grams represented by one natural unit of this food (a portion, a
    /// slice, a piece). `None` when the catalog has no data.
    pub base_quantity_g: Option<f64>,
}

impl Food {
    /// Creates a food with a generated stable ID.
    pub fn new(name: impl Into<String>, base_quantity_g: Option<f64>) -> Self {
        Self::with_id(Uuid::new_v4(), name, base_quantity_g)
    }

    /// Creates a food with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: FoodId, name: impl Into<String>, base_quantity_g: Option<f64>) -> Self {
        Self {
            uuid,
            name: name.into(),
            base_quantity_g,
        }
    }

    /// Grams per one natural unit of this food, fallback applied.
    ///
    /// Absent, non-positive and non-finite hints all resolve to
    /// [`FALLBACK_BASE_QUANTITY_G`], so the result is always usable as a
    /// conversion factor.
    pub fn effective_base_quantity_g(&self) -> f64 {
        match self.base_quantity_g {
            Some(value) if value.is_finite() && value > 0.0 => value,
            _ => FALLBACK_BASE_QUANTITY_G,
        }
    }

    /// Checks catalog invariants before persistence.
    pub fn validate(&self) -> Result<(), FoodValidationError> {
        if self.name.trim().is_empty() {
            return Err(FoodValidationError::EmptyName);
        }
        if let Some(value) = self.base_quantity_g {
            if !value.is_finite() {
                return Err(FoodValidationError::NonFiniteBaseQuantity(value));
            }
        }
        Ok(())
    }
}

/// Validation failure for catalog foods.
#[derive(Debug)]
pub enum FoodValidationError {
    /// Name is empty or whitespace.
    EmptyName,
    /// Base quantity is NaN or infinite; non-positive values are legal and
    /// handled by the fallback rule instead.
    NonFiniteBaseQuantity(f64),
}

impl Display for FoodValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "food name must not be empty"),
            Self::NonFiniteBaseQuantity(value) => {
                write!(f, "food base quantity must be finite, got {value}")
            }
        }
    }
}

impl Error for FoodValidationError {}

//! Domain model for the food catalog, unit equivalences and consumption
//! records.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Keep persistence-bound invariants next to the data they protect.
//!
//! # Invariants
//! - Every owned row is identified by a stable UUID assigned on creation,
//!   never supplied by API callers.
//! - Unit tokens held by models are already trimmed and lowercased.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod equivalence;
pub mod food;
pub mod registration;

/// Validation failure for any domain model.
///
/// Repositories report this single type so callers can match on "the write
/// was rejected before SQL" without caring which entity it was.
#[derive(Debug)]
pub enum ModelValidationError {
    Food(food::FoodValidationError),
    Equivalence(equivalence::EquivalenceValidationError),
    Registration(registration::RegistrationValidationError),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Food(err) => write!(f, "{err}"),
            Self::Equivalence(err) => write!(f, "{err}"),
            Self::Registration(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ModelValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Food(err) => Some(err),
            Self::Equivalence(err) => Some(err),
            Self::Registration(err) => Some(err),
        }
    }
}

impl From<food::FoodValidationError> for ModelValidationError {
    fn from(value: food::FoodValidationError) -> Self {
        Self::Food(value)
    }
}

impl From<equivalence::EquivalenceValidationError> for ModelValidationError {
    fn from(value: equivalence::EquivalenceValidationError) -> Self {
        Self::Equivalence(value)
    }
}

impl From<registration::RegistrationValidationError> for ModelValidationError {
    fn from(value: registration::RegistrationValidationError) -> Self {
        Self::Registration(value)
    }
}

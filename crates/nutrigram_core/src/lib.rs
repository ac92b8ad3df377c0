//! Core domain logic for nutrigram: quantity normalization and race-safe
//! unit-equivalence upserts over a food catalog.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod units;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::equivalence::{EquivalenceId, EquivalenceValidationError, UnitEquivalence};
pub use model::food::{Food, FoodId};
pub use model::registration::{FoodRegistration, NormalizedQuantity, RegistrationId, UserId};
pub use repo::equivalence_repo::{EquivalenceStore, RepoError, RepoResult, SqliteEquivalenceStore};
pub use repo::food_repo::{FoodRepository, SqliteFoodRepository};
pub use repo::registration_repo::{RegistrationStore, SqliteRegistrationStore};
pub use service::equivalence_service::{EquivalenceService, EquivalenceServiceError};
pub use service::registration_service::{
    RecordConsumptionRequest, RegistrationService, RegistrationServiceError,
};
pub use service::statistics::{LoggingStatisticsTrigger, StatisticsTrigger};
pub use units::{default_factor, is_recognized, normalize_unit, CANONICAL_UNIT};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Quantity normalization and consumption recording.
//!
//! # Responsibility
//! - Normalize user-supplied quantities to the canonical unit using the
//!   factor resolver.
//! - Record consumptions: persist the normalized and original values side
//!   by side, then fire the statistics trigger.
//!
//! # Invariants
//! - Validation errors are detected before any persistence work.
//! - The original quantity/unit pair is stored verbatim, never discarded.
//! - The statistics trigger fires only after a successful save.

use crate::model::food::FoodId;
use crate::model::registration::{FoodRegistration, NormalizedQuantity, UserId};
use crate::repo::equivalence_repo::{EquivalenceStore, RepoError};
use crate::repo::food_repo::FoodRepository;
use crate::repo::registration_repo::RegistrationStore;
use crate::service::equivalence_service::{EquivalenceService, EquivalenceServiceError};
use crate::service::statistics::StatisticsTrigger;
use crate::units;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Service error for normalization and recording use-cases.
#[derive(Debug)]
pub enum RegistrationServiceError {
    /// Quantity is zero, negative, NaN or infinite. User-correctable.
    InvalidQuantity(f64),
    /// Unit token is not in the recognized set. User-correctable.
    InvalidUnit(String),
    /// Referenced catalog food does not exist.
    FoodNotFound(FoodId),
    /// Factor resolution failed below the validation layer.
    Equivalence(EquivalenceServiceError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for RegistrationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuantity(value) => {
                write!(f, "quantity must be a positive finite number, got {value}")
            }
            Self::InvalidUnit(unit) => write!(f, "invalid unit: `{unit}`"),
            Self::FoodNotFound(id) => write!(f, "food not found: {id}"),
            Self::Equivalence(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistrationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Equivalence(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EquivalenceServiceError> for RegistrationServiceError {
    fn from(value: EquivalenceServiceError) -> Self {
        match value {
            EquivalenceServiceError::InvalidUnit(unit) => Self::InvalidUnit(unit),
            EquivalenceServiceError::FoodNotFound(id) => Self::FoodNotFound(id),
            EquivalenceServiceError::Repo(err) => Self::Repo(err),
            other => Self::Equivalence(other),
        }
    }
}

impl From<RepoError> for RegistrationServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::FoodNotFound(id) => Self::FoodNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Request model for recording one consumption.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordConsumptionRequest {
    pub user_id: UserId,
    pub food_id: FoodId,
    /// Quantity in `unit`, exactly as the user entered it.
    pub quantity: f64,
    /// Unit token as entered; normalized by the service.
    pub unit: String,
    /// Meal slot label, free-form.
    pub meal_moment: Option<String>,
    /// Consumption timestamp override, epoch milliseconds. `None` means
    /// "now".
    pub consumed_at_ms: Option<i64>,
}

/// Use-case service for quantity normalization and consumption recording.
pub struct RegistrationService<S, F, R, T>
where
    S: EquivalenceStore,
    F: FoodRepository,
    R: RegistrationStore,
    T: StatisticsTrigger,
{
    equivalences: EquivalenceService<S, F>,
    registrations: R,
    statistics: T,
}

impl<S, F, R, T> RegistrationService<S, F, R, T>
where
    S: EquivalenceStore,
    F: FoodRepository,
    R: RegistrationStore,
    T: StatisticsTrigger,
{
    /// Creates a service from the factor resolver, the registration store
    /// and the statistics trigger.
    pub fn new(equivalences: EquivalenceService<S, F>, registrations: R, statistics: T) -> Self {
        Self {
            equivalences,
            registrations,
            statistics,
        }
    }

    /// Converts a user-supplied quantity to the canonical unit.
    ///
    /// Pure use-case over the resolver: nothing is persisted here. The
    /// returned value carries the original quantity and normalized unit so
    /// the caller can store both sides.
    pub fn normalize_quantity(
        &self,
        food_id: FoodId,
        quantity: f64,
        unit: &str,
    ) -> Result<NormalizedQuantity, RegistrationServiceError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(RegistrationServiceError::InvalidQuantity(quantity));
        }

        let original_unit = units::normalize_unit(unit);
        let factor = self.equivalences.resolve_factor(food_id, &original_unit)?;

        Ok(NormalizedQuantity {
            quantity_g: quantity * factor,
            original_quantity: quantity,
            original_unit,
        })
    }

    /// Records one consumption: normalize, persist, fire the statistics
    /// trigger.
    pub fn record_consumption(
        &self,
        request: &RecordConsumptionRequest,
    ) -> Result<FoodRegistration, RegistrationServiceError> {
        let normalized =
            self.normalize_quantity(request.food_id, request.quantity, &request.unit)?;

        let consumed_at_ms = request.consumed_at_ms.unwrap_or_else(now_epoch_ms);
        let registration = FoodRegistration::new(
            request.user_id,
            request.food_id,
            &normalized,
            request.meal_moment.clone(),
            consumed_at_ms,
        );

        self.registrations.save_registration(&registration)?;
        info!(
            "event=registration_save module=service status=ok user={} food={} quantity_g={} original_quantity={} original_unit={}",
            registration.user_id,
            registration.food_id,
            registration.quantity_g,
            registration.original_quantity,
            registration.original_unit
        );

        self.statistics
            .on_registration_saved(registration.user_id, registration.epoch_day());

        Ok(registration)
    }

    /// Most recent registrations for a user, newest first.
    pub fn list_recent_for_user(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<FoodRegistration>, RegistrationServiceError> {
        Ok(self.registrations.list_recent_for_user(user_id, limit)?)
    }

    /// Access to the underlying resolver, for callers that only need
    /// factor resolution or declaration.
    pub fn equivalences(&self) -> &EquivalenceService<S, F> {
        &self.equivalences
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

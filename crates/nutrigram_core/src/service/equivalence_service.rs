//! Factor resolution and race-safe equivalence declaration.
//!
//! # Responsibility
//! - Resolve the grams-per-unit factor for a `(food, origin unit)` pair:
//!   declared entry first, unit-catalog default on a miss.
//! - Declare (create-or-update) equivalence entries, tolerating concurrent
//!   first-writers racing on the same key.
//!
//! # Invariants
//! - Resolution is read-only: a computed default is never written back.
//!   Caching a factor is an explicit declaration, not a resolution side
//!   effect.
//! - Declaration performs at most one conflict-recovery cycle; conflicts
//!   are absorbed here and never surface to callers.
//! - The last declared factor wins when writers race.

use crate::model::equivalence::UnitEquivalence;
use crate::model::food::FoodId;
use crate::repo::equivalence_repo::{EquivalenceStore, RepoError, RepoResult};
use crate::repo::food_repo::FoodRepository;
use crate::units;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for factor resolution and declaration use-cases.
#[derive(Debug)]
pub enum EquivalenceServiceError {
    /// Unit token is not in the recognized set. User-correctable.
    InvalidUnit(String),
    /// Referenced catalog food does not exist.
    FoodNotFound(FoodId),
    /// The single conflict-recovery cycle still found no winner row.
    UpsertFailed {
        food_id: FoodId,
        origin_unit: String,
        destination_unit: String,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for EquivalenceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUnit(unit) => write!(f, "invalid unit: `{unit}`"),
            Self::FoodNotFound(id) => write!(f, "food not found: {id}"),
            Self::UpsertFailed {
                food_id,
                origin_unit,
                destination_unit,
            } => write!(
                f,
                "equivalence upsert failed for food {food_id} {origin_unit}->{destination_unit}: no winner row after conflict recovery"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EquivalenceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EquivalenceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::FoodNotFound(id) => Self::FoodNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service for factor resolution and equivalence declaration.
pub struct EquivalenceService<S: EquivalenceStore, F: FoodRepository> {
    store: S,
    foods: F,
}

impl<S: EquivalenceStore, F: FoodRepository> EquivalenceService<S, F> {
    /// Creates a service using the provided store and catalog.
    pub fn new(store: S, foods: F) -> Self {
        Self { store, foods }
    }

    /// Grams per one `origin_unit` of the food, destination fixed to
    /// [`units::CANONICAL_UNIT`].
    ///
    /// A declared entry always overrides the catalog default: explicit data
    /// beats the heuristic. Read-only; safe to call concurrently without
    /// synchronization.
    pub fn resolve_factor(
        &self,
        food_id: FoodId,
        origin_unit: &str,
    ) -> Result<f64, EquivalenceServiceError> {
        let origin_unit = units::normalize_unit(origin_unit);
        if !units::is_recognized(&origin_unit) {
            return Err(EquivalenceServiceError::InvalidUnit(origin_unit));
        }

        let food = self
            .foods
            .get_food(food_id)?
            .ok_or(EquivalenceServiceError::FoodNotFound(food_id))?;

        match self
            .store
            .find_equivalence(food_id, &origin_unit, units::CANONICAL_UNIT)?
        {
            Some(entry) => {
                debug!(
                    "event=factor_resolve module=service status=declared food={food_id} unit={origin_unit} factor={}",
                    entry.factor
                );
                Ok(entry.factor)
            }
            None => {
                let factor = units::default_factor(&origin_unit, &food);
                debug!(
                    "event=factor_resolve module=service status=default food={food_id} unit={origin_unit} factor={factor}"
                );
                Ok(factor)
            }
        }
    }

    /// Declares (creates or corrects) a conversion factor for one key.
    ///
    /// Optimistic insert with a single bounded recovery cycle:
    /// 1. an existing entry is updated in place;
    /// 2. otherwise a new entry is inserted;
    /// 3. an insert conflict means another writer won the race between the
    ///    read and the insert. The key is re-read (store uniqueness
    ///    guarantees exactly one winner) and updated with this caller's
    ///    factor, so the last declared value wins.
    ///
    /// An empty re-read after a conflict is a store-level anomaly and fails
    /// with [`EquivalenceServiceError::UpsertFailed`]; there is no second
    /// retry.
    pub fn declare(
        &self,
        food_id: FoodId,
        origin_unit: &str,
        destination_unit: &str,
        factor: f64,
    ) -> Result<UnitEquivalence, EquivalenceServiceError> {
        let origin_unit = units::normalize_unit(origin_unit);
        let destination_unit = units::normalize_unit(destination_unit);

        self.foods
            .get_food(food_id)?
            .ok_or(EquivalenceServiceError::FoodNotFound(food_id))?;

        if let Some(existing) =
            self.store
                .find_equivalence(food_id, &origin_unit, &destination_unit)?
        {
            let updated = self.apply_factor(existing, factor)?;
            info!(
                "event=equivalence_declare module=service status=updated food={food_id} origin={origin_unit} destination={destination_unit} factor={factor}"
            );
            return Ok(updated);
        }

        let candidate = UnitEquivalence::new(food_id, origin_unit, destination_unit, factor);
        match self.store.insert_equivalence(&candidate) {
            Ok(_) => {
                info!(
                    "event=equivalence_declare module=service status=created food={food_id} origin={} destination={} factor={factor}",
                    candidate.origin_unit, candidate.destination_unit
                );
                Ok(candidate)
            }
            Err(RepoError::Conflict { .. }) => {
                warn!(
                    "event=equivalence_declare module=service status=conflict food={food_id} origin={} destination={} detail=concurrent_writer_won_insert",
                    candidate.origin_unit, candidate.destination_unit
                );
                self.recover_from_conflict(candidate, factor)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Distinct origin units declared for a food.
    pub fn list_origin_units(&self, food_id: FoodId) -> Result<Vec<String>, EquivalenceServiceError> {
        self.foods
            .get_food(food_id)?
            .ok_or(EquivalenceServiceError::FoodNotFound(food_id))?;

        let origin_units = self.store.list_origin_units(food_id)?;
        info!(
            "event=origin_units_list module=service status=ok food={food_id} count={}",
            origin_units.len()
        );
        Ok(origin_units)
    }

    /// One recovery cycle after an insert conflict: re-read the winner row
    /// and overwrite its factor with this caller's value.
    fn recover_from_conflict(
        &self,
        candidate: UnitEquivalence,
        factor: f64,
    ) -> Result<UnitEquivalence, EquivalenceServiceError> {
        let winner = self.store.find_equivalence(
            candidate.food_id,
            &candidate.origin_unit,
            &candidate.destination_unit,
        )?;

        match winner {
            Some(existing) => {
                let updated = self.apply_factor(existing, factor)?;
                warn!(
                    "event=equivalence_declare module=service status=conflict_recovered food={} origin={} destination={} factor={factor}",
                    updated.food_id, updated.origin_unit, updated.destination_unit
                );
                Ok(updated)
            }
            None => {
                error!(
                    "event=equivalence_declare module=service status=upsert_failed food={} origin={} destination={} detail=no_row_after_conflict",
                    candidate.food_id, candidate.origin_unit, candidate.destination_unit
                );
                Err(EquivalenceServiceError::UpsertFailed {
                    food_id: candidate.food_id,
                    origin_unit: candidate.origin_unit,
                    destination_unit: candidate.destination_unit,
                })
            }
        }
    }

    fn apply_factor(
        &self,
        mut entry: UnitEquivalence,
        factor: f64,
    ) -> RepoResult<UnitEquivalence> {
        entry.factor = factor;
        self.store.update_equivalence(&entry)?;
        Ok(entry)
    }
}

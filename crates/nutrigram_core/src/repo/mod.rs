//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate models before persistence.
//! - Repository APIs return semantic errors (`Conflict`, `FoodNotFound`,
//!   `EntryNotFound`) in addition to DB transport errors.
//! - Key uniqueness for equivalences is enforced by the storage schema and
//!   surfaced as `RepoError::Conflict`, never checked by a prior read.

pub mod equivalence_repo;
pub mod food_repo;
pub mod registration_repo;

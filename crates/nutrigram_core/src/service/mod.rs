//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs: factor
//!   resolution, race-safe equivalence declaration, quantity normalization
//!   and consumption recording.
//! - Keep outer API layers decoupled from storage details.

pub mod equivalence_service;
pub mod registration_service;
pub mod statistics;

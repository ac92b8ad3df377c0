//! Consumption record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist food registrations with the original quantity/unit preserved
//!   next to the normalized value.
//! - Serve the recent-registrations read used by consumption history.
//!
//! # Invariants
//! - Write paths call `FoodRegistration::validate()` before SQL mutations.
//! - Recent listing is ordered by `consumed_at DESC, uuid ASC` and clamps
//!   its limit.

use crate::model::registration::{FoodRegistration, RegistrationId, UserId};
use crate::model::ModelValidationError;
use crate::repo::equivalence_repo::{
    ensure_schema_current, ensure_table_with_columns, parse_uuid_column, RepoResult,
};
use rusqlite::{params, Connection, Row};

const RECENT_DEFAULT_LIMIT: u32 = 10;
const RECENT_LIMIT_MAX: u32 = 50;

/// Repository interface for consumption records.
pub trait RegistrationStore {
    /// Persists one registration and returns its stable id.
    fn save_registration(&self, registration: &FoodRegistration) -> RepoResult<RegistrationId>;
    /// Most recent registrations for a user, newest first.
    fn list_recent_for_user(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<FoodRegistration>>;
}

/// SQLite-backed registration store.
pub struct SqliteRegistrationStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistrationStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        ensure_table_with_columns(
            conn,
            "food_registrations",
            &[
                "uuid",
                "user_id",
                "food_uuid",
                "quantity_g",
                "original_quantity",
                "original_unit",
                "meal_moment",
                "consumed_at",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl RegistrationStore for SqliteRegistrationStore<'_> {
    fn save_registration(&self, registration: &FoodRegistration) -> RepoResult<RegistrationId> {
        registration.validate().map_err(ModelValidationError::from)?;

        self.conn.execute(
            "INSERT INTO food_registrations (
                uuid,
                user_id,
                food_uuid,
                quantity_g,
                original_quantity,
                original_unit,
                meal_moment,
                consumed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                registration.uuid.to_string(),
                registration.user_id,
                registration.food_id.to_string(),
                registration.quantity_g,
                registration.original_quantity,
                registration.original_unit.as_str(),
                registration.meal_moment.as_deref(),
                registration.consumed_at_ms,
            ],
        )?;

        Ok(registration.uuid)
    }

    fn list_recent_for_user(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<FoodRegistration>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                uuid,
                user_id,
                food_uuid,
                quantity_g,
                original_quantity,
                original_unit,
                meal_moment,
                consumed_at
             FROM food_registrations
             WHERE user_id = ?1
             ORDER BY consumed_at DESC, uuid ASC
             LIMIT ?2;",
        )?;

        let applied_limit = normalize_recent_limit(limit);
        let mut rows = stmt.query(params![user_id, i64::from(applied_limit)])?;
        let mut registrations = Vec::new();
        while let Some(row) = rows.next()? {
            registrations.push(parse_registration_row(row)?);
        }

        Ok(registrations)
    }
}

/// Normalizes the recent-listing limit: default 10, clamp to 50.
pub fn normalize_recent_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => RECENT_DEFAULT_LIMIT,
        Some(value) if value > RECENT_LIMIT_MAX => RECENT_LIMIT_MAX,
        Some(value) => value,
    }
}

fn parse_registration_row(row: &Row<'_>) -> RepoResult<FoodRegistration> {
    let uuid = parse_uuid_column(row, "uuid", "food_registrations.uuid")?;
    let food_id = parse_uuid_column(row, "food_uuid", "food_registrations.food_uuid")?;

    let registration = FoodRegistration {
        uuid,
        user_id: row.get("user_id")?,
        food_id,
        quantity_g: row.get("quantity_g")?,
        original_quantity: row.get("original_quantity")?,
        original_unit: row.get("original_unit")?,
        meal_moment: row.get("meal_moment")?,
        consumed_at_ms: row.get("consumed_at")?,
    };
    registration.validate().map_err(ModelValidationError::from)?;
    Ok(registration)
}

#[cfg(test)]
mod tests {
    use super::normalize_recent_limit;

    #[test]
    fn recent_limit_defaults_and_clamps() {
        assert_eq!(normalize_recent_limit(None), 10);
        assert_eq!(normalize_recent_limit(Some(0)), 10);
        assert_eq!(normalize_recent_limit(Some(25)), 25);
        assert_eq!(normalize_recent_limit(Some(500)), 50);
    }
}

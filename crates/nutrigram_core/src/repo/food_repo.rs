//! Food catalog repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide catalog lookup for factor resolution and registration.
//! - Keep catalog SQL inside the persistence boundary.
//!
//! # Invariants
//! - `create_food` validates the model before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::food::{Food, FoodId};
use crate::model::ModelValidationError;
use crate::repo::equivalence_repo::{
    ensure_schema_current, ensure_table_with_columns, parse_uuid_column, RepoResult,
};
use rusqlite::{params, Connection, Row};

/// Repository interface for catalog foods.
pub trait FoodRepository {
    /// Persists a new catalog food and returns its stable id.
    fn create_food(&self, food: &Food) -> RepoResult<FoodId>;
    /// Gets one food by stable id.
    fn get_food(&self, id: FoodId) -> RepoResult<Option<Food>>;
}

/// SQLite-backed food repository.
pub struct SqliteFoodRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFoodRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        ensure_table_with_columns(conn, "foods", &["uuid", "name", "base_quantity_g"])?;
        Ok(Self { conn })
    }
}

impl FoodRepository for SqliteFoodRepository<'_> {
    fn create_food(&self, food: &Food) -> RepoResult<FoodId> {
        food.validate().map_err(ModelValidationError::from)?;

        self.conn.execute(
            "INSERT INTO foods (uuid, name, base_quantity_g) VALUES (?1, ?2, ?3);",
            params![
                food.uuid.to_string(),
                food.name.as_str(),
                food.base_quantity_g,
            ],
        )?;

        Ok(food.uuid)
    }

    fn get_food(&self, id: FoodId) -> RepoResult<Option<Food>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, base_quantity_g
             FROM foods
             WHERE uuid = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_food_row(row)?));
        }

        Ok(None)
    }
}

fn parse_food_row(row: &Row<'_>) -> RepoResult<Food> {
    let uuid = parse_uuid_column(row, "uuid", "foods.uuid")?;
    let food = Food {
        uuid,
        name: row.get("name")?,
        base_quantity_g: row.get("base_quantity_g")?,
    };
    food.validate().map_err(ModelValidationError::from)?;
    Ok(food)
}

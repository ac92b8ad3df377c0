//! Equivalence store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/insert/update persistence over `unit_equivalences`.
//! - Surface unique-key collisions as `RepoError::Conflict` so the upsert
//!   coordinator can run its recovery cycle.
//!
//! # Invariants
//! - `insert` relies on the schema `UNIQUE` constraint for atomicity; it
//!   never pre-checks with a read, because a sibling connection may write
//!   between the read and the insert.
//! - Write paths call `UnitEquivalence::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::equivalence::{EquivalenceId, UnitEquivalence};
use crate::model::food::FoodId;
use crate::model::ModelValidationError;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EQUIVALENCE_SELECT_SQL: &str = "SELECT
    uuid,
    food_uuid,
    origin_unit,
    destination_unit,
    factor
FROM unit_equivalences";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for catalog, equivalence and registration
/// persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    /// An entry for this key already exists. Expected under concurrency;
    /// recovered by the upsert coordinator, never surfaced to its callers.
    Conflict {
        food_id: FoodId,
        origin_unit: String,
        destination_unit: String,
    },
    EntryNotFound(EquivalenceId),
    FoodNotFound(FoodId),
    InvalidData(String),
    /// Connection has not been migrated to the supported schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict {
                food_id,
                origin_unit,
                destination_unit,
            } => write!(
                f,
                "equivalence already exists for food {food_id} {origin_unit}->{destination_unit}"
            ),
            Self::EntryNotFound(id) => write!(f, "equivalence entry not found: {id}"),
            Self::FoodNotFound(id) => write!(f, "food not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match supported {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store interface for cached conversion factors.
///
/// All operations are request-scoped and stateless between calls: recovery
/// after a failed write is a fresh read, nothing else.
pub trait EquivalenceStore {
    /// Exact-match lookup on pre-normalized unit tokens. Case-sensitive.
    fn find_equivalence(
        &self,
        food_id: FoodId,
        origin_unit: &str,
        destination_unit: &str,
    ) -> RepoResult<Option<UnitEquivalence>>;

    /// Inserts a new entry. Fails with [`RepoError::Conflict`] when the
    /// `(food, origin, destination)` key is already taken, atomically with
    /// respect to the uniqueness check.
    fn insert_equivalence(&self, entry: &UnitEquivalence) -> RepoResult<EquivalenceId>;

    /// Replaces the factor of an existing entry by stable ID.
    fn update_equivalence(&self, entry: &UnitEquivalence) -> RepoResult<()>;

    /// Distinct origin units declared for a food, sorted ascending.
    fn list_origin_units(&self, food_id: FoodId) -> RepoResult<Vec<String>>;
}

/// SQLite-backed equivalence store.
pub struct SqliteEquivalenceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEquivalenceStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        ensure_table_with_columns(
            conn,
            "unit_equivalences",
            &["uuid", "food_uuid", "origin_unit", "destination_unit", "factor"],
        )?;
        Ok(Self { conn })
    }
}

impl EquivalenceStore for SqliteEquivalenceStore<'_> {
    fn find_equivalence(
        &self,
        food_id: FoodId,
        origin_unit: &str,
        destination_unit: &str,
    ) -> RepoResult<Option<UnitEquivalence>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EQUIVALENCE_SELECT_SQL}
             WHERE food_uuid = ?1
               AND origin_unit = ?2
               AND destination_unit = ?3;"
        ))?;

        let mut rows = stmt.query(params![food_id.to_string(), origin_unit, destination_unit])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_equivalence_row(row)?));
        }

        Ok(None)
    }

    fn insert_equivalence(&self, entry: &UnitEquivalence) -> RepoResult<EquivalenceId> {
        entry.validate().map_err(ModelValidationError::from)?;

        let inserted = self.conn.execute(
            "INSERT INTO unit_equivalences (
                uuid,
                food_uuid,
                origin_unit,
                destination_unit,
                factor
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                entry.uuid.to_string(),
                entry.food_id.to_string(),
                entry.origin_unit.as_str(),
                entry.destination_unit.as_str(),
                entry.factor,
            ],
        );

        match inserted {
            Ok(_) => Ok(entry.uuid),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict {
                food_id: entry.food_id,
                origin_unit: entry.origin_unit.clone(),
                destination_unit: entry.destination_unit.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn update_equivalence(&self, entry: &UnitEquivalence) -> RepoResult<()> {
        entry.validate().map_err(ModelValidationError::from)?;

        let changed = self.conn.execute(
            "UPDATE unit_equivalences
             SET
                factor = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![entry.factor, entry.uuid.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::EntryNotFound(entry.uuid));
        }

        Ok(())
    }

    fn list_origin_units(&self, food_id: FoodId) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT origin_unit
             FROM unit_equivalences
             WHERE food_uuid = ?1
             ORDER BY origin_unit ASC;",
        )?;

        let mut rows = stmt.query([food_id.to_string()])?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(row.get::<_, String>(0)?);
        }

        Ok(units)
    }
}

fn parse_equivalence_row(row: &Row<'_>) -> RepoResult<UnitEquivalence> {
    let uuid = parse_uuid_column(row, "uuid", "unit_equivalences.uuid")?;
    let food_id = parse_uuid_column(row, "food_uuid", "unit_equivalences.food_uuid")?;

    let entry = UnitEquivalence {
        uuid,
        food_id,
        origin_unit: row.get("origin_unit")?,
        destination_unit: row.get("destination_unit")?,
        factor: row.get("factor")?,
    };
    entry.validate().map_err(ModelValidationError::from)?;
    Ok(entry)
}

/// SQLITE_CONSTRAINT_UNIQUE only: foreign-key and NOT NULL violations share
/// the generic constraint error code and must not be treated as key races.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub(crate) fn parse_uuid_column(
    row: &Row<'_>,
    column: &str,
    qualified: &str,
) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {qualified}")))
}

pub(crate) fn ensure_schema_current(conn: &Connection) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn ensure_table_with_columns(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise `nutrigram_core` wiring end to end against an in-memory
//!   database.
//! - Keep output deterministic for quick local sanity checks.

use nutrigram_core::db::open_db_in_memory;
use nutrigram_core::{
    EquivalenceService, Food, FoodRepository, LoggingStatisticsTrigger,
    RecordConsumptionRequest, RegistrationService, SqliteEquivalenceStore, SqliteFoodRepository,
    SqliteRegistrationStore, CANONICAL_UNIT,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("nutrigram_core ping={}", nutrigram_core::ping());
    println!("nutrigram_core version={}", nutrigram_core::core_version());

    let conn = open_db_in_memory()?;
    let food = Food::new("arroz cocido", Some(150.0));
    SqliteFoodRepository::try_new(&conn)?.create_food(&food)?;

    let equivalences = EquivalenceService::new(
        SqliteEquivalenceStore::try_new(&conn)?,
        SqliteFoodRepository::try_new(&conn)?,
    );
    let entry = equivalences.declare(food.uuid, "cup", CANONICAL_UNIT, 240.0)?;
    println!(
        "declared {}->{} factor={}",
        entry.origin_unit, entry.destination_unit, entry.factor
    );

    let service = RegistrationService::new(
        equivalences,
        SqliteRegistrationStore::try_new(&conn)?,
        LoggingStatisticsTrigger,
    );
    let registration = service.record_consumption(&RecordConsumptionRequest {
        user_id: 1,
        food_id: food.uuid,
        quantity: 2.0,
        unit: "cup".to_string(),
        meal_moment: Some("almuerzo".to_string()),
        consumed_at_ms: None,
    })?;
    println!(
        "recorded {} {} -> {} g",
        registration.original_quantity, registration.original_unit, registration.quantity_g
    );

    Ok(())
}

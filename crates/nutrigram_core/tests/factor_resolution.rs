use nutrigram_core::db::open_db_in_memory;
use nutrigram_core::{
    EquivalenceService, EquivalenceServiceError, Food, FoodRepository, SqliteEquivalenceStore,
    SqliteFoodRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn seed_food(conn: &Connection, base_quantity_g: Option<f64>) -> Food {
    let foods = SqliteFoodRepository::try_new(conn).unwrap();
    let food = Food::new("lenteja cocida", base_quantity_g);
    foods.create_food(&food).unwrap();
    food
}

fn service(conn: &Connection) -> EquivalenceService<SqliteEquivalenceStore<'_>, SqliteFoodRepository<'_>> {
    EquivalenceService::new(
        SqliteEquivalenceStore::try_new(conn).unwrap(),
        SqliteFoodRepository::try_new(conn).unwrap(),
    )
}

fn equivalence_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM unit_equivalences;", [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn mass_units_resolve_to_fixed_constants_regardless_of_base_quantity() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, Some(250.0));
    let service = service(&conn);

    assert_eq!(service.resolve_factor(food.uuid, "g").unwrap(), 1.0);
    assert_eq!(service.resolve_factor(food.uuid, "kg").unwrap(), 1000.0);
    assert_eq!(service.resolve_factor(food.uuid, "mg").unwrap(), 0.001);
}

#[test]
fn resolution_is_case_insensitive_on_input() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, Some(250.0));
    let service = service(&conn);

    assert_eq!(service.resolve_factor(food.uuid, " KG ").unwrap(), 1000.0);
    assert_eq!(service.resolve_factor(food.uuid, "Cup").unwrap(), 250.0);
}

#[test]
fn undeclared_non_mass_units_fall_back_to_base_quantity() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, Some(80.0));
    let service = service(&conn);

    assert_eq!(service.resolve_factor(food.uuid, "porción").unwrap(), 80.0);
    assert_eq!(service.resolve_factor(food.uuid, "cup").unwrap(), 80.0);
    assert_eq!(service.resolve_factor(food.uuid, "hoja").unwrap(), 80.0);
}

#[test]
fn missing_base_quantity_falls_back_to_100g() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, None);
    let service = service(&conn);

    assert_eq!(service.resolve_factor(food.uuid, "taza").unwrap(), 100.0);
}

#[test]
fn non_positive_base_quantity_falls_back_to_100g() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, Some(-10.0));
    let service = service(&conn);

    assert_eq!(service.resolve_factor(food.uuid, "pieza").unwrap(), 100.0);
}

#[test]
fn unrecognized_unit_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, Some(100.0));
    let service = service(&conn);

    let err = service.resolve_factor(food.uuid, "gallon").unwrap_err();
    assert!(matches!(
        err,
        EquivalenceServiceError::InvalidUnit(unit) if unit == "gallon"
    ));

    // Long-form mass tokens are default-factor vocabulary, not registration
    // vocabulary: they are rejected before resolution.
    let err = service.resolve_factor(food.uuid, "gramos").unwrap_err();
    assert!(matches!(err, EquivalenceServiceError::InvalidUnit(_)));
}

#[test]
fn declared_factor_overrides_the_default_heuristic() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, Some(80.0));
    let service = service(&conn);

    assert_eq!(service.resolve_factor(food.uuid, "cup").unwrap(), 80.0);

    service.declare(food.uuid, "cup", "grams", 240.0).unwrap();
    assert_eq!(service.resolve_factor(food.uuid, "cup").unwrap(), 240.0);
}

#[test]
fn resolution_never_writes_back_a_computed_default() {
    let conn = open_db_in_memory().unwrap();
    let food = seed_food(&conn, Some(80.0));
    let service = service(&conn);

    for _ in 0..3 {
        assert_eq!(service.resolve_factor(food.uuid, "cup").unwrap(), 80.0);
    }
    assert_eq!(equivalence_count(&conn), 0);
}

#[test]
fn unknown_food_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    seed_food(&conn, Some(100.0));
    let service = service(&conn);

    let missing = Uuid::new_v4();
    let err = service.resolve_factor(missing, "g").unwrap_err();
    assert!(matches!(
        err,
        EquivalenceServiceError::FoodNotFound(id) if id == missing
    ));
}

//! Unit catalog: recognition rules and default conversion factors.
//!
//! # Responsibility
//! - Own the fixed allow-list of unit tokens accepted at registration time.
//! - Compute the grams-per-unit default used when no declared equivalence
//!   exists for a `(food, origin unit)` pair.
//!
//! # Invariants
//! - All functions are pure; no I/O, no shared state.
//! - `is_recognized` and `default_factor` expect pre-normalized input
//!   (`normalize_unit` first).
//! - `default_factor` never fails and always returns a positive factor.

use crate::model::food::Food;

/// The single destination unit every quantity is normalized to.
pub const CANONICAL_UNIT: &str = "grams";

/// Unit tokens accepted from registration input.
///
/// Mass and volume tokens plus the count/portion vocabulary used by the
/// food catalog. Membership is checked on the lowercased token.
const RECOGNIZED_UNITS: &[&str] = &[
    "mg", "g", "kg", "ml", "l", "tsp", "tbsp", "cup", "oz", "lb", "unidad", "porción", "rebanada",
    "pieza", "taza", "vaso", "lonja", "filete", "puñado", "cucharada", "hoja", "bola",
];

/// Normalizes a user-supplied unit token for lookup and storage.
pub fn normalize_unit(unit: &str) -> String {
    unit.trim().to_lowercase()
}

/// Returns whether the (already normalized) token is accepted at
/// registration time.
pub fn is_recognized(unit: &str) -> bool {
    RECOGNIZED_UNITS.contains(&unit)
}

/// Grams per one `unit` of `food` when no declared equivalence exists.
///
/// Fixed SI factors for mass tokens (including their long Spanish forms);
/// every other token falls back to the food's base quantity: one natural
/// unit of the food weighs `base_quantity_g` grams, 100 g when the hint is
/// absent or non-positive.
pub fn default_factor(unit: &str, food: &Food) -> f64 {
    match unit {
        "g" | "gramos" | "gramo" => 1.0,
        "kg" | "kilogramos" | "kilogramo" => 1000.0,
        "mg" | "miligramos" | "miligramo" => 0.001,
        _ => food.effective_base_quantity_g(),
    }
}

#[cfg(test)]
mod tests {
    use super::{default_factor, is_recognized, normalize_unit, CANONICAL_UNIT};
    use crate::model::food::Food;

    #[test]
    fn normalize_unit_trims_and_lowercases() {
        assert_eq!(normalize_unit("  CUP "), "cup");
        assert_eq!(normalize_unit("Porción"), "porción");
        assert_eq!(normalize_unit("kg"), "kg");
    }

    #[test]
    fn recognized_set_covers_mass_volume_and_portion_tokens() {
        for unit in ["g", "kg", "mg", "ml", "cup", "oz", "porción", "puñado"] {
            assert!(is_recognized(unit), "expected `{unit}` to be recognized");
        }
        assert!(!is_recognized("gallon"));
        assert!(!is_recognized("CUP"));
        assert!(!is_recognized(CANONICAL_UNIT));
    }

    #[test]
    fn mass_units_use_fixed_factors_regardless_of_base_quantity() {
        let food = Food::new("arroz", Some(250.0));
        assert_eq!(default_factor("g", &food), 1.0);
        assert_eq!(default_factor("gramos", &food), 1.0);
        assert_eq!(default_factor("kg", &food), 1000.0);
        assert_eq!(default_factor("kilogramo", &food), 1000.0);
        assert_eq!(default_factor("mg", &food), 0.001);
        assert_eq!(default_factor("miligramos", &food), 0.001);
    }

    #[test]
    fn other_units_fall_back_to_base_quantity() {
        let food = Food::new("pan", Some(30.0));
        assert_eq!(default_factor("rebanada", &food), 30.0);
        assert_eq!(default_factor("cup", &food), 30.0);
    }

    #[test]
    fn missing_or_non_positive_base_quantity_falls_back_to_100g() {
        let unknown = Food::new("caldo", None);
        assert_eq!(default_factor("porción", &unknown), 100.0);

        let broken = Food::new("caldo", Some(-5.0));
        assert_eq!(default_factor("porción", &broken), 100.0);
    }
}

use crate::models::{FOOD_GROUP_COUNT, NUTRIENT_COUNT};

/// Meal slots per day in the current formulation.
pub const DEFAULT_MEALS_PER_DAY: usize = 4;

/// Big-M constant for meal-level indicator linking.
///
/// Must be at least the largest `max_porcoes_dia` of any food.
pub const DEFAULT_BIG_M: f64 = 50.0;

/// How many meal slots of one day may feature the same food.
pub const DEFAULT_MEAL_CAP_PER_FOOD: u32 = 2;

/// Total portions allowed per day, all foods and meals combined.
pub const DAILY_PORTION_CAP: u32 = 50;

/// Relative optimality gap at which the search may stop.
pub const DEFAULT_MIP_GAP: f64 = 0.05;

/// Wall-clock budget for one solver call, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 60.0;

// ─────────────────────────────────────────────────────────────────────────────
// Daily nutrient targets, table order:
// energy, carbohydrate, protein, fat, iron, magnesium, vitamin C, zinc, sodium
// ─────────────────────────────────────────────────────────────────────────────

pub const NUTRIENT_MIN: [f64; NUTRIENT_COUNT] =
    [3000.0, 450.0, 120.0, 70.0, 8.0, 400.0, 75.0, 11.0, 1500.0];

pub const NUTRIENT_MAX: [f64; NUTRIENT_COUNT] =
    [5000.0, 900.0, 150.0, 120.0, 18.0, 420.0, 90.0, 25.0, 3000.0];

/// Minimum portions per day for groups 1..=7.
pub const DEFAULT_GROUP_MINIMUMS: [u32; FOOD_GROUP_COUNT as usize] = [2, 1, 1, 1, 1, 0, 0];

// ─────────────────────────────────────────────────────────────────────────────
// First formulation (kept for comparison runs only)
// ─────────────────────────────────────────────────────────────────────────────

pub const LEGACY_MEALS_PER_DAY: usize = 3;

pub const LEGACY_BIG_M: f64 = 1000.0;

pub const LEGACY_NUTRIENT_MIN: [f64; NUTRIENT_COUNT] =
    [3000.0, 450.0, 120.0, 70.0, 8.0, 400.0, 75.0, 11.0, 3000.0];

pub const LEGACY_NUTRIENT_MAX: [f64; NUTRIENT_COUNT] =
    [5000.0, 900.0, 150.0, 120.0, 18.0, 420.0, 90.0, 11.0, 7000.0];

// ─────────────────────────────────────────────────────────────────────────────
// Numerics
// ─────────────────────────────────────────────────────────────────────────────

/// Absolute slack accepted when checking recomputed values against bounds.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

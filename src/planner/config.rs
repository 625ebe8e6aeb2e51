use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::models::{FOOD_GROUP_COUNT, FoodItem, NUTRIENT_COUNT, Nutrient, PlanningHorizon};
use crate::planner::constants::*;

/// Daily `[min, max]` target for one nutrient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientBound {
    pub min: f64,
    pub max: f64,
}

/// Where a value falls relative to a [`NutrientBound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundCheck {
    Within,
    BelowMin,
    AboveMax,
}

impl fmt::Display for BoundCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoundCheck::Within => "ok",
            BoundCheck::BelowMin => "BELOW MIN",
            BoundCheck::AboveMax => "ABOVE MAX",
        })
    }
}

impl NutrientBound {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Classify `value`, allowing [`FEASIBILITY_TOLERANCE`] of slack on either side.
    pub fn check(&self, value: f64) -> BoundCheck {
        if value < self.min - FEASIBILITY_TOLERANCE {
            BoundCheck::BelowMin
        } else if value > self.max + FEASIBILITY_TOLERANCE {
            BoundCheck::AboveMax
        } else {
            BoundCheck::Within
        }
    }
}

/// Daily nutrient targets keyed by nutrient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientBounds(BTreeMap<Nutrient, NutrientBound>);

impl NutrientBounds {
    /// Build from parallel min/max tables in [`Nutrient::ALL`] order.
    pub fn from_tables(min: [f64; NUTRIENT_COUNT], max: [f64; NUTRIENT_COUNT]) -> Self {
        Self(
            Nutrient::ALL
                .iter()
                .map(|&n| (n, NutrientBound::new(min[n.index()], max[n.index()])))
                .collect(),
        )
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<&NutrientBound> {
        self.0.get(&nutrient)
    }

    /// Bound for `nutrient`, or [`PlanError::MissingNutrientBound`].
    pub fn require(&self, nutrient: Nutrient) -> Result<NutrientBound> {
        self.get(nutrient)
            .copied()
            .ok_or(PlanError::MissingNutrientBound(nutrient))
    }

    pub fn set(&mut self, nutrient: Nutrient, bound: NutrientBound) {
        self.0.insert(nutrient, bound);
    }

    pub fn remove(&mut self, nutrient: Nutrient) {
        self.0.remove(&nutrient);
    }

    /// Every nutrient has a finite bound with `min <= max`.
    pub fn validate(&self) -> Result<()> {
        for nutrient in Nutrient::ALL {
            let bound = self.require(nutrient)?;
            if !bound.min.is_finite() || !bound.max.is_finite() {
                return Err(PlanError::InvalidConfig(format!(
                    "bound for {} must be finite",
                    nutrient
                )));
            }
            if bound.min > bound.max {
                return Err(PlanError::InvalidConfig(format!(
                    "bound for {} has min {} above max {}",
                    nutrient, bound.min, bound.max
                )));
            }
        }
        Ok(())
    }
}

impl Default for NutrientBounds {
    fn default() -> Self {
        Self::from_tables(NUTRIENT_MIN, NUTRIENT_MAX)
    }
}

/// Minimum portions per day for each food group. Unlisted groups require none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupMinimums(BTreeMap<u8, u32>);

impl GroupMinimums {
    /// No group requirements.
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, group: u8) -> u32 {
        self.0.get(&group).copied().unwrap_or(0)
    }

    pub fn set(&mut self, group: u8, minimum: u32) {
        self.0.insert(group, minimum);
    }

    pub fn validate(&self) -> Result<()> {
        match self.0.keys().find(|g| !(1..=FOOD_GROUP_COUNT).contains(*g)) {
            Some(group) => Err(PlanError::InvalidConfig(format!(
                "group minimum for unknown group {}",
                group
            ))),
            None => Ok(()),
        }
    }
}

impl Default for GroupMinimums {
    fn default() -> Self {
        Self(
            (1..=FOOD_GROUP_COUNT)
                .zip(DEFAULT_GROUP_MINIMUMS)
                .filter(|&(_, min)| min > 0)
                .collect(),
        )
    }
}

/// Policy parameters of the weekly model.
///
/// Every historical variant of the formulation is a value of this struct;
/// the default is the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanConfig {
    pub meals_per_day: usize,

    /// Bound used to link meal portions to their usage indicator.
    pub big_m: f64,

    /// Meal slots per day that may feature the same food.
    pub meal_cap_per_food: u32,

    pub daily_portion_cap: u32,

    /// Forbid empty meal slots.
    pub require_meal_activity: bool,

    /// Link indicators in both directions so they equal "portions > 0".
    pub strict_linking: bool,

    pub nutrient_bounds: NutrientBounds,

    pub group_minimums: GroupMinimums,

    /// Relative optimality gap handed to the solver, if it supports one.
    pub mip_gap: Option<f64>,

    /// Seconds each solver call may run before it gives up.
    pub time_limit_secs: Option<f64>,

    /// Search for a conflicting constraint subset when the model is infeasible.
    pub diagnose_conflicts: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            meals_per_day: DEFAULT_MEALS_PER_DAY,
            big_m: DEFAULT_BIG_M,
            meal_cap_per_food: DEFAULT_MEAL_CAP_PER_FOOD,
            daily_portion_cap: DAILY_PORTION_CAP,
            require_meal_activity: true,
            strict_linking: true,
            nutrient_bounds: NutrientBounds::default(),
            group_minimums: GroupMinimums::default(),
            mip_gap: Some(DEFAULT_MIP_GAP),
            time_limit_secs: Some(DEFAULT_TIME_LIMIT_SECS),
            diagnose_conflicts: true,
        }
    }
}

impl PlanConfig {
    /// The first formulation: three meals, one-way indicator links, no variety rules.
    #[deprecated(note = "one-way indicator links admit plans whose usage flags disagree with portions")]
    pub fn legacy() -> Self {
        Self {
            meals_per_day: LEGACY_MEALS_PER_DAY,
            big_m: LEGACY_BIG_M,
            meal_cap_per_food: DEFAULT_MEAL_CAP_PER_FOOD,
            daily_portion_cap: DAILY_PORTION_CAP,
            require_meal_activity: false,
            strict_linking: false,
            nutrient_bounds: NutrientBounds::from_tables(LEGACY_NUTRIENT_MIN, LEGACY_NUTRIENT_MAX),
            group_minimums: GroupMinimums::none(),
            mip_gap: None,
            time_limit_secs: Some(DEFAULT_TIME_LIMIT_SECS),
            diagnose_conflicts: true,
        }
    }

    pub fn horizon(&self) -> PlanningHorizon {
        PlanningHorizon::weekly(self.meals_per_day)
    }

    /// Check the parameters on their own.
    pub fn validate(&self) -> Result<()> {
        if self.meals_per_day == 0 {
            return Err(PlanError::InvalidConfig(
                "meals_per_day must be at least 1".to_string(),
            ));
        }
        if !self.big_m.is_finite() || self.big_m <= 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "big_m must be a positive number, got {}",
                self.big_m
            )));
        }
        if let Some(gap) = self.mip_gap {
            if !(0.0..1.0).contains(&gap) {
                return Err(PlanError::InvalidConfig(format!(
                    "mip_gap must lie in [0, 1), got {}",
                    gap
                )));
            }
        }
        if let Some(limit) = self.time_limit_secs {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(PlanError::InvalidConfig(format!(
                    "time_limit_secs must be a positive number, got {}",
                    limit
                )));
            }
        }
        self.nutrient_bounds.validate()?;
        self.group_minimums.validate()
    }

    /// Check the parameters against the food table they will be applied to.
    pub fn validate_for(&self, foods: &[FoodItem]) -> Result<()> {
        self.validate()?;
        if foods.is_empty() {
            return Err(PlanError::EmptyFoodTable);
        }
        let required = foods
            .iter()
            .map(|f| f.max_portions_per_day)
            .max()
            .unwrap_or(0) as f64;
        if self.big_m < required {
            return Err(PlanError::BigMTooSmall {
                big_m: self.big_m,
                required,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutrientVector;

    fn food(max_portions: u32) -> FoodItem {
        FoodItem {
            name: "Leite".to_string(),
            nutrients: NutrientVector::default(),
            price: 1.0,
            max_portions_per_day: max_portions,
            max_days_per_week: 7,
            group: 4,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = PlanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizon().meals, 4);
        assert_eq!(config.group_minimums.get(1), 2);
        assert_eq!(config.group_minimums.get(7), 0);
    }

    #[test]
    #[allow(deprecated)]
    fn test_legacy_config_is_valid() {
        let config = PlanConfig::legacy();
        assert!(config.validate().is_ok());
        assert!(!config.strict_linking);
        assert_eq!(config.horizon().meals, 3);
    }

    #[test]
    fn test_missing_nutrient_bound() {
        let mut config = PlanConfig::default();
        config.nutrient_bounds.remove(Nutrient::Zinc);
        assert!(matches!(
            config.validate(),
            Err(PlanError::MissingNutrientBound(Nutrient::Zinc))
        ));
    }

    #[test]
    fn test_inverted_bound_rejected() {
        let mut config = PlanConfig::default();
        config
            .nutrient_bounds
            .set(Nutrient::Iron, NutrientBound::new(20.0, 10.0));
        assert!(matches!(config.validate(), Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_group_rejected() {
        let mut config = PlanConfig::default();
        config.group_minimums.set(9, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_time_limit_must_be_positive() {
        for limit in [0.0, -5.0, f64::NAN] {
            let config = PlanConfig {
                time_limit_secs: Some(limit),
                ..PlanConfig::default()
            };
            assert!(matches!(config.validate(), Err(PlanError::InvalidConfig(_))));
        }
        let unlimited = PlanConfig {
            time_limit_secs: None,
            ..PlanConfig::default()
        };
        assert!(unlimited.validate().is_ok());
    }

    #[test]
    fn test_big_m_must_cover_portions() {
        let config = PlanConfig {
            big_m: 10.0,
            ..PlanConfig::default()
        };
        assert!(config.validate_for(&[food(10)]).is_ok());
        assert!(matches!(
            config.validate_for(&[food(10), food(20)]),
            Err(PlanError::BigMTooSmall { .. })
        ));
        assert!(matches!(
            config.validate_for(&[]),
            Err(PlanError::EmptyFoodTable)
        ));
    }

    #[test]
    fn test_bound_check() {
        let bound = NutrientBound::new(10.0, 20.0);
        assert_eq!(bound.check(10.0), BoundCheck::Within);
        assert_eq!(bound.check(9.0), BoundCheck::BelowMin);
        assert_eq!(bound.check(20.5), BoundCheck::AboveMax);
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "meals_per_day": 3, "group_minimums": { "1": 3 } }"#;
        let config: PlanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.meals_per_day, 3);
        assert_eq!(config.group_minimums.get(1), 3);
        assert_eq!(config.group_minimums.get(2), 0);
        assert_eq!(config.big_m, DEFAULT_BIG_M);
    }
}

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Number of tracked nutrients.
pub const NUTRIENT_COUNT: usize = 9;

/// Highest valid food-group tag. Tags run from 1 to this value.
pub const FOOD_GROUP_COUNT: u8 = 7;

/// A nutrient tracked by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Energy,
    Carbohydrate,
    Protein,
    Fat,
    Iron,
    Magnesium,
    VitaminC,
    Zinc,
    Sodium,
}

impl Nutrient {
    /// All nutrients in table order.
    pub const ALL: [Nutrient; NUTRIENT_COUNT] = [
        Nutrient::Energy,
        Nutrient::Carbohydrate,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Iron,
        Nutrient::Magnesium,
        Nutrient::VitaminC,
        Nutrient::Zinc,
        Nutrient::Sodium,
    ];

    /// Position in a [`NutrientVector`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name in the input food table.
    pub fn column(self) -> &'static str {
        match self {
            Nutrient::Energy => "calorias",
            Nutrient::Carbohydrate => "carboidratos",
            Nutrient::Protein => "proteinas",
            Nutrient::Fat => "gorduras",
            Nutrient::Iron => "ferro",
            Nutrient::Magnesium => "magnesio",
            Nutrient::VitaminC => "vitamina_c",
            Nutrient::Zinc => "zinco",
            Nutrient::Sodium => "sodio",
        }
    }

    /// Short label used in constraint names and reports.
    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Energy => "energy",
            Nutrient::Carbohydrate => "carbohydrate",
            Nutrient::Protein => "protein",
            Nutrient::Fat => "fat",
            Nutrient::Iron => "iron",
            Nutrient::Magnesium => "magnesium",
            Nutrient::VitaminC => "vitamin_c",
            Nutrient::Zinc => "zinc",
            Nutrient::Sodium => "sodium",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-portion (or aggregated) amounts of every tracked nutrient.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientVector([f64; NUTRIENT_COUNT]);

impl NutrientVector {
    pub fn new(values: [f64; NUTRIENT_COUNT]) -> Self {
        Self(values)
    }

    /// Iterate `(nutrient, amount)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.iter().map(move |&n| (n, self.0[n.index()]))
    }

    /// Add `factor` times `other` into this vector.
    pub fn add_scaled(&mut self, other: &NutrientVector, factor: f64) {
        for (acc, value) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += value * factor;
        }
    }
}

impl Index<Nutrient> for NutrientVector {
    type Output = f64;

    fn index(&self, nutrient: Nutrient) -> &f64 {
        &self.0[nutrient.index()]
    }
}

impl IndexMut<Nutrient> for NutrientVector {
    fn index_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        &mut self.0[nutrient.index()]
    }
}

/// One row of the food table.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodItem {
    pub name: String,

    /// Nutrients provided by a single portion.
    pub nutrients: NutrientVector,

    /// Price of a single portion.
    pub price: f64,

    pub max_portions_per_day: u32,

    /// Number of distinct days in the week the food may appear (0..=7).
    pub max_days_per_week: u32,

    /// Food-group tag, 1..=7.
    pub group: u8,
}

impl FoodItem {
    /// Amount of `nutrient` in one portion.
    #[inline]
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        self.nutrients[nutrient]
    }

    /// Check value ranges. Fails with [`PlanError::InvalidFood`] on the first problem found.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| PlanError::InvalidFood {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("empty name".to_string()));
        }
        for (nutrient, value) in self.nutrients.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a non-negative number", nutrient)));
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(invalid("price must be a non-negative number".to_string()));
        }
        if self.max_days_per_week > crate::models::DAYS_PER_WEEK as u32 {
            return Err(invalid(format!(
                "max_dias {} exceeds {} days",
                self.max_days_per_week,
                crate::models::DAYS_PER_WEEK
            )));
        }
        if !(1..=FOOD_GROUP_COUNT).contains(&self.group) {
            return Err(invalid(format!(
                "group {} outside 1..={}",
                self.group, FOOD_GROUP_COUNT
            )));
        }
        Ok(())
    }

    /// Canonical key for duplicate detection (trimmed, lowercase name).
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_food() -> FoodItem {
        FoodItem {
            name: "Arroz".to_string(),
            nutrients: NutrientVector::new([130.0, 28.0, 2.7, 0.3, 0.2, 12.0, 0.0, 0.5, 1.0]),
            price: 0.8,
            max_portions_per_day: 4,
            max_days_per_week: 7,
            group: 2,
        }
    }

    #[test]
    fn test_nutrient_indexing_follows_table_order() {
        let food = sample_food();
        assert_eq!(food.nutrient(Nutrient::Energy), 130.0);
        assert_eq!(food.nutrient(Nutrient::Sodium), 1.0);
        for (i, nutrient) in Nutrient::ALL.iter().enumerate() {
            assert_eq!(nutrient.index(), i);
        }
    }

    #[test]
    fn test_add_scaled() {
        let food = sample_food();
        let mut total = NutrientVector::default();
        total.add_scaled(&food.nutrients, 3.0);
        assert!((total[Nutrient::Energy] - 390.0).abs() < 1e-9);
        assert!((total[Nutrient::Protein] - 8.1).abs() < 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(sample_food().validate().is_ok());

        let mut bad_group = sample_food();
        bad_group.group = 8;
        assert!(bad_group.validate().is_err());

        let mut bad_days = sample_food();
        bad_days.max_days_per_week = 8;
        assert!(bad_days.validate().is_err());

        let mut negative = sample_food();
        negative.nutrients[Nutrient::Iron] = -1.0;
        assert!(negative.validate().is_err());
    }
}

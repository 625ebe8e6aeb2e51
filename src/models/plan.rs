use crate::models::{FoodItem, NutrientVector};

/// Days in the planning horizon.
pub const DAYS_PER_WEEK: usize = 7;

/// Days by meal slots covered by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningHorizon {
    pub days: usize,
    pub meals: usize,
}

impl PlanningHorizon {
    /// A one-week horizon with `meals` slots per day.
    pub fn weekly(meals: usize) -> Self {
        Self {
            days: DAYS_PER_WEEK,
            meals,
        }
    }

    /// Number of (day, meal) slots.
    pub fn slots(&self) -> usize {
        self.days * self.meals
    }
}

/// Integer portions and usage indicators decoded from a solver assignment.
///
/// Portions and meal indicators are stored food-major: `[food][day][meal]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPlan {
    horizon: PlanningHorizon,
    food_count: usize,
    portions: Vec<u32>,
    meal_used: Vec<bool>,
    day_used: Vec<bool>,
    objective: f64,
}

impl WeeklyPlan {
    /// An empty plan (no portions, no usage) for `food_count` foods.
    pub fn new(horizon: PlanningHorizon, food_count: usize) -> Self {
        let slots = food_count * horizon.slots();
        Self {
            horizon,
            food_count,
            portions: vec![0; slots],
            meal_used: vec![false; slots],
            day_used: vec![false; food_count * horizon.days],
            objective: 0.0,
        }
    }

    pub fn horizon(&self) -> PlanningHorizon {
        self.horizon
    }

    pub fn food_count(&self) -> usize {
        self.food_count
    }

    #[inline]
    fn slot(&self, food: usize, day: usize, meal: usize) -> usize {
        (food * self.horizon.days + day) * self.horizon.meals + meal
    }

    #[inline]
    fn food_day(&self, food: usize, day: usize) -> usize {
        food * self.horizon.days + day
    }

    pub fn portions(&self, food: usize, day: usize, meal: usize) -> u32 {
        self.portions[self.slot(food, day, meal)]
    }

    pub fn set_portions(&mut self, food: usize, day: usize, meal: usize, portions: u32) {
        let idx = self.slot(food, day, meal);
        self.portions[idx] = portions;
    }

    /// Meal-level usage indicator as assigned by the solver.
    pub fn meal_used(&self, food: usize, day: usize, meal: usize) -> bool {
        self.meal_used[self.slot(food, day, meal)]
    }

    pub fn set_meal_used(&mut self, food: usize, day: usize, meal: usize, used: bool) {
        let idx = self.slot(food, day, meal);
        self.meal_used[idx] = used;
    }

    /// Day-level usage indicator as assigned by the solver.
    pub fn day_used(&self, food: usize, day: usize) -> bool {
        self.day_used[self.food_day(food, day)]
    }

    pub fn set_day_used(&mut self, food: usize, day: usize, used: bool) {
        let idx = self.food_day(food, day);
        self.day_used[idx] = used;
    }

    /// Objective value reported for the assignment.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn set_objective(&mut self, objective: f64) {
        self.objective = objective;
    }

    /// Portions of `food` across all meals of `day`.
    pub fn food_day_portions(&self, food: usize, day: usize) -> u32 {
        (0..self.horizon.meals)
            .map(|meal| self.portions(food, day, meal))
            .sum()
    }

    /// Portions of every food at one meal.
    pub fn meal_portions(&self, day: usize, meal: usize) -> u32 {
        (0..self.food_count)
            .map(|food| self.portions(food, day, meal))
            .sum()
    }

    /// Portions of every food across a whole day.
    pub fn day_portions(&self, day: usize) -> u32 {
        (0..self.food_count)
            .map(|food| self.food_day_portions(food, day))
            .sum()
    }

    /// Number of days with the day-level indicator set for `food`.
    pub fn days_used(&self, food: usize) -> usize {
        (0..self.horizon.days)
            .filter(|&day| self.day_used(food, day))
            .count()
    }

    /// Number of meals on `day` with the meal-level indicator set for `food`.
    pub fn meals_used(&self, food: usize, day: usize) -> usize {
        (0..self.horizon.meals)
            .filter(|&meal| self.meal_used(food, day, meal))
            .count()
    }

    /// Nutrient totals for `day`, recomputed from portions.
    pub fn daily_nutrients(&self, foods: &[FoodItem], day: usize) -> NutrientVector {
        let mut total = NutrientVector::default();
        for (idx, food) in foods.iter().enumerate().take(self.food_count) {
            let portions = self.food_day_portions(idx, day);
            if portions > 0 {
                total.add_scaled(&food.nutrients, portions as f64);
            }
        }
        total
    }

    /// Cost of `day`, recomputed from portions.
    pub fn daily_cost(&self, foods: &[FoodItem], day: usize) -> f64 {
        foods
            .iter()
            .enumerate()
            .take(self.food_count)
            .map(|(idx, food)| food.price * self.food_day_portions(idx, day) as f64)
            .sum()
    }

    /// Cost of the whole week, recomputed from portions.
    pub fn total_cost(&self, foods: &[FoodItem]) -> f64 {
        (0..self.horizon.days)
            .map(|day| self.daily_cost(foods, day))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Nutrient, NutrientVector};

    fn foods() -> Vec<FoodItem> {
        vec![
            FoodItem {
                name: "Banana".to_string(),
                nutrients: NutrientVector::new([90.0, 23.0, 1.1, 0.3, 0.3, 27.0, 8.7, 0.2, 1.0]),
                price: 0.5,
                max_portions_per_day: 3,
                max_days_per_week: 7,
                group: 1,
            },
            FoodItem {
                name: "Feijao".to_string(),
                nutrients: NutrientVector::new([76.0, 14.0, 4.8, 0.5, 1.3, 42.0, 0.0, 0.7, 2.0]),
                price: 0.3,
                max_portions_per_day: 2,
                max_days_per_week: 5,
                group: 3,
            },
        ]
    }

    #[test]
    fn test_new_plan_is_empty() {
        let plan = WeeklyPlan::new(PlanningHorizon::weekly(4), 2);
        assert_eq!(plan.horizon().slots(), 28);
        for day in 0..DAYS_PER_WEEK {
            assert_eq!(plan.day_portions(day), 0);
        }
        assert_eq!(plan.days_used(0), 0);
    }

    #[test]
    fn test_totals_recomputed_from_portions() {
        let foods = foods();
        let mut plan = WeeklyPlan::new(PlanningHorizon::weekly(3), foods.len());
        plan.set_portions(0, 2, 0, 2);
        plan.set_portions(1, 2, 1, 1);
        plan.set_portions(1, 2, 2, 1);

        assert_eq!(plan.food_day_portions(1, 2), 2);
        assert_eq!(plan.meal_portions(2, 0), 2);
        assert_eq!(plan.day_portions(2), 4);
        assert_eq!(plan.day_portions(3), 0);

        let nutrients = plan.daily_nutrients(&foods, 2);
        assert!((nutrients[Nutrient::Energy] - (2.0 * 90.0 + 2.0 * 76.0)).abs() < 1e-9);
        assert!((plan.daily_cost(&foods, 2) - 1.6).abs() < 1e-9);
        assert!((plan.total_cost(&foods) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_usage_counts() {
        let mut plan = WeeklyPlan::new(PlanningHorizon::weekly(3), 1);
        plan.set_day_used(0, 1, true);
        plan.set_day_used(0, 4, true);
        plan.set_meal_used(0, 1, 0, true);
        plan.set_meal_used(0, 1, 2, true);

        assert_eq!(plan.days_used(0), 2);
        assert_eq!(plan.meals_used(0, 1), 2);
        assert_eq!(plan.meals_used(0, 4), 0);
    }
}

mod food;
mod plan;

pub use food::{FOOD_GROUP_COUNT, FoodItem, NUTRIENT_COUNT, Nutrient, NutrientVector};
pub use plan::{DAYS_PER_WEEK, PlanningHorizon, WeeklyPlan};

pub mod cli;
pub mod error;
pub mod interface;
pub mod models;
pub mod planner;
pub mod solver;
pub mod state;

pub use error::{PlanError, Result};
pub use models::{FoodItem, Nutrient, WeeklyPlan};
pub use planner::{DietModel, PlanConfig, build_model};
pub use solver::{SolveOutcome, SolvedModel, solve};

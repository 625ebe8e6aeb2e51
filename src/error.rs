use thiserror::Error;

use crate::models::Nutrient;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{}' in food table{}", .column, suggestion_hint(.suggestion))]
    MissingColumn {
        column: String,
        suggestion: Option<String>,
    },

    #[error("Food table is empty")]
    EmptyFoodTable,

    #[error("Duplicate food: {0}")]
    DuplicateFood(String),

    #[error("Invalid food '{name}': {reason}")]
    InvalidFood { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No bound configured for nutrient {0}")]
    MissingNutrientBound(Nutrient),

    #[error("Big-M constant {big_m} is smaller than the largest portion count {required}")]
    BigMTooSmall { big_m: f64, required: f64 },
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;

pub mod builder;
pub mod config;
pub mod constants;
pub mod model;

pub use builder::{build_model, validate_foods};
pub use config::{BoundCheck, GroupMinimums, NutrientBound, NutrientBounds, PlanConfig};
pub use constants::*;
pub use model::{
    ConstraintFamily, DietModel, LinearConstraint, LinearExpr, ModelStats, Sense, VarDef,
    VarDomain, VarId,
};

use std::collections::HashSet;

use crate::error::{PlanError, Result};
use crate::models::{FOOD_GROUP_COUNT, FoodItem, Nutrient, PlanningHorizon};
use crate::planner::config::PlanConfig;
use crate::planner::model::{
    ConstraintFamily, DietModel, LinearConstraint, LinearExpr, Sense, VarDef, VarDomain, VarId,
};

/// Build the weekly diet model for `foods` under `config`.
///
/// Foods and configuration are validated before any variable is created.
pub fn build_model(foods: Vec<FoodItem>, config: &PlanConfig) -> Result<DietModel> {
    validate_foods(&foods)?;
    config.validate_for(&foods)?;

    if !config.strict_linking {
        tracing::warn!(
            "strict_linking is disabled: usage indicators may disagree with portions; \
             this formulation is deprecated"
        );
    }

    let mut builder = ModelBuilder::new(foods, config.clone());
    builder.add_variables();
    builder.set_objective();
    builder.add_nutrient_bounds()?;
    builder.add_group_minimums();
    builder.add_daily_food_caps();
    builder.add_weekly_day_caps();
    builder.add_meal_counts();
    builder.add_daily_portion_caps();
    if builder.model.config.require_meal_activity {
        builder.add_meal_activity();
    }
    if builder.model.config.strict_linking {
        builder.add_day_links();
    }
    builder.add_meal_links()?;

    let model = builder.model;
    let stats = model.stats();
    tracing::info!(
        foods = model.foods.len(),
        meals = model.horizon.meals,
        integer_vars = stats.integer_vars,
        binary_vars = stats.binary_vars,
        constraints = stats.constraints(),
        "Built diet model"
    );
    Ok(model)
}

/// Validate every food and reject duplicate names (case-insensitive).
pub fn validate_foods(foods: &[FoodItem]) -> Result<()> {
    if foods.is_empty() {
        return Err(PlanError::EmptyFoodTable);
    }
    let mut seen = HashSet::new();
    for food in foods {
        food.validate()?;
        if !seen.insert(food.key()) {
            return Err(PlanError::DuplicateFood(food.name.clone()));
        }
    }
    Ok(())
}

/// Accumulates variables and constraints onto a model it owns exclusively.
struct ModelBuilder {
    model: DietModel,
}

impl ModelBuilder {
    fn new(foods: Vec<FoodItem>, config: PlanConfig) -> Self {
        let horizon = config.horizon();
        Self {
            model: DietModel {
                foods,
                config,
                horizon,
                vars: Vec::new(),
                portions: Vec::new(),
                meal_used: Vec::new(),
                day_used: Vec::new(),
                objective: LinearExpr::new(),
                constraints: Vec::new(),
            },
        }
    }

    fn horizon(&self) -> PlanningHorizon {
        self.model.horizon
    }

    fn food_count(&self) -> usize {
        self.model.foods.len()
    }

    fn new_var(&mut self, name: String, domain: VarDomain) -> VarId {
        let id = VarId(self.model.vars.len());
        self.model.vars.push(VarDef { name, domain });
        id
    }

    fn push(
        &mut self,
        family: ConstraintFamily,
        name: String,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) {
        tracing::trace!(constraint = %name, terms = expr.terms().len(), "{} {}", sense, rhs);
        self.model.constraints.push(LinearConstraint {
            name,
            family,
            expr,
            sense,
            rhs,
        });
    }

    fn log_family(&self, family: ConstraintFamily) {
        tracing::debug!(
            family = %family,
            count = self.model.constraints_in(family).count(),
            "Added constraint family"
        );
    }

    /// `Portions`, `Used` and `DayUsed`, laid out food-major.
    fn add_variables(&mut self) {
        let horizon = self.horizon();
        for food in 0..self.food_count() {
            let name = self.model.foods[food].name.clone();
            let upper = self.model.foods[food].max_portions_per_day as f64;
            for day in 0..horizon.days {
                let day_used = self.new_var(format!("day_used[{},d{}]", name, day + 1), VarDomain::Binary);
                self.model.day_used.push(day_used);
                for meal in 0..horizon.meals {
                    let tag = format!("{},d{},m{}", name, day + 1, meal + 1);
                    let portions =
                        self.new_var(format!("portions[{}]", tag), VarDomain::Integer { upper });
                    let used = self.new_var(format!("used[{}]", tag), VarDomain::Binary);
                    self.model.portions.push(portions);
                    self.model.meal_used.push(used);
                }
            }
        }
        tracing::debug!(count = self.model.vars.len(), "Added decision variables");
    }

    /// Minimise the price of every portion served.
    fn set_objective(&mut self) {
        let horizon = self.horizon();
        let mut objective = LinearExpr::new();
        for (food, item) in self.model.foods.iter().enumerate() {
            for day in 0..horizon.days {
                for meal in 0..horizon.meals {
                    objective.add_term(self.model.portions_var(food, day, meal), item.price);
                }
            }
        }
        self.model.objective = objective;
    }

    /// Sum over foods and meals of `coefficient(food) * Portions[food, day, meal]`.
    fn day_weighted(&self, day: usize, coefficient: impl Fn(&FoodItem) -> f64) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for (food, item) in self.model.foods.iter().enumerate() {
            let c = coefficient(item);
            for meal in 0..self.horizon().meals {
                expr.add_term(self.model.portions_var(food, day, meal), c);
            }
        }
        expr
    }

    fn food_day_portions(&self, food: usize, day: usize) -> LinearExpr {
        LinearExpr::sum((0..self.horizon().meals).map(|meal| self.model.portions_var(food, day, meal)))
    }

    fn add_nutrient_bounds(&mut self) -> Result<()> {
        for day in 0..self.horizon().days {
            for nutrient in Nutrient::ALL {
                let bound = self.model.config.nutrient_bounds.require(nutrient)?;
                let expr = self.day_weighted(day, |f| f.nutrient(nutrient));
                self.push(
                    ConstraintFamily::NutrientMin,
                    format!("nutrient_min:{}:day{}", nutrient, day + 1),
                    expr.clone(),
                    Sense::GreaterEq,
                    bound.min,
                );
                self.push(
                    ConstraintFamily::NutrientMax,
                    format!("nutrient_max:{}:day{}", nutrient, day + 1),
                    expr,
                    Sense::LessEq,
                    bound.max,
                );
            }
        }
        self.log_family(ConstraintFamily::NutrientMin);
        self.log_family(ConstraintFamily::NutrientMax);
        Ok(())
    }

    fn add_group_minimums(&mut self) {
        for day in 0..self.horizon().days {
            for group in 1..=FOOD_GROUP_COUNT {
                let minimum = self.model.config.group_minimums.get(group);
                let expr = self.day_weighted(day, |f| if f.group == group { 1.0 } else { 0.0 });
                self.push(
                    ConstraintFamily::GroupMinimum,
                    format!("group_min:g{}:day{}", group, day + 1),
                    expr,
                    Sense::GreaterEq,
                    minimum as f64,
                );
            }
        }
        self.log_family(ConstraintFamily::GroupMinimum);
    }

    /// `Σ_meal Portions <= max_portions_per_day * DayUsed`.
    fn add_daily_food_caps(&mut self) {
        for food in 0..self.food_count() {
            let cap = self.model.foods[food].max_portions_per_day as f64;
            for day in 0..self.horizon().days {
                let expr = self
                    .food_day_portions(food, day)
                    .with_term(self.model.day_used_var(food, day), -cap);
                let name = format!("daily_food_cap:{}:day{}", self.model.foods[food].name, day + 1);
                self.push(ConstraintFamily::DailyFoodCap, name, expr, Sense::LessEq, 0.0);
            }
        }
        self.log_family(ConstraintFamily::DailyFoodCap);
    }

    /// `Σ_day DayUsed <= max_days_per_week`.
    fn add_weekly_day_caps(&mut self) {
        for food in 0..self.food_count() {
            let expr = LinearExpr::sum(
                (0..self.horizon().days).map(|day| self.model.day_used_var(food, day)),
            );
            let item = &self.model.foods[food];
            let name = format!("weekly_day_cap:{}", item.name);
            let rhs = item.max_days_per_week as f64;
            self.push(ConstraintFamily::WeeklyDayCap, name, expr, Sense::LessEq, rhs);
        }
        self.log_family(ConstraintFamily::WeeklyDayCap);
    }

    /// `Σ_meal Used <= c * DayUsed`.
    fn add_meal_counts(&mut self) {
        let cap = self.model.config.meal_cap_per_food as f64;
        for food in 0..self.food_count() {
            for day in 0..self.horizon().days {
                let expr = LinearExpr::sum(
                    (0..self.horizon().meals).map(|meal| self.model.meal_used_var(food, day, meal)),
                )
                .with_term(self.model.day_used_var(food, day), -cap);
                let name = format!("meal_count:{}:day{}", self.model.foods[food].name, day + 1);
                self.push(ConstraintFamily::MealCount, name, expr, Sense::LessEq, 0.0);
            }
        }
        self.log_family(ConstraintFamily::MealCount);
    }

    fn add_daily_portion_caps(&mut self) {
        let cap = self.model.config.daily_portion_cap as f64;
        for day in 0..self.horizon().days {
            let expr = self.day_weighted(day, |_| 1.0);
            let name = format!("daily_portion_cap:day{}", day + 1);
            self.push(ConstraintFamily::DailyPortionCap, name, expr, Sense::LessEq, cap);
        }
        self.log_family(ConstraintFamily::DailyPortionCap);
    }

    /// At least one portion of something in every meal slot.
    fn add_meal_activity(&mut self) {
        let horizon = self.horizon();
        for day in 0..horizon.days {
            for meal in 0..horizon.meals {
                let expr = LinearExpr::sum(
                    (0..self.food_count()).map(|food| self.model.portions_var(food, day, meal)),
                );
                let name = format!("meal_activity:day{}:meal{}", day + 1, meal + 1);
                self.push(ConstraintFamily::MealActivity, name, expr, Sense::GreaterEq, 1.0);
            }
        }
        self.log_family(ConstraintFamily::MealActivity);
    }

    /// `Σ_meal Portions >= DayUsed`: a used day serves at least one portion.
    fn add_day_links(&mut self) {
        for food in 0..self.food_count() {
            for day in 0..self.horizon().days {
                let expr = self
                    .food_day_portions(food, day)
                    .with_term(self.model.day_used_var(food, day), -1.0);
                let name = format!("day_link:{}:day{}", self.model.foods[food].name, day + 1);
                self.push(ConstraintFamily::DayLink, name, expr, Sense::GreaterEq, 0.0);
            }
        }
        self.log_family(ConstraintFamily::DayLink);
    }

    fn add_meal_links(&mut self) -> Result<()> {
        let big_m = self.model.config.big_m;
        let horizon = self.horizon();
        for food in 0..self.food_count() {
            for day in 0..horizon.days {
                for meal in 0..horizon.meals {
                    let tag = format!("{}:day{}:meal{}", self.model.foods[food].name, day + 1, meal + 1);
                    self.add_implication(
                        self.model.portions_var(food, day, meal),
                        self.model.meal_used_var(food, day, meal),
                        big_m,
                        &tag,
                    )?;
                }
            }
        }
        self.log_family(ConstraintFamily::MealLinkUpper);
        self.log_family(ConstraintFamily::MealLinkLower);
        Ok(())
    }

    /// Tie `indicator` to `quantity > 0`.
    ///
    /// Always adds `quantity <= bound * indicator` (no quantity without the indicator);
    /// under strict linking also adds `quantity >= indicator` (no indicator without
    /// quantity). `bound` must reach the largest value `quantity` can take.
    fn add_implication(
        &mut self,
        quantity: VarId,
        indicator: VarId,
        bound: f64,
        tag: &str,
    ) -> Result<()> {
        let required = LinearExpr::new()
            .with_term(quantity, 1.0)
            .upper_bound(&self.model.vars);
        if bound < required {
            return Err(PlanError::BigMTooSmall {
                big_m: bound,
                required,
            });
        }

        let upper = LinearExpr::new()
            .with_term(quantity, 1.0)
            .with_term(indicator, -bound);
        self.push(
            ConstraintFamily::MealLinkUpper,
            format!("meal_link_upper:{}", tag),
            upper,
            Sense::LessEq,
            0.0,
        );

        if self.model.config.strict_linking {
            let lower = LinearExpr::new()
                .with_term(quantity, 1.0)
                .with_term(indicator, -1.0);
            self.push(
                ConstraintFamily::MealLinkLower,
                format!("meal_link_lower:{}", tag),
                lower,
                Sense::GreaterEq,
                0.0,
            );
        }
        Ok(())
    }
}

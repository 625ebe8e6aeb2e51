//! Solver-independent representation of the weekly diet MILP.

use std::fmt;

use crate::models::{FoodItem, PlanningHorizon, WeeklyPlan};
use crate::planner::config::PlanConfig;
use crate::planner::constants::FEASIBILITY_TOLERANCE;

/// Index of a decision variable inside a [`DietModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarDomain {
    /// Integer in `[0, upper]`.
    Integer { upper: f64 },
    Binary,
}

impl VarDomain {
    /// Largest value the variable can take.
    pub fn upper(&self) -> f64 {
        match self {
            VarDomain::Integer { upper } => *upper,
            VarDomain::Binary => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub domain: VarDomain,
}

/// Sparse linear combination of variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of `vars`, each with coefficient 1.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    /// Add `coefficient * var`. Zero coefficients are dropped.
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    pub fn with_term(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression under an assignment indexed by [`VarId`].
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| coeff * values[var.0])
            .sum()
    }

    /// Largest value the expression can reach given variable domains.
    pub fn upper_bound(&self, vars: &[VarDef]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| {
                let upper = vars[var.0].domain.upper();
                if *coeff > 0.0 { coeff * upper } else { 0.0 }
            })
            .sum()
    }
}

/// Direction of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    LessEq,
    GreaterEq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::LessEq => "<=",
            Sense::GreaterEq => ">=",
        })
    }
}

/// Which rule of the formulation a constraint instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintFamily {
    NutrientMin,
    NutrientMax,
    GroupMinimum,
    DailyFoodCap,
    WeeklyDayCap,
    MealCount,
    DailyPortionCap,
    MealActivity,
    DayLink,
    MealLinkUpper,
    MealLinkLower,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 11] = [
        ConstraintFamily::NutrientMin,
        ConstraintFamily::NutrientMax,
        ConstraintFamily::GroupMinimum,
        ConstraintFamily::DailyFoodCap,
        ConstraintFamily::WeeklyDayCap,
        ConstraintFamily::MealCount,
        ConstraintFamily::DailyPortionCap,
        ConstraintFamily::MealActivity,
        ConstraintFamily::DayLink,
        ConstraintFamily::MealLinkUpper,
        ConstraintFamily::MealLinkLower,
    ];

    /// Prefix of every constraint name in the family.
    pub fn prefix(self) -> &'static str {
        match self {
            ConstraintFamily::NutrientMin => "nutrient_min",
            ConstraintFamily::NutrientMax => "nutrient_max",
            ConstraintFamily::GroupMinimum => "group_min",
            ConstraintFamily::DailyFoodCap => "daily_food_cap",
            ConstraintFamily::WeeklyDayCap => "weekly_day_cap",
            ConstraintFamily::MealCount => "meal_count",
            ConstraintFamily::DailyPortionCap => "daily_portion_cap",
            ConstraintFamily::MealActivity => "meal_activity",
            ConstraintFamily::DayLink => "day_link",
            ConstraintFamily::MealLinkUpper => "meal_link_upper",
            ConstraintFamily::MealLinkLower => "meal_link_lower",
        }
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A named linear (in)equality `expr <sense> rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub family: ConstraintFamily,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        self.holds_at(self.expr.eval(values))
    }

    /// Verdict for a constraint with no variables, which holds or fails on its own.
    pub fn constant_verdict(&self) -> Option<bool> {
        self.expr.is_empty().then(|| self.holds_at(0.0))
    }

    fn holds_at(&self, lhs: f64) -> bool {
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            Sense::GreaterEq => lhs >= self.rhs - FEASIBILITY_TOLERANCE,
        }
    }
}

/// Counts of a built model, for inspection and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStats {
    pub integer_vars: usize,
    pub binary_vars: usize,
    pub per_family: Vec<(ConstraintFamily, usize)>,
}

impl ModelStats {
    pub fn constraints(&self) -> usize {
        self.per_family.iter().map(|(_, n)| n).sum()
    }
}

/// The weekly diet MILP: variables, cost objective, and named constraints.
///
/// Built by [`crate::planner::build_model`]; read-only afterwards.
#[derive(Debug, Clone)]
pub struct DietModel {
    pub(crate) foods: Vec<FoodItem>,
    pub(crate) config: PlanConfig,
    pub(crate) horizon: PlanningHorizon,
    pub(crate) vars: Vec<VarDef>,
    pub(crate) portions: Vec<VarId>,
    pub(crate) meal_used: Vec<VarId>,
    pub(crate) day_used: Vec<VarId>,
    pub(crate) objective: LinearExpr,
    pub(crate) constraints: Vec<LinearConstraint>,
}

impl DietModel {
    pub fn foods(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn horizon(&self) -> PlanningHorizon {
        self.horizon
    }

    pub fn variables(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn constraints_in(
        &self,
        family: ConstraintFamily,
    ) -> impl Iterator<Item = &LinearConstraint> + '_ {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    #[inline]
    fn slot(&self, food: usize, day: usize, meal: usize) -> usize {
        (food * self.horizon.days + day) * self.horizon.meals + meal
    }

    /// `Portions[food, day, meal]`.
    pub fn portions_var(&self, food: usize, day: usize, meal: usize) -> VarId {
        self.portions[self.slot(food, day, meal)]
    }

    /// `Used[food, day, meal]`.
    pub fn meal_used_var(&self, food: usize, day: usize, meal: usize) -> VarId {
        self.meal_used[self.slot(food, day, meal)]
    }

    /// `DayUsed[food, day]`.
    pub fn day_used_var(&self, food: usize, day: usize) -> VarId {
        self.day_used[food * self.horizon.days + day]
    }

    pub fn stats(&self) -> ModelStats {
        let binary_vars = self
            .vars
            .iter()
            .filter(|v| v.domain == VarDomain::Binary)
            .count();
        ModelStats {
            integer_vars: self.vars.len() - binary_vars,
            binary_vars,
            per_family: ConstraintFamily::ALL
                .iter()
                .map(|&family| (family, self.constraints_in(family).count()))
                .collect(),
        }
    }

    /// Names of the constraints an assignment violates.
    pub fn violations(&self, values: &[f64]) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Round a solver assignment into a [`WeeklyPlan`].
    pub fn decode(&self, values: &[f64]) -> WeeklyPlan {
        let mut plan = WeeklyPlan::new(self.horizon, self.foods.len());
        for food in 0..self.foods.len() {
            for day in 0..self.horizon.days {
                let day_used = values[self.day_used_var(food, day).0].round() >= 1.0;
                plan.set_day_used(food, day, day_used);
                for meal in 0..self.horizon.meals {
                    let portions = values[self.portions_var(food, day, meal).0].round().max(0.0);
                    plan.set_portions(food, day, meal, portions as u32);
                    let used = values[self.meal_used_var(food, day, meal).0].round() >= 1.0;
                    plan.set_meal_used(food, day, meal, used);
                }
            }
        }
        plan.set_objective(self.objective.eval(values));
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_expr_eval_and_bound() {
        let vars = vec![
            VarDef {
                name: "x".to_string(),
                domain: VarDomain::Integer { upper: 5.0 },
            },
            VarDef {
                name: "y".to_string(),
                domain: VarDomain::Binary,
            },
        ];
        let expr = LinearExpr::new()
            .with_term(VarId(0), 2.0)
            .with_term(VarId(1), -3.0)
            .with_term(VarId(1), 0.0);

        assert_eq!(expr.terms().len(), 2);
        assert_eq!(expr.eval(&[4.0, 1.0]), 5.0);
        assert_eq!(expr.upper_bound(&vars), 10.0);
    }

    #[test]
    fn test_constraint_satisfaction() {
        let constraint = LinearConstraint {
            name: "c".to_string(),
            family: ConstraintFamily::DailyPortionCap,
            expr: LinearExpr::sum([VarId(0), VarId(1)]),
            sense: Sense::LessEq,
            rhs: 3.0,
        };
        assert!(constraint.is_satisfied(&[1.0, 2.0]));
        assert!(!constraint.is_satisfied(&[2.0, 2.0]));
        assert_eq!(constraint.constant_verdict(), None);
    }

    #[test]
    fn test_constant_verdict() {
        let impossible = LinearConstraint {
            name: "empty_group".to_string(),
            family: ConstraintFamily::GroupMinimum,
            expr: LinearExpr::new(),
            sense: Sense::GreaterEq,
            rhs: 2.0,
        };
        assert_eq!(impossible.constant_verdict(), Some(false));

        let trivial = LinearConstraint {
            rhs: 0.0,
            ..impossible
        };
        assert_eq!(trivial.constant_verdict(), Some(true));
    }
}

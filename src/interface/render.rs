use std::fmt::{self, Display, Formatter};

use crate::models::{FoodItem, Nutrient, WeeklyPlan};
use crate::planner::DietModel;
use crate::solver::{SolveOutcome, SolvedModel};

/// Width of the nutrient label column.
const LABEL_WIDTH: usize = 12;

/// Plain-text report for a solved model.
///
/// Output depends only on the solved model, so rendering twice yields identical text.
pub struct Report<'a> {
    solved: &'a SolvedModel,
}

impl<'a> Report<'a> {
    pub fn new(solved: &'a SolvedModel) -> Self {
        Self { solved }
    }
}

/// Render the report for `solved` to a string.
pub fn render_report(solved: &SolvedModel) -> String {
    Report::new(solved).to_string()
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let model = self.solved.model();
        let outcome = self.solved.outcome();

        writeln!(f, "=== Weekly Diet Plan ===")?;
        writeln!(f, "Status: {}", outcome.status_label())?;

        match outcome {
            SolveOutcome::Optimal(plan) => {
                writeln!(f, "Total cost: {:.2}", plan.objective())?;
                writeln!(f)?;
                write_portions(f, model, plan)?;
                write_nutrients(f, model, plan)?;
                write_day_usage(f, model.foods(), plan)?;
                write_meal_usage(f, model.foods(), plan)
            }
            SolveOutcome::Infeasible { conflict } => {
                writeln!(f, "No plan satisfies every constraint.")?;
                writeln!(f)?;
                writeln!(f, "--- Conflicting constraints ({}) ---", conflict.len())?;
                if conflict.is_empty() {
                    writeln!(f, "  (no conflict subset available)")?;
                }
                for name in conflict {
                    writeln!(f, "  {}", name)?;
                }
                Ok(())
            }
            SolveOutcome::Other { .. } => Ok(()),
        }
    }
}

fn write_portions(f: &mut Formatter<'_>, model: &DietModel, plan: &WeeklyPlan) -> fmt::Result {
    let foods = model.foods();
    let horizon = plan.horizon();

    writeln!(f, "--- Portions by day and meal ---")?;
    for day in 0..horizon.days {
        writeln!(
            f,
            "Day {} ({} portions, cost {:.2})",
            day + 1,
            plan.day_portions(day),
            plan.daily_cost(foods, day)
        )?;
        for meal in 0..horizon.meals {
            let items: Vec<String> = foods
                .iter()
                .enumerate()
                .filter_map(|(idx, food)| {
                    let portions = plan.portions(idx, day, meal);
                    (portions > 0).then(|| format!("{} x{}", food.name, portions))
                })
                .collect();
            let listing = if items.is_empty() {
                "-".to_string()
            } else {
                items.join(", ")
            };
            writeln!(f, "  Meal {}: {}", meal + 1, listing)?;
        }
    }
    writeln!(f)
}

fn write_nutrients(f: &mut Formatter<'_>, model: &DietModel, plan: &WeeklyPlan) -> fmt::Result {
    let bounds = &model.config().nutrient_bounds;

    writeln!(f, "--- Daily nutrient totals ---")?;
    for day in 0..plan.horizon().days {
        writeln!(f, "Day {}", day + 1)?;
        let totals = plan.daily_nutrients(model.foods(), day);
        for nutrient in Nutrient::ALL {
            let value = totals[nutrient];
            match bounds.get(nutrient) {
                Some(bound) => writeln!(
                    f,
                    "  {:<width$} {:>10.2}  [{:.2}, {:.2}]  {}",
                    nutrient.label(),
                    value,
                    bound.min,
                    bound.max,
                    bound.check(value),
                    width = LABEL_WIDTH
                )?,
                None => writeln!(
                    f,
                    "  {:<width$} {:>10.2}",
                    nutrient.label(),
                    value,
                    width = LABEL_WIDTH
                )?,
            }
        }
    }
    writeln!(f)
}

fn write_day_usage(f: &mut Formatter<'_>, foods: &[FoodItem], plan: &WeeklyPlan) -> fmt::Result {
    writeln!(f, "--- Days used per food ---")?;
    for (idx, food) in foods.iter().enumerate() {
        let days: Vec<String> = (0..plan.horizon().days)
            .filter(|&day| plan.day_used(idx, day))
            .map(|day| (day + 1).to_string())
            .collect();
        let listing = if days.is_empty() {
            "-".to_string()
        } else {
            days.join(" ")
        };
        writeln!(
            f,
            "  {}: {} ({}/{})",
            food.name,
            listing,
            days.len(),
            food.max_days_per_week
        )?;
    }
    writeln!(f)
}

fn write_meal_usage(f: &mut Formatter<'_>, foods: &[FoodItem], plan: &WeeklyPlan) -> fmt::Result {
    let horizon = plan.horizon();

    writeln!(f, "--- Meals used per food ---")?;
    for (idx, food) in foods.iter().enumerate() {
        let days: Vec<String> = (0..horizon.days)
            .filter_map(|day| {
                let meals: Vec<String> = (0..horizon.meals)
                    .filter(|&meal| plan.meal_used(idx, day, meal))
                    .map(|meal| format!("m{}", meal + 1))
                    .collect();
                (!meals.is_empty()).then(|| format!("d{}[{}]", day + 1, meals.join(",")))
            })
            .collect();
        let listing = if days.is_empty() {
            "-".to_string()
        } else {
            days.join(" ")
        };
        writeln!(f, "  {}: {}", food.name, listing)?;
    }
    Ok(())
}

/// Print the effective model size per constraint family.
pub fn display_model_stats(model: &DietModel) {
    let stats = model.stats();

    println!();
    println!("=== Model ===");
    println!(
        "Foods: {}  Days: {}  Meals/day: {}",
        model.foods().len(),
        model.horizon().days,
        model.horizon().meals
    );
    println!(
        "Variables: {} integer, {} binary",
        stats.integer_vars, stats.binary_vars
    );
    println!();

    let width = stats
        .per_family
        .iter()
        .map(|(family, _)| family.prefix().len())
        .max()
        .unwrap_or(10);
    for (family, count) in &stats.per_family {
        println!("  {:<width$} {:>6}", family.prefix(), count, width = width);
    }
    println!("  {:<width$} {:>6}", "total", stats.constraints(), width = width);
    println!();
}

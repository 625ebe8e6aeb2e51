use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use diet_planner_rs::models::{DAYS_PER_WEEK, FoodItem, Nutrient, NutrientVector};
use diet_planner_rs::planner::{GroupMinimums, NutrientBound, NutrientBounds, PlanConfig, build_model};
use diet_planner_rs::solver::{SolveOutcome, solve};

const SOLVE_BUDGET_SECS: f64 = 30.0;

const PER_PORTION: [f64; 9] = [100.0, 10.0, 5.0, 2.0, 1.0, 20.0, 3.0, 0.5, 50.0];

fn make_food(name: &str, nutrients: [f64; 9], price: f64, max_portions: u32, max_days: u32) -> FoodItem {
    FoodItem {
        name: name.to_string(),
        nutrients: NutrientVector::new(nutrients),
        price,
        max_portions_per_day: max_portions,
        max_days_per_week: max_days,
        group: 1,
    }
}

/// Three meals, no empty-meal rule, no group rules, strict linking, exact search.
fn open_config(min: [f64; 9], max: [f64; 9], big_m: f64) -> PlanConfig {
    PlanConfig {
        meals_per_day: 3,
        big_m,
        require_meal_activity: false,
        nutrient_bounds: NutrientBounds::from_tables(min, max),
        group_minimums: GroupMinimums::none(),
        mip_gap: None,
        time_limit_secs: Some(SOLVE_BUDGET_SECS),
        ..PlanConfig::default()
    }
}

fn scaled(k: [f64; 9]) -> [f64; 9] {
    let mut out = [0.0; 9];
    for i in 0..9 {
        out[i] = PER_PORTION[i] * k[i];
    }
    out
}

#[test]
fn test_single_food_matching_minimums_exactly() {
    let food = make_food("Unica", PER_PORTION, 1.0, 100, 7);
    let config = open_config(PER_PORTION, PER_PORTION, 100.0);
    let solved = solve(build_model(vec![food], &config).unwrap());

    let plan = solved.outcome().plan().expect("expected an optimal plan");
    for day in 0..DAYS_PER_WEEK {
        assert_eq!(plan.day_portions(day), 1, "day {}", day + 1);
    }
    assert!((plan.objective() - 7.0).abs() < 1e-6);
}

#[test]
fn test_tightest_nutrient_sets_portion_count() {
    // Protein needs three portions a day; every other nutrient would settle for two.
    let min = scaled([2.0, 2.0, 3.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
    let max = scaled([10.0; 9]);
    let food = make_food("Unica", PER_PORTION, 1.0, 100, 7);
    let solved = solve(build_model(vec![food.clone()], &open_config(min, max, 100.0)).unwrap());

    let plan = solved.outcome().plan().expect("expected an optimal plan");
    let foods = [food];
    for day in 0..DAYS_PER_WEEK {
        assert_eq!(plan.day_portions(day), 3);
        let totals = plan.daily_nutrients(&foods, day);
        assert!((totals[Nutrient::Protein] - 15.0).abs() < 1e-9);
    }
    assert!((plan.objective() - 21.0).abs() < 1e-6);
    assert!((plan.total_cost(&foods) - 21.0).abs() < 1e-6);
}

#[test]
fn test_cheaper_food_preferred() {
    let min = scaled([2.0; 9]);
    let max = scaled([10.0; 9]);
    let foods = vec![
        make_food("Cara", PER_PORTION, 5.0, 10, 7),
        make_food("Barata", PER_PORTION, 1.0, 10, 7),
    ];
    let solved = solve(build_model(foods, &open_config(min, max, 10.0)).unwrap());

    let plan = solved.outcome().plan().expect("expected an optimal plan");
    assert_eq!(plan.days_used(0), 0);
    assert_eq!(plan.days_used(1), 7);
    assert!((plan.objective() - 14.0).abs() < 1e-6);
}

#[test]
fn test_unreachable_minimum_reports_conflict() {
    let mut min = [0.0; 9];
    min[Nutrient::Energy.index()] = 10_000.0;
    let food = make_food("Pouca", PER_PORTION, 1.0, 5, 7);
    let solved = solve(build_model(vec![food], &open_config(min, [1e6; 9], 50.0)).unwrap());

    match solved.outcome() {
        SolveOutcome::Infeasible { conflict } => {
            assert!(!conflict.is_empty());
            assert!(
                conflict.iter().any(|name| name.starts_with("nutrient_min:energy:")),
                "conflict: {:?}",
                conflict
            );
        }
        other => panic!("expected infeasible, got {:?}", other),
    }
}

#[test]
fn test_zero_days_allowed_without_meal_activity() {
    let food = make_food("Proibida", PER_PORTION, 1.0, 5, 0);
    let solved = solve(build_model(vec![food], &open_config([0.0; 9], [1e6; 9], 50.0)).unwrap());

    let plan = solved.outcome().plan().expect("expected an optimal plan");
    for day in 0..DAYS_PER_WEEK {
        assert_eq!(plan.day_portions(day), 0);
    }
    assert!(plan.objective().abs() < 1e-6);
}

#[test]
fn test_zero_days_infeasible_with_meal_activity() {
    let food = make_food("Proibida", PER_PORTION, 1.0, 5, 0);
    let config = PlanConfig {
        require_meal_activity: true,
        ..open_config([0.0; 9], [1e6; 9], 50.0)
    };
    let solved = solve(build_model(vec![food], &config).unwrap());

    match solved.outcome() {
        SolveOutcome::Infeasible { conflict } => assert!(!conflict.is_empty()),
        other => panic!("expected infeasible, got {:?}", other),
    }
}

#[test]
fn test_group_minimum_forces_variety() {
    let mut fruit = make_food("Fruta", PER_PORTION, 3.0, 5, 7);
    fruit.group = 1;
    let mut grain = make_food("Grao", PER_PORTION, 1.0, 5, 7);
    grain.group = 2;

    let mut config = open_config(scaled([2.0; 9]), scaled([10.0; 9]), 5.0);
    config.group_minimums.set(1, 1);
    let solved = solve(build_model(vec![fruit, grain], &config).unwrap());

    let plan = solved.outcome().plan().expect("expected an optimal plan");
    for day in 0..DAYS_PER_WEEK {
        assert_eq!(plan.food_day_portions(0, day), 1);
        assert_eq!(plan.food_day_portions(1, day), 1);
    }
    assert!((plan.objective() - 28.0).abs() < 1e-6);
}

#[test]
fn test_random_instances_respect_invariants() {
    let mut rng = StdRng::seed_from_u64(7);
    let meal_cap = 2;
    let (mut used_days, mut idle_days, mut used_meals, mut idle_meals) = (0, 0, 0, 0);

    for round in 0..3 {
        let foods: Vec<FoodItem> = (0..3)
            .map(|i| {
                let mut nutrients = [0.0; 9];
                nutrients[Nutrient::Energy.index()] = rng.gen_range(100.0..=200.0);
                for value in nutrients.iter_mut().skip(1) {
                    *value = rng.gen_range(0.0..=20.0);
                }
                make_food(
                    &format!("Alimento{}", i),
                    nutrients,
                    rng.gen_range(0.5..=3.0),
                    rng.gen_range(3..=6),
                    rng.gen_range(3..=7),
                )
            })
            .collect();

        let mut config = open_config([0.0; 9], [1e6; 9], 6.0);
        config.meal_cap_per_food = meal_cap;
        config
            .nutrient_bounds
            .set(Nutrient::Energy, NutrientBound::new(300.0, 5000.0));

        let solved = solve(build_model(foods.clone(), &config).unwrap());
        let plan = solved
            .outcome()
            .plan()
            .unwrap_or_else(|| {
                panic!(
                    "round {}: expected optimal plan, got {}",
                    round,
                    solved.outcome().status_label()
                )
            });

        for day in 0..DAYS_PER_WEEK {
            assert!(plan.day_portions(day) <= config.daily_portion_cap);
            let totals = plan.daily_nutrients(&foods, day);
            for nutrient in Nutrient::ALL {
                let bound = config.nutrient_bounds.get(nutrient).unwrap();
                assert!(totals[nutrient] >= bound.min - 1e-6);
                assert!(totals[nutrient] <= bound.max + 1e-6);
            }
        }

        for (idx, food) in foods.iter().enumerate() {
            assert!(plan.days_used(idx) <= food.max_days_per_week as usize);
            for day in 0..DAYS_PER_WEEK {
                assert_eq!(plan.day_used(idx, day), plan.food_day_portions(idx, day) > 0);
                if plan.day_used(idx, day) {
                    used_days += 1;
                } else {
                    idle_days += 1;
                }
                assert!(plan.meals_used(idx, day) <= meal_cap as usize);
                assert!(plan.food_day_portions(idx, day) <= food.max_portions_per_day);
                for meal in 0..3 {
                    assert_eq!(plan.meal_used(idx, day, meal), plan.portions(idx, day, meal) > 0);
                    if plan.meal_used(idx, day, meal) {
                        used_meals += 1;
                    } else {
                        idle_meals += 1;
                    }
                }
            }
        }
    }

    // Both sides of each indicator equivalence were exercised.
    assert!(used_days > 0 && idle_days > 0, "days: {} used, {} idle", used_days, idle_days);
    assert!(used_meals > 0 && idle_meals > 0, "meals: {} used, {} idle", used_meals, idle_meals);
}

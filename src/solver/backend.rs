//! Translation of a [`DietModel`] into a `good_lp` problem and a single solve call.

use good_lp::solvers::SolutionStatus;
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    constraint, variable,
};

use crate::planner::{DietModel, LinearConstraint, LinearExpr, Sense, VarDomain};

/// What to minimise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Objective {
    /// The model's cost objective.
    Cost,
    /// A constant objective, for pure feasibility probes.
    Feasibility,
}

/// Raw result of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BackendResult {
    /// Variable values indexed like [`DietModel::variables`].
    Solved(Vec<f64>),
    Infeasible,
    /// The time limit expired before the search finished.
    TimedOut,
    Failed(String),
}

/// Per-call solver limits.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Limits {
    pub mip_gap: Option<f64>,
    pub time_limit_secs: Option<f64>,
}

impl Limits {
    pub fn from_model(model: &DietModel) -> Self {
        Self {
            mip_gap: model.config().mip_gap,
            time_limit_secs: model.config().time_limit_secs,
        }
    }
}

#[cfg(not(any(feature = "highs", feature = "microlp")))]
compile_error!("enable one solver backend: the `highs` or `microlp` feature");

/// Solve `model` keeping only the constraints flagged in `active`.
pub(crate) fn run(
    model: &DietModel,
    active: &[bool],
    objective: Objective,
    limits: Limits,
) -> BackendResult {
    let enabled = || {
        model
            .constraints()
            .iter()
            .zip(active)
            .filter(|(_, on)| **on)
            .map(|(c, _)| c)
    };

    // Constraints without variables never reach the solver.
    if enabled().any(|c| c.constant_verdict() == Some(false)) {
        return BackendResult::Infeasible;
    }

    let mut problem = ProblemVariables::new();
    let vars: Vec<Variable> = model
        .variables()
        .iter()
        .map(|def| {
            let definition = match def.domain {
                VarDomain::Integer { upper } => variable().integer().min(0).max(upper),
                VarDomain::Binary => variable().binary(),
            };
            problem.add(definition.name(def.name.clone()))
        })
        .collect();

    let goal = match objective {
        Objective::Cost => to_expression(model.objective(), &vars),
        Objective::Feasibility => Expression::default(),
    };
    let constraints: Vec<Constraint> = enabled()
        .filter(|c| c.constant_verdict().is_none())
        .map(|c| to_constraint(c, &vars))
        .collect();

    #[cfg(feature = "highs")]
    let solver_model = {
        use good_lp::solvers::WithMipGap;

        let mut m = problem.minimise(goal).using(good_lp::solvers::highs::highs);
        if let Some(seconds) = limits.time_limit_secs {
            m = m.set_time_limit(seconds);
        }
        match limits.mip_gap {
            Some(gap) => match m.with_mip_gap(gap as f32) {
                Ok(m) => m,
                Err(e) => return BackendResult::Failed(format!("invalid mip gap: {:?}", e)),
            },
            None => m,
        }
    };

    #[cfg(all(feature = "microlp", not(feature = "highs")))]
    let solver_model = {
        let _ = limits;
        problem
            .minimise(goal)
            .using(good_lp::solvers::microlp::microlp)
    };

    finish(solver_model, constraints, &vars)
}

/// Whether the backend built into this crate honours gap and time limits.
pub(crate) fn supports_limits() -> bool {
    cfg!(feature = "highs")
}

fn finish<M>(mut solver_model: M, constraints: Vec<Constraint>, vars: &[Variable]) -> BackendResult
where
    M: SolverModel<Error = ResolutionError>,
{
    for c in constraints {
        solver_model = solver_model.with(c);
    }
    match solver_model.solve() {
        Ok(solution) => classify(solution.status(), || {
            vars.iter().map(|&v| solution.value(v)).collect()
        }),
        Err(ResolutionError::Infeasible) => BackendResult::Infeasible,
        Err(e) => BackendResult::Failed(e.to_string()),
    }
}

/// Map a returned solution to a result. An assignment cut short by the clock
/// is not proven optimal, so its values are discarded.
fn classify(status: SolutionStatus, values: impl FnOnce() -> Vec<f64>) -> BackendResult {
    match status {
        SolutionStatus::TimeLimit => BackendResult::TimedOut,
        _ => BackendResult::Solved(values()),
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms().len());
    for &(var, coeff) in expr.terms() {
        out.add_mul(coeff, vars[var.index()]);
    }
    out
}

fn to_constraint(c: &LinearConstraint, vars: &[Variable]) -> Constraint {
    let lhs = to_expression(&c.expr, vars);
    let rhs = Expression::from(c.rhs);
    match c.sense {
        Sense::LessEq => constraint::leq(lhs, rhs),
        Sense::GreaterEq => constraint::leq(rhs, lhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_limit_discards_values() {
        let result = classify(SolutionStatus::TimeLimit, || vec![1.0, 2.0]);
        assert_eq!(result, BackendResult::TimedOut);
    }

    #[test]
    fn test_gap_limit_keeps_values() {
        let result = classify(SolutionStatus::GapLimit, || vec![3.0]);
        assert_eq!(result, BackendResult::Solved(vec![3.0]));
        let result = classify(SolutionStatus::Optimal, Vec::new);
        assert_eq!(result, BackendResult::Solved(Vec::new()));
    }
}

//! The single optimisation attempt and its three terminal outcomes.

mod backend;
pub mod conflict;

pub use conflict::find_conflict;

use crate::models::WeeklyPlan;
use crate::planner::DietModel;
use backend::{BackendResult, Limits, Objective};

/// Terminal state of a solve attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The solver proved optimality (within the configured gap).
    Optimal(WeeklyPlan),

    /// No assignment satisfies every constraint. `conflict` names an irreducible
    /// conflicting subset, or is empty when diagnosis was disabled.
    Infeasible { conflict: Vec<String> },

    /// Any other solver status, kept verbatim.
    Other { status: String },
}

impl SolveOutcome {
    /// Banner text for reports.
    pub fn status_label(&self) -> &str {
        match self {
            SolveOutcome::Optimal(_) => "OPTIMAL",
            SolveOutcome::Infeasible { .. } => "INFEASIBLE",
            SolveOutcome::Other { status } => status,
        }
    }

    pub fn plan(&self) -> Option<&WeeklyPlan> {
        match self {
            SolveOutcome::Optimal(plan) => Some(plan),
            _ => None,
        }
    }
}

/// A model together with the outcome of solving it.
#[derive(Debug, Clone)]
pub struct SolvedModel {
    model: DietModel,
    outcome: SolveOutcome,
}

impl SolvedModel {
    pub fn new(model: DietModel, outcome: SolveOutcome) -> Self {
        Self { model, outcome }
    }

    pub fn model(&self) -> &DietModel {
        &self.model
    }

    pub fn outcome(&self) -> &SolveOutcome {
        &self.outcome
    }
}

/// Status reported when the solver's time limit expires.
pub const TIME_LIMIT_STATUS: &str = "TIME_LIMIT";

/// Run one optimisation of `model`. No retries, no relaxation.
pub fn solve(model: DietModel) -> SolvedModel {
    let limits = Limits::from_model(&model);
    if !backend::supports_limits()
        && (limits.mip_gap.is_some() || limits.time_limit_secs.is_some())
    {
        tracing::warn!("microlp backend ignores the gap and time limit; solving to optimality");
    }

    tracing::info!(constraints = model.constraints().len(), "Optimizing model");
    let active = vec![true; model.constraints().len()];
    let result = backend::run(&model, &active, Objective::Cost, limits);
    let outcome = outcome_for(&model, result);

    tracing::info!(status = outcome.status_label(), "Solve finished");
    SolvedModel::new(model, outcome)
}

fn outcome_for(model: &DietModel, result: BackendResult) -> SolveOutcome {
    match result {
        BackendResult::Solved(values) => {
            let violations = model.violations(&values);
            if let Some(first) = violations.first() {
                tracing::warn!(
                    count = violations.len(),
                    first = %first,
                    "Solver assignment violates model constraints"
                );
            }
            SolveOutcome::Optimal(model.decode(&values))
        }
        BackendResult::Infeasible => {
            let conflict = if model.config().diagnose_conflicts {
                find_conflict(model)
            } else {
                Vec::new()
            };
            SolveOutcome::Infeasible { conflict }
        }
        BackendResult::TimedOut => {
            tracing::warn!(
                seconds = ?model.config().time_limit_secs,
                "Solver time limit reached before optimality was proven"
            );
            SolveOutcome::Other {
                status: TIME_LIMIT_STATUS.to_string(),
            }
        }
        BackendResult::Failed(status) => SolveOutcome::Other { status },
    }
}

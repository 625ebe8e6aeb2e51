//! Irreducible conflicting subsets of an infeasible model.

use crate::planner::{ConstraintFamily, DietModel};
use crate::solver::backend::{self, BackendResult, Limits, Objective};

/// Verdict of one feasibility probe on a subset of constraints.
#[derive(Debug, Clone, PartialEq)]
enum Probe {
    Infeasible,
    Feasible,
    /// The backend returned neither verdict (time limit, solver error).
    Undecided(String),
}

/// Names of an irreducible subset of constraints that cannot hold together.
///
/// Deletion filter: each candidate is dropped and the rest re-solved for
/// feasibility; it stays dropped only if the remainder is still infeasible.
/// Whole families are tried first so most of the model goes in a few probes.
/// A probe the backend cannot decide keeps its candidate in the subset.
///
/// Returns an empty list only when the full model is proven feasible.
pub fn find_conflict(model: &DietModel) -> Vec<String> {
    let limits = Limits {
        mip_gap: None,
        time_limit_secs: model.config().time_limit_secs,
    };
    deletion_filter(model, |active| {
        match backend::run(model, active, Objective::Feasibility, limits) {
            BackendResult::Infeasible => Probe::Infeasible,
            BackendResult::Solved(_) => Probe::Feasible,
            BackendResult::TimedOut => Probe::Undecided("time limit".to_string()),
            BackendResult::Failed(status) => Probe::Undecided(status),
        }
    })
}

fn deletion_filter<F>(model: &DietModel, mut probe: F) -> Vec<String>
where
    F: FnMut(&[bool]) -> Probe,
{
    let total = model.constraints().len();
    let mut active = vec![true; total];
    let mut probes = 1usize;

    match probe(&active) {
        Probe::Infeasible => {}
        Probe::Feasible => {
            tracing::warn!("Conflict search started on a model the backend finds feasible");
            return Vec::new();
        }
        // The caller already saw the full model fail; keep searching with
        // undecided probes treated as feasible so candidates are retained.
        Probe::Undecided(status) => {
            tracing::warn!(%status, "Could not re-confirm infeasibility of the full model");
        }
    }

    let mut still_infeasible = |active: &[bool]| {
        probes += 1;
        match probe(active) {
            Probe::Infeasible => true,
            Probe::Feasible => false,
            Probe::Undecided(status) => {
                tracing::warn!(%status, "Conflict probe undecided, keeping candidate");
                false
            }
        }
    };

    for family in ConstraintFamily::ALL {
        let members: Vec<usize> = model
            .constraints()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.family == family)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }
        for &i in &members {
            active[i] = false;
        }
        if still_infeasible(&active) {
            tracing::debug!(family = %family, dropped = members.len(), "Family not involved in conflict");
        } else {
            for &i in &members {
                active[i] = true;
            }
        }
    }

    for i in 0..total {
        if !active[i] {
            continue;
        }
        active[i] = false;
        if !still_infeasible(&active) {
            active[i] = true;
        }
    }

    let conflict: Vec<String> = model
        .constraints()
        .iter()
        .zip(&active)
        .filter(|(_, on)| **on)
        .map(|(c, _)| c.name.clone())
        .collect();
    tracing::info!(constraints = conflict.len(), probes, "Conflict analysis finished");
    conflict
}

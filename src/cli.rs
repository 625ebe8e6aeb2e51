use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::error::Result;
use crate::planner::PlanConfig;
use crate::state::load_config;

/// Weekly diet planner: minimum-cost portions per day and meal under nutrient targets.
#[derive(Parser, Debug)]
#[command(name = "diet_planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the food table CSV.
    #[arg(short, long, default_value = "alimentos.csv")]
    pub foods: PathBuf,

    /// Path to a JSON plan configuration. Defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report file, overwritten on every run.
    #[arg(short, long, default_value = "plano_semanal.txt")]
    pub output: PathBuf,

    /// Override the number of meal slots per day.
    #[arg(long)]
    pub meals: Option<usize>,

    /// Override the relative optimality gap (e.g. 0.05).
    #[arg(long)]
    pub mip_gap: Option<f64>,

    /// Override the per-call solver time limit, in seconds.
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Log more (-v debug, -vv trace). RUST_LOG applies when not given.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Default)]
pub enum Command {
    /// Build and solve the weekly model, then write the report.
    #[default]
    Plan,

    /// Build the model and print its size without solving.
    Inspect,

    /// Print the effective configuration as JSON.
    Config,
}

impl Cli {
    /// Configuration from `--config` (or defaults) with command-line overrides applied.
    pub fn effective_config(&self) -> Result<PlanConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PlanConfig::default(),
        };
        if let Some(meals) = self.meals {
            config.meals_per_day = meals;
        }
        if let Some(gap) = self.mip_gap {
            config.mip_gap = Some(gap);
        }
        if let Some(limit) = self.time_limit {
            config.time_limit_secs = Some(limit);
        }
        config.validate()?;
        Ok(config)
    }
}

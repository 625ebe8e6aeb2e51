use clap::Parser;
use tracing_subscriber::EnvFilter;

use diet_planner_rs::cli::{Cli, Command};
use diet_planner_rs::error::Result;
use diet_planner_rs::interface::{display_model_stats, render_report};
use diet_planner_rs::planner::build_model;
use diet_planner_rs::solver::solve;
use diet_planner_rs::state::{load_foods, write_report};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match cli.command.as_ref().unwrap_or(&Command::Plan) {
        Command::Plan => cmd_plan(cli),
        Command::Inspect => cmd_inspect(cli),
        Command::Config => cmd_config(cli),
    }
}

/// Build, solve once, and report.
fn cmd_plan(cli: &Cli) -> Result<()> {
    let config = cli.effective_config()?;
    let foods = load_foods(&cli.foods)?;
    println!("Loaded {} foods from {}", foods.len(), cli.foods.display());

    let model = build_model(foods, &config)?;
    let solved = solve(model);

    print!("{}", render_report(&solved));
    write_report(&cli.output, &solved)?;
    println!();
    println!("Report written to {}", cli.output.display());
    Ok(())
}

/// Build the model and show its size per constraint family.
fn cmd_inspect(cli: &Cli) -> Result<()> {
    let config = cli.effective_config()?;
    let foods = load_foods(&cli.foods)?;
    let model = build_model(foods, &config)?;
    display_model_stats(&model);
    Ok(())
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let config = cli.effective_config()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

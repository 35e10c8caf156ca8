//! Run every parameter fixture through the engine and the validation rules
//!
//! Exits non-zero when any fixture fails, so it can gate CI.

use anyhow::{Context, Result};
use solar_projection::{
    params::{load_fixtures, loader::DEFAULT_FIXTURES_PATH, SimulationParams},
    validation::ValidationReport,
    ScenarioRunner,
};
use rayon::prelude::*;
use std::time::Instant;

struct FixtureResult {
    name: String,
    horizon: u32,
    total_savings: f64,
    report: ValidationReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_FIXTURES_PATH.to_string());
    let start = Instant::now();

    let fixtures = load_fixtures(&path).with_context(|| format!("loading fixtures from {}", path))?;
    println!("Loaded {} fixtures from {}", fixtures.len(), path);

    let runner = ScenarioRunner::from_csv().unwrap_or_else(|e| {
        log::warn!("using built-in assumptions: {}", e);
        ScenarioRunner::new()
    });

    let results: Vec<FixtureResult> = fixtures
        .par_iter()
        .map(|fixture| {
            let params = SimulationParams::from_raw(&fixture.raw);
            let (output, report) = runner.run_validated(&params);
            FixtureResult {
                name: fixture.name.clone(),
                horizon: output.horizon(),
                total_savings: output.metrics.total_savings_projected,
                report,
            }
        })
        .collect();

    println!("\n{:<20} {:>5} {:>14} {:>7}  Status", "Fixture", "Years", "Savings", "Score");
    println!("{}", "-".repeat(58));

    let mut failed = 0;
    for r in &results {
        println!(
            "{:<20} {:>5} {:>14.2} {:>7.1}  {}",
            r.name,
            r.horizon,
            r.total_savings,
            r.report.score,
            if r.report.is_valid { "ok" } else { "FAILED" }
        );
        if !r.report.is_valid {
            failed += 1;
            for e in &r.report.errors {
                println!("    {}", e);
            }
        }
    }

    let mean_score = if results.is_empty() {
        100.0
    } else {
        results.iter().map(|r| r.report.score).sum::<f64>() / results.len() as f64
    };

    println!("\n{} fixtures, {} failed, mean score {:.1}, in {:?}", results.len(), failed, mean_score, start.elapsed());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

//! Solar Projection CLI
//!
//! Runs a quote projection from a parameter file (or the form defaults),
//! prints the yearly table and KPIs, and audits the result.

use anyhow::{Context, Result};
use clap::Parser;
use solar_projection::{
    params::{load_params, SimulationParams},
    projection::{BreakEven, CalculationOutput, FinancingMode},
    Assumptions, RawSimulationParams, ScenarioRunner,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "solar_projection", version, about = "Solar quote financial projection")]
struct Args {
    /// JSON file with the quote parameters (form defaults when omitted)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Directory holding market.csv and regional_pricing.csv
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Override the projection horizon (years)
    #[arg(long)]
    years: Option<u32>,

    /// Write the full output as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write both yearly series as CSV
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Department code for the property value estimate
    #[arg(long, requires = "surface")]
    department: Option<String>,

    /// Living surface (m²) for the property value estimate
    #[arg(long, requires = "department")]
    surface: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let assumptions = match &args.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => Assumptions::default_pricing(),
    };
    let runner = ScenarioRunner::with_assumptions(assumptions);

    let raw = match &args.params {
        Some(path) => load_params(path).with_context(|| format!("reading {}", path.display()))?,
        None => RawSimulationParams::default(),
    };
    let mut params = SimulationParams::from_raw(&raw);
    if let Some(years) = args.years {
        params = params.with_horizon(years);
    }

    let (output, report) = runner.run_validated(&params);

    print_header(&output);
    print_table(&output);
    print_kpis(&output);

    if let (Some(department), Some(surface)) = (&args.department, args.surface) {
        println!(
            "  Property value uplift ({} m², dept {}): {:.0} €",
            surface,
            department,
            runner.property_value_uplift(department, surface)
        );
    }

    println!("\nValidation: score {:.1}/100, {}", report.score, if report.is_valid { "OK" } else { "FAILED" });
    for e in &report.errors {
        println!("  error: {}", e);
    }
    for w in &report.warnings {
        println!("  warning: {}", w);
    }

    if let Some(path) = &args.json_out {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &output)?;
        println!("\nFull output written to: {}", path.display());
    }

    if let Some(path) = &args.csv_out {
        write_csv(&output, path)?;
        println!("Yearly series written to: {}", path.display());
    }

    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn print_header(output: &CalculationOutput) {
    let p = &output.params;
    let t = &output.loan_terms;

    println!("Solar Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("========================\n");
    println!(
        "Installation: {:.0} € for {:.0} kWh/yr ({:.0} % self-consumed)",
        p.install_cost, p.yearly_production, p.self_consumption_rate
    );
    println!(
        "Household:    {:.0} kWh/yr at {:.4} €/kWh, +{:.2} %/yr",
        p.annual_consumption, p.electricity_price, p.inflation_rate
    );
    println!(
        "Loan:         {:.2} € over {} months at {:.2} % -> {:.2} €/month + {:.2} € insurance",
        t.principal, t.duration_months, t.annual_rate, t.monthly_payment, t.monthly_insurance
    );
    println!();
}

fn print_table(output: &CalculationOutput) {
    println!(
        "{:>4} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12}",
        "Year", "NoSolar", "Credit", "Residual", "Surplus", "Net", "CumLoan", "CumCash"
    );
    println!("{}", "-".repeat(86));

    for (loan, cash) in output.loan.details.iter().zip(&output.cash.details) {
        println!(
            "{:>4} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.2} {:>12.2}",
            loan.year,
            loan.bill_without_solar,
            loan.credit_payment,
            loan.residual_bill,
            loan.surplus_revenue,
            loan.net_cashflow_vs_baseline,
            loan.cumulative_savings,
            cash.cumulative_savings,
        );
    }
}

fn print_kpis(output: &CalculationOutput) {
    let m = &output.metrics;
    let horizon = output.horizon();
    let break_even = |be: BreakEven| match be.year() {
        Some(y) => format!("year {}", y),
        None => format!("not within {} years", horizon),
    };

    println!("\nKey figures ({} years):", horizon);
    println!("  Total savings (loan):      {:.2} €", m.total_savings_projected);
    println!("  Total savings (cash):      {:.2} €", m.total_savings_projected_cash);
    println!("  Break-even (loan):         {}", break_even(m.break_even));
    println!("  Break-even (cash):         {}", break_even(m.break_even_cash));
    println!("  ROI:                       {:.2} %", m.roi_percentage);
    if let Some(irr) = m.irr_percentage_cash {
        println!("  IRR (cash):                {:.2} %", irr);
    }
    println!("  Cost of waiting one year:  {:.2} €", m.loss_if_wait_1_year);
    println!("  Bank-equivalent capital:   {:.0} €", m.bank_equivalent_capital);
    println!("  Inaction per second:       {:.6} €", m.cost_of_inaction_per_second);
    println!("  Monthly effort (year 1):   {:.2} €", output.year_one.monthly_effort);
}

fn write_csv(output: &CalculationOutput, path: &Path) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    writeln!(
        file,
        "Mode,Year,Price,BillNoSolar,SelfConsumedKwh,SurplusKwh,SelfUseSavings,Credit,Residual,\
         SurplusRevenue,TotalSolar,Net,CumSavings,CumSpendNoSolar,CumSpendSolar"
    )?;

    for mode in [FinancingMode::Loan, FinancingMode::Cash] {
        for d in &output.series(mode).details {
            writeln!(
                file,
                "{},{},{:.6},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                mode.as_str(),
                d.year,
                d.electricity_price,
                d.bill_without_solar,
                d.self_consumed_kwh,
                d.surplus_kwh,
                d.savings_from_self_use,
                d.credit_payment,
                d.residual_bill,
                d.surplus_revenue,
                d.total_with_solar,
                d.net_cashflow_vs_baseline,
                d.cumulative_savings,
                d.cumulative_spend_no_solar,
                d.cumulative_spend_solar,
            )?;
        }
    }

    Ok(())
}

//! AWS Lambda handler computing a quote projection
//!
//! Accepts the raw form parameters as the JSON event and returns the full
//! projection with its validation report. Optional horizons re-run the same
//! parameters so the dashboard can switch between them.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use solar_projection::{
    projection::CalculationOutput,
    validation::ValidationReport,
    RawSimulationParams, ScenarioRunner, SimulationParams,
};

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub params: RawSimulationParams,

    /// Extra horizons to summarize (e.g. [10, 15, 20, 25])
    #[serde(default)]
    pub horizons: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct HorizonSummary {
    pub years: u32,
    pub total_savings: f64,
    pub roi_percentage: f64,
    pub break_even_year: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub output: CalculationOutput,
    pub validation: ValidationReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub horizons: Vec<HorizonSummary>,
    pub execution_time_us: u64,
}

async fn handler(event: LambdaEvent<QuoteRequest>) -> Result<QuoteResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    let runner = ScenarioRunner::new();
    let params = SimulationParams::from_raw(&request.params);
    let (output, validation) = runner.run_validated(&params);

    let horizons = runner
        .run_horizons(&params, &request.horizons)
        .into_iter()
        .map(|o| HorizonSummary {
            years: o.horizon(),
            total_savings: o.metrics.total_savings_projected,
            roi_percentage: o.metrics.roi_percentage,
            break_even_year: o.metrics.break_even.year(),
        })
        .collect();

    if !validation.is_valid {
        log::warn!("quote failed validation: {:?}", validation.errors);
    }

    Ok(QuoteResponse {
        output,
        validation,
        horizons,
        execution_time_us: start.elapsed().as_micros() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

//! Simulation parameters, form-value coercion and fixture loading

mod data;
mod coerce;
pub mod loader;

pub use data::{NumericInput, RawSimulationParams, SimulationParams, MAX_PROJECTION_YEARS, STANDARD_HORIZONS};
pub use coerce::parse_numeric;
pub use loader::{load_fixtures, load_fixtures_from_reader, load_params, params_from_json, ParamFixture};

//! Load parameter sets from JSON requests and CSV fixture files

use super::{NumericInput, RawSimulationParams};
use crate::error::LoadError;
use csv::Reader;
use std::fs::File;
use std::path::Path;

/// Default location of the regression fixtures
pub const DEFAULT_FIXTURES_PATH: &str = "data/fixtures/params.csv";

/// A named parameter set used by the regression fixtures
#[derive(Debug, Clone)]
pub struct ParamFixture {
    pub name: String,
    pub raw: RawSimulationParams,
}

/// Raw CSV row; every column is kept as text so the form coercion applies
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    name: String,
    inflation_rate: Option<String>,
    electricity_price: Option<String>,
    yearly_production: Option<String>,
    self_consumption_rate: Option<String>,
    install_cost: Option<String>,
    credit_monthly_payment: Option<String>,
    insurance_monthly_payment: Option<String>,
    credit_duration_months: Option<String>,
    cash_down_payment: Option<String>,
    annual_consumption: Option<String>,
    credit_interest_rate: Option<String>,
    insurance_rate: Option<String>,
    projection_years: Option<String>,
}

impl CsvRow {
    fn into_fixture(self) -> ParamFixture {
        let text = |value: Option<String>| value.map(NumericInput::Text);

        ParamFixture {
            name: self.name,
            raw: RawSimulationParams {
                inflation_rate: text(self.inflation_rate),
                electricity_price: text(self.electricity_price),
                yearly_production: text(self.yearly_production),
                self_consumption_rate: text(self.self_consumption_rate),
                install_cost: text(self.install_cost),
                credit_monthly_payment: text(self.credit_monthly_payment),
                insurance_monthly_payment: text(self.insurance_monthly_payment),
                credit_duration_months: text(self.credit_duration_months),
                cash_down_payment: text(self.cash_down_payment),
                annual_consumption: text(self.annual_consumption),
                credit_interest_rate: text(self.credit_interest_rate),
                insurance_rate: text(self.insurance_rate),
                projection_years: text(self.projection_years),
            },
        }
    }
}

/// Parse raw parameters from a JSON document
pub fn params_from_json(json: &str) -> Result<RawSimulationParams, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Load raw parameters from a JSON file
pub fn load_params<P: AsRef<Path>>(path: P) -> Result<RawSimulationParams, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    Ok(serde_json::from_reader(file)?)
}

/// Load all fixtures from a CSV file
pub fn load_fixtures<P: AsRef<Path>>(path: P) -> Result<Vec<ParamFixture>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    load_fixtures_from_reader(file).map_err(|e| match e {
        LoadError::Csv { source, .. } => LoadError::csv(path, source),
        other => other,
    })
}

/// Load fixtures from any reader (e.g., string buffer)
pub fn load_fixtures_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ParamFixture>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut fixtures = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result.map_err(|e| LoadError::csv("<reader>", e))?;
        fixtures.push(row.into_fixture());
    }

    Ok(fixtures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;

    const FIXTURES: &str = "\
name,inflation_rate,electricity_price,yearly_production,self_consumption_rate,install_cost,credit_monthly_payment,insurance_monthly_payment,credit_duration_months,cash_down_payment,annual_consumption,credit_interest_rate,insurance_rate,projection_years
default,5,\"0,25\",7000,70,18799,,,180,0,10000,\"3,89\",\"0,3\",20
flat,0,0.20,5000,100,12000,,,120,2000,8000,0,0,10
";

    #[test]
    fn test_load_fixtures_from_reader() {
        let fixtures = load_fixtures_from_reader(FIXTURES.as_bytes()).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].name, "default");

        let params = SimulationParams::from_raw(&fixtures[0].raw);
        assert_eq!(params, SimulationParams::default());

        let flat = SimulationParams::from_raw(&fixtures[1].raw);
        assert_eq!(flat.inflation_rate, 0.0);
        assert_eq!(flat.cash_down_payment, 2000.0);
        assert_eq!(flat.projection_years, 10);
    }

    #[test]
    fn test_params_from_json_rejects_garbage() {
        assert!(params_from_json("not json").is_err());
        assert!(params_from_json("{}").is_ok());
    }
}

use crate::core::energy_system::component::EnergyCarrier;
use crate::errors::ConfigurationError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;

/// Specific emissions and prices of the energy carriers for one year.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ScenarioYear {
    pub year: u32,
    #[serde(rename = "spec_CO2_gas [g/kWh]")]
    pub spec_co2_gas: f64,
    #[serde(rename = "spec_CO2_el [g/kWh]")]
    pub spec_co2_el: f64,
    #[serde(rename = "cost_gas [ct/kWh]")]
    pub cost_gas: f64,
    #[serde(rename = "cost_el_hh [ct/kWh]")]
    pub cost_el_hh: f64,
}

impl ScenarioYear {
    /// Specific emissions of the carrier, in g/kWh
    pub fn spec_co2(&self, carrier: EnergyCarrier) -> f64 {
        match carrier {
            EnergyCarrier::Gas => self.spec_co2_gas,
            EnergyCarrier::Electricity => self.spec_co2_el,
        }
    }

    /// Household price of the carrier, in ct/kWh
    pub fn spec_cost(&self, carrier: EnergyCarrier) -> f64 {
        match carrier {
            EnergyCarrier::Gas => self.cost_gas,
            EnergyCarrier::Electricity => self.cost_el_hh,
        }
    }
}

/// Development of emission factors and energy prices over the years of a game.
#[derive(Clone, Debug)]
pub struct Scenario {
    years: IndexMap<u32, ScenarioYear>,
}

impl Scenario {
    pub fn new(csv: impl Read) -> anyhow::Result<Self> {
        let rows = csv::Reader::from_reader(csv)
            .deserialize::<ScenarioYear>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: impl IntoIterator<Item = ScenarioYear>) -> Self {
        Self {
            years: rows.into_iter().map(|row| (row.year, row)).collect(),
        }
    }

    pub fn year(&self, year: u32) -> Result<&ScenarioYear, ConfigurationError> {
        self.years
            .get(&year)
            .ok_or(ConfigurationError::MissingScenarioYear(year))
    }

    /// Check that every year of a game is covered, so that a gap fails before play starts.
    pub fn check_covers(&self, first_year: u32, last_year: u32) -> Result<(), ConfigurationError> {
        (first_year..=last_year).try_for_each(|year| self.year(year).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    const SCENARIO_CSV: &str = "year,spec_CO2_gas [g/kWh],spec_CO2_el [g/kWh],cost_gas [ct/kWh],cost_el_hh [ct/kWh]
2022,201,420,12.0,32.0
2023,201,400,12.5,33.0
2024,200,380,13.0,34.0
";

    #[fixture]
    fn scenario() -> Scenario {
        Scenario::new(SCENARIO_CSV.as_bytes()).unwrap()
    }

    #[rstest]
    fn test_read_scenario(scenario: Scenario) {
        let year = scenario.year(2023).unwrap();

        assert_eq!(year.spec_co2_gas, 201.);
        assert_eq!(year.spec_co2(EnergyCarrier::Electricity), 400.);
        assert_eq!(year.spec_cost(EnergyCarrier::Gas), 12.5);
        assert_eq!(year.spec_cost(EnergyCarrier::Electricity), 33.);
    }

    #[rstest]
    fn test_missing_year(scenario: Scenario) {
        assert_eq!(
            scenario.year(2030).unwrap_err(),
            ConfigurationError::MissingScenarioYear(2030)
        );
        assert!(scenario.check_covers(2022, 2024).is_ok());
        assert_eq!(
            scenario.check_covers(2022, 2025).unwrap_err(),
            ConfigurationError::MissingScenarioYear(2025)
        );
    }

    #[rstest]
    fn test_malformed_csv_is_rejected() {
        assert!(Scenario::new("year,cost_gas [ct/kWh]\n2022,12.0\n".as_bytes()).is_err());
    }
}

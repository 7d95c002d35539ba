use crate::core::energy_system::controller::UNCOVERED_HEAT;
use crate::core::energy_system::system::{
    annual_totals, EnergyTable, System, EMISSIONS_TOTAL, ENERGY_COST_TOTAL,
};
use crate::core::scenario::Scenario;
use crate::core::space_heat_demand::building::Building;
use crate::core::units::wh_to_kwh;
use crate::core::user::UserProfile;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const EVENT_BALANCE: &str = "Event balance [Euro/a]";
pub const INVESTMENT_COST: &str = "Investment cost [Euro/a]";
pub const REVENUES: &str = "Revenues [Euro/a]";
pub const EXPENSES: &str = "Expenses [Euro/a]";
pub const BALANCE: &str = "Balance [Euro/a]";
pub const COMFORT_DEVIATION: &str = "Comfort deviation [degC]";

/// Everything one simulated year produces.
#[derive(Clone, Debug)]
pub struct YearResults {
    pub year: u32,
    /// Annual heat demand and its terms, in kWh/a
    pub building: IndexMap<String, f64>,
    /// Annual sums of the system's energy channels, in Wh
    pub system: IndexMap<String, f64>,
    /// Emissions per component, of the household grid draw and in total, in t
    pub ecology: IndexMap<String, f64>,
    /// Energy cost channels and the household's annual money flows, in Euro
    pub economy: IndexMap<String, f64>,
    pub comfort: IndexMap<String, f64>,
    pub hourly_heat_demand: Vec<f64>,
    pub hourly_el_demand: Vec<f64>,
    pub hourly_system: EnergyTable,
}

impl YearResults {
    pub fn total_emissions(&self) -> f64 {
        self.ecology.get(EMISSIONS_TOTAL).copied().unwrap_or_default()
    }

    pub fn balance(&self) -> f64 {
        self.economy.get(BALANCE).copied().unwrap_or_default()
    }

    pub fn comfort_deviation(&self) -> f64 {
        self.comfort
            .get(COMFORT_DEVIATION)
            .copied()
            .unwrap_or_default()
    }

    /// All annual results in ledger column order
    pub fn annual_channels(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.building
            .iter()
            .chain(&self.system)
            .chain(&self.ecology)
            .chain(&self.economy)
            .chain(&self.comfort)
    }
}

/// Turns one year of weather and behaviour into the annual building, system, ecology,
/// economy and comfort results.
#[derive(Clone, Debug)]
pub struct AnnualSimulator {
    scenario: Arc<Scenario>,
}

impl AnnualSimulator {
    pub fn new(scenario: Arc<Scenario>) -> Self {
        Self { scenario }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Simulate one year.
    ///
    /// Feed-in tariffs that expire in `year` are renewed before the year is simulated. The
    /// user's transaction log is read but not cleared.
    ///
    /// Arguments:
    /// * `year` - calendar year, selecting emission factors and prices from the scenario
    /// * `building` - the building in its current state of renovation
    /// * `user` - the household
    /// * `system` - the household's energy system
    pub fn simulate_year(
        &self,
        year: u32,
        building: &Building,
        user: &UserProfile,
        system: &mut System,
    ) -> anyhow::Result<YearResults> {
        system.update_feed_in_tariffs(year);

        let building_results = building.calc(user.set_point_temperature);
        let hourly_el_demand = user.hourly_el_demand();
        debug!(
            "{year}: heat demand {:.0} kWh, design heat load {:.0} W",
            building_results
                .annual
                .get("Heat demand [kWh/a]")
                .copied()
                .unwrap_or_default(),
            building_results.design_heat_load()
        );

        let hourly_system = system.calc_energy(
            &building_results.hourly_heat_demand,
            &hourly_el_demand,
            building.weather(),
        )?;
        let system_totals = annual_totals(&hourly_system);

        let uncovered_heat = system_totals
            .get(UNCOVERED_HEAT)
            .copied()
            .unwrap_or_default();
        if uncovered_heat > 0. {
            warn!(
                "{year}: heating system could not cover {:.0} kWh of heat demand",
                wh_to_kwh(uncovered_heat)
            );
        }

        let ecology = system.calc_emissions(year, &self.scenario, &hourly_system)?;
        let mut economy = system.calc_energy_cost(year, &self.scenario, &hourly_system)?;

        let (revenues, expenses) = user.calc_economy();
        let energy_cost = economy
            .get(ENERGY_COST_TOTAL)
            .copied()
            .unwrap_or_default();
        let event_balance = user.transactions.event_balance();
        let action_balance = user.transactions.action_balance();
        let balance = revenues - expenses - energy_cost + event_balance - action_balance;

        economy.insert(EVENT_BALANCE.into(), event_balance);
        economy.insert(INVESTMENT_COST.into(), action_balance);
        economy.insert(REVENUES.into(), revenues);
        economy.insert(EXPENSES.into(), expenses);
        economy.insert(BALANCE.into(), balance);

        let comfort = IndexMap::from([(COMFORT_DEVIATION.to_string(), user.comfort_deviation())]);

        let results = YearResults {
            year,
            building: building_results.annual,
            system: system_totals,
            ecology,
            economy,
            comfort,
            hourly_heat_demand: building_results.hourly_heat_demand,
            hourly_el_demand,
            hourly_system,
        };
        info!(
            "{year}: CO2 emissions {:.2} t, balance {:.2} Euro, comfort deviation {:.1} K",
            results.total_emissions(),
            results.balance(),
            results.comfort_deviation()
        );

        Ok(results)
    }
}

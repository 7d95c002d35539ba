use crate::core::energy_system::component::{EnergyCarrier, EnergyComponent};
use crate::core::energy_system::controller::{
    Controller, HourlyResults, ELECTRICITY_GRID_HOUSEHOLD,
};
use crate::core::scenario::Scenario;
use crate::core::units::{cost_in_euro, emissions_in_tonnes, kw_to_w};
use crate::errors::ConfigurationError;
use crate::external_conditions::WeatherSeries;
use crate::input::SystemInput;
use anyhow::bail;
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::info;

pub const EMISSIONS_GRID_HOUSEHOLD: &str = "CO2 emissions grid household [t]";
pub const EMISSIONS_TOTAL: &str = "CO2 emissions total [t]";
pub const ENERGY_COST_GRID_HOUSEHOLD: &str = "Energy cost grid household [Euro]";
pub const ENERGY_COST_TOTAL: &str = "Energy cost total [Euro]";
pub const INVESTMENT_COST_TOTAL: &str = "Investment cost total [Euro]";

/// Hourly results of a year, keyed by result channel, in Wh
pub type EnergyTable = IndexMap<String, Vec<f64>>;

/// Sum every channel of an energy table over the year, in Wh
pub fn annual_totals(energy: &EnergyTable) -> IndexMap<String, f64> {
    energy
        .iter()
        .map(|(channel, hourly)| (channel.clone(), hourly.iter().sum()))
        .collect()
}

/// The household's energy system: named components in dispatch order and the controller
/// matching them.
#[derive(Clone, Debug)]
pub struct System {
    components: IndexMap<String, EnergyComponent>,
    controller: Controller,
}

impl System {
    /// Arguments:
    /// * `input` - the configured components, in dispatch order
    /// * `construction_year` - year in which the configured components were installed
    pub fn from_input(input: &SystemInput, construction_year: u32) -> Self {
        let components: IndexMap<String, EnergyComponent> = input
            .0
            .iter()
            .map(|(name, component)| {
                (
                    name.clone(),
                    EnergyComponent::from_input(name, component, construction_year),
                )
            })
            .collect();
        let controller = Controller::for_components(components.values());

        Self {
            components,
            controller,
        }
    }

    pub fn components(&self) -> &IndexMap<String, EnergyComponent> {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&EnergyComponent> {
        self.components.get(name)
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut EnergyComponent> {
        self.components.get_mut(name)
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut EnergyComponent> {
        self.components.values_mut()
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    /// Add a component at the end of the dispatch order.
    pub fn add_component(
        &mut self,
        name: &str,
        component: EnergyComponent,
    ) -> Result<(), ConfigurationError> {
        if self.components.contains_key(name) {
            return Err(ConfigurationError::DuplicateComponent(name.into()));
        }

        self.components.insert(name.into(), component);
        self.controller = Controller::for_components(self.components.values());
        Ok(())
    }

    /// Remove a component, keeping the order of the others.
    pub fn remove_component(&mut self, name: &str) -> Result<EnergyComponent, ConfigurationError> {
        let component = self
            .components
            .shift_remove(name)
            .ok_or_else(|| ConfigurationError::UnknownComponent(name.into()))?;
        self.controller = Controller::for_components(self.components.values());

        Ok(component)
    }

    /// Combined nominal heat output of all heat producers, in W
    pub fn heat_capacity(&self) -> f64 {
        self.components
            .values()
            .filter(|component| component.produces_heat())
            .map(|component| kw_to_w(component.power_nom()))
            .sum()
    }

    /// Renew the feed-in tariffs of all photovoltaic arrays whose validity has run out.
    pub fn update_feed_in_tariffs(&mut self, year: u32) {
        for component in self.components.values_mut() {
            if let EnergyComponent::Photovoltaic(pv) = component {
                pv.update_feed_in_tariff(year);
            }
        }
    }

    /// Run the controller for every hour of the year.
    ///
    /// Arguments:
    /// * `heat_demand` - hourly heat demand of the building, in W
    /// * `el_demand` - hourly household electricity demand, in W
    /// * `weather` - weather of the representative year
    pub fn calc_energy(
        &self,
        heat_demand: &[f64],
        el_demand: &[f64],
        weather: &WeatherSeries,
    ) -> anyhow::Result<EnergyTable> {
        let records = weather.records();
        if heat_demand.len() != records.len() || el_demand.len() != records.len() {
            bail!(
                "Hourly demand series ({} heat, {} electricity) do not match the {} hours of weather data",
                heat_demand.len(),
                el_demand.len(),
                records.len()
            );
        }

        let hourly_results: Vec<HourlyResults> = (0..records.len())
            .into_par_iter()
            .map(|hour| {
                self.controller.control(
                    heat_demand[hour],
                    el_demand[hour],
                    &records[hour],
                    &self.components,
                )
            })
            .collect();

        let mut energy = EnergyTable::new();
        for results in hourly_results {
            for (channel, value) in results {
                energy
                    .entry(channel)
                    .or_insert_with(|| Vec::with_capacity(records.len()))
                    .push(value);
            }
        }

        Ok(energy)
    }

    /// Annual CO2 emissions of every component and of the grid electricity drawn by the
    /// household, with their total, in t.
    pub fn calc_emissions(
        &self,
        year: u32,
        scenario: &Scenario,
        energy: &EnergyTable,
    ) -> Result<IndexMap<String, f64>, ConfigurationError> {
        let factors = scenario.year(year)?;
        let totals = annual_totals(energy);

        let mut emissions: IndexMap<String, f64> = self
            .components
            .values()
            .map(|component| {
                let energy_wh = totals
                    .get(&component.channels().energy)
                    .copied()
                    .unwrap_or_default();
                (
                    component.channels().emissions.clone(),
                    component.calc_emissions(energy_wh, factors.spec_co2(component.carrier())),
                )
            })
            .collect();
        emissions.insert(
            EMISSIONS_GRID_HOUSEHOLD.into(),
            emissions_in_tonnes(
                grid_household_energy(&totals),
                factors.spec_co2(EnergyCarrier::Electricity),
            ),
        );
        let total: f64 = emissions.values().sum();
        emissions.insert(EMISSIONS_TOTAL.into(), total);

        Ok(emissions)
    }

    /// Annual energy cost of every component and of the grid electricity drawn by the
    /// household, with their total, in Euro. Feed-in revenue enters as a negative cost.
    pub fn calc_energy_cost(
        &self,
        year: u32,
        scenario: &Scenario,
        energy: &EnergyTable,
    ) -> Result<IndexMap<String, f64>, ConfigurationError> {
        let prices = scenario.year(year)?;
        let totals = annual_totals(energy);

        let mut costs: IndexMap<String, f64> = self
            .components
            .values()
            .map(|component| {
                let energy_wh = totals
                    .get(component.billed_energy_channel())
                    .copied()
                    .unwrap_or_default();
                (
                    component.channels().cost.clone(),
                    component.calc_energy_cost(energy_wh, prices.spec_cost(component.carrier())),
                )
            })
            .collect();
        costs.insert(
            ENERGY_COST_GRID_HOUSEHOLD.into(),
            cost_in_euro(
                grid_household_energy(&totals),
                prices.spec_cost(EnergyCarrier::Electricity),
            ),
        );
        let total: f64 = costs.values().sum();
        costs.insert(ENERGY_COST_TOTAL.into(), total);

        Ok(costs)
    }

    /// Investment cost of every component with their total, in Euro
    pub fn calc_investment_cost(&self) -> IndexMap<String, f64> {
        let mut costs: IndexMap<String, f64> = self
            .components
            .values()
            .map(|component| {
                (
                    component.channels().investment.clone(),
                    component.calc_investment_cost(),
                )
            })
            .collect();
        let total: f64 = costs.values().sum();
        costs.insert(INVESTMENT_COST_TOTAL.into(), total);

        costs
    }

    pub fn log_summary(&self) {
        for (name, component) in &self.components {
            info!(
                "System component '{name}': {} with {:.1} kW nominal power",
                component.kind(),
                component.power_nom()
            );
        }
        info!("Controller: {}", self.controller);
    }
}

fn grid_household_energy(totals: &IndexMap<String, f64>) -> f64 {
    totals
        .get(ELECTRICITY_GRID_HOUSEHOLD)
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::energy_system::controller::{ELECTRICITY_FEED_IN, UNCOVERED_HEAT};
    use crate::core::scenario::ScenarioYear;
    use crate::core::units::HOURS_PER_YEAR;
    use crate::external_conditions::WeatherRecord;
    use crate::input::{ComponentInput, GasBoilerInput, PhotovoltaicInput};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn boiler_input(power_nom: f64) -> ComponentInput {
        ComponentInput::GasBoiler(GasBoilerInput {
            power_nom,
            efficiency: 0.9,
            investment_cost: None,
        })
    }

    fn pv_input(power_nom: f64) -> ComponentInput {
        ComponentInput::Photovoltaic(PhotovoltaicInput {
            power_nom,
            tilt_angle: 30.,
            azimuth_angle: 0.,
            efficiency_param: 1.,
            neg_temp_coeff: 0.004,
            feed_in_tariff: Default::default(),
            investment_cost: None,
        })
    }

    #[fixture]
    fn system() -> System {
        System::from_input(
            &SystemInput(IndexMap::from([
                ("Boiler".to_string(), boiler_input(10.)),
                ("PV".to_string(), pv_input(5.)),
            ])),
            2022,
        )
    }

    #[fixture]
    fn scenario() -> Scenario {
        Scenario::from_rows([ScenarioYear {
            year: 2022,
            spec_co2_gas: 200.,
            spec_co2_el: 400.,
            cost_gas: 10.,
            cost_el_hh: 30.,
        }])
    }

    /// Half of the hours sunny with 1 kW per kWp of generation, the other half dark
    #[fixture]
    fn weather() -> WeatherSeries {
        let records = (0..HOURS_PER_YEAR)
            .map(|hour| {
                if hour % 2 == 0 {
                    WeatherRecord {
                        air_temp: 5.,
                        direct_beam_radiation: 1000.,
                        solar_zenith_angle: 30.,
                        ..Default::default()
                    }
                } else {
                    WeatherRecord {
                        air_temp: 5.,
                        solar_zenith_angle: 90.,
                        ..Default::default()
                    }
                }
            })
            .collect();
        WeatherSeries::new(48.1, 11.6, records).unwrap()
    }

    #[rstest]
    fn test_controller_follows_components(mut system: System) {
        assert_eq!(system.controller(), Controller::Combined);

        system.remove_component("PV").unwrap();
        assert_eq!(system.controller(), Controller::HeatOnly);

        system.remove_component("Boiler").unwrap();
        assert_eq!(system.controller(), Controller::GridOnly);
    }

    #[rstest]
    fn test_component_names_are_unique(mut system: System) {
        let duplicate = EnergyComponent::from_input("PV", &pv_input(2.), 2030);

        assert_eq!(
            system.add_component("PV", duplicate).unwrap_err(),
            ConfigurationError::DuplicateComponent("PV".into())
        );
        assert_eq!(
            system.remove_component("Heat pump").unwrap_err(),
            ConfigurationError::UnknownComponent("Heat pump".into())
        );
    }

    #[rstest]
    fn test_add_component_keeps_order(mut system: System) {
        system
            .add_component(
                "Backup",
                EnergyComponent::from_input("Backup", &boiler_input(4.), 2030),
            )
            .unwrap();

        assert_eq!(
            system.components().keys().collect::<Vec<_>>(),
            vec!["Boiler", "PV", "Backup"]
        );
        assert_eq!(system.heat_capacity(), 14_000.);
    }

    #[rstest]
    fn test_calc_energy_table(system: System, weather: WeatherSeries) {
        let heat_demand = vec![12_000.; HOURS_PER_YEAR];
        let el_demand = vec![1_000.; HOURS_PER_YEAR];

        let energy = system.calc_energy(&heat_demand, &el_demand, &weather).unwrap();
        let totals = annual_totals(&energy);

        assert!(energy.values().all(|hourly| hourly.len() == HOURS_PER_YEAR));
        assert_eq!(totals["Heat Boiler [Wh]"], 10_000. * 8760.);
        assert_eq!(totals[UNCOVERED_HEAT], 2_000. * 8760.);
        // sunny hours export 4 kWh each, dark hours draw 1 kWh each from the grid
        assert_relative_eq!(totals[ELECTRICITY_FEED_IN], 4_000. * 4380., max_relative = 1e-9);
        assert_relative_eq!(totals[ELECTRICITY_GRID_HOUSEHOLD], 1_000. * 4380.);
    }

    #[rstest]
    fn test_demand_series_must_match_weather(system: System, weather: WeatherSeries) {
        assert!(system
            .calc_energy(&[0.; 10], &vec![0.; HOURS_PER_YEAR], &weather)
            .is_err());
    }

    #[rstest]
    fn test_emissions_and_cost_totals(system: System, scenario: Scenario, weather: WeatherSeries) {
        let heat_demand = vec![900.; HOURS_PER_YEAR];
        let el_demand = vec![1_000.; HOURS_PER_YEAR];
        let energy = system.calc_energy(&heat_demand, &el_demand, &weather).unwrap();

        let emissions = system.calc_emissions(2022, &scenario, &energy).unwrap();
        let costs = system.calc_energy_cost(2022, &scenario, &energy).unwrap();

        // 1000 Wh of gas and 0.5 * 1000 Wh of grid electricity per hour on average
        assert_relative_eq!(
            emissions["CO2 emissions Boiler [t]"],
            8760. * 0.0002,
            max_relative = 1e-9
        );
        assert_eq!(emissions["CO2 emissions PV [t]"], 0.);
        assert_relative_eq!(
            emissions[EMISSIONS_GRID_HOUSEHOLD],
            4380. * 0.0004,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            costs["Energy cost PV [Euro]"],
            -4380. * 4. * 6.24 / 100.,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            costs[ENERGY_COST_GRID_HOUSEHOLD],
            4380. * 0.3,
            max_relative = 1e-9
        );

        for (results, total_key) in [(&emissions, EMISSIONS_TOTAL), (&costs, ENERGY_COST_TOTAL)] {
            let channel_sum: f64 = results
                .iter()
                .filter(|(key, _)| key.as_str() != total_key)
                .map(|(_, value)| value)
                .sum();
            assert_relative_eq!(results[total_key], channel_sum, max_relative = 1e-12);
        }
    }

    #[rstest]
    fn test_missing_scenario_year(system: System, scenario: Scenario, weather: WeatherSeries) {
        let energy = system
            .calc_energy(&vec![0.; HOURS_PER_YEAR], &vec![0.; HOURS_PER_YEAR], &weather)
            .unwrap();

        assert_eq!(
            system.calc_emissions(2023, &scenario, &energy).unwrap_err(),
            ConfigurationError::MissingScenarioYear(2023)
        );
    }

    #[rstest]
    fn test_investment_cost(system: System) {
        let costs = system.calc_investment_cost();

        assert_relative_eq!(
            costs["Investment cost Boiler [Euro]"],
            10. * 400. * 10f64.powf(-0.3)
        );
        assert_relative_eq!(
            costs[INVESTMENT_COST_TOTAL],
            costs["Investment cost Boiler [Euro]"] + costs["Investment cost PV [Euro]"]
        );
    }

    #[rstest]
    fn test_feed_in_tariffs_renew_after_validity(mut system: System) {
        system.update_feed_in_tariffs(2030);
        let EnergyComponent::Photovoltaic(pv) = system.component("PV").unwrap() else {
            panic!("expected a photovoltaic component");
        };
        assert_eq!(pv.feed_in_tariff(), 6.24);

        system.update_feed_in_tariffs(2042);
        let EnergyComponent::Photovoltaic(pv) = system.component("PV").unwrap() else {
            panic!("expected a photovoltaic component");
        };
        assert!(pv.feed_in_tariff() < 6.24);
    }
}

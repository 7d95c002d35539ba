use crate::core::energy_system::component::EnergyComponent;
use crate::core::units::kw_to_w;
use crate::external_conditions::WeatherRecord;
use indexmap::IndexMap;
use strum_macros::Display;

pub const UNCOVERED_HEAT: &str = "Uncovered heat [Wh]";
pub const ELECTRICITY_FEED_IN: &str = "Electricity feed-in [Wh]";
pub const ELECTRICITY_GRID_HOUSEHOLD: &str = "Electricity grid household [Wh]";

/// Results of one hour, keyed by result channel, in Wh
pub type HourlyResults = IndexMap<String, f64>;

/// Stateless hourly balancer of heat and electricity.
///
/// Which balances are performed depends on the kinds of component present in the system.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Controller {
    HeatOnly,
    ElectricityOnly,
    Combined,
    GridOnly,
}

impl Controller {
    pub fn for_components<'a>(components: impl IntoIterator<Item = &'a EnergyComponent>) -> Self {
        let (heat, electricity) = components
            .into_iter()
            .fold((false, false), |(heat, electricity), component| {
                (
                    heat || component.produces_heat(),
                    electricity || component.produces_electricity(),
                )
            });

        match (heat, electricity) {
            (true, true) => Self::Combined,
            (true, false) => Self::HeatOnly,
            (false, true) => Self::ElectricityOnly,
            (false, false) => Self::GridOnly,
        }
    }

    /// Balance heat and electricity for one hour.
    ///
    /// Arguments:
    /// * `heat_load` - heat demand of the building, in W (negative demand is treated as zero)
    /// * `el_load` - household electricity demand, in W
    /// * `record` - weather for the hour
    /// * `components` - the components of the system, in dispatch order
    pub fn control(
        &self,
        heat_load: f64,
        el_load: f64,
        record: &WeatherRecord,
        components: &IndexMap<String, EnergyComponent>,
    ) -> HourlyResults {
        let mut results = HourlyResults::new();

        match self {
            Self::HeatOnly | Self::Combined => {
                balance_heat(heat_load, record, components, &mut results)
            }
            Self::ElectricityOnly | Self::GridOnly => {
                results.insert(UNCOVERED_HEAT.into(), heat_load.max(0.));
            }
        }

        match self {
            Self::ElectricityOnly | Self::Combined => {
                balance_electricity(el_load, record, components, &mut results)
            }
            Self::HeatOnly | Self::GridOnly => {
                results.insert(ELECTRICITY_FEED_IN.into(), 0.);
                results.insert(ELECTRICITY_GRID_HOUSEHOLD.into(), el_load.max(0.));
            }
        }

        results
    }
}

/// Dispatch the heat load to the heat producers in order, each up to its nominal power.
/// Whatever is left once every producer is at capacity is reported as uncovered.
fn balance_heat(
    heat_load: f64,
    record: &WeatherRecord,
    components: &IndexMap<String, EnergyComponent>,
    results: &mut HourlyResults,
) {
    let mut remaining = heat_load.max(0.);

    for component in components.values().filter(|c| c.produces_heat()) {
        let delivered = remaining.min(kw_to_w(component.power_nom()));
        remaining -= delivered;

        let channels = component.channels();
        results.insert(channels.heat.clone(), delivered);
        results.insert(
            channels.energy.clone(),
            component.calc_heat_energy(delivered, record),
        );
    }

    results.insert(UNCOVERED_HEAT.into(), remaining);
}

/// Net the generation of all photovoltaic arrays against the household load. Surplus is fed
/// into the grid, split between arrays in proportion to what they generated.
fn balance_electricity(
    el_load: f64,
    record: &WeatherRecord,
    components: &IndexMap<String, EnergyComponent>,
    results: &mut HourlyResults,
) {
    let generation = components
        .values()
        .filter_map(|component| match component {
            EnergyComponent::Photovoltaic(pv) => Some((component, pv.calc_energy(record))),
            _ => None,
        })
        .collect::<Vec<_>>();
    let total_generation: f64 = generation.iter().map(|(_, energy)| energy).sum();

    let net = el_load - total_generation;
    let feed_in = (-net).max(0.);
    let grid = net.max(0.);

    for (component, energy) in generation {
        let channels = component.channels();
        let share = if total_generation > 0. {
            energy / total_generation
        } else {
            0.
        };
        results.insert(channels.energy.clone(), energy);
        results.insert(channels.feed_in.clone(), feed_in * share);
    }

    results.insert(ELECTRICITY_FEED_IN.into(), feed_in);
    results.insert(ELECTRICITY_GRID_HOUSEHOLD.into(), grid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{
        ComponentInput, GasBoilerInput, HeatPumpAirInput, PhotovoltaicInput, QuadraticCoefficients,
    };
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn boiler(power_nom: f64) -> ComponentInput {
        ComponentInput::GasBoiler(GasBoilerInput {
            power_nom,
            efficiency: 0.9,
            investment_cost: None,
        })
    }

    fn pv(power_nom: f64) -> ComponentInput {
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

    fn heat_pump(power_nom: f64) -> ComponentInput {
        ComponentInput::HeatPumpAir(HeatPumpAirInput {
            power_nom,
            heating_curve: QuadraticCoefficients {
                constant: 40.,
                linear: -0.6,
                quadratic: 0.,
            },
            cop_curve: QuadraticCoefficients {
                constant: 7.,
                linear: -0.12,
                quadratic: 0.0006,
            },
            investment_cost: None,
        })
    }

    fn components(inputs: &[(&str, ComponentInput)]) -> IndexMap<String, EnergyComponent> {
        inputs
            .iter()
            .map(|(name, input)| {
                (
                    name.to_string(),
                    EnergyComponent::from_input(name, input, 2022),
                )
            })
            .collect()
    }

    #[fixture]
    fn sunny_hour() -> WeatherRecord {
        // 1000 W/m2 square on to the modules at 25 degC module temperature: 1 kW per kWp
        WeatherRecord {
            air_temp: 5.,
            direct_beam_radiation: 1000.,
            solar_zenith_angle: 30.,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(vec![("Boiler", boiler(10.))], Controller::HeatOnly)]
    #[case(vec![("PV", pv(5.))], Controller::ElectricityOnly)]
    #[case(vec![("PV", pv(5.)), ("HP", heat_pump(8.))], Controller::Combined)]
    #[case(vec![], Controller::GridOnly)]
    fn test_controller_selection(
        #[case] inputs: Vec<(&str, ComponentInput)>,
        #[case] expected: Controller,
    ) {
        assert_eq!(
            Controller::for_components(components(&inputs).values()),
            expected
        );
    }

    #[rstest]
    fn test_capacity_clamp(sunny_hour: WeatherRecord) {
        let components = components(&[("Boiler", boiler(10.))]);

        let results = Controller::HeatOnly.control(12_500., 300., &sunny_hour, &components);

        assert_eq!(results["Heat Boiler [Wh]"], 10_000.);
        assert_eq!(results[UNCOVERED_HEAT], 2_500.);
        assert_relative_eq!(results["Energy Boiler [Wh]"], 10_000. / 0.9);
        assert_eq!(results[ELECTRICITY_GRID_HOUSEHOLD], 300.);
        assert_eq!(results[ELECTRICITY_FEED_IN], 0.);
    }

    #[rstest]
    fn test_load_within_capacity_is_fully_covered(sunny_hour: WeatherRecord) {
        let components = components(&[("Boiler", boiler(10.))]);

        let results = Controller::HeatOnly.control(4_000., 300., &sunny_hour, &components);

        assert_eq!(results["Heat Boiler [Wh]"], 4_000.);
        assert_eq!(results[UNCOVERED_HEAT], 0.);
    }

    #[rstest]
    fn test_negative_heat_load_is_treated_as_zero(sunny_hour: WeatherRecord) {
        let components = components(&[("Boiler", boiler(10.))]);

        let results = Controller::HeatOnly.control(-800., 300., &sunny_hour, &components);

        assert_eq!(results["Heat Boiler [Wh]"], 0.);
        assert_eq!(results["Energy Boiler [Wh]"], 0.);
        assert_eq!(results[UNCOVERED_HEAT], 0.);
    }

    #[rstest]
    fn test_heat_cascades_across_producers(sunny_hour: WeatherRecord) {
        let components = components(&[("HP", heat_pump(6.)), ("Boiler", boiler(10.))]);

        let results = Controller::HeatOnly.control(9_000., 0., &sunny_hour, &components);

        assert_eq!(results["Heat HP [Wh]"], 6_000.);
        assert_eq!(results["Heat Boiler [Wh]"], 3_000.);
        assert_eq!(results[UNCOVERED_HEAT], 0.);
    }

    #[rstest]
    fn test_pv_surplus_is_fed_in(sunny_hour: WeatherRecord) {
        let components = components(&[("PV", pv(5.))]);

        let results = Controller::ElectricityOnly.control(2_000., 800., &sunny_hour, &components);

        assert_relative_eq!(results["Energy PV [Wh]"], 5_000., max_relative = 1e-9);
        assert_relative_eq!(results[ELECTRICITY_FEED_IN], 4_200., max_relative = 1e-9);
        assert_relative_eq!(results["Electricity feed-in PV [Wh]"], 4_200., max_relative = 1e-9);
        assert_eq!(results[ELECTRICITY_GRID_HOUSEHOLD], 0.);
        assert_eq!(results[UNCOVERED_HEAT], 2_000.);
    }

    #[rstest]
    fn test_pv_deficit_is_drawn_from_grid(sunny_hour: WeatherRecord) {
        let components = components(&[("PV", pv(5.))]);

        let results = Controller::ElectricityOnly.control(0., 6_500., &sunny_hour, &components);

        assert_eq!(results[ELECTRICITY_FEED_IN], 0.);
        assert_relative_eq!(results[ELECTRICITY_GRID_HOUSEHOLD], 1_500., max_relative = 1e-9);
    }

    #[rstest]
    fn test_feed_in_is_shared_between_arrays(sunny_hour: WeatherRecord) {
        let components = components(&[("PV house", pv(3.)), ("PV garage", pv(1.))]);

        let results = Controller::ElectricityOnly.control(0., 2_000., &sunny_hour, &components);

        assert_relative_eq!(results[ELECTRICITY_FEED_IN], 2_000., max_relative = 1e-9);
        assert_relative_eq!(results["Electricity feed-in PV house [Wh]"], 1_500., max_relative = 1e-9);
        assert_relative_eq!(results["Electricity feed-in PV garage [Wh]"], 500., max_relative = 1e-9);
    }

    #[rstest]
    fn test_combined_merges_both_balances(sunny_hour: WeatherRecord) {
        let components = components(&[("Boiler", boiler(10.)), ("PV", pv(5.))]);

        let results = Controller::Combined.control(3_000., 1_000., &sunny_hour, &components);

        assert_eq!(
            results.keys().map(String::as_str).collect::<Vec<_>>(),
            vec![
                "Heat Boiler [Wh]",
                "Energy Boiler [Wh]",
                UNCOVERED_HEAT,
                "Energy PV [Wh]",
                "Electricity feed-in PV [Wh]",
                ELECTRICITY_FEED_IN,
                ELECTRICITY_GRID_HOUSEHOLD,
            ]
        );
        assert_eq!(results["Heat Boiler [Wh]"], 3_000.);
        assert_relative_eq!(results[ELECTRICITY_FEED_IN], 4_000., max_relative = 1e-9);
    }

    #[rstest]
    fn test_grid_only(sunny_hour: WeatherRecord) {
        let results = Controller::GridOnly.control(1_000., 400., &sunny_hour, &IndexMap::new());

        assert_eq!(results[UNCOVERED_HEAT], 1_000.);
        assert_eq!(results[ELECTRICITY_GRID_HOUSEHOLD], 400.);
    }
}

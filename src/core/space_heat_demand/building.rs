use crate::core::material_properties::AIR_DENSITY;
use crate::core::space_heat_demand::envelope::{
    adjacent_space_temperature, attic_heating_factor, basement_heating_factor, BuildingEnvelope,
};
use crate::core::units::wh_to_kwh;
use crate::external_conditions::{irradiance_on_tilted_plane, WeatherRecord, WeatherSeries};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::ops::Add;
use std::sync::Arc;

/// Orientations of the four facades before rotation by the building's orientation offset
/// (south, east, north, west)
const FACADE_ORIENTATIONS: [f64; 4] = [0., 90., 180., 270.];

const VERTICAL_TILT: f64 = 90.;

/// Heat flows across the envelope for one hour, in W (equal to Wh for the one hour step).
///
/// Losses are positive, as are the solar gains.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HourlyHeatBalance {
    pub ventilation: f64,
    pub infiltration: f64,
    pub facade: f64,
    pub window: f64,
    pub roof: f64,
    pub groundplate: f64,
    pub solar_gains: f64,
}

impl HourlyHeatBalance {
    pub fn transmission(&self) -> f64 {
        self.facade + self.window + self.roof + self.groundplate
    }

    pub fn heat_demand(&self) -> f64 {
        self.ventilation + self.transmission() + self.infiltration - self.solar_gains
    }
}

impl Add for HourlyHeatBalance {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            ventilation: self.ventilation + other.ventilation,
            infiltration: self.infiltration + other.infiltration,
            facade: self.facade + other.facade,
            window: self.window + other.window,
            roof: self.roof + other.roof,
            groundplate: self.groundplate + other.groundplate,
            solar_gains: self.solar_gains + other.solar_gains,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BuildingResults {
    /// Annual sums of the heat demand and its loss and gain terms, in kWh/a
    pub annual: IndexMap<String, f64>,
    /// Heat demand for every hour of the year, in W. Negative where gains exceed losses.
    pub hourly_heat_demand: Vec<f64>,
}

impl BuildingResults {
    /// Largest hourly heat demand of the year, in W
    pub fn design_heat_load(&self) -> f64 {
        self.hourly_heat_demand
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
            .max(0.)
    }
}

/// Single-zone steady-state thermal model of the household's building.
#[derive(Clone, Debug)]
pub struct Building {
    pub envelope: BuildingEnvelope,
    weather: Arc<WeatherSeries>,
}

impl Building {
    pub fn new(envelope: BuildingEnvelope, weather: Arc<WeatherSeries>) -> Self {
        Self { envelope, weather }
    }

    pub fn weather(&self) -> &WeatherSeries {
        &self.weather
    }

    /// Heat flows for one hour.
    ///
    /// Arguments:
    /// * `record` - weather for the hour
    /// * `set_point_temperature` - internal air temperature the heating maintains, in deg C
    pub fn hourly_heat_balance(
        &self,
        record: &WeatherRecord,
        set_point_temperature: f64,
    ) -> HourlyHeatBalance {
        let envelope = &self.envelope;
        let areas = envelope.areas();
        let u_values = envelope.u_values();

        let delta_t = set_point_temperature - record.air_temp;
        let delta_t_ground = set_point_temperature - record.ground_temp;
        // Spaces behind an unheated attic or basement sit at the adjacent space temperature.
        // This equals dT * f_corr2ext (or dT_ground * f_corr2ground) without dividing by a
        // temperature difference that can be zero.
        let delta_t_adjacent =
            set_point_temperature - adjacent_space_temperature(envelope.age_class());
        let x_attic = attic_heating_factor(envelope.attic());
        let x_basement = basement_heating_factor(envelope.basement());

        let air_change_loss = envelope.volume_air() * AIR_DENSITY * delta_t;

        let solar_gains = FACADE_ORIENTATIONS
            .iter()
            .map(|orientation| {
                envelope.g_value_window()
                    * (1. - envelope.shading())
                    * irradiance_on_tilted_plane(
                        record,
                        VERTICAL_TILT,
                        normalise_orientation(orientation + envelope.orientation_offset()),
                    )
                    * (areas.window / FACADE_ORIENTATIONS.len() as f64)
            })
            .sum();

        HourlyHeatBalance {
            ventilation: envelope.ventilation_rate * air_change_loss,
            infiltration: envelope.infiltration_rate * air_change_loss,
            facade: u_values.facade * areas.facade * delta_t,
            window: u_values.window * areas.window * delta_t,
            roof: u_values.roof * areas.roof * x_attic * delta_t
                + u_values.upper_ceiling * areas.upper_ceiling * (1. - x_attic) * delta_t_adjacent,
            groundplate: u_values.groundplate
                * (areas.ground + areas.basement_wall)
                * x_basement
                * delta_t_ground
                + u_values.groundplate * areas.ground * (1. - x_basement) * delta_t_adjacent,
            solar_gains,
        }
    }

    /// Heat flows for every hour of the representative year, in hour order.
    pub fn hourly_heat_balances(&self, set_point_temperature: f64) -> Vec<HourlyHeatBalance> {
        self.weather
            .records()
            .par_iter()
            .map(|record| self.hourly_heat_balance(record, set_point_temperature))
            .collect()
    }

    /// Annual heat demand of the building.
    ///
    /// Arguments:
    /// * `set_point_temperature` - internal air temperature the heating maintains, in deg C
    pub fn calc(&self, set_point_temperature: f64) -> BuildingResults {
        let balances = self.hourly_heat_balances(set_point_temperature);

        let hourly_heat_demand: Vec<f64> = balances
            .iter()
            .map(HourlyHeatBalance::heat_demand)
            .collect();
        let totals = balances
            .iter()
            .fold(HourlyHeatBalance::default(), |total, hour| total + *hour);

        let annual = IndexMap::from([
            (
                "Heat demand [kWh/a]".to_string(),
                wh_to_kwh(hourly_heat_demand.iter().sum()),
            ),
            (
                "Ventilation losses [kWh/a]".to_string(),
                wh_to_kwh(totals.ventilation),
            ),
            (
                "Infiltration losses [kWh/a]".to_string(),
                wh_to_kwh(totals.infiltration),
            ),
            (
                "Transmission losses [kWh/a]".to_string(),
                wh_to_kwh(totals.transmission()),
            ),
            (
                "Transmission losses facade [kWh/a]".to_string(),
                wh_to_kwh(totals.facade),
            ),
            (
                "Transmission losses window [kWh/a]".to_string(),
                wh_to_kwh(totals.window),
            ),
            (
                "Transmission losses roof [kWh/a]".to_string(),
                wh_to_kwh(totals.roof),
            ),
            (
                "Transmission losses groundplate [kWh/a]".to_string(),
                wh_to_kwh(totals.groundplate),
            ),
            (
                "Solar gains [kWh/a]".to_string(),
                wh_to_kwh(totals.solar_gains),
            ),
        ]);

        BuildingResults {
            annual,
            hourly_heat_demand,
        }
    }
}

/// Map an azimuth in degrees onto the range -180 to 180
fn normalise_orientation(orientation: f64) -> f64 {
    let orientation = orientation.rem_euclid(360.);
    if orientation > 180. {
        orientation - 360.
    } else {
        orientation
    }
}

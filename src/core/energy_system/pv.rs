use crate::core::energy_system::component::{
    EnergyCarrier, EnergyComponentBehaviour, InvestmentCostCurve, ResultChannels,
};
use crate::core::units::{cost_in_euro, MONTHS_PER_YEAR, WATTS_PER_KILOWATT};
use crate::external_conditions::{irradiance_on_tilted_plane, WeatherRecord};
use crate::input::{FeedInTariffInput, PhotovoltaicInput};
use tracing::info;

const DEFAULT_INVESTMENT_COST: InvestmentCostCurve = InvestmentCostCurve::new(1800., -0.15);

/// Module area per kW of peak power, in m2/kWp
const SPECIFIC_AREA: f64 = 5.;

/// Irradiance at standard test conditions, in W/m2
const IRRADIANCE_STC: f64 = 1000.;

/// Module temperature at standard test conditions, in deg C
const MODULE_TEMPERATURE_STC: f64 = 25.;

/// Module temperature above ambient while generating, in K
const MODULE_TEMPERATURE_LAG: f64 = 20.;

/// Tariff paid for exported electricity, degressing monthly from a reference year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedInTariffScheme {
    reference_year: u32,
    reference_tariff: f64, // ct/kWh
    monthly_degression: f64,
    validity_years: u32,
}

impl FeedInTariffScheme {
    /// Tariff for arrays commissioned in `year`, in ct/kWh
    pub fn tariff_for_year(&self, year: u32) -> f64 {
        let months = MONTHS_PER_YEAR as i32 * (year as i32 - self.reference_year as i32);
        self.reference_tariff * (1. - self.monthly_degression).powi(months)
    }

    pub fn validity_years(&self) -> u32 {
        self.validity_years
    }
}

impl From<FeedInTariffInput> for FeedInTariffScheme {
    fn from(input: FeedInTariffInput) -> Self {
        Self {
            reference_year: input.reference_year,
            reference_tariff: input.reference_tariff,
            monthly_degression: input.monthly_degression,
            validity_years: input.validity_years,
        }
    }
}

/// Roof-mounted photovoltaic array.
///
/// Output follows an empirical efficiency curve in plane-of-array irradiance with a linear
/// temperature derating. Exported electricity is paid at the tariff locked when the array was
/// commissioned (or when the tariff was last renewed).
#[derive(Clone, Debug)]
pub struct Photovoltaic {
    name: String,
    channels: ResultChannels,
    power_nom: f64, // kWp
    tilt_angle: f64,
    azimuth_angle: f64,
    efficiency_param: f64,
    neg_temp_coeff: f64, // 1/K
    construction_year: u32,
    tariff_scheme: FeedInTariffScheme,
    feed_in_tariff: f64, // ct/kWh
    tariff_start_year: u32,
    investment_cost: InvestmentCostCurve,
}

impl Photovoltaic {
    pub fn new(name: &str, input: &PhotovoltaicInput, construction_year: u32) -> Self {
        let tariff_scheme = FeedInTariffScheme::from(input.feed_in_tariff);

        Self {
            name: name.to_string(),
            channels: ResultChannels::for_component(name),
            power_nom: input.power_nom,
            tilt_angle: input.tilt_angle,
            azimuth_angle: input.azimuth_angle,
            efficiency_param: input.efficiency_param,
            neg_temp_coeff: input.neg_temp_coeff,
            construction_year,
            tariff_scheme,
            feed_in_tariff: tariff_scheme.tariff_for_year(construction_year),
            tariff_start_year: construction_year,
            investment_cost: input
                .investment_cost
                .map(Into::into)
                .unwrap_or(DEFAULT_INVESTMENT_COST),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construction_year(&self) -> u32 {
        self.construction_year
    }

    pub fn feed_in_tariff(&self) -> f64 {
        self.feed_in_tariff
    }

    pub fn efficiency_param(&self) -> f64 {
        self.efficiency_param
    }

    /// Adjust the environmental derating, e.g. for soiled modules. Never goes below zero.
    pub fn adjust_efficiency_param(&mut self, delta: f64) -> f64 {
        self.efficiency_param = (self.efficiency_param + delta).max(0.);
        self.efficiency_param
    }

    pub fn module_area(&self) -> f64 {
        self.power_nom * SPECIFIC_AREA
    }

    /// Efficiency at standard test conditions
    pub fn nominal_efficiency(&self) -> f64 {
        if self.power_nom == 0. {
            return 0.;
        }
        self.power_nom * WATTS_PER_KILOWATT as f64 / (IRRADIANCE_STC * self.module_area())
    }

    /// Electricity generated during one hour, in Wh
    pub fn calc_energy(&self, record: &WeatherRecord) -> f64 {
        if self.power_nom == 0. {
            return 0.;
        }

        let irradiance = irradiance_on_tilted_plane(record, self.tilt_angle, self.azimuth_angle);
        if irradiance <= 0. {
            return 0.;
        }

        let module_temperature = record.air_temp + MODULE_TEMPERATURE_LAG;
        let temperature_factor =
            (1. - self.neg_temp_coeff * (module_temperature - MODULE_TEMPERATURE_STC)).max(0.);

        irradiance
            * self.module_area()
            * self.nominal_efficiency()
            * relative_efficiency(irradiance)
            * self.efficiency_param
            * temperature_factor
    }

    /// Renew the feed-in tariff once its validity window has run out.
    ///
    /// Returns whether the tariff changed.
    pub fn update_feed_in_tariff(&mut self, year: u32) -> bool {
        if year < self.tariff_start_year + self.tariff_scheme.validity_years() {
            return false;
        }

        let previous = self.feed_in_tariff;
        self.feed_in_tariff = self.tariff_scheme.tariff_for_year(year);
        self.tariff_start_year = year;
        info!(
            "Feed-in tariff of '{}' expired, renewed for {} years: {:.2} ct/kWh -> {:.2} ct/kWh",
            self.name,
            self.tariff_scheme.validity_years(),
            previous,
            self.feed_in_tariff
        );
        true
    }
}

/// Empirical efficiency relative to standard test conditions, as a cubic in irradiance
fn relative_efficiency(irradiance: f64) -> f64 {
    let g = irradiance / IRRADIANCE_STC;
    (0.71 + 0.65 * g - 0.55 * g.powi(2) + 0.19 * g.powi(3)).max(0.)
}

impl EnergyComponentBehaviour for Photovoltaic {
    fn channels(&self) -> &ResultChannels {
        &self.channels
    }

    fn power_nom(&self) -> f64 {
        self.power_nom
    }

    fn carrier(&self) -> EnergyCarrier {
        EnergyCarrier::Electricity
    }

    fn investment_cost_curve(&self) -> &InvestmentCostCurve {
        &self.investment_cost
    }

    fn calc_emissions(&self, _energy_wh: f64, _spec_co2: f64) -> f64 {
        0.
    }

    /// Revenue for the exported electricity at the locked feed-in tariff, as a negative cost
    fn calc_energy_cost(&self, energy_wh: f64, _spec_cost: f64) -> f64 {
        -cost_in_euro(energy_wh, self.feed_in_tariff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    fn pv_input(power_nom: f64) -> PhotovoltaicInput {
        PhotovoltaicInput {
            power_nom,
            tilt_angle: 30.,
            azimuth_angle: 0.,
            efficiency_param: 1.,
            neg_temp_coeff: 0.004,
            feed_in_tariff: Default::default(),
            investment_cost: None,
        }
    }

    #[fixture]
    fn pv() -> Photovoltaic {
        Photovoltaic::new("PV", &pv_input(5.), 2022)
    }

    #[fixture]
    fn sunny_hour() -> WeatherRecord {
        // sun square on to the modules with 1000 W/m2 of beam radiation
        WeatherRecord {
            air_temp: 5.,
            direct_beam_radiation: 1000.,
            solar_zenith_angle: 30.,
            solar_azimuth_angle: 0.,
            ..Default::default()
        }
    }

    #[rstest]
    fn test_nominal_efficiency(pv: Photovoltaic) {
        assert_relative_eq!(pv.module_area(), 25.);
        assert_relative_eq!(pv.nominal_efficiency(), 0.2);
    }

    #[rstest]
    fn test_output_at_standard_irradiance(pv: Photovoltaic, sunny_hour: WeatherRecord) {
        // module at exactly 25 degC, so the temperature derating is neutral
        assert_relative_eq!(pv.calc_energy(&sunny_hour), 5000., max_relative = 1e-9);
    }

    #[rstest]
    fn test_temperature_derating(pv: Photovoltaic, mut sunny_hour: WeatherRecord) {
        // module runs 20 K above the air, 25 K above the reference temperature
        sunny_hour.air_temp = 30.;
        assert_relative_eq!(
            pv.calc_energy(&sunny_hour),
            5000. * (1. - 0.004 * (30. + 20. - 25.)),
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn test_efficiency_param_derates_output(mut pv: Photovoltaic, sunny_hour: WeatherRecord) {
        assert_relative_eq!(pv.adjust_efficiency_param(-0.2), 0.8);
        assert_relative_eq!(pv.calc_energy(&sunny_hour), 4000., max_relative = 1e-9);
        assert_eq!(pv.adjust_efficiency_param(-2.), 0.);
    }

    #[rstest]
    fn test_zero_power_produces_nothing(sunny_hour: WeatherRecord) {
        let pv = Photovoltaic::new("PV", &pv_input(0.), 2022);
        assert_eq!(pv.nominal_efficiency(), 0.);
        assert_eq!(pv.calc_energy(&sunny_hour), 0.);
        assert_eq!(pv.calc_investment_cost(), 0.);
    }

    #[rstest]
    fn test_no_output_at_night(pv: Photovoltaic) {
        let night = WeatherRecord {
            solar_zenith_angle: 90.,
            ..Default::default()
        };
        assert_eq!(pv.calc_energy(&night), 0.);
    }

    #[rstest]
    fn test_relative_efficiency_curve() {
        assert_relative_eq!(relative_efficiency(1000.), 1.0, max_relative = 1e-12);
        assert_relative_eq!(relative_efficiency(0.), 0.71);
        assert!(relative_efficiency(200.) > 0.71);
    }

    #[rstest]
    fn test_feed_in_tariff_degression() {
        let scheme = FeedInTariffScheme::from(FeedInTariffInput::default());

        assert_relative_eq!(scheme.tariff_for_year(2022), 6.24);
        assert_relative_eq!(
            scheme.tariff_for_year(2023),
            6.24 * 0.996f64.powi(12),
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn test_feed_in_tariff_is_piecewise_constant(mut pv: Photovoltaic) {
        let tariffs = (2022..2070)
            .map(|year| {
                pv.update_feed_in_tariff(year);
                pv.feed_in_tariff()
            })
            .collect::<Vec<_>>();

        let scheme = FeedInTariffScheme::from(FeedInTariffInput::default());
        for (year, tariff) in (2022..2070).zip(tariffs) {
            let window_start = 2022 + 20 * ((year - 2022) / 20);
            assert_relative_eq!(tariff, scheme.tariff_for_year(window_start));
        }
    }

    #[rstest]
    fn test_tariff_renewed_once_per_expiry(mut pv: Photovoltaic) {
        assert!(!pv.update_feed_in_tariff(2041));
        assert!(pv.update_feed_in_tariff(2042));
        assert!(!pv.update_feed_in_tariff(2042));
        assert!(!pv.update_feed_in_tariff(2061));
    }

    #[rstest]
    fn test_feed_in_revenue_and_emissions(pv: Photovoltaic) {
        assert_relative_eq!(pv.calc_energy_cost(1_000_000., 30.), -62.4);
        assert_eq!(pv.calc_emissions(1_000_000., 400.), 0.);
    }
}

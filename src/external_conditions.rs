use crate::core::units::{DAYS_PER_YEAR, HOURS_PER_DAY, HOURS_PER_YEAR};
use crate::errors::ConfigurationError;
use itertools::izip;

/// Solar reflectivity of the ground used for the ground-reflected part of plane irradiance
const GROUND_ALBEDO: f64 = 0.2;

/// Conditions at a location for one hour of the representative year.
///
/// Angles are in degrees. Solar azimuth is measured from south, eastwards positive and westwards
/// negative, which is the same convention used for the orientation of inclined surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeatherRecord {
    pub air_temp: f64,                     // deg C
    pub global_horizontal_radiation: f64,  // W/m2
    pub direct_beam_radiation: f64,        // W/m2, normal incidence
    pub diffuse_horizontal_radiation: f64, // W/m2
    pub solar_zenith_angle: f64,
    pub solar_azimuth_angle: f64,
    pub ground_temp: f64, // deg C
}

/// Hourly weather for one typical meteorological year at one location.
#[derive(Clone, Debug)]
pub struct WeatherSeries {
    pub latitude: f64,
    pub longitude: f64,
    records: Vec<WeatherRecord>,
}

impl WeatherSeries {
    /// Arguments:
    /// * `latitude` - latitude of the location, in degrees
    /// * `longitude` - longitude of the location, easterly +ve westerly -ve, in degrees
    /// * `records` - one record per hour of the year (8760 entries)
    pub fn new(
        latitude: f64,
        longitude: f64,
        records: Vec<WeatherRecord>,
    ) -> Result<Self, ConfigurationError> {
        if records.len() != HOURS_PER_YEAR {
            return Err(ConfigurationError::WeatherSeriesLength {
                expected: HOURS_PER_YEAR,
                found: records.len(),
            });
        }

        Ok(Self {
            latitude,
            longitude,
            records,
        })
    }

    /// Build a series from measured hourly data, deriving the sun position for every hour.
    ///
    /// Arguments:
    /// * `latitude` - latitude of the location, in degrees
    /// * `longitude` - longitude of the location, easterly +ve westerly -ve, in degrees
    /// * `timezone` - timezone the data is given in, -12 to 12 (0 for UTC data)
    /// * `air_temps` - external air temperatures, in deg C
    /// * `global_horizontal_radiation` - in W/m2
    /// * `direct_beam_radiation` - direct beam radiation at normal incidence, in W/m2
    /// * `diffuse_horizontal_radiation` - in W/m2
    /// * `ground_temps` - ground temperatures, in deg C; when absent, the annual mean air
    ///                    temperature is used for every hour
    pub fn from_measurements(
        latitude: f64,
        longitude: f64,
        timezone: i32,
        air_temps: Vec<f64>,
        global_horizontal_radiation: Vec<f64>,
        direct_beam_radiation: Vec<f64>,
        diffuse_horizontal_radiation: Vec<f64>,
        ground_temps: Option<Vec<f64>>,
    ) -> Result<Self, ConfigurationError> {
        for series in [
            &air_temps,
            &global_horizontal_radiation,
            &direct_beam_radiation,
            &diffuse_horizontal_radiation,
        ] {
            if series.len() != HOURS_PER_YEAR {
                return Err(ConfigurationError::WeatherSeriesLength {
                    expected: HOURS_PER_YEAR,
                    found: series.len(),
                });
            }
        }
        let ground_temps = match ground_temps {
            Some(temps) if temps.len() != HOURS_PER_YEAR => {
                return Err(ConfigurationError::WeatherSeriesLength {
                    expected: HOURS_PER_YEAR,
                    found: temps.len(),
                })
            }
            Some(temps) => temps,
            None => {
                let annual_mean = air_temps.iter().sum::<f64>() / air_temps.len() as f64;
                vec![annual_mean; HOURS_PER_YEAR]
            }
        };

        let time_shift = init_time_shift(timezone, longitude);
        let solar_declinations = (0..DAYS_PER_YEAR)
            .map(|day| init_solar_declination(init_earth_orbit_deviation(day)))
            .collect::<Vec<f64>>();
        let equations_of_time = (0..DAYS_PER_YEAR)
            .map(init_equation_of_time)
            .collect::<Vec<f64>>();

        let records = izip!(
            0..HOURS_PER_YEAR,
            air_temps,
            global_horizontal_radiation,
            direct_beam_radiation,
            diffuse_horizontal_radiation,
            ground_temps
        )
        .map(|(hour, air_temp, ghi, dni, dhi, ground_temp)| {
            let day = hour / HOURS_PER_DAY as usize;
            let solar_time = init_solar_time(
                (hour % HOURS_PER_DAY as usize) as u32,
                equations_of_time[day],
                time_shift,
            );
            let solar_hour_angle = init_solar_hour_angle(solar_time);
            let solar_altitude =
                init_solar_altitude(latitude, solar_declinations[day], solar_hour_angle);
            WeatherRecord {
                air_temp,
                global_horizontal_radiation: ghi,
                direct_beam_radiation: dni,
                diffuse_horizontal_radiation: dhi,
                solar_zenith_angle: 90. - solar_altitude,
                solar_azimuth_angle: init_solar_azimuth_angle(
                    latitude,
                    solar_declinations[day],
                    solar_hour_angle,
                ),
                ground_temp,
            }
        })
        .collect();

        Self::new(latitude, longitude, records)
    }

    pub fn record(&self, hour: usize) -> &WeatherRecord {
        &self.records[hour % HOURS_PER_YEAR]
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn air_temp_annual(&self) -> f64 {
        self.records.iter().map(|r| r.air_temp).sum::<f64>() / self.records.len() as f64
    }
}

/// Total solar irradiance on an inclined surface, in W/m2.
///
/// Sum of the direct beam on the plane, the isotropic sky diffuse part and the ground reflected
/// part.
///
/// Arguments:
/// * `record` - weather for the hour in question
/// * `tilt` - tilt angle of the surface from horizontal, 0 to 90, in degrees
/// * `orientation` - azimuth of the surface normal, S 0, E 90, W -90, N 180 or -180, in degrees
pub fn irradiance_on_tilted_plane(record: &WeatherRecord, tilt: f64, orientation: f64) -> f64 {
    let cos_tilt = tilt.to_radians().cos();

    let direct = if record.solar_zenith_angle < 90. {
        (record.direct_beam_radiation * cos_solar_angle_of_incidence(record, tilt, orientation))
            .max(0.)
    } else {
        0.
    };
    let sky_diffuse = record.diffuse_horizontal_radiation * (1. + cos_tilt) / 2.;
    let ground_reflected =
        record.global_horizontal_radiation * GROUND_ALBEDO * (1. - cos_tilt) / 2.;

    direct + sky_diffuse + ground_reflected
}

fn cos_solar_angle_of_incidence(record: &WeatherRecord, tilt: f64, orientation: f64) -> f64 {
    let zenith = record.solar_zenith_angle.to_radians();
    let tilt = tilt.to_radians();
    let relative_azimuth = (record.solar_azimuth_angle - orientation).to_radians();

    zenith.cos() * tilt.cos() + zenith.sin() * tilt.sin() * relative_azimuth.cos()
}

fn init_earth_orbit_deviation(current_day: u32) -> f64 {
    let current_day = current_day + 1; // 1-indexed day

    (360.0 / 365.0) * current_day as f64
}

fn init_solar_declination(earth_orbit_deviation: f64) -> f64 {
    let earth_orbit_deviation = earth_orbit_deviation.to_radians();

    0.33281 - 22.984 * earth_orbit_deviation.cos() - 0.3499 * (2.0 * earth_orbit_deviation).cos()
        - 0.1398 * (3.0 * earth_orbit_deviation).cos()
        + 3.7872 * earth_orbit_deviation.sin()
        + 0.03205 * (2.0 * earth_orbit_deviation).sin()
        + 0.07187 * (3.0 * earth_orbit_deviation).sin()
}

/// Equation of time, in minutes
fn init_equation_of_time(current_day: u32) -> f64 {
    let nday = (current_day + 1) as i32;

    match nday {
        nday if nday < 21 => 2.6 + 0.44 * nday as f64,
        nday if nday < 136 => 5.2 + 9.0 * ((nday - 43) as f64 * 0.0357).cos(),
        nday if nday < 241 => 1.4 - 5.0 * ((nday - 135) as f64 * 0.0449).cos(),
        nday if nday < 336 => -6.3 - 10.0 * ((nday - 306) as f64 * 0.036).cos(),
        nday => 0.45 * (nday - 359) as f64,
    }
}

/// Time shift, in hours, between the timezone meridian and the longitude of the location
fn init_time_shift(timezone: i32, longitude: f64) -> f64 {
    timezone as f64 - longitude / 15.0
}

fn init_solar_time(hour_of_day: u32, equation_of_time: f64, time_shift: f64) -> f64 {
    // hour sections run from 1 (0h to 1h) to 24
    (hour_of_day + 1) as f64 - (equation_of_time / 60.0) - time_shift
}

/// Solar hour angle in the middle of the hour section, -180 to 180 degrees, morning positive
fn init_solar_hour_angle(solar_time: f64) -> f64 {
    let solar_angle = 15. * (12.5 - solar_time);

    if solar_angle > 180.0 {
        solar_angle - 360.0
    } else if solar_angle < -180.0 {
        solar_angle + 360.0
    } else {
        solar_angle
    }
}

fn init_solar_altitude(latitude: f64, solar_declination: f64, solar_hour_angle: f64) -> f64 {
    let latitude = latitude.to_radians();
    let solar_declination = solar_declination.to_radians();
    let solar_hour_angle = solar_hour_angle.to_radians();

    let asol = (solar_declination.sin() * latitude.sin()
        + solar_declination.cos() * latitude.cos() * solar_hour_angle.cos())
    .asin()
    .to_degrees();

    if asol < 0.0001 {
        0.
    } else {
        asol
    }
}

/// Solar azimuth angle from south, eastwards positive, westwards negative, in degrees
fn init_solar_azimuth_angle(latitude: f64, solar_declination: f64, solar_hour_angle: f64) -> f64 {
    let latitude = latitude.to_radians();
    let solar_declination = solar_declination.to_radians();
    let solar_hour_angle = (180.0 - solar_hour_angle).to_radians();

    let sin_aux1 = solar_declination.cos() * solar_hour_angle.sin();
    let cos_aux1 = latitude.cos() * solar_declination.sin()
        + latitude.sin() * solar_declination.cos() * solar_hour_angle.cos();
    let aux2 = (sin_aux1 / (sin_aux1.powi(2) + cos_aux1.powi(2)).sqrt())
        .clamp(-1., 1.)
        .asin()
        .to_degrees();

    if sin_aux1 >= 0.0 && cos_aux1 > 0.0 {
        180.0 - aux2
    } else if cos_aux1 < 0.0 {
        aux2
    } else {
        -(180.0 + aux2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[fixture]
    fn record() -> WeatherRecord {
        WeatherRecord {
            air_temp: 5.,
            global_horizontal_radiation: 400.,
            direct_beam_radiation: 500.,
            diffuse_horizontal_radiation: 150.,
            solar_zenith_angle: 60.,
            solar_azimuth_angle: 0.,
            ground_temp: 10.,
        }
    }

    fn measurements() -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let air_temps = (0..HOURS_PER_YEAR)
            .map(|hour| if hour < HOURS_PER_YEAR / 2 { 0. } else { 20. })
            .collect();
        (
            air_temps,
            vec![300.; HOURS_PER_YEAR],
            vec![400.; HOURS_PER_YEAR],
            vec![100.; HOURS_PER_YEAR],
        )
    }

    #[rstest]
    fn test_horizontal_irradiance(record: WeatherRecord) {
        // beam on the horizontal plane plus the complete diffuse part, no ground reflection
        assert_relative_eq!(
            irradiance_on_tilted_plane(&record, 0., 0.),
            500. * 0.5 + 150.,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn test_vertical_irradiance_facing_away_from_sun(record: WeatherRecord) {
        // north facade receives half the sky diffuse and half the ground reflection only
        assert_relative_eq!(
            irradiance_on_tilted_plane(&record, 90., 180.),
            150. / 2. + 400. * 0.2 / 2.,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn test_no_beam_below_horizon(mut record: WeatherRecord) {
        record.solar_zenith_angle = 95.;
        assert_relative_eq!(
            irradiance_on_tilted_plane(&record, 30., 0.),
            150. * (1. + 30f64.to_radians().cos()) / 2.
                + 400. * 0.2 * (1. - 30f64.to_radians().cos()) / 2.,
            max_relative = 1e-9
        );
    }

    #[rstest]
    fn test_series_must_cover_one_year(record: WeatherRecord) {
        assert_eq!(
            WeatherSeries::new(48., 11., vec![record; 10]).unwrap_err(),
            ConfigurationError::WeatherSeriesLength {
                expected: 8760,
                found: 10
            }
        );
        assert!(WeatherSeries::new(48., 11., vec![record; HOURS_PER_YEAR]).is_ok());
    }

    #[rstest]
    fn test_ground_temperature_defaults_to_annual_mean() {
        let (air_temps, ghi, dni, dhi) = measurements();
        let weather =
            WeatherSeries::from_measurements(48.1, 11.6, 0, air_temps, ghi, dni, dhi, None)
                .unwrap();

        assert_relative_eq!(weather.air_temp_annual(), 10.);
        assert!(weather.records().iter().all(|r| r.ground_temp == 10.));
    }

    #[rstest]
    fn test_sun_position_over_a_summer_day() {
        let (air_temps, ghi, dni, dhi) = measurements();
        let weather =
            WeatherSeries::from_measurements(48.1, 0., 0, air_temps, ghi, dni, dhi, None).unwrap();

        // 21st of June, local midnight and the hour section around solar noon
        let midnight = weather.record(171 * 24);
        let noon = weather.record(171 * 24 + 11);
        assert_eq!(midnight.solar_zenith_angle, 90.);
        assert!(noon.solar_zenith_angle < 30.);
        assert!(noon.solar_azimuth_angle.abs() < 25.);
        // morning sun is in the east, afternoon sun in the west
        assert!(weather.record(171 * 24 + 7).solar_azimuth_angle > 0.);
        assert!(weather.record(171 * 24 + 16).solar_azimuth_angle < 0.);
    }

    #[rstest]
    fn test_measurements_of_wrong_length_are_rejected() {
        let (air_temps, ghi, dni, _) = measurements();
        assert!(matches!(
            WeatherSeries::from_measurements(48.1, 0., 0, air_temps, ghi, dni, vec![0.; 5], None),
            Err(ConfigurationError::WeatherSeriesLength { found: 5, .. })
        ));
    }
}

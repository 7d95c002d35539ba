use crate::external_conditions::WeatherSeries;
use anyhow::Context;
use serde::Deserialize;
use std::io::Read;

/// Typical meteorological year as delivered by the PVGIS TMY service (JSON output format).
///
/// Times in the file are UTC, so the sun position is derived with a timezone of zero.
#[derive(Debug, Deserialize)]
struct PvgisTmyDocument {
    inputs: PvgisInputs,
    outputs: PvgisOutputs,
}

#[derive(Debug, Deserialize)]
struct PvgisInputs {
    location: PvgisLocation,
}

#[derive(Debug, Deserialize)]
struct PvgisLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct PvgisOutputs {
    tmy_hourly: Vec<PvgisHourlyRecord>,
}

#[derive(Debug, Deserialize)]
struct PvgisHourlyRecord {
    #[serde(rename = "T2m")]
    air_temp: f64, // dry bulb temperature in degrees
    #[serde(rename = "G(h)")]
    global_horizontal: f64, // W/m2
    #[serde(rename = "Gb(n)")]
    beam_normal: f64, // W/m2
    #[serde(rename = "Gd(h)")]
    diffuse_horizontal: f64, // W/m2
}

#[derive(Clone, Debug)]
pub struct WeatherFileData {
    pub latitude: f64,
    pub longitude: f64,
    pub air_temperatures: Vec<f64>,
    pub global_horizontal_radiation: Vec<f64>,
    pub direct_beam_radiation: Vec<f64>,
    pub diffuse_horizontal_radiation: Vec<f64>,
}

impl WeatherFileData {
    pub fn into_weather_series(self) -> anyhow::Result<WeatherSeries> {
        Ok(WeatherSeries::from_measurements(
            self.latitude,
            self.longitude,
            0,
            self.air_temperatures,
            self.global_horizontal_radiation,
            self.direct_beam_radiation,
            self.diffuse_horizontal_radiation,
            None,
        )?)
    }
}

pub fn pvgis_tmy_to_vec(file: impl Read) -> anyhow::Result<WeatherFileData> {
    let document: PvgisTmyDocument =
        serde_json::from_reader(file).context("Could not parse the PVGIS TMY weather file")?;

    let records = document.outputs.tmy_hourly;
    Ok(WeatherFileData {
        latitude: document.inputs.location.latitude,
        longitude: document.inputs.location.longitude,
        air_temperatures: records.iter().map(|r| r.air_temp).collect(),
        global_horizontal_radiation: records.iter().map(|r| r.global_horizontal).collect(),
        direct_beam_radiation: records.iter().map(|r| r.beam_normal).collect(),
        diffuse_horizontal_radiation: records.iter().map(|r| r.diffuse_horizontal).collect(),
    })
}

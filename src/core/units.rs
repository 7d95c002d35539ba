pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const WATT_HOURS_PER_KILOWATT_HOUR: u32 = 1_000;
pub const GRAMS_PER_TONNE: u32 = 1_000_000;
pub const CENTS_PER_EURO: u32 = 100;
pub const CENTIMETRES_PER_METRE: u32 = 100;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const HOURS_PER_YEAR: usize = (HOURS_PER_DAY * DAYS_PER_YEAR) as usize;
pub const MONTHS_PER_YEAR: u32 = 12;

pub fn wh_to_kwh(energy_wh: f64) -> f64 {
    energy_wh / WATT_HOURS_PER_KILOWATT_HOUR as f64
}

pub fn kw_to_w(power_kw: f64) -> f64 {
    power_kw * WATTS_PER_KILOWATT as f64
}

/// Convert an energy amount in Wh with a specific emission factor in g/kWh to tonnes of CO2
pub fn emissions_in_tonnes(energy_wh: f64, spec_co2_g_per_kwh: f64) -> f64 {
    wh_to_kwh(energy_wh) * spec_co2_g_per_kwh / GRAMS_PER_TONNE as f64
}

/// Convert an energy amount in Wh with a specific price in ct/kWh to Euro
pub fn cost_in_euro(energy_wh: f64, spec_cost_ct_per_kwh: f64) -> f64 {
    wh_to_kwh(energy_wh) * spec_cost_ct_per_kwh / CENTS_PER_EURO as f64
}

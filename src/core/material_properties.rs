//! Properties of the materials used by the thermal model.

/// Density of air, in kg/m3.
///
/// The ventilation balance uses it directly as its W/(m3.K) factor per air change.
pub const AIR_DENSITY: f64 = 1.2;

/// Thermal conductivity of the insulation material added to the envelope, in W/(m.K)
pub const INSULATION_THERMAL_CONDUCTIVITY: f64 = 0.035;

/// Thermal resistance of a layer of insulation, in (m2.K)/W
///
/// Arguments:
/// * `thickness` - layer thickness, in m
pub fn insulation_thermal_resistance(thickness: f64) -> f64 {
    thickness / INSULATION_THERMAL_CONDUCTIVITY
}

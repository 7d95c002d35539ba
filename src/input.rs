use crate::errors::ConfigurationError;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::{BufReader, Read};
use strum_macros::{Display, EnumString};

/// Read and validate a configuration record from JSON.
///
/// Unknown fields, unknown category names and values outside their declared bounds are all
/// rejected here, before any simulation state is built from the record.
pub fn ingest_for_processing<T>(json: impl Read) -> anyhow::Result<T>
where
    T: DeserializeOwned + CheckedInput,
{
    let input: T = serde_json::from_reader(BufReader::new(json))?;
    input.check()?;

    Ok(input)
}

/// A configuration record whose declared bounds can be checked after deserialisation.
pub trait CheckedInput {
    fn check(&self) -> Result<(), ConfigurationError>;
}

fn check_bounds<T: Validate>(record: &T) -> Result<(), ConfigurationError> {
    record.validate().map_err(|errors| {
        ConfigurationError::invalid_value(
            std::any::type_name::<T>().rsplit("::").next().unwrap_or("input"),
            errors.to_string(),
        )
    })
}

impl CheckedInput for BuildingInput {
    fn check(&self) -> Result<(), ConfigurationError> {
        check_bounds(self)
    }
}

impl CheckedInput for UserInput {
    fn check(&self) -> Result<(), ConfigurationError> {
        check_bounds(self)
    }
}

impl CheckedInput for ComponentInput {
    fn check(&self) -> Result<(), ConfigurationError> {
        match self {
            ComponentInput::GasBoiler(boiler) => check_bounds(boiler),
            ComponentInput::Photovoltaic(pv) => check_bounds(pv),
            ComponentInput::HeatPumpAir(heat_pump) => check_bounds(heat_pump),
        }
    }
}

impl CheckedInput for SystemInput {
    fn check(&self) -> Result<(), ConfigurationError> {
        self.0.values().try_for_each(CheckedInput::check)
    }
}

impl CheckedInput for ActionPlanInput {
    fn check(&self) -> Result<(), ConfigurationError> {
        for action in self.0.values().flatten() {
            match action {
                PlannedAction::Insulate {
                    component,
                    thickness_cm,
                } => check_insulation(*component, *thickness_cm)?,
                PlannedAction::AddComponent { component, .. } => component.check()?,
                PlannedAction::AdoptBehaviour {
                    set_point_temperature,
                    el_demand_reduction,
                } => check_behaviour(*set_point_temperature, *el_demand_reduction)?,
                PlannedAction::ChangeWindows { .. } | PlannedAction::RemoveComponent { .. } => {}
            }
        }
        Ok(())
    }
}

/// Insulation goes on opaque components only, in a positive thickness.
pub fn check_insulation(
    component: EnvelopeComponent,
    thickness_cm: f64,
) -> Result<(), ConfigurationError> {
    if component == EnvelopeComponent::Window {
        return Err(ConfigurationError::invalid_value(
            "component",
            "windows cannot be insulated, replace them instead",
        ));
    }
    if !thickness_cm.is_finite() || thickness_cm <= 0. {
        return Err(ConfigurationError::invalid_value(
            "thickness_cm",
            format!("insulation thickness must be positive, got {thickness_cm}"),
        ));
    }
    Ok(())
}

fn check_behaviour(
    set_point_temperature: Option<f64>,
    el_demand_reduction: Option<f64>,
) -> Result<(), ConfigurationError> {
    if set_point_temperature.is_none() && el_demand_reduction.is_none() {
        return Err(ConfigurationError::invalid_value(
            "adopt_behaviour",
            "give a new set point temperature, an electricity demand reduction or both",
        ));
    }
    if set_point_temperature.is_some_and(|temperature| !temperature.is_finite()) {
        return Err(ConfigurationError::invalid_value(
            "set_point_temperature",
            "set point temperature must be a finite number",
        ));
    }
    if el_demand_reduction.is_some_and(|reduction| !reduction.is_finite() || reduction < 0.) {
        return Err(ConfigurationError::invalid_value(
            "el_demand_reduction",
            "electricity demand reduction must not be negative",
        ));
    }
    Ok(())
}

// Categorical fields are parsed through strum so that an unknown name surfaces as a
// configuration error naming the category, rather than as a generic serde message.
macro_rules! category_from_string {
    ($category:ty, $kind:literal) => {
        impl TryFrom<String> for $category {
            type Error = ConfigurationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value
                    .parse()
                    .map_err(|_| ConfigurationError::UnknownCategory { kind: $kind, value })
            }
        }
    };
}

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum BuildingShape {
    Compact,
    Elongated,
    Complex,
}
category_from_string!(BuildingShape, "building shape");

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum Neighbours {
    None,
    OneSide,
    TwoSides,
}
category_from_string!(Neighbours, "neighbours category");

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum BasementType {
    None,
    Heated,
    PartlyHeated,
    Unheated,
}
category_from_string!(BasementType, "basement category");

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum AtticType {
    FlatRoof,
    Heated,
    PartlyHeated,
    Unheated,
}
category_from_string!(AtticType, "attic category");

/// Construction era of the building, used for default U-values and the temperature of
/// unheated adjacent spaces.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
pub enum BuildingAgeClass {
    #[strum(serialize = "before_1919")]
    Before1919,
    #[strum(serialize = "1919_1948")]
    From1919To1948,
    #[strum(serialize = "1949_1978")]
    From1949To1978,
    #[strum(serialize = "1979_1994")]
    From1979To1994,
    #[strum(serialize = "1995_2009")]
    From1995To2009,
    #[strum(serialize = "from_2010")]
    From2010,
}
category_from_string!(BuildingAgeClass, "building age class");

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum OpaqueConstruction {
    #[default]
    Massive,
    TimberFrame,
}
category_from_string!(OpaqueConstruction, "opaque construction");

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum WindowType {
    WoodSingleGlazed,
    WoodDoubleGlazed,
    PlasticInsulatingGlass,
    AluSteelInsulatingGlass,
    TripleGlazed,
}
category_from_string!(WindowType, "window type");

/// Envelope components a player can renovate.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq)]
#[serde(try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum EnvelopeComponent {
    Facade,
    Roof,
    UpperCeiling,
    Groundplate,
    Window,
}
category_from_string!(EnvelopeComponent, "envelope component");

#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ConstructionsInput {
    pub facade: OpaqueConstruction,
    pub roof: OpaqueConstruction,
    pub upper_ceiling: OpaqueConstruction,
    pub groundplate: OpaqueConstruction,
    /// When absent, the window type typical of the building age class is assumed.
    pub window: Option<WindowType>,
}

/// Measured U-values in W/(m2.K). Any component left out takes the age-class default.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct UValuesInput {
    #[validate(exclusive_minimum = 0.)]
    pub facade: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub roof: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub upper_ceiling: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub groundplate: Option<f64>,
    #[validate(exclusive_minimum = 0.)]
    pub window: Option<f64>,
}

/// Measured envelope areas in m2, replacing the estimate from the building geometry.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct EnvelopeAreas {
    #[validate(minimum = 0.)]
    pub facade: f64,
    #[validate(minimum = 0.)]
    pub roof: f64,
    #[validate(minimum = 0.)]
    pub upper_ceiling: f64,
    #[validate(minimum = 0.)]
    pub ground: f64,
    #[validate(minimum = 0.)]
    pub window: f64,
    #[validate(minimum = 0.)]
    pub basement_wall: f64,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BuildingInput {
    #[validate(exclusive_minimum = 0.)]
    pub ground_area: f64,
    #[validate(minimum = 1)]
    pub stories: u32,
    #[validate(exclusive_minimum = 0.)]
    pub story_height: f64,
    pub shape: BuildingShape,
    pub neighbours: Neighbours,
    pub basement: BasementType,
    pub attic: AtticType,
    pub age_class: BuildingAgeClass,
    #[serde(default)]
    #[validate]
    pub constructions: ConstructionsInput,
    #[serde(default)]
    #[validate]
    pub u_values: UValuesInput,
    /// g-value of the glazing. Defaults to the value of the window type.
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub g_value_window: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub shading: f64,
    #[validate(minimum = 0.)]
    pub ventilation_rate: f64, // 1/h
    #[validate(minimum = 0.)]
    pub infiltration_rate: f64, // 1/h
    /// Rotation of the four facades against the cardinal directions, in degrees
    #[serde(default)]
    pub orientation_offset: f64,
    #[validate]
    pub areas: Option<EnvelopeAreas>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserInput {
    pub comfort_temperature: f64,     // deg C
    pub set_point_temperature: f64,   // deg C
    #[validate(minimum = 0.)]
    pub monthly_salary: f64, // Euro
    #[validate(minimum = 0.)]
    pub monthly_living_cost: f64, // Euro
    #[validate(minimum = 0.)]
    pub monthly_entertainment: f64, // Euro
    #[validate(minimum = 0.)]
    pub monthly_loan_payoff: f64, // Euro
    #[validate(minimum = 0.)]
    pub annual_el_demand: f64, // kWh/a
    pub bank_deposit: f64,     // Euro
    /// Normalised hourly household electricity profile (8760 values summing to one)
    pub el_profile: Option<Vec<f64>>,
}

/// Cost curve for the investment in a component: cost = power_nom * a * power_nom^b, in Euro.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct InvestmentCostInput {
    #[validate(minimum = 0.)]
    pub a: f64,
    pub b: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuadraticCoefficients {
    pub constant: f64,
    #[serde(default)]
    pub linear: f64,
    #[serde(default)]
    pub quadratic: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
#[serde(deny_unknown_fields)]
pub struct FeedInTariffInput {
    pub reference_year: u32,
    #[validate(minimum = 0.)]
    pub reference_tariff: f64, // ct/kWh
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub monthly_degression: f64,
    #[validate(minimum = 1)]
    pub validity_years: u32,
}

impl Default for FeedInTariffInput {
    fn default() -> Self {
        Self {
            reference_year: 2022,
            reference_tariff: 6.24,
            monthly_degression: 0.004,
            validity_years: 20,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GasBoilerInput {
    #[validate(minimum = 0.)]
    pub power_nom: f64, // kW
    #[validate(exclusive_minimum = 0.)]
    #[validate(maximum = 1.)]
    pub efficiency: f64,
    #[validate]
    pub investment_cost: Option<InvestmentCostInput>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PhotovoltaicInput {
    #[validate(minimum = 0.)]
    pub power_nom: f64, // kWp
    #[validate(minimum = 0.)]
    #[validate(maximum = 90.)]
    pub tilt_angle: f64,
    /// Azimuth of the module normal: south 0, east 90, west -90
    pub azimuth_angle: f64,
    #[serde(default = "default_efficiency_param")]
    #[validate(minimum = 0.)]
    pub efficiency_param: f64,
    #[serde(default = "default_neg_temp_coeff")]
    #[validate(minimum = 0.)]
    pub neg_temp_coeff: f64, // 1/K
    #[serde(default)]
    #[validate]
    pub feed_in_tariff: FeedInTariffInput,
    #[validate]
    pub investment_cost: Option<InvestmentCostInput>,
}

fn default_efficiency_param() -> f64 {
    1.0
}

fn default_neg_temp_coeff() -> f64 {
    0.004
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HeatPumpAirInput {
    #[validate(minimum = 0.)]
    pub power_nom: f64, // kW
    /// Sink temperature as a function of ambient temperature, in deg C
    pub heating_curve: QuadraticCoefficients,
    /// Coefficient of performance as a function of the temperature lift, in K
    pub cop_curve: QuadraticCoefficients,
    #[validate]
    pub investment_cost: Option<InvestmentCostInput>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentInput {
    GasBoiler(GasBoilerInput),
    Photovoltaic(PhotovoltaicInput),
    HeatPumpAir(HeatPumpAirInput),
}

/// Ordered, named list of the components making up the energy system of the household.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct SystemInput(pub IndexMap<String, ComponentInput>);

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum PlannedAction {
    Insulate {
        component: EnvelopeComponent,
        thickness_cm: f64,
    },
    ChangeWindows {
        window_type: WindowType,
    },
    AddComponent {
        name: String,
        component: ComponentInput,
    },
    RemoveComponent {
        name: String,
    },
    /// Change the household's habits: heat to another set point, save electricity, or both.
    AdoptBehaviour {
        set_point_temperature: Option<f64>, // deg C
        el_demand_reduction: Option<f64>,   // kWh/a
    },
}

/// Actions the player takes, keyed by the year in which they are carried out.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct ActionPlanInput(pub IndexMap<u32, Vec<PlannedAction>>);

impl ActionPlanInput {
    pub fn actions_for_year(&self, year: u32) -> &[PlannedAction] {
        self.0.get(&year).map(Vec::as_slice).unwrap_or_default()
    }
}

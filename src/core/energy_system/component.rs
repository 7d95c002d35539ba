use crate::core::energy_system::boiler::GasBoiler;
use crate::core::energy_system::heat_pump::HeatPumpAir;
use crate::core::energy_system::pv::Photovoltaic;
use crate::core::units::{cost_in_euro, emissions_in_tonnes};
use crate::external_conditions::WeatherRecord;
use crate::input::{ComponentInput, InvestmentCostInput};
use strum_macros::Display;

/// The energy carrier a component draws on, selecting the scenario factors it is priced with.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum EnergyCarrier {
    Gas,
    Electricity,
}

/// Keys under which a component reports its results.
///
/// Every component owns the same set of channels, so results can be merged by key without
/// knowing which kind of component produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultChannels {
    pub heat: String,
    pub energy: String,
    pub feed_in: String,
    pub emissions: String,
    pub cost: String,
    pub investment: String,
}

impl ResultChannels {
    pub fn for_component(name: &str) -> Self {
        Self {
            heat: format!("Heat {name} [Wh]"),
            energy: format!("Energy {name} [Wh]"),
            feed_in: format!("Electricity feed-in {name} [Wh]"),
            emissions: format!("CO2 emissions {name} [t]"),
            cost: format!("Energy cost {name} [Euro]"),
            investment: format!("Investment cost {name} [Euro]"),
        }
    }
}

/// Investment cost as a function of the nominal power: cost = power_nom * a * power_nom^b
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvestmentCostCurve {
    a: f64,
    b: f64,
}

impl InvestmentCostCurve {
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Arguments:
    /// * `power_nom` - nominal power, in kW
    pub fn cost(&self, power_nom: f64) -> f64 {
        if power_nom <= 0. {
            return 0.;
        }
        power_nom * self.a * power_nom.powf(self.b)
    }
}

impl From<InvestmentCostInput> for InvestmentCostCurve {
    fn from(input: InvestmentCostInput) -> Self {
        Self::new(input.a, input.b)
    }
}

pub trait EnergyComponentBehaviour {
    fn channels(&self) -> &ResultChannels;

    /// Nominal power, in kW
    fn power_nom(&self) -> f64;

    fn carrier(&self) -> EnergyCarrier;

    fn investment_cost_curve(&self) -> &InvestmentCostCurve;

    /// Emissions caused by the energy a component used, in t CO2
    ///
    /// Arguments:
    /// * `energy_wh` - annual energy, in Wh
    /// * `spec_co2` - specific emissions of the energy carrier, in g/kWh
    fn calc_emissions(&self, energy_wh: f64, spec_co2: f64) -> f64 {
        emissions_in_tonnes(energy_wh, spec_co2)
    }

    /// Cost of the energy a component used, in Euro (negative for revenue)
    ///
    /// Arguments:
    /// * `energy_wh` - annual energy, in Wh
    /// * `spec_cost` - specific price of the energy carrier, in ct/kWh
    fn calc_energy_cost(&self, energy_wh: f64, spec_cost: f64) -> f64 {
        cost_in_euro(energy_wh, spec_cost)
    }

    fn calc_investment_cost(&self) -> f64 {
        self.investment_cost_curve().cost(self.power_nom())
    }
}

#[derive(Clone, Debug)]
pub enum EnergyComponent {
    GasBoiler(GasBoiler),
    Photovoltaic(Photovoltaic),
    HeatPumpAir(HeatPumpAir),
}

impl EnergyComponent {
    /// Arguments:
    /// * `name` - unique name of the component within its system
    /// * `input` - configuration record of the component
    /// * `construction_year` - year the component is installed, fixing the feed-in tariff of
    ///                         photovoltaic arrays
    pub fn from_input(name: &str, input: &ComponentInput, construction_year: u32) -> Self {
        match input {
            ComponentInput::GasBoiler(boiler) => Self::GasBoiler(GasBoiler::new(name, boiler)),
            ComponentInput::Photovoltaic(pv) => {
                Self::Photovoltaic(Photovoltaic::new(name, pv, construction_year))
            }
            ComponentInput::HeatPumpAir(heat_pump) => {
                Self::HeatPumpAir(HeatPumpAir::new(name, heat_pump))
            }
        }
    }

    fn behaviour(&self) -> &dyn EnergyComponentBehaviour {
        match self {
            Self::GasBoiler(boiler) => boiler,
            Self::Photovoltaic(pv) => pv,
            Self::HeatPumpAir(heat_pump) => heat_pump,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::GasBoiler(_) => "GasBoiler",
            Self::Photovoltaic(_) => "Photovoltaic",
            Self::HeatPumpAir(_) => "HeatPumpAir",
        }
    }

    pub fn produces_heat(&self) -> bool {
        matches!(self, Self::GasBoiler(_) | Self::HeatPumpAir(_))
    }

    pub fn produces_electricity(&self) -> bool {
        matches!(self, Self::Photovoltaic(_))
    }

    pub fn channels(&self) -> &ResultChannels {
        self.behaviour().channels()
    }

    pub fn power_nom(&self) -> f64 {
        self.behaviour().power_nom()
    }

    pub fn carrier(&self) -> EnergyCarrier {
        self.behaviour().carrier()
    }

    /// Energy drawn from the component's carrier to deliver heat during one hour, in Wh.
    /// Zero for components that do not produce heat.
    pub fn calc_heat_energy(&self, heat_wh: f64, record: &WeatherRecord) -> f64 {
        match self {
            Self::GasBoiler(boiler) => boiler.calc_energy(heat_wh),
            Self::HeatPumpAir(heat_pump) => heat_pump.calc_energy(heat_wh, record.air_temp),
            Self::Photovoltaic(_) => 0.,
        }
    }

    /// Channel holding the energy the component is billed (or paid) for
    pub fn billed_energy_channel(&self) -> &str {
        match self {
            Self::Photovoltaic(pv) => &pv.channels().feed_in,
            Self::GasBoiler(_) | Self::HeatPumpAir(_) => &self.channels().energy,
        }
    }

    pub fn calc_emissions(&self, energy_wh: f64, spec_co2: f64) -> f64 {
        self.behaviour().calc_emissions(energy_wh, spec_co2)
    }

    pub fn calc_energy_cost(&self, energy_wh: f64, spec_cost: f64) -> f64 {
        self.behaviour().calc_energy_cost(energy_wh, spec_cost)
    }

    pub fn calc_investment_cost(&self) -> f64 {
        self.behaviour().calc_investment_cost()
    }
}

use crate::core::energy_system::component::{
    EnergyCarrier, EnergyComponentBehaviour, InvestmentCostCurve, ResultChannels,
};
use crate::input::GasBoilerInput;

const DEFAULT_INVESTMENT_COST: InvestmentCostCurve = InvestmentCostCurve::new(400., -0.3);

/// Aging never takes the efficiency below this value
const MINIMUM_EFFICIENCY: f64 = 0.5;

/// Gas-fired boiler delivering space heat at a constant efficiency.
#[derive(Clone, Debug)]
pub struct GasBoiler {
    channels: ResultChannels,
    power_nom: f64, // kW
    efficiency: f64,
    investment_cost: InvestmentCostCurve,
}

impl GasBoiler {
    pub fn new(name: &str, input: &GasBoilerInput) -> Self {
        Self {
            channels: ResultChannels::for_component(name),
            power_nom: input.power_nom,
            efficiency: input.efficiency,
            investment_cost: input
                .investment_cost
                .map(Into::into)
                .unwrap_or(DEFAULT_INVESTMENT_COST),
        }
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Gas needed to deliver the given heat, in Wh
    pub fn calc_energy(&self, heat_wh: f64) -> f64 {
        heat_wh / self.efficiency
    }

    /// Lower the efficiency by `step` and return the new value.
    pub fn age(&mut self, step: f64) -> f64 {
        let floor = MINIMUM_EFFICIENCY.min(self.efficiency);
        self.efficiency = (self.efficiency - step).max(floor);
        self.efficiency
    }
}

impl EnergyComponentBehaviour for GasBoiler {
    fn channels(&self) -> &ResultChannels {
        &self.channels
    }

    fn power_nom(&self) -> f64 {
        self.power_nom
    }

    fn carrier(&self) -> EnergyCarrier {
        EnergyCarrier::Gas
    }

    fn investment_cost_curve(&self) -> &InvestmentCostCurve {
        &self.investment_cost
    }
}

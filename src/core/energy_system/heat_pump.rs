use crate::core::energy_system::component::{
    EnergyCarrier, EnergyComponentBehaviour, InvestmentCostCurve, ResultChannels,
};
use crate::input::{HeatPumpAirInput, QuadraticCoefficients};

const DEFAULT_INVESTMENT_COST: InvestmentCostCurve = InvestmentCostCurve::new(2500., -0.25);

/// A heat pump never delivers less heat than the electricity it draws
const MINIMUM_COP: f64 = 1.;

fn evaluate(curve: &QuadraticCoefficients, x: f64) -> f64 {
    curve.constant + curve.linear * x + curve.quadratic * x.powi(2)
}

/// Air-source heat pump. The ambient air is the heat source.
#[derive(Clone, Debug)]
pub struct HeatPumpAir {
    channels: ResultChannels,
    power_nom: f64, // kW
    heating_curve: QuadraticCoefficients,
    cop_curve: QuadraticCoefficients,
    investment_cost: InvestmentCostCurve,
}

impl HeatPumpAir {
    pub fn new(name: &str, input: &HeatPumpAirInput) -> Self {
        Self {
            channels: ResultChannels::for_component(name),
            power_nom: input.power_nom,
            heating_curve: input.heating_curve,
            cop_curve: input.cop_curve,
            investment_cost: input
                .investment_cost
                .map(Into::into)
                .unwrap_or(DEFAULT_INVESTMENT_COST),
        }
    }

    /// Flow temperature the heating system needs at the given ambient temperature, in deg C
    pub fn sink_temperature(&self, ambient_temp: f64) -> f64 {
        evaluate(&self.heating_curve, ambient_temp)
    }

    /// Temperature lift from the ambient air to the sink, in K. Never negative.
    pub fn temperature_lift(&self, ambient_temp: f64) -> f64 {
        (self.sink_temperature(ambient_temp) - ambient_temp).max(0.)
    }

    pub fn cop_for_lift(&self, lift: f64) -> f64 {
        evaluate(&self.cop_curve, lift.max(0.)).max(MINIMUM_COP)
    }

    pub fn cop(&self, ambient_temp: f64) -> f64 {
        self.cop_for_lift(self.temperature_lift(ambient_temp))
    }

    /// Electricity needed to deliver the given heat, in Wh
    pub fn calc_energy(&self, heat_wh: f64, ambient_temp: f64) -> f64 {
        heat_wh / self.cop(ambient_temp)
    }
}

impl EnergyComponentBehaviour for HeatPumpAir {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use itertools::Itertools;
    use rstest::*;

    #[fixture]
    fn heat_pump() -> HeatPumpAir {
        HeatPumpAir::new(
            "Heat pump",
            &HeatPumpAirInput {
                power_nom: 8.,
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
            },
        )
    }

    #[rstest]
    fn test_sink_temperature_and_lift(heat_pump: HeatPumpAir) {
        assert_relative_eq!(heat_pump.sink_temperature(-10.), 46.);
        assert_relative_eq!(heat_pump.temperature_lift(-10.), 56.);
        assert_relative_eq!(heat_pump.temperature_lift(10.), 24.);
    }

    #[rstest]
    fn test_lift_is_never_negative(heat_pump: HeatPumpAir) {
        // ambient above the sink temperature
        assert_eq!(heat_pump.temperature_lift(30.), 0.);
        assert_relative_eq!(heat_pump.cop(30.), 7.);
    }

    #[rstest]
    fn test_cop_is_non_increasing_in_lift(heat_pump: HeatPumpAir) {
        let cops = (0..=90)
            .map(|lift| heat_pump.cop_for_lift(lift as f64))
            .collect::<Vec<_>>();

        assert!(cops.iter().tuple_windows().all(|(a, b)| b <= a));
    }

    #[rstest]
    fn test_cop_never_below_one() {
        let heat_pump = HeatPumpAir::new(
            "Heat pump",
            &HeatPumpAirInput {
                power_nom: 8.,
                heating_curve: QuadraticCoefficients {
                    constant: 70.,
                    ..Default::default()
                },
                cop_curve: QuadraticCoefficients {
                    constant: 4.,
                    linear: -0.1,
                    quadratic: 0.,
                },
                investment_cost: None,
            },
        );

        assert_eq!(heat_pump.cop(-20.), 1.);
    }

    #[rstest]
    fn test_electricity_use(heat_pump: HeatPumpAir) {
        let cop = 7. - 0.12 * 24. + 0.0006 * 24f64.powi(2);

        assert_relative_eq!(heat_pump.calc_energy(1000., 10.), 1000. / cop);
        assert_relative_eq!(heat_pump.calc_emissions(1000., 400.), 0.0004);
    }
}

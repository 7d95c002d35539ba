use crate::core::energy_system::component::EnergyComponent;
use crate::errors::{ActionError, ConfigurationError};
use crate::household::Household;
use crate::input::{ComponentInput, EnvelopeComponent, PlannedAction, WindowType};
use tracing::{info, warn};

fn ensure_solvent(household: &Household, cost: f64) -> Result<(), ActionError> {
    if household.user.check_solvency(cost) {
        Ok(())
    } else {
        Err(ActionError::InsufficientFunds {
            cost,
            available: household.user.available_funds(),
        })
    }
}

/// Add insulation to an opaque envelope component and pay for it.
///
/// Returns the cost, in Euro.
pub fn insulate(
    household: &mut Household,
    component: EnvelopeComponent,
    thickness_cm: f64,
) -> Result<f64, ActionError> {
    let envelope = &household.building.envelope;
    let cost = envelope.insulation_cost(component, thickness_cm);
    ensure_solvent(household, cost)?;

    let u_value = household
        .building
        .envelope
        .insulate(component, thickness_cm)?;
    household
        .user
        .transactions
        .record_action(format!("{thickness_cm} cm insulation on {component}"), cost);
    info!("Insulated {component} with {thickness_cm} cm for {cost:.2} Euro, U-value now {u_value:.3} W/(m2.K)");

    Ok(cost)
}

/// Replace every window of the building and pay for it.
///
/// Returns the cost, in Euro.
pub fn change_windows(
    household: &mut Household,
    window_type: WindowType,
) -> Result<f64, ActionError> {
    let cost = household
        .building
        .envelope
        .window_replacement_cost(window_type);
    ensure_solvent(household, cost)?;

    household.building.envelope.change_windows(window_type);
    household
        .user
        .transactions
        .record_action(format!("{window_type} windows"), cost);
    info!("Replaced windows with {window_type} for {cost:.2} Euro");

    Ok(cost)
}

/// Buy a new component and add it at the end of the system's dispatch order.
///
/// Returns the investment cost, in Euro.
///
/// Arguments:
/// * `name` - name of the new component, unique within the system
/// * `input` - configuration of the new component
/// * `year` - year of installation, fixing the feed-in tariff of a photovoltaic array
pub fn add_component(
    household: &mut Household,
    name: &str,
    input: &ComponentInput,
    year: u32,
) -> Result<f64, ActionError> {
    if household.system.component(name).is_some() {
        return Err(ConfigurationError::DuplicateComponent(name.into()).into());
    }

    let component = EnergyComponent::from_input(name, input, year);
    let cost = component.calc_investment_cost();
    ensure_solvent(household, cost)?;

    household.system.add_component(name, component)?;
    household
        .user
        .transactions
        .record_action(format!("New component '{name}'"), cost);
    info!("Installed '{name}' for {cost:.2} Euro");

    Ok(cost)
}

/// Take a component out of the system. Removal is free.
pub fn remove_component(
    household: &mut Household,
    name: &str,
) -> Result<EnergyComponent, ActionError> {
    let component = household.system.remove_component(name)?;
    info!("Removed '{name}' from the system");

    Ok(component)
}

/// Change how the household lives: heat to a new set point and/or cut the household
/// electricity demand. Habits cost nothing.
///
/// Arguments:
/// * `set_point_temperature` - new heating set point, in deg C
/// * `el_demand_reduction` - electricity saved every year from now on, in kWh/a
pub fn adopt_behaviour(
    household: &mut Household,
    set_point_temperature: Option<f64>,
    el_demand_reduction: Option<f64>,
) -> Result<f64, ActionError> {
    let user = &mut household.user;
    if let Some(set_point_temperature) = set_point_temperature {
        user.set_point_temperature = set_point_temperature;
        info!("Heating set point now {set_point_temperature:.1} degC");
    }
    if let Some(reduction) = el_demand_reduction {
        let el_demand = user.reduce_el_demand(reduction);
        info!("Saving {reduction:.0} kWh/a, household electricity demand now {el_demand:.0} kWh/a");
    }

    Ok(0.)
}

/// Carry out the actions planned for `year`, in order.
///
/// An action the household cannot afford is skipped with a warning. An action that does not
/// fit the household (e.g. removing a component that does not exist) is an error.
///
/// Returns the amount spent, in Euro.
pub fn apply_planned(
    year: u32,
    actions: &[PlannedAction],
    household: &mut Household,
) -> Result<f64, ConfigurationError> {
    let mut spent = 0.;

    for action in actions {
        let outcome = match action {
            PlannedAction::Insulate {
                component,
                thickness_cm,
            } => insulate(household, *component, *thickness_cm),
            PlannedAction::ChangeWindows { window_type } => change_windows(household, *window_type),
            PlannedAction::AddComponent { name, component } => {
                add_component(household, name, component, year)
            }
            PlannedAction::RemoveComponent { name } => {
                remove_component(household, name).map(|_| 0.)
            }
            PlannedAction::AdoptBehaviour {
                set_point_temperature,
                el_demand_reduction,
            } => adopt_behaviour(household, *set_point_temperature, *el_demand_reduction),
        };

        match outcome {
            Ok(cost) => spent += cost,
            Err(ActionError::InsufficientFunds { cost, available }) => {
                warn!("{year}: skipped {action:?}, it costs {cost:.2} Euro but only {available:.2} Euro are available");
            }
            Err(ActionError::Invalid(error)) => return Err(error),
        }
    }

    Ok(spent)
}

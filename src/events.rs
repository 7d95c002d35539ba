use crate::core::energy_system::component::EnergyComponent;
use crate::household::Household;
use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use strum_macros::Display;
use tracing::{debug, info};

/// Years the pandemic's extra ventilation lasts
const PANDEMIC_YEARS: u32 = 2;
const PANDEMIC_VENTILATION: f64 = 0.2; // 1/h
const SAHARA_SAND_YEARS: u32 = 1;
const SAHARA_SAND_DERATING: f64 = 0.2;
const UNEMPLOYMENT_SALARY_FACTOR: f64 = 0.5;
const FRIDGE_COST: f64 = 500.; // Euro
const FRIDGE_EL_SAVING: f64 = 100.; // kWh/a
const BOILER_AGING_STEP: f64 = 0.02;

/// Something that can happen to the household in a year.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum Event {
    Nothing,
    Inherit,
    Pandemic,
    SaharaSand,
    Unemployed,
    Promotion,
    BrokenFridge,
    BoilerAging,
}

/// Events are drawn uniformly from this pool, so a boring year is as likely as all the others
/// together.
const EVENT_POOL: [Event; 14] = [
    Event::Nothing,
    Event::Inherit,
    Event::Nothing,
    Event::Pandemic,
    Event::Nothing,
    Event::SaharaSand,
    Event::Nothing,
    Event::Unemployed,
    Event::Nothing,
    Event::Promotion,
    Event::Nothing,
    Event::BrokenFridge,
    Event::Nothing,
    Event::BoilerAging,
];

/// What a temporary event changed, so it can be undone exactly
#[derive(Clone, Debug, PartialEq)]
enum TemporaryEffect {
    Ventilation(f64),
    PvDerating(Vec<(String, f64)>),
    SalaryFactor(f64),
}

#[derive(Clone, Debug, PartialEq)]
struct PendingReset {
    reset_year: u32,
    effect: TemporaryEffect,
}

/// Draws the yearly random events from a seeded generator and undoes temporary events once
/// they run out.
#[derive(Clone, Debug)]
pub struct EventManager {
    rng: Pcg64,
    pending: IndexMap<Event, PendingReset>,
}

impl EventManager {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            pending: Default::default(),
        }
    }

    /// Temporary events still in force, with the year they end
    pub fn pending(&self) -> impl Iterator<Item = (Event, u32)> + '_ {
        self.pending
            .iter()
            .map(|(event, pending)| (*event, pending.reset_year))
    }

    pub fn is_active(&self, event: Event) -> bool {
        self.pending.contains_key(&event)
    }

    /// Undo every temporary event that ends in or before `year`.
    pub fn apply_resets(&mut self, year: u32, household: &mut Household) {
        let (expired, pending): (IndexMap<_, _>, IndexMap<_, _>) = self
            .pending
            .drain(..)
            .partition(|(_, pending)| pending.reset_year <= year);
        self.pending = pending;

        for (event, reset) in expired {
            revert(event, reset.effect, household);
        }
    }

    /// Draw this year's event and apply it. Returns the event that took effect, which is
    /// `Event::Nothing` when the drawn one had nothing to act on.
    pub fn draw(&mut self, year: u32, household: &mut Household) -> Event {
        let event = EVENT_POOL[self.rng.random_range(0..EVENT_POOL.len())];
        if self.apply(event, year, household) {
            event
        } else {
            info!("{year}: nothing happens this year");
            Event::Nothing
        }
    }

    /// Apply `event` to the household. Returns whether it had any effect; an event that is
    /// already in force, or that finds nothing to act on, has none.
    pub fn apply(&mut self, event: Event, year: u32, household: &mut Household) -> bool {
        match event {
            Event::Nothing => false,
            Event::Inherit => {
                let salaries = self.rng.random_range(5..=50);
                let heritage = salaries as f64 * household.user.monthly_salary();
                household.user.transactions.record_event("Inheritance", heritage);
                info!("{year}: you inherit {heritage:.2} Euro");
                true
            }
            Event::Pandemic => {
                if self.is_active(event) {
                    return false;
                }
                let envelope = &mut household.building.envelope;
                envelope.ventilation_rate += PANDEMIC_VENTILATION;
                info!(
                    "{year}: a pandemic raises the ventilation rate to {:.2} 1/h for {PANDEMIC_YEARS} years",
                    envelope.ventilation_rate
                );
                self.schedule_reset(
                    event,
                    year + PANDEMIC_YEARS,
                    TemporaryEffect::Ventilation(PANDEMIC_VENTILATION),
                );
                true
            }
            Event::SaharaSand => {
                if self.is_active(event) {
                    return false;
                }
                let derating = household
                    .system
                    .components_mut()
                    .filter_map(|component| match component {
                        EnergyComponent::Photovoltaic(pv) => {
                            let before = pv.efficiency_param();
                            let after = pv.adjust_efficiency_param(-SAHARA_SAND_DERATING);
                            Some((pv.name().to_string(), before - after))
                        }
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                if derating.is_empty() {
                    return false;
                }
                info!("{year}: Sahara sand covers the PV modules, output is reduced for a year");
                self.schedule_reset(
                    event,
                    year + SAHARA_SAND_YEARS,
                    TemporaryEffect::PvDerating(derating),
                );
                true
            }
            Event::Unemployed => {
                if self.is_active(event) {
                    return false;
                }
                let salary = household.user.scale_salary(UNEMPLOYMENT_SALARY_FACTOR);
                let years = self.rng.random_range(1..=2);
                info!("{year}: you lost your job, unemployment benefit is {salary:.2} Euro/month");
                self.schedule_reset(
                    event,
                    year + years,
                    TemporaryEffect::SalaryFactor(UNEMPLOYMENT_SALARY_FACTOR),
                );
                true
            }
            Event::Promotion => {
                if self.is_active(Event::Unemployed) {
                    return false;
                }
                let raise = self.rng.random_range(5..=25) as f64 / 100.;
                let salary = household.user.scale_salary(1. + raise);
                info!("{year}: you have been promoted, monthly salary is now {salary:.2} Euro");
                true
            }
            Event::BrokenFridge => {
                household
                    .user
                    .transactions
                    .record_event("Broken fridge", -FRIDGE_COST);
                let demand = household.user.reduce_el_demand(FRIDGE_EL_SAVING);
                info!(
                    "{year}: your fridge broke and was replaced for {FRIDGE_COST} Euro, electricity demand is now {demand:.0} kWh/a"
                );
                true
            }
            Event::BoilerAging => {
                let efficiencies = household
                    .system
                    .components_mut()
                    .filter_map(|component| match component {
                        EnergyComponent::GasBoiler(boiler) => Some(boiler.age(BOILER_AGING_STEP)),
                        _ => None,
                    })
                    .collect::<Vec<_>>();
                if efficiencies.is_empty() {
                    return false;
                }
                info!("{year}: your boiler is aging, efficiency drops to {efficiencies:.2?}");
                true
            }
        }
    }

    fn schedule_reset(&mut self, event: Event, reset_year: u32, effect: TemporaryEffect) {
        self.pending.insert(event, PendingReset { reset_year, effect });
    }
}

fn revert(event: Event, effect: TemporaryEffect, household: &mut Household) {
    match effect {
        TemporaryEffect::Ventilation(increase) => {
            let envelope = &mut household.building.envelope;
            envelope.ventilation_rate = (envelope.ventilation_rate - increase).max(0.);
            info!(
                "The pandemic is over, ventilation rate back to {:.2} 1/h",
                envelope.ventilation_rate
            );
        }
        TemporaryEffect::PvDerating(derating) => {
            for (name, applied) in derating {
                // arrays removed in the meantime need no cleaning
                if let Some(EnergyComponent::Photovoltaic(pv)) =
                    household.system.component_mut(&name)
                {
                    pv.adjust_efficiency_param(applied);
                }
            }
            info!("The PV modules are clean again");
        }
        TemporaryEffect::SalaryFactor(factor) => {
            let salary = household.user.scale_salary(1. / factor);
            info!("You found a new job, monthly salary is {salary:.2} Euro");
        }
    }
    debug!("Reverted event {event}");
}

use crate::core::units::{HOURS_PER_DAY, HOURS_PER_YEAR, MONTHS_PER_YEAR, WATT_HOURS_PER_KILOWATT_HOUR};
use crate::errors::ConfigurationError;
use crate::input::UserInput;
use crate::simulation_time::SimulationTime;
use std::f64::consts::PI;
use strum_macros::Display;

/// Salaries paid per year, including the Christmas bonus
const SALARIES_PER_YEAR: f64 = 13.;

/// Relative household electricity use for each hour of the day
const DAILY_EL_SHAPE: [f64; HOURS_PER_DAY as usize] = [
    0.5, 0.4, 0.4, 0.4, 0.4, 0.5, 0.8, 1.1, 1.0, 0.8, 0.8, 0.9, 1.0, 0.9, 0.8, 0.8, 0.9, 1.2, 1.5,
    1.6, 1.5, 1.3, 1.0, 0.7,
];

/// Amplitude of the winter peak of household electricity use
const SEASONAL_EL_AMPLITUDE: f64 = 0.2;

#[derive(Clone, Copy, Debug, Display, PartialEq)]
pub enum TransactionKind {
    Event,
    Action,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub description: String,
    /// Income for events (negative for expenses), cost for actions, in Euro
    pub amount: f64,
}

/// One-off payments of the current year, read into the annual balance and then cleared.
#[derive(Clone, Debug, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    pub fn record_event(&mut self, description: impl Into<String>, amount: f64) {
        self.entries.push(Transaction {
            kind: TransactionKind::Event,
            description: description.into(),
            amount,
        });
    }

    pub fn record_action(&mut self, description: impl Into<String>, cost: f64) {
        self.entries.push(Transaction {
            kind: TransactionKind::Action,
            description: description.into(),
            amount: cost,
        });
    }

    /// Net income from events, in Euro
    pub fn event_balance(&self) -> f64 {
        self.sum_of(TransactionKind::Event)
    }

    /// Total spent on actions, in Euro
    pub fn action_balance(&self) -> f64 {
        self.sum_of(TransactionKind::Action)
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn sum_of(&self, kind: TransactionKind) -> f64 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.amount)
            .sum()
    }
}

/// The player: thermal preferences, household finances and electricity use.
#[derive(Clone, Debug)]
pub struct UserProfile {
    pub comfort_temperature: f64,   // deg C
    pub set_point_temperature: f64, // deg C
    monthly_salary: f64,
    pub monthly_living_cost: f64,
    pub monthly_entertainment: f64,
    pub monthly_loan_payoff: f64,
    annual_el_demand: f64, // kWh/a
    bank_deposit: f64,
    el_profile: Vec<f64>,
    pub transactions: TransactionLog,
}

impl UserProfile {
    pub fn from_input(input: &UserInput) -> Result<Self, ConfigurationError> {
        let el_profile = match &input.el_profile {
            Some(profile) => normalise_profile(profile)?,
            None => default_el_profile(),
        };

        Ok(Self {
            comfort_temperature: input.comfort_temperature,
            set_point_temperature: input.set_point_temperature,
            monthly_salary: input.monthly_salary,
            monthly_living_cost: input.monthly_living_cost,
            monthly_entertainment: input.monthly_entertainment,
            monthly_loan_payoff: input.monthly_loan_payoff,
            annual_el_demand: input.annual_el_demand,
            bank_deposit: input.bank_deposit,
            el_profile,
            transactions: Default::default(),
        })
    }

    pub fn monthly_salary(&self) -> f64 {
        self.monthly_salary
    }

    /// Multiply the salary by `factor` and return the new monthly salary.
    pub fn scale_salary(&mut self, factor: f64) -> f64 {
        self.monthly_salary *= factor;
        self.monthly_salary
    }

    pub fn annual_el_demand(&self) -> f64 {
        self.annual_el_demand
    }

    /// Lower the annual household electricity demand, never below zero.
    pub fn reduce_el_demand(&mut self, reduction_kwh: f64) -> f64 {
        self.annual_el_demand = (self.annual_el_demand - reduction_kwh).max(0.);
        self.annual_el_demand
    }

    pub fn bank_deposit(&self) -> f64 {
        self.bank_deposit
    }

    pub fn set_bank_deposit(&mut self, bank_deposit: f64) {
        self.bank_deposit = bank_deposit;
    }

    /// Annual revenues and expenses, in Euro
    pub fn calc_economy(&self) -> (f64, f64) {
        let revenues = SALARIES_PER_YEAR * self.monthly_salary;
        let expenses = MONTHS_PER_YEAR as f64
            * (self.monthly_living_cost + self.monthly_entertainment + self.monthly_loan_payoff);

        (revenues, expenses)
    }

    /// Money the player can spend right now: the deposit plus this year's event income, less
    /// what has already been spent on actions this year.
    pub fn available_funds(&self) -> f64 {
        self.bank_deposit + self.transactions.event_balance() - self.transactions.action_balance()
    }

    pub fn check_solvency(&self, cost: f64) -> bool {
        cost <= self.available_funds()
    }

    /// Household electricity demand for every hour of the year, in W
    pub fn hourly_el_demand(&self) -> Vec<f64> {
        let annual_wh = self.annual_el_demand * WATT_HOURS_PER_KILOWATT_HOUR as f64;
        self.el_profile
            .iter()
            .map(|share| share * annual_wh)
            .collect()
    }

    /// Distance of the heating set point from the temperature the player finds comfortable,
    /// in K
    pub fn comfort_deviation(&self) -> f64 {
        self.comfort_temperature - self.set_point_temperature
    }
}

fn normalise_profile(profile: &[f64]) -> Result<Vec<f64>, ConfigurationError> {
    if profile.len() != HOURS_PER_YEAR {
        return Err(ConfigurationError::invalid_value(
            "el_profile",
            format!("expected {HOURS_PER_YEAR} hourly values, found {}", profile.len()),
        ));
    }
    if profile.iter().any(|share| *share < 0. || !share.is_finite()) {
        return Err(ConfigurationError::invalid_value(
            "el_profile",
            "values must be finite and non-negative",
        ));
    }

    let total: f64 = profile.iter().sum();
    if total <= 0. {
        return Err(ConfigurationError::invalid_value(
            "el_profile",
            "profile must not be all zeros",
        ));
    }

    Ok(profile.iter().map(|share| share / total).collect())
}

/// Daily load shape with a winter peak, normalised to sum to one over the year
fn default_el_profile() -> Vec<f64> {
    let profile = SimulationTime::annual()
        .iter()
        .map(|t| {
            let season = (2. * PI * t.current_day() as f64 / 365.).cos();
            DAILY_EL_SHAPE[t.hour_of_day() as usize] * (1. + SEASONAL_EL_AMPLITUDE * season)
        })
        .collect::<Vec<_>>();
    let total: f64 = profile.iter().sum();

    profile.into_iter().map(|share| share / total).collect()
}

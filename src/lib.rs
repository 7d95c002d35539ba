#![allow(clippy::too_many_arguments)]

pub mod actions;
pub mod core;
pub mod errors;
pub mod events;
pub mod external_conditions;
pub mod gamelog;
pub mod household;
pub mod input;
pub mod output;
pub mod read_weather_file;
mod simulation_time;
pub mod simulator;
#[cfg(test)]
mod tests;

use crate::core::energy_system::system::System;
use crate::core::scenario::Scenario;
use crate::core::space_heat_demand::building::Building;
use crate::core::space_heat_demand::envelope::BuildingEnvelope;
use crate::core::user::UserProfile;
use crate::errors::{ConfigurationError, RehomeCoreError, RehomeError};
use crate::events::EventManager;
use crate::external_conditions::WeatherSeries;
use crate::gamelog::{GameLog, GameStatus};
use crate::household::Household;
use crate::input::{ActionPlanInput, BuildingInput, CheckedInput, SystemInput, UserInput};
use crate::output::Output;
use crate::simulator::{AnnualSimulator, YearResults};
use anyhow::anyhow;
use csv::WriterBuilder;
use std::sync::Arc;
use tracing::{info, warn};

pub const START_YEAR: u32 = 2022;
pub const END_YEAR: u32 = 2066;
const CO2_BUDGET: f64 = 50.; // t
const COMFORT_POINTS: u32 = 3;

const ANNUAL_RESULTS_KEY: &str = "annual_results";

#[derive(Clone, Copy, Debug)]
pub struct GameSettings {
    pub start_year: u32,
    pub end_year: u32,
    /// Seed of the event generator; a random seed is chosen (and logged) when absent
    pub seed: Option<u64>,
    pub co2_budget: f64, // t
    pub comfort_points: u32,
    /// Also write the hourly system table of every year
    pub write_hourly: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            start_year: START_YEAR,
            end_year: END_YEAR,
            seed: None,
            co2_budget: CO2_BUDGET,
            comfort_points: COMFORT_POINTS,
            write_hourly: false,
        }
    }
}

/// Everything a game is set up from.
#[derive(Clone, Debug)]
pub struct GameInputs {
    pub building: BuildingInput,
    pub user: UserInput,
    pub system: SystemInput,
    pub scenario: Scenario,
    pub weather: WeatherSeries,
    pub plan: ActionPlanInput,
}

/// A game in progress, played one year at a time.
#[derive(Debug)]
pub struct Game {
    settings: GameSettings,
    household: Household,
    simulator: AnnualSimulator,
    events: EventManager,
    plan: ActionPlanInput,
    log: GameLog,
    year: u32,
    design_heat_load: f64,
}

impl Game {
    pub fn new(inputs: GameInputs, settings: GameSettings) -> Result<Self, RehomeError> {
        let GameInputs {
            building,
            user,
            system,
            scenario,
            weather,
            plan,
        } = inputs;

        building.check()?;
        user.check()?;
        system.check()?;
        plan.check()?;
        if settings.end_year < settings.start_year {
            return Err(ConfigurationError::invalid_value(
                "end_year",
                format!(
                    "game ends ({}) before it starts ({})",
                    settings.end_year, settings.start_year
                ),
            )
            .into());
        }
        scenario.check_covers(settings.start_year, settings.end_year)?;

        info!(
            "Weather: mean air temperature {:.1} degC",
            weather.air_temp_annual()
        );
        let building = Building::new(BuildingEnvelope::from_input(&building)?, Arc::new(weather));
        let user = UserProfile::from_input(&user)?;
        let system = System::from_input(&system, settings.start_year);
        system.log_summary();

        let design_heat_load = building.calc(user.set_point_temperature).design_heat_load();
        info!(
            "Maximum heating load of the building: {:.2} kW",
            design_heat_load / 1000.
        );
        if system.heat_capacity() < design_heat_load {
            warn!(
                "The heat producers ({:.2} kW) cannot cover the maximum heating load",
                system.heat_capacity() / 1000.
            );
        }

        let seed = settings.seed.unwrap_or_else(rand::random);
        info!("Event seed: {seed}");

        let log = GameLog::new(
            settings.start_year.saturating_sub(1),
            settings.co2_budget,
            user.bank_deposit(),
            settings.comfort_points,
        );

        Ok(Self {
            settings,
            household: Household::new(building, user, system),
            simulator: AnnualSimulator::new(Arc::new(scenario)),
            events: EventManager::new(seed),
            plan,
            log,
            year: settings.start_year,
            design_heat_load,
        })
    }

    /// The next year to be played
    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn household(&self) -> &Household {
        &self.household
    }

    /// Direct access to the household, for front ends that let the player act between years
    pub fn household_mut(&mut self) -> &mut Household {
        &mut self.household
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn status(&self) -> GameStatus {
        self.log.status()
    }

    /// Largest hourly heat demand of the building as configured at the start, in W
    pub fn design_heat_load(&self) -> f64 {
        self.design_heat_load
    }

    pub fn is_finished(&self) -> bool {
        self.status().is_over() || self.year > self.settings.end_year
    }

    /// Play the next year: the planned actions, the end of temporary events, a new event,
    /// the annual simulation and the ledger update.
    pub fn play_year(&mut self) -> Result<YearResults, RehomeError> {
        if self.is_finished() {
            return Err(RehomeCoreError::new(anyhow!(
                "The game is over ({}) after {}",
                self.status(),
                self.log.last().year
            ))
            .into());
        }
        let year = self.year;

        actions::apply_planned(year, self.plan.actions_for_year(year), &mut self.household)?;
        self.events.apply_resets(year, &mut self.household);
        let event = self.events.draw(year, &mut self.household);

        let results = self
            .household
            .settle_year(year, &self.simulator)
            .map_err(calculation_error)?;

        let row = self.log.record(&results, event);
        let (co2_budget, bank_deposit) = (row.co2_budget, row.bank_deposit);
        self.household.user.set_bank_deposit(bank_deposit);
        info!(
            "{year}: CO2 budget {co2_budget:.2} t, bank deposit {bank_deposit:.2} Euro, comfort{}",
            row.comfort()
        );

        self.year += 1;
        Ok(results)
    }

    /// Play until the last year or until the game is lost.
    ///
    /// Arguments:
    /// * `on_year` - called with the results of every year played
    pub fn play(
        &mut self,
        mut on_year: impl FnMut(&YearResults) -> anyhow::Result<()>,
    ) -> Result<GameStatus, RehomeError> {
        while !self.is_finished() {
            let results = self.play_year()?;
            on_year(&results).map_err(RehomeError::ErrorInOutput)?;
        }

        let status = self.status();
        if status.is_over() {
            info!("Game over: {status} in {}", self.log.last().year);
        } else {
            info!("You made it to {}!", self.settings.end_year);
        }

        Ok(status)
    }
}

/// Missing scenario years and similar configuration gaps surface during the simulation; they
/// are reported as invalid input rather than as calculation failures.
fn calculation_error(error: anyhow::Error) -> RehomeError {
    match error.downcast::<ConfigurationError>() {
        Ok(error) => error.into(),
        Err(error) => RehomeCoreError::new(error).into(),
    }
}

/// Play a whole game and write its ledger (and optionally the hourly tables of every year) to
/// the output.
pub fn run_game(
    inputs: GameInputs,
    output: impl Output,
    settings: GameSettings,
) -> Result<GameLog, RehomeError> {
    let mut game = Game::new(inputs, settings)?;

    game.play(|results| {
        if settings.write_hourly && !output.is_noop() {
            write_hourly_results(&output, results)?;
        }
        Ok(())
    })?;

    if !output.is_noop() {
        let writer = output
            .writer_for_location_key(ANNUAL_RESULTS_KEY)
            .map_err(RehomeError::ErrorInOutput)?;
        game.log
            .write_csv(writer)
            .map_err(RehomeError::ErrorInOutput)?;
    }

    Ok(game.log)
}

fn write_hourly_results(output: &impl Output, results: &YearResults) -> anyhow::Result<()> {
    let location_key = format!("hourly_results_{}", results.year);
    let writer = output.writer_for_location_key(&location_key)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(
        ["Hour", "Heat demand [W]", "Electricity demand household [W]"]
            .into_iter()
            .chain(results.hourly_system.keys().map(String::as_str)),
    )?;
    for (hour, (heat, el)) in results
        .hourly_heat_demand
        .iter()
        .zip(&results.hourly_el_demand)
        .enumerate()
    {
        let mut record = vec![hour.to_string(), heat.to_string(), el.to_string()];
        record.extend(
            results
                .hourly_system
                .values()
                .map(|series| series[hour].to_string()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

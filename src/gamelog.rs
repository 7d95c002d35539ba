use crate::events::Event;
use crate::simulator::YearResults;
use csv::WriterBuilder;
use indexmap::{IndexMap, IndexSet};
use std::io::Write;
use strum_macros::Display;

pub const YEAR: &str = "Year";
pub const CO2_BUDGET: &str = "CO2 Budget [t]";
pub const BANK_DEPOSIT: &str = "Bank Deposit [Euro]";
pub const COMFORT: &str = "Comfort";
pub const EVENT: &str = "Event";

/// A comfort point is lost in every year the set point misses the comfort temperature by more
/// than this, in K
const COMFORT_TOLERANCE: f64 = 2.;

const COMFORT_POINT: &str = " =)";

#[derive(Clone, Copy, Debug, Display, PartialEq)]
pub enum GameStatus {
    #[strum(to_string = "running")]
    Running,
    #[strum(to_string = "CO2 budget exceeded")]
    CO2BudgetExceeded,
    #[strum(to_string = "bank account empty")]
    BankAccountEmpty,
    #[strum(to_string = "comfort violated")]
    ComfortViolated,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        *self != Self::Running
    }
}

/// One year of the annual results ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerRow {
    pub year: u32,
    pub co2_budget: f64,   // t
    pub bank_deposit: f64, // Euro
    pub comfort_points: u32,
    pub event: Option<Event>,
    /// Every annual result channel of the year, absent for the initial row
    pub results: IndexMap<String, f64>,
}

impl LedgerRow {
    pub fn comfort(&self) -> String {
        COMFORT_POINT.repeat(self.comfort_points as usize)
    }

    pub fn status(&self) -> GameStatus {
        if self.co2_budget < 0. {
            GameStatus::CO2BudgetExceeded
        } else if self.bank_deposit < 0. {
            GameStatus::BankAccountEmpty
        } else if self.comfort_points == 0 {
            GameStatus::ComfortViolated
        } else {
            GameStatus::Running
        }
    }
}

/// Running totals of the game: each year's row follows from that year's results and the row
/// before it.
#[derive(Clone, Debug)]
pub struct GameLog {
    rows: Vec<LedgerRow>,
}

impl GameLog {
    /// Arguments:
    /// * `initial_year` - the year before the first simulated one
    /// * `co2_budget` - emissions the household may cause over the game, in t
    /// * `bank_deposit` - the household's savings at the start, in Euro
    /// * `comfort_points` - years of poor comfort the household tolerates
    pub fn new(initial_year: u32, co2_budget: f64, bank_deposit: f64, comfort_points: u32) -> Self {
        Self {
            rows: vec![LedgerRow {
                year: initial_year,
                co2_budget,
                bank_deposit,
                comfort_points,
                event: None,
                results: Default::default(),
            }],
        }
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn last(&self) -> &LedgerRow {
        // never empty, the initial row is created with the log
        &self.rows[self.rows.len() - 1]
    }

    pub fn status(&self) -> GameStatus {
        self.last().status()
    }

    /// Settle a simulated year against the previous row and append it.
    pub fn record(&mut self, results: &YearResults, event: Event) -> &LedgerRow {
        let previous = self.last();
        let comfort_points = if results.comfort_deviation().abs() > COMFORT_TOLERANCE {
            previous.comfort_points.saturating_sub(1)
        } else {
            previous.comfort_points
        };

        let row = LedgerRow {
            year: results.year,
            co2_budget: previous.co2_budget - results.total_emissions(),
            bank_deposit: previous.bank_deposit + results.balance(),
            comfort_points,
            event: Some(event),
            results: results
                .annual_channels()
                .map(|(channel, value)| (channel.clone(), *value))
                .collect(),
        };
        self.rows.push(row);

        self.last()
    }

    /// Write the ledger as CSV, one row per year. Result columns appear in the order they
    /// were first produced; a year without a channel leaves its cell empty.
    pub fn write_csv(&self, writer: impl Write) -> anyhow::Result<()> {
        let channels: IndexSet<&String> = self
            .rows
            .iter()
            .flat_map(|row| row.results.keys())
            .collect();

        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(
            [YEAR, CO2_BUDGET, BANK_DEPOSIT, COMFORT, EVENT]
                .into_iter()
                .chain(channels.iter().map(|channel| channel.as_str())),
        )?;

        for row in &self.rows {
            let mut record = vec![
                row.year.to_string(),
                row.co2_budget.to_string(),
                row.bank_deposit.to_string(),
                row.comfort(),
                row.event.map(|event| event.to_string()).unwrap_or_default(),
            ];
            record.extend(channels.iter().map(|channel| {
                row.results
                    .get(*channel)
                    .map(|value| value.to_string())
                    .unwrap_or_default()
            }));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        Ok(())
    }
}

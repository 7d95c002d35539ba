extern crate rehome;

use anyhow::Context;
use clap::Parser;
use rehome::core::scenario::Scenario;
use rehome::input::{ingest_for_processing, ActionPlanInput, CheckedInput};
use rehome::output::FileOutput;
use rehome::read_weather_file::pvgis_tmy_to_vec;
use rehome::{run_game, GameInputs, GameSettings, END_YEAR, START_YEAR};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct RehomeArgs {
    /// Building configuration (JSON)
    building_file: PathBuf,
    /// User configuration (JSON)
    user_file: PathBuf,
    /// Energy system configuration (JSON)
    system_file: PathBuf,
    /// Yearly emission factors and prices (CSV)
    #[arg(long)]
    scenario: PathBuf,
    /// PVGIS typical meteorological year (JSON)
    #[arg(long)]
    weather: PathBuf,
    /// Actions to take, keyed by year (JSON)
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Seed for the random events, to replay a game
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = START_YEAR)]
    start_year: u32,
    #[arg(long, default_value_t = END_YEAR)]
    end_year: u32,
    #[arg(long, short, default_value = ".")]
    output_dir: PathBuf,
    /// Also write the hourly system results of every year
    #[arg(long, default_value_t = false)]
    hourly: bool,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn read_json<T: DeserializeOwned + CheckedInput>(path: &Path) -> anyhow::Result<T> {
    ingest_for_processing(BufReader::new(File::open(path)?))
        .with_context(|| format!("Could not read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let args = RehomeArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let weather = pvgis_tmy_to_vec(BufReader::new(File::open(&args.weather)?))
        .and_then(|data| data.into_weather_series())
        .with_context(|| format!("Could not parse the weather file {}", args.weather.display()))?;
    let scenario = Scenario::new(BufReader::new(File::open(&args.scenario)?))
        .with_context(|| format!("Could not read the scenario {}", args.scenario.display()))?;
    let plan: ActionPlanInput = match &args.plan {
        Some(path) => read_json(path)?,
        None => Default::default(),
    };

    let inputs = GameInputs {
        building: read_json(&args.building_file)?,
        user: read_json(&args.user_file)?,
        system: read_json(&args.system_file)?,
        scenario,
        weather,
        plan,
    };
    let settings = GameSettings {
        start_year: args.start_year,
        end_year: args.end_year,
        seed: args.seed,
        write_hourly: args.hourly,
        ..Default::default()
    };

    fs::create_dir_all(&args.output_dir)?;
    let output = FileOutput::new(args.output_dir.clone(), "{}.csv".to_string());

    let log = run_game(inputs, &output, settings)?;

    let last = log.last();
    println!(
        "{}: {} (CO2 budget {:.2} t, bank deposit {:.2} Euro, comfort{})",
        last.year,
        if log.status().is_over() {
            "GAME OVER"
        } else {
            "You made it"
        },
        last.co2_budget,
        last.bank_deposit,
        last.comfort()
    );
    println!(
        "Results written to {}",
        args.output_dir.join("annual_results.csv").display()
    );

    Ok(())
}

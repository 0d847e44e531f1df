use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, CustomUserError, Select, Text, validator::Validation};
use metar_core::{
    Config, MetarProvider, ProviderId, RawReport, StationCode, fetch_report,
    provider::{default_provider_from_config, provider_from_config},
};
use tracing::debug;

use crate::render::{JsonReport, render};

/// Shown for every fetch failure, whatever the cause.
const UNAVAILABLE: &str = "Station not found or connection error.";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "metar", version, about = "METAR decoder")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default station, provider and timeout.
    Configure,

    /// Fetch and decode the latest METAR for a station.
    Show {
        /// ICAO station code; defaults to the configured station or LFQQ.
        station: Option<String>,

        /// Provider short name, "noaa" or "aviationweather".
        #[arg(long)]
        provider: Option<String>,

        /// Print the decoded report as JSON.
        #[arg(long)]
        json: bool,

        /// Offer to refresh after each report.
        #[arg(long)]
        watch: bool,
    },

    /// Decode a raw METAR line without fetching anything.
    Decode {
        /// The METAR text; several arguments are joined with spaces.
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
        raw: Vec<String>,

        /// Print the decoded report as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                station,
                provider,
                json,
                watch,
            } => show(station.as_deref(), provider.as_deref(), json, watch).await,
            Command::Decode { raw, json } => print_report(&RawReport::new(raw.join(" ")), json),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_station = config.default_station().unwrap_or_default();
    let station = Text::new("Default station (ICAO code):")
        .with_default(current_station.as_str())
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            Ok(match StationCode::try_from(input) {
                Ok(_) => Validation::Valid,
                Err(err) => Validation::Invalid(err.to_string().into()),
            })
        })
        .prompt()?;
    config.set_default_station(&StationCode::try_from(station.as_str())?);

    let providers = ProviderId::all().to_vec();
    let current_provider = config.default_provider_id().unwrap_or_default();
    let cursor = providers
        .iter()
        .position(|id| *id == current_provider)
        .unwrap_or(0);
    let provider = Select::new("Default provider:", providers)
        .with_starting_cursor(cursor)
        .prompt()?;
    config.set_default_provider(provider);

    let timeout = CustomType::<u64>::new("HTTP timeout (seconds):")
        .with_default(config.timeout().as_secs())
        .with_error_message("Please type a whole number of seconds")
        .prompt()?;
    config.set_timeout_secs(timeout);

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(
    station: Option<&str>,
    provider: Option<&str>,
    json: bool,
    watch: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let station = match station {
        Some(code) => StationCode::try_from(code)?,
        None => config.default_station()?,
    };
    let provider = match provider {
        Some(id) => provider_from_config(ProviderId::try_from(id)?, &config)?,
        None => default_provider_from_config(&config)?,
    };
    debug!(%station, provider = %provider.id(), watch, "showing report");

    loop {
        let found = show_once(provider.as_ref(), &station, json).await?;

        if !watch {
            if !found {
                bail!(UNAVAILABLE);
            }
            return Ok(());
        }
        if !found {
            eprintln!("{UNAVAILABLE}");
        }

        let refresh = Confirm::new("Refresh?").with_default(true).prompt()?;
        if !refresh {
            return Ok(());
        }
    }
}

/// Fetches and prints one report; `false` when the station was unavailable.
async fn show_once(
    provider: &dyn MetarProvider,
    station: &StationCode,
    json: bool,
) -> anyhow::Result<bool> {
    match fetch_report(provider, station).await {
        Some(raw) => {
            print_report(&raw, json)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn print_report(raw: &RawReport, json: bool) -> anyhow::Result<()> {
    let report = raw.decode();

    if json {
        let text = serde_json::to_string_pretty(&JsonReport::new(raw, &report))
            .context("Failed to serialize report to JSON")?;
        println!("{text}");
    } else {
        print!("{}", render(raw, &report, Utc::now()));
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use common::FilterState;

pub mod commands;

use crate::config::AppConfig;
use commands::{comparison, legacy_forecast, mappings, normalize_supply, snapshot};

#[derive(Parser)]
#[command(name = "vacinadash")]
#[command(about = "Vaccine distribution dashboard data client")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./vacinadash.{toml,yaml,json} when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Analytics backend base URL
    ///
    /// Example: http://localhost:8000
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Dashboard filters; every one is optional.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Year (e.g. 2024)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month (1-12)
    #[arg(long)]
    pub month: Option<u32>,

    /// Two-letter state code (e.g. SP)
    #[arg(long)]
    pub uf: Option<String>,

    /// Vaccine name
    #[arg(long)]
    pub vaccine: Option<String>,

    /// Manufacturer
    #[arg(long)]
    pub manufacturer: Option<String>,
}

impl From<FilterArgs> for FilterState {
    fn from(args: FilterArgs) -> Self {
        FilterState {
            year: args.year,
            month: args.month,
            state_code: trimmed(args.uf),
            vaccine_name: trimmed(args.vaccine),
            manufacturer: trimmed(args.manufacturer),
        }
    }
}

/// Drops surrounding whitespace so validation sees what is sent; blank means unset.
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one fetch cycle and print the resulting view state as JSON
    Snapshot {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the forecast or comparison outcome for the filters
    Comparison {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the yearly history and projection of one vaccine
    LegacyForecast {
        /// Vaccine name
        #[arg(long)]
        vaccine: String,

        /// Two-letter state code
        #[arg(long)]
        uf: Option<String>,

        /// Month (1-12)
        #[arg(long)]
        month: Option<u32>,
    },
    /// List vaccines with mapped supply records
    Mappings,
    /// Normalize raw supply names against a mapping file
    ///
    /// The mapping file is a JSON array of
    /// {"pattern": "...", "vacina_normalizada": "...", "priority": 10}
    NormalizeSupply {
        /// Mapping file (defaults to mappings_path from the configuration)
        #[arg(short, long)]
        mappings: Option<PathBuf>,

        /// Raw supply names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?
            .with_overrides(self.api_base_url, self.timeout);

        match self.command {
            Commands::Snapshot { filters } => {
                snapshot(&config, filters.into()).await?;
            }
            Commands::Comparison { filters } => {
                comparison(&config, filters.into()).await?;
            }
            Commands::LegacyForecast { vaccine, uf, month } => {
                let filters = FilterState {
                    vaccine_name: Some(vaccine),
                    state_code: trimmed(uf),
                    month,
                    ..FilterState::default()
                };
                legacy_forecast(&config, filters).await?;
            }
            Commands::Mappings => {
                mappings(&config).await?;
            }
            Commands::NormalizeSupply { mappings, names } => {
                let path = mappings.or_else(|| config.mappings_path.clone());
                normalize_supply(path.as_deref(), &names)?;
            }
        }
        Ok(())
    }
}

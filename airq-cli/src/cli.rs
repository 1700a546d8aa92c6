use airq_core::{Config, Location, Panel, Session};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::{configure, interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "airq", version, about = "Air-quality dashboard client")]
pub struct Cli {
    /// Backend base URL, overriding the configured one.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Read and write configuration at this path instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text (non-interactive commands).
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather, alerts and current readings grouped by city.
    Dashboard,

    /// List monitoring stations with coordinates, marker colour and latest PM2.5.
    Map,

    /// Show the weather panel.
    Weather {
        /// Latitude; defaults to the configured location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; defaults to the configured location.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Show the AQI trend for one monitoring location.
    Forecast {
        /// City name as reported by the backend, e.g. "Houston".
        city: String,

        /// Location name within the city, e.g. "Downtown".
        location: String,
    },

    /// Look up places by name.
    Search {
        query: String,

        /// Maximum number of suggestions.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Browse the dashboard interactively (favourites live for the session only).
    Session,

    /// Edit configuration interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = self.load_config()?;

        match self.command {
            Command::Configure => {
                let path = configure::run(config, self.config.as_deref())?;
                println!("Configuration saved to {}", path.display());
            }
            Command::Dashboard => {
                let mut session = Session::from_config(&config)?;
                session.refresh().await;
                if self.json {
                    print_json(&render::dashboard_json(&session))?;
                } else {
                    print!("{}", render::dashboard(&session));
                }
            }
            Command::Map => {
                let mut session = Session::from_config(&config)?;
                session.refresh_readings().await;
                if let Panel::Failed(reason) = session.readings_panel() {
                    anyhow::bail!("{reason}");
                }
                if self.json {
                    print_json(&serde_json::to_value(session.stations())?)?;
                } else {
                    print!("{}", render::stations(&session.stations()));
                }
            }
            Command::Weather { lat, lon } => {
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.default_location =
                        Location { name: format!("{lat:.4}, {lon:.4}"), lat, lon };
                }
                let mut session = Session::from_config(&config)?;
                session.refresh_weather().await;
                if self.json {
                    print_json(&render::panel_json(session.weather()))?;
                } else {
                    print!("{}", render::weather(session.location(), session.weather()));
                }
            }
            Command::Forecast { city, location } => {
                let mut session = Session::from_config(&config)?;
                let panel = session.load_forecast(&city, &location).await;
                if self.json {
                    print_json(&render::panel_json(panel))?;
                } else {
                    print!("{}", render::forecast(panel));
                }
            }
            Command::Search { query, limit } => {
                if let Some(limit) = limit {
                    config.search_limit = limit;
                }
                let session = Session::from_config(&config)?;
                let found = session.search(&query).await?;
                if self.json {
                    print_json(&serde_json::to_value(&found)?)?;
                } else {
                    print!("{}", render::suggestions(&found));
                }
            }
            Command::Session => {
                let session = Session::from_config(&config)?;
                interactive::run(session).await?;
            }
        }

        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(url) = &self.backend {
            config.backend_url = url.clone();
            config.validate().context("Invalid --backend")?;
        }

        tracing::debug!(backend = %config.backend_url, "configuration loaded");
        Ok(config)
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

use airq_core::{Config, config::parse_base_url};
use anyhow::Result;
use inquire::{CustomType, Text, validator::Validation};
use std::path::{Path, PathBuf};

/// Prompt for every setting, starting from the current values, and save.
pub fn run(mut config: Config, path: Option<&Path>) -> Result<PathBuf> {
    config.backend_url = url_prompt("Backend URL:", &config.backend_url)?;
    config.geocoder_url = url_prompt("Geocoder (Nominatim) URL:", &config.geocoder_url)?;

    config.default_location.name = Text::new("Default location name:")
        .with_default(&config.default_location.name)
        .prompt()?;
    config.default_location.lat = CustomType::<f64>::new("Latitude:")
        .with_default(config.default_location.lat)
        .with_validator(|v: &f64| Ok(range_check(*v, 90.0)))
        .prompt()?;
    config.default_location.lon = CustomType::<f64>::new("Longitude:")
        .with_default(config.default_location.lon)
        .with_validator(|v: &f64| Ok(range_check(*v, 180.0)))
        .prompt()?;

    config.search_limit = CustomType::<usize>::new("Search result limit:")
        .with_default(config.search_limit)
        .with_validator(|v: &usize| Ok(at_least_one(*v as u64)))
        .prompt()?;
    config.request_timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.request_timeout_secs)
        .with_validator(|v: &u64| Ok(at_least_one(*v)))
        .prompt()?;

    config.validate()?;

    match path {
        Some(p) => {
            config.save_to(p)?;
            Ok(p.to_path_buf())
        }
        None => config.save(),
    }
}

fn url_prompt(message: &str, current: &str) -> Result<String> {
    let value = Text::new(message)
        .with_default(current)
        .with_validator(|s: &str| {
            Ok(match parse_base_url(s) {
                Ok(_) => Validation::Valid,
                Err(e) => Validation::Invalid(format!("{e:#}").into()),
            })
        })
        .prompt()?;
    Ok(value.trim().to_string())
}

fn at_least_one(v: u64) -> Validation {
    if v == 0 { Validation::Invalid("Must be at least 1".into()) } else { Validation::Valid }
}

fn range_check(v: f64, bound: f64) -> Validation {
    if v.abs() <= bound {
        Validation::Valid
    } else {
        Validation::Invalid(format!("Must be between -{bound} and {bound}").into())
    }
}

use crate::{
    Config,
    model::{ForecastPoint, GeocodeSuggestion, MergedSnapshot, WeatherSnapshot},
    provider::{backend::BackendClient, nominatim::NominatimGeocoder},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod backend;
pub mod nominatim;

/// Everything the dashboard reads from its backend.
#[async_trait]
pub trait DashboardSource: Send + Sync + Debug {
    /// Current readings for every monitored location plus the satellite summary.
    async fn fetch_merged(&self) -> anyhow::Result<MergedSnapshot>;

    async fn fetch_weather(&self, lat: f64, lon: f64) -> anyhow::Result<WeatherSnapshot>;

    async fn fetch_forecast(&self, city: &str, location: &str)
    -> anyhow::Result<Vec<ForecastPoint>>;
}

/// Free-text place search.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(&self, query: &str, limit: usize) -> anyhow::Result<Vec<GeocodeSuggestion>>;
}

/// Construct the backend source described by `config`.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn DashboardSource>> {
    let client = BackendClient::new(&config.backend_url, config.request_timeout())?;
    Ok(Box::new(client))
}

/// Construct the geocoder described by `config`.
pub fn geocoder_from_config(config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    let geocoder = NominatimGeocoder::new(
        &config.geocoder_url,
        &config.user_agent,
        config.request_timeout(),
    )?;
    Ok(Box::new(geocoder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_both_clients() {
        let cfg = Config::default();
        assert!(source_from_config(&cfg).is_ok());
        assert!(geocoder_from_config(&cfg).is_ok());
    }

    #[test]
    fn invalid_backend_url_is_rejected() {
        let cfg = Config { backend_url: "not a url".into(), ..Default::default() };
        let err = source_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("not a valid URL"));
    }
}

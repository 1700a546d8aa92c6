//! Forward geocoding through Nominatim (OpenStreetMap).
//! Free, no API key, but the usage policy requires an identifying User-Agent.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::{config::parse_base_url, error::ApiError, model::GeocodeSuggestion};

use super::Geocoder;

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    search_url: Url,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut search_url = parse_base_url(base_url)?;
        let path = format!("{}/search", search_url.path().trim_end_matches('/'));
        search_url.set_path(&path);

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build geocoding HTTP client")?;

        Ok(Self { search_url, http })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NmCoord {
    Number(f64),
    Text(String),
}

impl NmCoord {
    fn value(&self) -> Option<f64> {
        match self {
            NmCoord::Number(v) => Some(*v),
            NmCoord::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    display_name: String,
    lat: NmCoord,
    lon: NmCoord,
}

impl NmPlace {
    fn into_suggestion(self) -> Option<GeocodeSuggestion> {
        Some(GeocodeSuggestion {
            lat: self.lat.value()?,
            lon: self.lon.value()?,
            display_name: self.display_name,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GeocodeSuggestion>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit_param = limit.to_string();
        let res = self
            .http
            .get(self.search_url.clone())
            .query(&[("q", query), ("format", "json"), ("limit", limit_param.as_str())])
            .send()
            .await
            .context("Failed to send request to Nominatim")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Nominatim response body")?;

        if !status.is_success() {
            return Err(ApiError::status("nominatim search", status, &body).into());
        }

        let places: Vec<NmPlace> =
            serde_json::from_str(&body).context("Failed to parse Nominatim JSON")?;

        let suggestions: Vec<_> =
            places.into_iter().filter_map(NmPlace::into_suggestion).take(limit).collect();

        tracing::debug!(%query, found = suggestions.len(), "geocode search");
        Ok(suggestions)
    }
}

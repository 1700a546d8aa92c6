use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{
    config::parse_base_url,
    error::ApiError,
    model::{ForecastPoint, MergedSnapshot, WeatherSnapshot},
};

use super::DashboardSource;

/// HTTP client for the dashboard backend's `/api/*` endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base: Url,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = parse_base_url(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self
            .base
            .join(endpoint.trim_start_matches('/'))
            .with_context(|| format!("Failed to build URL for {endpoint}"))?;

        tracing::debug!(%url, ?query, "GET");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {endpoint}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read {endpoint} response body"))?;

        if !status.is_success() {
            return Err(ApiError::status(endpoint, status, &body).into());
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse {endpoint} JSON"))
    }
}

#[async_trait]
impl DashboardSource for BackendClient {
    async fn fetch_merged(&self) -> Result<MergedSnapshot> {
        let merged: MergedSnapshot = self.get_json("/api/merged", &[]).await?;
        tracing::info!(
            locations = merged.openaq.len(),
            overall_aqi = ?merged.overall_aqi,
            "merged snapshot fetched"
        );
        Ok(merged)
    }

    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        let query = [("lat", lat.to_string()), ("lon", lon.to_string())];
        self.get_json("/api/weather", &query).await
    }

    async fn fetch_forecast(&self, city: &str, location: &str) -> Result<Vec<ForecastPoint>> {
        let query = [("city", city.to_string()), ("location", location.to_string())];
        let points: Vec<ForecastPoint> = self.get_json("/api/forecast", &query).await?;
        tracing::info!(%city, %location, points = points.len(), "forecast fetched");
        Ok(points)
    }
}

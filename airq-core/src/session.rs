//! Dashboard session state.
//!
//! A [`Session`] owns everything the dashboard shows: the latest readings,
//! the weather panel, the selected forecast and the favourites. It starts
//! empty, changes only through its methods and is dropped when the user
//! quits. Network failures never escape the refresh methods; they are
//! logged and leave the affected panel in [`Panel::Failed`].

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::{
    Config,
    alert::{self, Alert, AlertRule},
    dashboard::{self, CityGroup, ForecastView, Station},
    favourites::{FavouriteEntry, Favourites},
    model::{AirQualityReading, GeocodeSuggestion, Location, MergedSnapshot, WeatherSnapshot},
    provider::{DashboardSource, Geocoder, geocoder_from_config, source_from_config},
};

/// Load state of one independently refreshed section of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Empty,
    Ready(T),
    Failed(String),
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Panel::Empty
    }
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Panel::Failed(_))
    }
}

#[derive(Debug)]
pub struct Session {
    source: Box<dyn DashboardSource>,
    geocoder: Box<dyn Geocoder>,
    alert_rules: Vec<AlertRule>,
    search_limit: usize,
    location: Location,
    favourites: Favourites,
    readings: Panel<MergedSnapshot>,
    weather: Panel<WeatherSnapshot>,
    forecast: Panel<ForecastView>,
    last_updated: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(source: Box<dyn DashboardSource>, geocoder: Box<dyn Geocoder>) -> Self {
        Self {
            source,
            geocoder,
            alert_rules: AlertRule::defaults(),
            search_limit: 5,
            location: Location::default(),
            favourites: Favourites::new(),
            readings: Panel::Empty,
            weather: Panel::Empty,
            forecast: Panel::Empty,
            last_updated: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let session = Self::new(source_from_config(config)?, geocoder_from_config(config)?)
            .with_alert_rules(config.alerts.clone())
            .with_location(config.default_location.clone())
            .with_search_limit(config.search_limit);
        Ok(session)
    }

    pub fn with_alert_rules(mut self, rules: Vec<AlertRule>) -> Self {
        self.alert_rules = rules;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Reload readings and weather.
    pub async fn refresh(&mut self) {
        self.refresh_readings().await;
        self.refresh_weather().await;
        self.last_updated = Some(Utc::now());
    }

    pub async fn refresh_readings(&mut self) {
        match self.source.fetch_merged().await {
            Ok(merged) => {
                tracing::debug!(tempo = %merged.tempo, "satellite data");
                self.favourites.update_aqi(&merged.openaq);
                self.readings = Panel::Ready(merged);
            }
            Err(err) => {
                tracing::warn!("Error fetching air-quality data: {err:#}");
                self.readings = Panel::Failed(format!("Failed to load readings: {err}"));
            }
        }
    }

    pub async fn refresh_weather(&mut self) {
        let Location { lat, lon, .. } = self.location;
        self.weather = match self.source.fetch_weather(lat, lon).await {
            Ok(w) if w.is_empty() => {
                tracing::warn!(lat, lon, "backend returned no weather data");
                Panel::Failed("No weather data available".to_string())
            }
            Ok(w) => Panel::Ready(w),
            Err(err) => {
                tracing::warn!("Error fetching weather data: {err:#}");
                Panel::Failed(format!("Failed to load weather: {err}"))
            }
        };
    }

    /// Move the weather panel to `location` and reload it.
    pub async fn set_location(&mut self, location: Location) {
        tracing::info!(name = %location.name, "weather location changed");
        self.location = location;
        self.refresh_weather().await;
    }

    pub async fn load_forecast(&mut self, city: &str, location: &str) -> &Panel<ForecastView> {
        self.forecast = match self.source.fetch_forecast(city, location).await {
            Ok(points) => Panel::Ready(ForecastView::new(city, location, points)),
            Err(err) => {
                tracing::warn!("Error fetching forecast data for {location}, {city}: {err:#}");
                Panel::Failed(format!("Failed to load forecast for {location}, {city}."))
            }
        };
        &self.forecast
    }

    pub async fn search(&self, query: &str) -> Result<Vec<GeocodeSuggestion>> {
        self.geocoder.search(query, self.search_limit).await
    }

    /// Toggle the favourite for a location present in the latest readings.
    /// Returns the new membership, or `None` if the location is unknown.
    pub fn toggle_favourite(&mut self, city: &str, location: &str) -> Option<bool> {
        let entry = FavouriteEntry::from(self.find_reading(city, location)?);
        Some(self.favourites.toggle(entry))
    }

    pub fn find_reading(&self, city: &str, location: &str) -> Option<&AirQualityReading> {
        self.readings().iter().find(|r| r.is_at(city, location))
    }

    /// Latest readings, empty until a refresh succeeds.
    pub fn readings(&self) -> &[AirQualityReading] {
        self.readings.ready().map(|m| m.openaq.as_slice()).unwrap_or_default()
    }

    pub fn readings_panel(&self) -> &Panel<MergedSnapshot> {
        &self.readings
    }

    pub fn city_groups(&self) -> Vec<CityGroup<'_>> {
        dashboard::group_by_city(self.readings())
    }

    pub fn stations(&self) -> Vec<Station<'_>> {
        dashboard::stations(self.readings())
    }

    pub fn overall_aqi(&self) -> Option<f64> {
        dashboard::overall_aqi(self.readings())
    }

    pub fn alerts(&self) -> Vec<Alert> {
        alert::evaluate(&self.alert_rules, self.readings())
    }

    pub fn weather(&self) -> &Panel<WeatherSnapshot> {
        &self.weather
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn forecast(&self) -> &Panel<ForecastView> {
        &self.forecast
    }

    pub fn favourites(&self) -> &Favourites {
        &self.favourites
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastPoint;
    use anyhow::anyhow;
    use async_trait::async_trait;

    #[derive(Debug, Default)]
    struct FakeSource {
        readings: Vec<AirQualityReading>,
        weather_fails: bool,
        forecast_fails: bool,
    }

    #[async_trait]
    impl DashboardSource for FakeSource {
        async fn fetch_merged(&self) -> Result<MergedSnapshot> {
            Ok(MergedSnapshot { openaq: self.readings.clone(), ..Default::default() })
        }

        async fn fetch_weather(&self, _lat: f64, _lon: f64) -> Result<WeatherSnapshot> {
            if self.weather_fails {
                Err(anyhow!("connection refused"))
            } else {
                Ok(WeatherSnapshot { temperature: Some(20.0), ..Default::default() })
            }
        }

        async fn fetch_forecast(&self, _city: &str, _location: &str) -> Result<Vec<ForecastPoint>> {
            if self.forecast_fails {
                return Err(anyhow!("timeout"));
            }
            Ok(vec![ForecastPoint {
                ds: "2024-10-05T10:00:00".into(),
                yhat: 55.0,
                parameter_name: Some("pm25".into()),
            }])
        }
    }

    #[derive(Debug)]
    struct NoGeocoder;

    #[async_trait]
    impl Geocoder for NoGeocoder {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<GeocodeSuggestion>> {
            Ok(vec![])
        }
    }

    fn reading(city: &str, location: &str, aqi: f64) -> AirQualityReading {
        AirQualityReading {
            city: city.into(),
            location: location.into(),
            lat: Some(29.76),
            lon: Some(-95.37),
            aqi: Some(aqi),
            dominant_pollutant: Some("pm25".into()),
            measurements: vec![],
        }
    }

    fn session(source: FakeSource) -> Session {
        Session::new(Box::new(source), Box::new(NoGeocoder))
    }

    #[tokio::test]
    async fn starts_empty() {
        let s = session(FakeSource::default());
        assert!(s.readings().is_empty());
        assert_eq!(s.weather(), &Panel::Empty);
        assert!(s.favourites().is_empty());
        assert!(s.last_updated().is_none());
    }

    #[tokio::test]
    async fn weather_failure_degrades_only_its_panel() {
        let mut s = session(FakeSource {
            readings: vec![reading("Houston", "Downtown", 160.0)],
            weather_fails: true,
            ..Default::default()
        });

        s.refresh().await;

        assert_eq!(s.readings().len(), 1);
        assert!(s.weather().is_failed());
        assert!(s.last_updated().is_some());
        assert_eq!(s.alerts().len(), 1);
        assert_eq!(s.overall_aqi(), Some(160.0));
    }

    #[tokio::test]
    async fn stations_follow_readings() {
        let mut unplaced = reading("Austin", "North", 30.0);
        unplaced.lon = None;
        let mut s = session(FakeSource {
            readings: vec![reading("Houston", "Downtown", 160.0), unplaced],
            ..Default::default()
        });
        assert!(s.stations().is_empty());

        s.refresh().await;

        let markers = s.stations();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].location, "Downtown");
        assert_eq!(markers[0].dominant_pollutant.as_deref(), Some("PM25"));
    }

    #[tokio::test]
    async fn toggle_favourite_uses_latest_reading() {
        let mut s = session(FakeSource {
            readings: vec![reading("Houston", "Downtown", 160.0)],
            ..Default::default()
        });

        assert_eq!(s.toggle_favourite("Houston", "Downtown"), None);

        s.refresh().await;
        assert_eq!(s.toggle_favourite("Houston", "Downtown"), Some(true));
        assert_eq!(s.favourites().list()[0].aqi, Some(160.0));
        assert_eq!(s.favourites().list()[0].lat, Some(29.76));

        assert_eq!(s.toggle_favourite("Houston", "Downtown"), Some(false));
        assert!(s.favourites().is_empty());
    }

    #[tokio::test]
    async fn forecast_panel_states() {
        let mut s = session(FakeSource::default());
        let panel = s.load_forecast("Houston", "Downtown").await;
        assert_eq!(
            panel.ready().map(|v| v.title.as_str()),
            Some("AQI Trend for PM25 in Downtown, Houston")
        );

        let mut s = session(FakeSource { forecast_fails: true, ..Default::default() });
        let panel = s.load_forecast("Houston", "Downtown").await;
        assert_eq!(panel, &Panel::Failed("Failed to load forecast for Downtown, Houston.".into()));
    }
}

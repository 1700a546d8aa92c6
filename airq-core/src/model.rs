use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::aqi::{AqiStatus, classify};

/// One pollutant observation reported for a monitoring location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub parameter: String,
    #[serde(default)]
    pub unit: String,
    pub value: f64,
    /// `None` when the backend sent an empty or unparseable `date_utc`.
    #[serde(rename = "date_utc", default, deserialize_with = "de_timestamp")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Current air quality at a single monitoring location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    #[serde(default = "unknown", deserialize_with = "de_or_unknown")]
    pub city: String,
    #[serde(default = "unknown", deserialize_with = "de_or_unknown")]
    pub location: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub dominant_pollutant: Option<String>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl AirQualityReading {
    pub fn status(&self) -> AqiStatus {
        classify(self.aqi)
    }

    /// Coordinates, if both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }

    pub fn is_at(&self, city: &str, location: &str) -> bool {
        self.city == city && self.location == location
    }
}

/// Body of `GET /api/merged`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedSnapshot {
    #[serde(default)]
    pub openaq: Vec<AirQualityReading>,
    /// Satellite dataset; carried through untouched.
    #[serde(default)]
    pub tempo: Value,
    #[serde(default)]
    pub overall_aqi: Option<f64>,
}

/// Nested upstream payload the backend forwards next to the flattened fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWeather {
    #[serde(default)]
    pub current: Value,
    #[serde(default)]
    pub hourly: Value,
}

/// Body of `GET /api/weather`. Every field is optional since the backend
/// answers `{}` when its upstream call fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub temperature: Option<f64>,
    /// km/h
    #[serde(default)]
    pub windspeed: Option<f64>,
    /// Degrees clockwise from north.
    #[serde(default)]
    pub winddirection: Option<f64>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub raw: Option<RawWeather>,
}

impl WeatherSnapshot {
    /// Relative humidity in percent, falling back to the raw upstream fields.
    pub fn humidity_pct(&self) -> Option<f64> {
        self.humidity.or_else(|| self.raw_value("relativehumidity_2m"))
    }

    /// Surface pressure in hPa, falling back to the raw upstream fields.
    pub fn pressure_hpa(&self) -> Option<f64> {
        self.pressure.or_else(|| self.raw_value("surface_pressure"))
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.windspeed.is_none()
            && self.humidity_pct().is_none()
            && self.pressure_hpa().is_none()
    }

    fn raw_value(&self, key: &str) -> Option<f64> {
        let raw = self.raw.as_ref()?;

        if let Some(v) = raw.current.get(key).and_then(Value::as_f64) {
            return Some(v);
        }

        let series = raw.hourly.get(key)?.as_array()?;
        let times = raw.hourly.get("time").and_then(Value::as_array);
        let now = self
            .time
            .as_deref()
            .or_else(|| raw.current.get("time").and_then(Value::as_str));

        let idx = match (times, now) {
            (Some(ts), Some(t)) => ts
                .iter()
                .position(|x| x.as_str() == Some(t))
                .or_else(|| ts.len().checked_sub(1)),
            (Some(ts), None) => ts.len().checked_sub(1),
            (None, _) => series.len().checked_sub(1),
        }?;

        series.get(idx)?.as_f64()
    }
}

/// One point of the per-location AQI trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: String,
    pub yhat: f64,
    #[serde(default)]
    pub parameter_name: Option<String>,
}

impl ForecastPoint {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.ds)
    }
}

/// A place returned by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeSuggestion {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Named coordinates, used for the weather panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self { name: "New York".to_string(), lat: 40.7128, lon: -74.0060 }
    }
}

impl From<GeocodeSuggestion> for Location {
    fn from(s: GeocodeSuggestion) -> Self {
        Self { name: s.display_name, lat: s.lat, lon: s.lon }
    }
}

/// Parse an ISO-8601 timestamp; naive timestamps are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ndt| ndt.and_utc())
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn de_or_unknown<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(d)?;
    Ok(s.filter(|s| !s.is_empty()).unwrap_or_else(unknown))
}

fn de_timestamp<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(d)?;
    Ok(s.as_deref().and_then(parse_timestamp))
}

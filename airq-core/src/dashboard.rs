//! Presentation-independent shaping of backend data: grouping readings by
//! city, placing stations on the map, picking the newest measurement,
//! summarising a forecast series.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    aqi::AqiStatus,
    model::{AirQualityReading, ForecastPoint, Measurement},
};

/// Readings of one city, worst air first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityGroup<'a> {
    pub city: &'a str,
    pub locations: Vec<&'a AirQualityReading>,
}

/// Group readings by city. Cities come out alphabetically; inside a city
/// locations are ordered by AQI, highest first, with a missing AQI counted as 0.
pub fn group_by_city(readings: &[AirQualityReading]) -> Vec<CityGroup<'_>> {
    let mut by_city: BTreeMap<&str, Vec<&AirQualityReading>> = BTreeMap::new();
    for r in readings {
        by_city.entry(r.city.as_str()).or_default().push(r);
    }

    by_city
        .into_iter()
        .map(|(city, mut locations)| {
            locations.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a)));
            CityGroup { city, locations }
        })
        .collect()
}

fn sort_key(r: &AirQualityReading) -> f64 {
    r.aqi.filter(|v| !v.is_nan()).unwrap_or(0.0)
}

/// A map marker for one monitoring station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station<'a> {
    pub city: &'a str,
    pub location: &'a str,
    pub lat: f64,
    pub lon: f64,
    pub aqi: Option<f64>,
    pub status: AqiStatus,
    /// Upper-cased, e.g. `PM25`.
    pub dominant_pollutant: Option<String>,
    pub pm25: Option<f64>,
}

/// Markers for every reading that reports both coordinates, in backend order.
pub fn stations(readings: &[AirQualityReading]) -> Vec<Station<'_>> {
    readings
        .iter()
        .filter_map(|r| {
            let (lat, lon) = r.coordinates()?;
            Some(Station {
                city: &r.city,
                location: &r.location,
                lat,
                lon,
                aqi: r.aqi,
                status: r.status(),
                dominant_pollutant: r.dominant_pollutant.as_deref().map(str::to_uppercase),
                pm25: latest_measurement(r, "pm25").map(|m| m.value),
            })
        })
        .collect()
}

/// Newest measurement of `parameter`; undated measurements rank oldest.
pub fn latest_measurement<'a>(
    reading: &'a AirQualityReading,
    parameter: &str,
) -> Option<&'a Measurement> {
    reading
        .measurements
        .iter()
        .filter(|m| m.parameter.eq_ignore_ascii_case(parameter))
        .reduce(|best, m| if m.observed_at > best.observed_at { m } else { best })
}

/// Worst AQI across all readings.
pub fn overall_aqi(readings: &[AirQualityReading]) -> Option<f64> {
    readings
        .iter()
        .filter_map(|r| r.aqi)
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
}

/// A forecast series with its display title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub city: String,
    pub location: String,
    pub title: String,
    /// Set when every point names the same pollutant.
    pub pollutant: Option<String>,
    pub points: Vec<ForecastPoint>,
}

impl ForecastView {
    pub fn new(city: &str, location: &str, points: Vec<ForecastPoint>) -> Self {
        let pollutant = single_pollutant(&points);
        let title = if points.is_empty() {
            format!("No 24-hour AQI forecast available for {location}, {city}.")
        } else if let Some(p) = &pollutant {
            format!("AQI Trend for {} in {location}, {city}", p.to_uppercase())
        } else {
            format!("AQI Trend for {location}, {city}")
        };

        Self { city: city.to_string(), location: location.to_string(), title, pollutant, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Highest predicted value and when it occurs.
    pub fn peak(&self) -> Option<&ForecastPoint> {
        self.points.iter().reduce(|best, p| if p.yhat > best.yhat { p } else { best })
    }
}

fn single_pollutant(points: &[ForecastPoint]) -> Option<String> {
    let first = points.first()?.parameter_name.as_deref()?;
    points
        .iter()
        .all(|p| p.parameter_name.as_deref() == Some(first))
        .then(|| first.to_string())
}

//! Human-friendly text and JSON output.

use airq_core::{
    AqiStatus, Favourites, Location, Panel, Session, WeatherSnapshot,
    alert::Alert,
    classify,
    dashboard::{CityGroup, ForecastView, Station, latest_measurement},
    model::GeocodeSuggestion,
};
use chrono::{DateTime, Local, Utc};
use serde_json::{Value, json};
use std::fmt::Write;

const NA: &str = "N/A";

pub fn fmt_aqi(aqi: Option<f64>) -> String {
    match aqi {
        Some(v) if v.is_finite() => format!("{v:.0}"),
        _ => NA.to_string(),
    }
}

/// Forecast values are fractional; show at most one decimal.
fn tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn fmt_value(v: f64) -> String {
    if !v.is_finite() {
        return NA.to_string();
    }
    let v = tenths(v);
    if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v:.1}") }
}

fn fmt_opt(v: Option<f64>, precision: usize, unit: &str) -> String {
    v.map_or_else(|| NA.to_string(), |v| format!("{v:.precision$}{unit}"))
}

fn status_text(status: &AqiStatus) -> String {
    format!("{} [{}]", status.label, status.text_color)
}

pub fn clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%I:%M:%S %p").to_string()
}

pub fn weather(location: &Location, panel: &Panel<WeatherSnapshot>) -> String {
    let mut out = format!("Weather ({})\n", location.name);
    match panel {
        Panel::Ready(w) => {
            let wind = match (w.windspeed, w.winddirection) {
                (Some(speed), Some(dir)) => format!("{speed:.1} km/h {dir:.0}°"),
                (Some(speed), None) => format!("{speed:.1} km/h"),
                _ => NA.to_string(),
            };
            let _ = writeln!(out, "  Temperature: {}", fmt_opt(w.temperature, 1, "°C"));
            let _ = writeln!(out, "  Wind:        {wind}");
            let _ = writeln!(out, "  Humidity:    {}", fmt_opt(w.humidity_pct(), 0, "%"));
            let _ = writeln!(out, "  Pressure:    {}", fmt_opt(w.pressure_hpa(), 1, " hPa"));
        }
        Panel::Failed(reason) => {
            let _ = writeln!(out, "  {NA} ({reason})");
        }
        Panel::Empty => {
            let _ = writeln!(out, "  {NA}");
        }
    }
    out
}

pub fn alerts(alerts: &[Alert]) -> String {
    alerts.iter().map(|a| format!("! {}\n", a.message)).collect()
}

pub fn readings(groups: &[CityGroup<'_>], favourites: &Favourites) -> String {
    if groups.is_empty() {
        return "No current readings available.\n".to_string();
    }

    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}", group.city);
        for r in &group.locations {
            let star = if favourites.contains(&r.city, &r.location) { '*' } else { ' ' };
            let pm25 = latest_measurement(r, "pm25")
                .map_or_else(|| NA.to_string(), |m| format!("{:.1}µg/m³", m.value));
            let _ = writeln!(
                out,
                "  {star} {:<28} PM2.5: {:<12} AQI {:>4}  {}",
                r.location,
                pm25,
                fmt_aqi(r.aqi),
                status_text(&r.status()),
            );
        }
    }
    out
}

pub fn forecast(panel: &Panel<ForecastView>) -> String {
    match panel {
        Panel::Ready(view) => {
            let mut out = format!("{}\n", view.title);
            for p in &view.points {
                let label = p.timestamp().map_or_else(
                    || p.ds.clone(),
                    |t| t.with_timezone(&Local).format("%H:%M").to_string(),
                );
                let pollutant = p
                    .parameter_name
                    .as_deref()
                    .map(|n| format!(" ({})", n.to_uppercase()))
                    .unwrap_or_default();
                let _ = writeln!(out, "  {label:>16}  {:>5}{pollutant}", fmt_value(p.yhat));
            }
            if let Some(peak) = view.peak() {
                let shown = tenths(peak.yhat);
                let label = classify(Some(shown)).label;
                let _ = writeln!(out, "  Peak: {} ({label})", fmt_value(shown));
            }
            out
        }
        Panel::Failed(reason) => format!("{reason}\n"),
        Panel::Empty => "No forecast loaded.\n".to_string(),
    }
}

/// Station markers: position, marker colour and popup details.
pub fn stations(stations: &[Station<'_>]) -> String {
    if stations.is_empty() {
        return "No stations with known coordinates.\n".to_string();
    }

    let mut out = String::new();
    for s in stations {
        let _ = writeln!(
            out,
            "{}, {}  ({:.4}, {:.4})  {}",
            s.location, s.city, s.lat, s.lon, s.status.marker_color
        );
        let _ = writeln!(
            out,
            "    AQI {} ({})  Dominant: {}  PM2.5: {}",
            fmt_aqi(s.aqi),
            s.status.label,
            s.dominant_pollutant.as_deref().unwrap_or(NA),
            fmt_opt(s.pm25, 1, "µg/m³"),
        );
    }
    out
}

pub fn favourites(favourites: &Favourites) -> String {
    if favourites.is_empty() {
        return "No favourites yet.\n".to_string();
    }

    favourites
        .list()
        .iter()
        .map(|f| {
            format!(
                "* {}, {}  AQI {}  {}\n",
                f.location,
                f.city,
                fmt_aqi(f.aqi),
                classify(f.aqi).label
            )
        })
        .collect()
}

pub fn suggestions(found: &[GeocodeSuggestion]) -> String {
    if found.is_empty() {
        return "No matching places.\n".to_string();
    }

    found
        .iter()
        .map(|s| format!("{}  ({:.4}, {:.4})\n", s.display_name, s.lat, s.lon))
        .collect()
}

/// Full dashboard as printed by `airq dashboard`.
pub fn dashboard(session: &Session) -> String {
    let mut out = String::new();

    if let Some(at) = session.last_updated() {
        let _ = writeln!(out, "Last updated: {}\n", clock(at));
    }

    out.push_str(&weather(session.location(), session.weather()));
    out.push('\n');

    let alert_lines = alerts(&session.alerts());
    if !alert_lines.is_empty() {
        out.push_str(&alert_lines);
        out.push('\n');
    }

    if let Panel::Failed(reason) = session.readings_panel() {
        let _ = writeln!(out, "{reason}");
        return out;
    }

    let overall = session.overall_aqi();
    let _ = writeln!(out, "Overall AQI: {} ({})\n", fmt_aqi(overall), classify(overall).label);
    out.push_str(&readings(&session.city_groups(), session.favourites()));
    out
}

pub fn dashboard_json(session: &Session) -> Value {
    let readings: Vec<Value> = session
        .readings()
        .iter()
        .map(|r| {
            json!({
                "reading": r,
                "status": r.status(),
                "favourite": session.favourites().contains(&r.city, &r.location),
            })
        })
        .collect();

    json!({
        "last_updated": session.last_updated(),
        "overall_aqi": session.overall_aqi(),
        "alerts": session.alerts(),
        "readings": readings,
        "readings_state": panel_state(session.readings_panel()),
        "stations": session.stations(),
        "weather": panel_json(session.weather()),
        "location": session.location(),
    })
}

pub fn panel_json<T: serde::Serialize>(panel: &Panel<T>) -> Value {
    match panel {
        Panel::Ready(v) => json!({ "state": "ready", "data": v }),
        _ => panel_state(panel),
    }
}

/// Load state without the payload, for panels whose data is emitted elsewhere.
fn panel_state<T>(panel: &Panel<T>) -> Value {
    match panel {
        Panel::Ready(_) => json!({ "state": "ready" }),
        Panel::Failed(reason) => json!({ "state": "failed", "error": reason }),
        Panel::Empty => json!({ "state": "empty" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airq_core::{
        AirQualityReading, DashboardSource, FavouriteEntry, ForecastPoint, Geocoder,
        MergedSnapshot, Measurement,
        dashboard::{group_by_city, stations as station_markers},
        model::parse_timestamp,
    };
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;

    /// Backend whose readings endpoint is down.
    #[derive(Debug)]
    struct ReadingsDown;

    #[async_trait]
    impl DashboardSource for ReadingsDown {
        async fn fetch_merged(&self) -> Result<MergedSnapshot> {
            Err(anyhow!("502 upstream"))
        }

        async fn fetch_weather(&self, _lat: f64, _lon: f64) -> Result<WeatherSnapshot> {
            Ok(WeatherSnapshot { temperature: Some(21.0), ..Default::default() })
        }

        async fn fetch_forecast(&self, _city: &str, _location: &str) -> Result<Vec<ForecastPoint>> {
            Ok(vec![])
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

    fn reading(city: &str, location: &str, aqi: Option<f64>) -> AirQualityReading {
        AirQualityReading {
            city: city.into(),
            location: location.into(),
            lat: None,
            lon: None,
            aqi,
            dominant_pollutant: None,
            measurements: vec![],
        }
    }

    #[test]
    fn aqi_formatting() {
        assert_eq!(fmt_aqi(Some(160.0)), "160");
        assert_eq!(fmt_aqi(Some(f64::NAN)), "N/A");
        assert_eq!(fmt_aqi(None), "N/A");
    }

    #[test]
    fn readings_mark_favourites_and_missing_values() {
        let data = vec![
            reading("Houston", "Downtown", Some(160.0)),
            reading("Houston", "Clinton", None),
        ];
        let mut favs = Favourites::new();
        favs.add(FavouriteEntry::new("Houston", "Downtown"));

        let out = readings(&group_by_city(&data), &favs);

        assert!(out.starts_with("Houston\n"));
        assert!(out.contains("* Downtown"));
        assert!(out.contains("Unhealthy [red]"));
        assert!(out.contains("N/A [gray]"));
    }

    #[test]
    fn empty_readings_message() {
        assert_eq!(readings(&[], &Favourites::new()), "No current readings available.\n");
    }

    #[test]
    fn weather_panel_states() {
        let loc = Location::default();
        let ready = Panel::Ready(WeatherSnapshot {
            temperature: Some(18.25),
            windspeed: Some(11.0),
            winddirection: Some(240.0),
            ..Default::default()
        });

        let out = weather(&loc, &ready);
        assert!(out.contains("Temperature: 18.2°C") || out.contains("Temperature: 18.3°C"));
        assert!(out.contains("11.0 km/h 240°"));
        assert!(out.contains("Humidity:    N/A"));

        let failed = weather(&loc, &Panel::Failed("Failed to load weather".into()));
        assert!(failed.contains("N/A (Failed to load weather)"));
    }

    #[test]
    fn forecast_lists_points_and_peak() {
        let view = ForecastView::new(
            "Houston",
            "Downtown",
            vec![point("not a date", 48.6), point("also not", 101.0)],
        );

        let out = forecast(&Panel::Ready(view));
        assert!(out.starts_with("AQI Trend for PM25 in Downtown, Houston\n"));
        assert!(out.contains("not a date"));
        assert!(out.contains(" 48.6 (PM25)"));
        assert!(out.contains("Peak: 101 (Unhealthy for Sensitive Groups)"));
    }

    fn point(ds: &str, yhat: f64) -> ForecastPoint {
        ForecastPoint { ds: ds.into(), yhat, parameter_name: Some("pm25".into()) }
    }

    #[test]
    fn forecast_peak_label_matches_printed_value() {
        let view = ForecastView::new("Houston", "Downtown", vec![point("t1", 50.4)]);
        let out = forecast(&Panel::Ready(view));
        assert!(out.contains("Peak: 50.4 (Moderate)"));

        let view = ForecastView::new("Houston", "Downtown", vec![point("t1", 50.04)]);
        let out = forecast(&Panel::Ready(view));
        assert!(out.contains("Peak: 50 (Good)"));
    }

    #[test]
    fn forecast_values() {
        assert_eq!(fmt_value(44.0), "44");
        assert_eq!(fmt_value(44.96), "45");
        assert_eq!(fmt_value(150.25), "150.3");
        assert_eq!(fmt_value(f64::NAN), "N/A");
    }

    #[test]
    fn stations_listing() {
        let mut placed = reading("Houston", "Downtown", Some(160.0));
        placed.lat = Some(29.76);
        placed.lon = Some(-95.37);
        placed.dominant_pollutant = Some("pm25".into());
        placed.measurements = vec![Measurement {
            parameter: "pm25".into(),
            unit: "µg/m³".into(),
            value: 72.1,
            observed_at: parse_timestamp("2024-10-05T12:00:00Z"),
        }];
        let data = vec![placed, reading("Houston", "Clinton", Some(90.0))];

        let out = stations(&station_markers(&data));

        assert!(out.starts_with("Downtown, Houston  (29.7600, -95.3700)  #F56565\n"));
        assert!(out.contains("AQI 160 (Unhealthy)  Dominant: PM25  PM2.5: 72.1µg/m³"));
        assert!(!out.contains("Clinton"));
        assert_eq!(stations(&[]), "No stations with known coordinates.\n");
    }

    #[test]
    fn favourites_listing() {
        let mut favs = Favourites::new();
        assert_eq!(favourites(&favs), "No favourites yet.\n");

        favs.add(FavouriteEntry::new("Houston", "Downtown").with_aqi(160.0));
        assert_eq!(favourites(&favs), "* Downtown, Houston  AQI 160  Unhealthy\n");
    }

    #[test]
    fn panel_json_shapes() {
        let failed: Panel<u8> = Panel::Failed("x".into());
        assert_eq!(panel_json(&failed)["state"], "failed");
        assert_eq!(panel_json(&Panel::Ready(3u8))["data"], 3);
        assert_eq!(panel_json(&Panel::<u8>::Empty), json!({ "state": "empty" }));
    }

    #[tokio::test]
    async fn dashboard_json_reports_failed_readings() {
        let mut session = Session::new(Box::new(ReadingsDown), Box::new(NoGeocoder));
        session.refresh().await;

        let out = dashboard_json(&session);

        assert_eq!(out["readings_state"]["state"], "failed");
        assert_eq!(out["readings_state"]["error"], "Failed to load readings: 502 upstream");
        assert_eq!(out["readings"], json!([]));
        assert_eq!(out["weather"]["state"], "ready");

        let text = out.to_string();
        assert!(text.contains("failed") && text.contains("502"));
    }
}

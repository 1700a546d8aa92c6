use serde::{Deserialize, Serialize};

use crate::{
    aqi::{AqiStatus, classify},
    model::AirQualityReading,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Health,
    Severe,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AlertLevel::Health => "Health",
            AlertLevel::Severe => "Severe",
        })
    }
}

/// Raise an alert when `city`'s AQI is strictly above `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub city: String,
    pub threshold: f64,
    pub level: AlertLevel,
}

impl AlertRule {
    pub fn new(city: impl Into<String>, threshold: f64, level: AlertLevel) -> Self {
        Self { city: city.into(), threshold, level }
    }

    pub fn defaults() -> Vec<AlertRule> {
        vec![
            AlertRule::new("Los Angeles", 100.0, AlertLevel::Health),
            AlertRule::new("Houston", 150.0, AlertLevel::Severe),
        ]
    }

    /// Checks the first reading reported for the rule's city.
    pub fn check(&self, readings: &[AirQualityReading]) -> Option<Alert> {
        let reading = readings.iter().find(|r| r.city == self.city)?;
        let aqi = reading.aqi.filter(|v| *v > self.threshold)?;
        let status = classify(Some(aqi));

        Some(Alert {
            level: self.level,
            city: reading.city.clone(),
            aqi,
            message: format!(
                "{} Alert: Air quality is {} in {}",
                self.level,
                status.label.to_lowercase(),
                reading.city
            ),
            status,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub city: String,
    pub aqi: f64,
    pub status: AqiStatus,
    pub message: String,
}

/// All alerts raised by `rules`, in rule order.
pub fn evaluate(rules: &[AlertRule], readings: &[AirQualityReading]) -> Vec<Alert> {
    rules.iter().filter_map(|rule| rule.check(readings)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(city: &str, aqi: Option<f64>) -> AirQualityReading {
        AirQualityReading {
            city: city.into(),
            location: "Central".into(),
            lat: None,
            lon: None,
            aqi,
            dominant_pollutant: None,
            measurements: vec![],
        }
    }

    #[test]
    fn threshold_is_strict() {
        let rules = AlertRule::defaults();
        assert!(evaluate(&rules, &[reading("Los Angeles", Some(100.0))]).is_empty());

        let alerts = evaluate(&rules, &[reading("Los Angeles", Some(101.0))]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Health);
        assert_eq!(
            alerts[0].message,
            "Health Alert: Air quality is unhealthy for sensitive groups in Los Angeles"
        );
    }

    #[test]
    fn severe_houston() {
        let alerts = evaluate(
            &AlertRule::defaults(),
            &[reading("Los Angeles", Some(40.0)), reading("Houston", Some(160.0))],
        );

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Severe);
        assert_eq!(alerts[0].message, "Severe Alert: Air quality is unhealthy in Houston");
    }

    #[test]
    fn only_first_reading_per_city_counts() {
        let readings = [reading("Houston", Some(20.0)), reading("Houston", Some(250.0))];
        assert!(evaluate(&AlertRule::defaults(), &readings).is_empty());
    }

    #[test]
    fn missing_aqi_never_alerts() {
        assert!(evaluate(&AlertRule::defaults(), &[reading("Houston", None)]).is_empty());
    }
}

use serde::{Deserialize, Serialize};

/// Severity band of an Air Quality Index value.
///
/// Bands are ordered; each one covers values up to and including its upper
/// bound. Absent or NaN values map to [`AqiCategory::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    Unknown,
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Classify a numeric AQI. Total over `f64`: NaN is `Unknown`, anything
    /// above 300 (including infinity) is `Hazardous`.
    pub fn from_value(aqi: f64) -> Self {
        if aqi.is_nan() {
            Self::Unknown
        } else if aqi <= 50.0 {
            Self::Good
        } else if aqi <= 100.0 {
            Self::Moderate
        } else if aqi <= 150.0 {
            Self::UnhealthyForSensitiveGroups
        } else if aqi <= 200.0 {
            Self::Unhealthy
        } else if aqi <= 300.0 {
            Self::VeryUnhealthy
        } else {
            Self::Hazardous
        }
    }

    pub fn from_option(aqi: Option<f64>) -> Self {
        aqi.map_or(Self::Unknown, Self::from_value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "N/A",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    /// Color name used for status text.
    pub fn text_color(&self) -> &'static str {
        match self {
            Self::Unknown => "gray",
            Self::Good => "green",
            Self::Moderate => "yellow",
            Self::UnhealthyForSensitiveGroups => "orange",
            Self::Unhealthy => "red",
            Self::VeryUnhealthy => "purple",
            Self::Hazardous => "dark red",
        }
    }

    /// Hex color used for map markers.
    pub fn marker_color(&self) -> &'static str {
        match self {
            Self::Unknown => "#4A5568",
            Self::Good => "#48BB78",
            Self::Moderate => "#ECC94B",
            Self::UnhealthyForSensitiveGroups => "#ED8936",
            Self::Unhealthy => "#F56565",
            Self::VeryUnhealthy => "#9F7AEA",
            Self::Hazardous => "#E53E3E",
        }
    }

    pub const fn all() -> &'static [AqiCategory] {
        &[
            AqiCategory::Unknown,
            AqiCategory::Good,
            AqiCategory::Moderate,
            AqiCategory::UnhealthyForSensitiveGroups,
            AqiCategory::Unhealthy,
            AqiCategory::VeryUnhealthy,
            AqiCategory::Hazardous,
        ]
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Status label plus presentation colors for one AQI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiStatus {
    pub category: AqiCategory,
    pub label: &'static str,
    pub text_color: &'static str,
    pub marker_color: &'static str,
}

impl From<AqiCategory> for AqiStatus {
    fn from(category: AqiCategory) -> Self {
        Self {
            category,
            label: category.label(),
            text_color: category.text_color(),
            marker_color: category.marker_color(),
        }
    }
}

/// Classify an optional AQI reading.
pub fn classify(aqi: Option<f64>) -> AqiStatus {
    AqiCategory::from_option(aqi).into()
}

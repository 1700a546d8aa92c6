//! Core library for the `airq` air-quality dashboard.
//!
//! This crate defines:
//! - AQI classification and session favourites
//! - Clients for the dashboard backend and the geocoder
//! - Shared domain models and dashboard view helpers
//! - Configuration handling
//!
//! It is used by `airq-cli`, but can also be reused by other front ends.

pub mod alert;
pub mod aqi;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod favourites;
pub mod model;
pub mod provider;
pub mod session;

pub use aqi::{AqiCategory, AqiStatus, classify};
pub use config::Config;
pub use error::ApiError;
pub use favourites::{FavouriteEntry, Favourites};
pub use model::{
    AirQualityReading, ForecastPoint, GeocodeSuggestion, Location, Measurement, MergedSnapshot,
    WeatherSnapshot,
};
pub use provider::{DashboardSource, Geocoder};
pub use session::{Panel, Session};

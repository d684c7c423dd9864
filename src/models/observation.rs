use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

/// Natural key of a stored observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    #[serde(alias = "datetime")]
    pub timestamp: String,
    #[serde(alias = "city")]
    pub location: String,
}

impl RecordKey {
    pub fn new(timestamp: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            location: location.into(),
        }
    }
}

/// One reading for one station at one instant.
///
/// Field order is the column order of the CSV store; do not reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    // ISO-8601 as reported by the station, not normalised
    pub timestamp: String,
    pub location: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub air_quality_index: Option<i64>,
    pub dominant_pollutant: Option<String>,

    // Pollutants
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
    pub o3: Option<f64>,

    // Weather
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub dew_point: Option<f64>,
}

impl Observation {
    /// Column names in store order.
    pub const FIELD_NAMES: [&'static str; 18] = [
        "timestamp",
        "location",
        "latitude",
        "longitude",
        "airQualityIndex",
        "dominantPollutant",
        "pm25",
        "pm10",
        "no2",
        "so2",
        "co",
        "o3",
        "temperature",
        "humidity",
        "pressure",
        "windSpeed",
        "windGust",
        "dewPoint",
    ];

    /// Observation with coordinates set and every measurement empty.
    pub fn new(timestamp: String, location: String, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            location,
            latitude,
            longitude,
            air_quality_index: None,
            dominant_pollutant: None,
            pm25: None,
            pm10: None,
            no2: None,
            so2: None,
            co: None,
            o3: None,
            temperature: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            wind_gust: None,
            dew_point: None,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.timestamp.clone(), self.location.clone())
    }

    pub fn validate_coordinates(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }
}

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ParseFailure, StationFailure};
use crate::models::Observation;
use crate::utils::constants::API_STATUS_OK;

/// Top-level shape of a WAQI feed response.
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    status: String,
    #[serde(default)]
    data: Option<Value>,
}

/// `iaqi` keys for each nullable measurement, in store order.
const POLLUTANT_KEYS: [&str; 6] = ["pm25", "pm10", "no2", "so2", "co", "o3"];
const WEATHER_KEYS: [&str; 6] = ["t", "h", "p", "w", "wg", "dew"];

/// Turns WAQI feed payloads into observations.
#[derive(Debug, Clone, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode a raw response body and parse its data payload.
    pub fn parse_response(
        &self,
        body: &[u8],
        location: &str,
    ) -> std::result::Result<Observation, StationFailure> {
        let envelope: FeedEnvelope = serde_json::from_slice(body)
            .map_err(|e| StationFailure::Api(format!("invalid response body: {}", e)))?;

        if envelope.status != API_STATUS_OK {
            let detail = match envelope.data {
                Some(Value::String(message)) => message,
                Some(other) => other.to_string(),
                None => "no details".to_string(),
            };
            return Err(StationFailure::Api(format!(
                "status '{}': {}",
                envelope.status, detail
            )));
        }

        match envelope.data {
            Some(data) if !data.is_null() => Ok(self.parse_observation(&data, location)?),
            _ => Err(StationFailure::Api("response has no data".to_string())),
        }
    }

    /// Parse the `data` object of a successful response.
    ///
    /// Only `iaqi`, `time.iso`, `city.geo` and `aqi` are required; every
    /// individual measurement is optional.
    pub fn parse_observation(
        &self,
        data: &Value,
        location: &str,
    ) -> std::result::Result<Observation, ParseFailure> {
        let iaqi = data
            .get("iaqi")
            .and_then(Value::as_object)
            .ok_or_else(|| ParseFailure::new(location, "missing iaqi"))?;

        let timestamp = data
            .pointer("/time/iso")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseFailure::new(location, "missing time.iso"))?;

        let (latitude, longitude) = Self::parse_geo(data)
            .ok_or_else(|| ParseFailure::new(location, "missing or malformed city.geo"))?;

        let aqi = data
            .get("aqi")
            .ok_or_else(|| ParseFailure::new(location, "missing aqi"))?;

        let metric = |key: &str| {
            iaqi.get(key)
                .and_then(|m| m.get("v"))
                .and_then(Value::as_f64)
        };
        let [pm25, pm10, no2, so2, co, o3] = POLLUTANT_KEYS.map(metric);
        let [temperature, humidity, pressure, wind_speed, wind_gust, dew_point] =
            WEATHER_KEYS.map(metric);

        let observation = Observation {
            timestamp: timestamp.to_string(),
            location: location.to_string(),
            latitude,
            longitude,
            air_quality_index: Self::parse_index(aqi),
            dominant_pollutant: data
                .get("dominentpol")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            pm25,
            pm10,
            no2,
            so2,
            co,
            o3,
            temperature,
            humidity,
            pressure,
            wind_speed,
            wind_gust,
            dew_point,
        };

        observation
            .validate_coordinates()
            .map_err(|e| ParseFailure::new(location, format!("invalid coordinates: {}", e)))?;

        Ok(observation)
    }

    fn parse_geo(data: &Value) -> Option<(f64, f64)> {
        let geo = data.pointer("/city/geo")?.as_array()?;
        match geo.as_slice() {
            [lat, lon, ..] => Some((lat.as_f64()?, lon.as_f64()?)),
            _ => None,
        }
    }

    /// The API reports an unavailable index as `"-"`.
    fn parse_index(aqi: &Value) -> Option<i64> {
        match aqi {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn hanoi_payload() -> Value {
        json!({
            "status": "ok",
            "data": {
                "iaqi": {"pm25": {"v": 42}},
                "time": {"iso": "2024-01-01T00:00:00+07:00"},
                "city": {"geo": [21.03, 105.85]},
                "aqi": 55,
                "dominentpol": "pm25"
            }
        })
    }

    #[test]
    fn test_parse_hanoi_payload() {
        let parser = ResponseParser::new();
        let body = serde_json::to_vec(&hanoi_payload()).unwrap();

        let observation = parser.parse_response(&body, "Hanoi").unwrap();

        let mut expected = Observation::new(
            "2024-01-01T00:00:00+07:00".to_string(),
            "Hanoi".to_string(),
            21.03,
            105.85,
        );
        expected.air_quality_index = Some(55);
        expected.dominant_pollutant = Some("pm25".to_string());
        expected.pm25 = Some(42.0);

        assert_eq!(observation, expected);
    }

    #[test]
    fn test_weather_fields_mapped() {
        let data = json!({
            "iaqi": {
                "t": {"v": 28.5}, "h": {"v": 70}, "p": {"v": 1012.3},
                "w": {"v": 2.1}, "wg": {"v": 5.4}, "dew": {"v": 22},
                "no2": {"v": 9.1}, "o3": {"v": 30}
            },
            "time": {"iso": "2024-01-01T00:00:00+07:00"},
            "city": {"geo": [21.03, 105.85]},
            "aqi": 55
        });

        let observation = ResponseParser::new()
            .parse_observation(&data, "Hanoi")
            .unwrap();

        assert_eq!(observation.temperature, Some(28.5));
        assert_eq!(observation.humidity, Some(70.0));
        assert_eq!(observation.pressure, Some(1012.3));
        assert_eq!(observation.wind_speed, Some(2.1));
        assert_eq!(observation.wind_gust, Some(5.4));
        assert_eq!(observation.dew_point, Some(22.0));
        assert_eq!(observation.no2, Some(9.1));
        assert_eq!(observation.o3, Some(30.0));
        assert_eq!(observation.pm25, None);
        assert_eq!(observation.dominant_pollutant, None);
    }

    #[test]
    fn test_missing_pm25_is_null() {
        let mut payload = hanoi_payload();
        payload["data"]["iaqi"] = json!({});

        let observation = ResponseParser::new()
            .parse_observation(&payload["data"], "Hanoi")
            .unwrap();

        assert_eq!(observation.pm25, None);
    }

    #[test]
    fn test_missing_time_iso_fails() {
        let mut payload = hanoi_payload();
        payload["data"]["time"] = json!({"s": "2024-01-01 00:00:00"});

        let failure = ResponseParser::new()
            .parse_observation(&payload["data"], "Hanoi")
            .unwrap_err();

        assert_eq!(failure, ParseFailure::new("Hanoi", "missing time.iso"));
    }

    #[test]
    fn test_required_fields() {
        let parser = ResponseParser::new();

        for field in ["iaqi", "city", "aqi"] {
            let mut payload = hanoi_payload();
            payload["data"].as_object_mut().unwrap().remove(field);

            let failure = parser
                .parse_observation(&payload["data"], "Hanoi")
                .unwrap_err();
            assert_eq!(failure.location, "Hanoi");
            assert!(failure.reason.contains(field), "{}", failure.reason);
        }
    }

    #[test]
    fn test_short_geo_fails() {
        let mut payload = hanoi_payload();
        payload["data"]["city"]["geo"] = json!([21.03]);

        let result = ResponseParser::new().parse_observation(&payload["data"], "Hanoi");
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_geo_fails() {
        let mut payload = hanoi_payload();
        payload["data"]["city"]["geo"] = json!([121.03, 105.85]);

        let failure = ResponseParser::new()
            .parse_observation(&payload["data"], "Hanoi")
            .unwrap_err();
        assert!(failure.reason.starts_with("invalid coordinates"));
    }

    #[test]
    fn test_unavailable_aqi_is_null() {
        let mut payload = hanoi_payload();
        payload["data"]["aqi"] = json!("-");

        let observation = ResponseParser::new()
            .parse_observation(&payload["data"], "Hanoi")
            .unwrap();
        assert_eq!(observation.air_quality_index, None);
    }

    #[test]
    fn test_error_status_is_api_failure() {
        let body = br#"{"status": "error", "data": "Unknown station"}"#;

        let failure = ResponseParser::new()
            .parse_response(body, "Hanoi")
            .unwrap_err();

        assert_eq!(
            failure,
            StationFailure::Api("status 'error': Unknown station".to_string())
        );
    }

    #[test]
    fn test_ok_status_without_data_is_api_failure() {
        let parser = ResponseParser::new();

        for body in [
            &br#"{"status": "ok"}"#[..],
            &br#"{"status": "ok", "data": null}"#[..],
        ] {
            let failure = parser.parse_response(body, "Hanoi").unwrap_err();
            assert!(matches!(failure, StationFailure::Api(_)));
        }
    }

    #[test]
    fn test_invalid_json_is_api_failure() {
        let failure = ResponseParser::new()
            .parse_response(b"<html>bad gateway</html>", "Hanoi")
            .unwrap_err();
        assert!(matches!(failure, StationFailure::Api(_)));
    }
}

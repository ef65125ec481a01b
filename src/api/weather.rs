//! Normalizes weather payloads into one [`WeatherSnapshot`] shape.
//!
//! The backend answers with a flat record (`temperature`, `humidity`, ...),
//! but older deployments proxied OpenWeatherMap verbatim (`main.temp`,
//! `weather[0].description`, ...). Both are accepted here so nothing past the
//! API boundary ever sees the nested form.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::models::{Coordinates, WeatherSnapshot};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeatherPayload {
    Flat(FlatWeather),
    OpenWeather(OpenWeatherPayload),
}

#[derive(Debug, Deserialize)]
struct FlatWeather {
    latitude: Option<f64>,
    longitude: Option<f64>,
    temperature: f64,
    humidity: f64,
    description: String,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    icon: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherPayload {
    coord: Option<OwmCoord>,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

/// Turn a raw weather body into a snapshot. `requested` fills in the position
/// when the payload does not echo it back.
pub fn normalize(value: Value, requested: Coordinates) -> ClientResult<WeatherSnapshot> {
    let payload: WeatherPayload = serde_json::from_value(value)
        .map_err(|_| ClientError::Decode("unrecognized weather payload".to_string()))?;

    let snapshot = match payload {
        WeatherPayload::Flat(w) => WeatherSnapshot {
            latitude: w.latitude.unwrap_or(requested.latitude),
            longitude: w.longitude.unwrap_or(requested.longitude),
            temperature_c: w.temperature,
            humidity: w.humidity,
            description: w.description,
            pressure: w.pressure,
            wind_speed: w.wind_speed,
            icon: w.icon,
            source: w.source,
        },
        WeatherPayload::OpenWeather(w) => {
            let (latitude, longitude) = w
                .coord
                .map(|c| (c.lat, c.lon))
                .unwrap_or((requested.latitude, requested.longitude));
            let condition = w.weather.into_iter().next();
            WeatherSnapshot {
                latitude,
                longitude,
                temperature_c: w.main.temp,
                humidity: w.main.humidity,
                description: condition
                    .as_ref()
                    .map(|c| c.description.clone())
                    .unwrap_or_default(),
                pressure: w.main.pressure,
                wind_speed: w.wind.map(|wind| wind.speed),
                icon: condition.and_then(|c| c.icon),
                source: Some("OpenWeatherMap".to_string()),
            }
        }
    };

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NYC: Coordinates = Coordinates {
        latitude: 40.7128,
        longitude: -74.006,
    };

    #[test]
    fn test_flat_minimal_payload() {
        let snapshot = normalize(
            json!({"temperature": 21, "humidity": 60, "description": "clear sky"}),
            NYC,
        )
        .unwrap();

        assert_eq!(snapshot.temperature_c, 21.0);
        assert_eq!(snapshot.humidity, 60.0);
        assert_eq!(snapshot.description, "clear sky");
        assert_eq!(snapshot.position(), NYC);
        assert_eq!(snapshot.temperature_label(), "21°C");
    }

    #[test]
    fn test_flat_backend_payload() {
        let snapshot = normalize(
            json!({
                "latitude": 51.5,
                "longitude": -0.09,
                "temperature": 22.5,
                "humidity": 65.0,
                "pressure": 1013.25,
                "wind_speed": 5.2,
                "wind_direction": 180.0,
                "description": "Partly cloudy",
                "icon": "02d",
                "timestamp": "2024-01-01T00:00:00",
                "source": "Mock Data (No API Key)"
            }),
            NYC,
        )
        .unwrap();

        assert_eq!(snapshot.position(), Coordinates::new(51.5, -0.09));
        assert_eq!(snapshot.pressure, Some(1013.25));
        assert_eq!(snapshot.icon.as_deref(), Some("02d"));
    }

    #[test]
    fn test_openweather_payload() {
        let snapshot = normalize(
            json!({
                "coord": {"lat": 40.71, "lon": -74.01},
                "main": {"temp": 18.3, "humidity": 72, "pressure": 1009},
                "weather": [{"description": "light rain", "icon": "10d"}],
                "wind": {"speed": 3.6, "deg": 200}
            }),
            NYC,
        )
        .unwrap();

        assert_eq!(snapshot.temperature_c, 18.3);
        assert_eq!(snapshot.humidity, 72.0);
        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.wind_speed, Some(3.6));
        assert_eq!(snapshot.position(), Coordinates::new(40.71, -74.01));
        assert_eq!(snapshot.source.as_deref(), Some("OpenWeatherMap"));
    }

    #[test]
    fn test_unrecognized_payload() {
        let err = normalize(json!({"temp_f": 70}), NYC).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}

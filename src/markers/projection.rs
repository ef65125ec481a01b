//! Entity → marker specs. Only entities with a position become markers.

use super::{Glyph, MarkerSpec};
use crate::models::{Disaster, Location, User, WeatherSnapshot};

/// Id of the single weather marker.
pub const WEATHER_MARKER_ID: &str = "current";

pub fn friend_specs(friends: &[User]) -> Vec<MarkerSpec> {
    friends
        .iter()
        .filter_map(|friend| {
            let position = friend.position()?;
            let status = friend.safety();
            let mut popup = vec![
                friend.name.clone(),
                format!("Status: {}", status.to_string().to_uppercase()),
            ];
            if let Some(updated) = friend.last_safe_update {
                popup.push(format!("Last updated: {}", updated.format("%Y-%m-%d %H:%M")));
            }
            Some(MarkerSpec {
                id: friend.id.to_string(),
                position,
                label: friend.name.clone(),
                popup,
                glyph: Glyph::Friend(status),
            })
        })
        .collect()
}

pub fn location_specs(locations: &[Location]) -> Vec<MarkerSpec> {
    locations
        .iter()
        .map(|location| MarkerSpec {
            id: location.id.to_string(),
            position: location.position(),
            label: location.name.clone(),
            popup: vec![location.name.clone(), format!("Type: {}", location.kind)],
            glyph: Glyph::Place(location.kind),
        })
        .collect()
}

pub fn weather_spec(weather: &WeatherSnapshot) -> MarkerSpec {
    MarkerSpec {
        id: WEATHER_MARKER_ID.to_string(),
        position: weather.position(),
        label: weather.temperature_label(),
        popup: vec![
            weather.temperature_label(),
            weather.description.clone(),
            format!("Humidity: {:.0}%", weather.humidity),
        ],
        glyph: Glyph::Weather,
    }
}

pub fn disaster_specs(disasters: &[Disaster]) -> Vec<MarkerSpec> {
    disasters
        .iter()
        .map(|d| {
            let mut popup = vec![d.title.clone()];
            if !d.description.is_empty() {
                popup.push(d.description.clone());
            }
            if let Some(magnitude) = d.magnitude {
                popup.push(format!("Magnitude: {:.1}", magnitude));
            }
            popup.push(format!("Severity: {}", format!("{:?}", d.severity).to_lowercase()));
            MarkerSpec {
                id: d.id.clone(),
                position: d.position(),
                label: d.title.clone(),
                popup,
                glyph: Glyph::Disaster(d.severity),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationType, SafetyStatus};
    use serde_json::json;

    #[test]
    fn test_friends_without_position_are_skipped() {
        let friends: Vec<User> = serde_json::from_value(json!([
            {"id": 1, "name": "A", "email": "a@example.com", "latitude": 51.5, "longitude": -0.1, "status": "alert"},
            {"id": 2, "name": "B", "email": "b@example.com"}
        ]))
        .unwrap();

        let specs = friend_specs(&friends);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].id, "1");
        assert_eq!(specs[0].glyph, Glyph::Friend(SafetyStatus::Warning));
        assert_eq!(specs[0].popup[1], "Status: WARNING");
    }

    #[test]
    fn test_location_popup() {
        let locations: Vec<Location> = serde_json::from_value(json!([
            {"id": 9, "name": "Office", "type": "office", "latitude": 51.52, "longitude": -0.11}
        ]))
        .unwrap();

        let specs = location_specs(&locations);
        assert_eq!(specs[0].popup, vec!["Office".to_string(), "Type: office".to_string()]);
        assert_eq!(specs[0].glyph, Glyph::Place(LocationType::Office));
    }

    #[test]
    fn test_weather_popup_shows_temperature() {
        let weather = WeatherSnapshot {
            latitude: 40.7128,
            longitude: -74.006,
            temperature_c: 21.0,
            humidity: 60.0,
            description: "clear sky".to_string(),
            pressure: None,
            wind_speed: None,
            icon: None,
            source: None,
        };
        let spec = weather_spec(&weather);
        assert_eq!(spec.id, WEATHER_MARKER_ID);
        assert_eq!(spec.popup[0], "21°C");
        assert_eq!(spec.popup[2], "Humidity: 60%");
    }
}

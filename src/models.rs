use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Canonical safety state of a user.
///
/// The backend stores `safe | alert | danger` while the map UI always spoke of
/// `safe | warning | danger`. Both middle spellings mean "needs help" and decode
/// to [`SafetyStatus::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyStatus {
    Safe,
    #[serde(alias = "alert")]
    Warning,
    Danger,
}

impl SafetyStatus {
    pub fn label(self) -> &'static str {
        match self {
            SafetyStatus::Safe => "Safe",
            SafetyStatus::Warning => "Needs help",
            SafetyStatus::Danger => "In danger!",
        }
    }
}

impl std::fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SafetyStatus::Safe => write!(f, "safe"),
            SafetyStatus::Warning => write!(f, "warning"),
            SafetyStatus::Danger => write!(f, "danger"),
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ClientError::validation(format!(
                "Latitude must be between -90 and 90 (got {})",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ClientError::validation(format!(
                "Longitude must be between -180 and 180 (got {})",
                self.longitude
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: Option<SafetyStatus>,
    #[serde(default)]
    pub is_safe: Option<bool>,
    #[serde(default, with = "timestamp")]
    pub last_safe_update: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Last known position, if the user ever shared one.
    pub fn position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    /// Users without an explicit status are treated as safe.
    pub fn safety(&self) -> SafetyStatus {
        self.status.unwrap_or(SafetyStatus::Safe)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Accept,
    Reject,
}

impl RequestAction {
    pub fn as_path(self) -> &'static str {
        match self {
            RequestAction::Accept => "accept",
            RequestAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: i64,
    pub from_user: User,
    pub status: RequestStatus,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Home,
    Office,
    School,
    Hospital,
    #[default]
    #[serde(other)]
    Other,
}

impl LocationType {
    pub const ALL: [LocationType; 5] = [
        LocationType::Home,
        LocationType::Office,
        LocationType::School,
        LocationType::Hospital,
        LocationType::Other,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LocationType::Home => "home",
            LocationType::Office => "office",
            LocationType::School => "school",
            LocationType::Hospital => "hospital",
            LocationType::Other => "other",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: LocationType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Location {
    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Body of `POST /locations/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewLocation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Canonical weather reading, whatever shape the server answered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_c: f64,
    pub humidity: f64,
    pub description: String,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub icon: Option<String>,
    pub source: Option<String>,
}

impl WeatherSnapshot {
    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "21°C", or "22.5°C" when the reading is fractional.
    pub fn temperature_label(&self) -> String {
        let t = self.temperature_c;
        if (t - t.round()).abs() < 1e-9 {
            format!("{:.0}°C", t)
        } else {
            format!("{:.1}°C", t)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterSeverity {
    Low,
    Medium,
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disaster {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub severity: DisasterSeverity,
}

impl Disaster {
    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Response of the `/emergency/{safe,alert,danger}` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub message: String,
    pub status: SafetyStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub session_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Body of `PUT /users/profile`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Minimal e-mail shape check used before sending anything to the server.
pub fn validate_email(email: &str) -> ClientResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClientError::validation("Email is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => Ok(()),
        _ => Err(ClientError::validation(format!("'{}' is not a valid email address", email))),
    }
}

/// Lenient timestamp (de)serialization.
///
/// Accepts RFC 3339 as well as the offset-less ISO-8601 strings the backend
/// produces, which are UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_accepts_both_spellings() {
        let alert: SafetyStatus = serde_json::from_value(json!("alert")).unwrap();
        let warning: SafetyStatus = serde_json::from_value(json!("warning")).unwrap();
        assert_eq!(alert, SafetyStatus::Warning);
        assert_eq!(warning, SafetyStatus::Warning);
        assert_eq!(serde_json::to_value(SafetyStatus::Warning).unwrap(), json!("warning"));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<SafetyStatus, _> = serde_json::from_value(json!("panicking"));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_from_backend_payload() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "name": "Jordan",
            "email": "jordan@example.com",
            "phone": null,
            "is_safe": false,
            "status": "danger",
            "last_safe_update": "2024-05-15T08:15:00.123456",
            "created_at": "2024-05-01T10:00:00",
            "latitude": 51.515,
            "longitude": -0.09
        }))
        .unwrap();

        assert_eq!(user.safety(), SafetyStatus::Danger);
        assert_eq!(user.position(), Some(Coordinates::new(51.515, -0.09)));
        assert!(user.last_safe_update.is_some());
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_minimal_user_defaults() {
        let user: User = serde_json::from_value(json!({"id": 1, "name": "A", "email": "a@example.com"})).unwrap();
        assert_eq!(user.safety(), SafetyStatus::Safe);
        assert_eq!(user.position(), None);
    }

    #[test]
    fn test_unknown_location_type_maps_to_other() {
        let loc: Location = serde_json::from_value(json!({
            "id": 1, "name": "Gym", "type": "gym", "latitude": 1.0, "longitude": 2.0
        }))
        .unwrap();
        assert_eq!(loc.kind, LocationType::Other);
    }

    #[test]
    fn test_new_location_serializes_type_field() {
        let body = serde_json::to_value(NewLocation {
            name: "Home".to_string(),
            kind: LocationType::Home,
            latitude: 51.5,
            longitude: -0.09,
        })
        .unwrap();
        assert_eq!(body["type"], json!("home"));
        assert!(body.get("kind").is_none());
    }

    #[test]
    fn test_location_type_cycles() {
        let mut kind = LocationType::Home;
        for _ in 0..LocationType::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, LocationType::Home);
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(40.7128, -74.006).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -181.0).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("x@example.com").is_ok());
        assert!(validate_email("  ").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("x@localhost").is_err());
    }

    #[test]
    fn test_temperature_label() {
        let mut weather = WeatherSnapshot {
            latitude: 0.0,
            longitude: 0.0,
            temperature_c: 21.0,
            humidity: 60.0,
            description: "clear sky".to_string(),
            pressure: None,
            wind_speed: None,
            icon: None,
            source: None,
        };
        assert_eq!(weather.temperature_label(), "21°C");
        weather.temperature_c = 22.5;
        assert_eq!(weather.temperature_label(), "22.5°C");
    }

    #[test]
    fn test_timestamp_parse_variants() {
        assert!(timestamp::parse("2024-01-01T00:00:00Z").is_some());
        assert!(timestamp::parse("2024-01-01T00:00:00+02:00").is_some());
        assert!(timestamp::parse("2024-01-01T00:00:00.5").is_some());
        assert!(timestamp::parse("yesterday").is_none());
    }
}

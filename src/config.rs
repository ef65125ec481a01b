use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Coordinates;
use crate::ui::Theme;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub notifications: NotificationsConfig,
    pub map: MapConfig,
    pub logging: LoggingConfig,
    pub theme: Theme,
}

/// SafeSphere server connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Background refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub enabled: bool,
    /// Seconds between refresh cycles
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// How long each notification stays on screen
    pub duration_secs: u64,
    /// Older notifications are dropped beyond this many
    pub max_visible: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            duration_secs: 3,
            max_visible: 5,
        }
    }
}

impl NotificationsConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs.max(1))
    }
}

/// Map viewport and layer defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
    /// Half-width of the visible area in degrees
    pub zoom_span: f64,
    pub show_friends: bool,
    pub show_locations: bool,
    pub show_weather: bool,
    pub show_disasters: bool,
    /// Search radius for nearby disasters
    pub disaster_radius_km: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: 51.505,
            default_longitude: -0.09,
            zoom_span: 0.1,
            show_friends: true,
            show_locations: true,
            show_weather: true,
            show_disasters: true,
            disaster_radius_km: 100.0,
        }
    }
}

impl MapConfig {
    pub fn default_center(&self) -> Coordinates {
        Coordinates::new(self.default_latitude, self.default_longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive, overridden by RUST_LOG
    pub level: String,
    /// Log file (empty = default cache dir)
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("safesphere");

        fs::create_dir_all(&config_dir)
            .context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .context("Failed to read config file")?;

            let config: Config = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Generate example config content for documentation
    pub fn example_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_secs, 10);
        assert!(config.polling.enabled);
        assert_eq!(config.polling.interval(), Duration::from_secs(30));
        assert_eq!(config.notifications.duration(), Duration::from_secs(3));
        assert_eq!(config.notifications.max_visible, 5);
        assert_eq!(config.map.default_center(), Coordinates::new(51.505, -0.09));
        assert!(config.map.show_friends);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial_toml = r#"
[api]
base_url = "https://safesphere.example.com"
"#;

        let config: Config = toml::from_str(partial_toml).unwrap();

        assert_eq!(config.api.base_url, "https://safesphere.example.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.polling.interval_secs, 30);
        assert!(config.map.show_weather);
    }

    #[test]
    fn test_full_config_parsing() {
        let full_toml = r#"
[api]
base_url = "http://10.0.0.2:8080"
timeout_secs = 4

[polling]
enabled = false
interval_secs = 60

[notifications]
duration_secs = 5
max_visible = 2

[map]
default_latitude = 40.7128
default_longitude = -74.006
zoom_span = 0.5
show_friends = true
show_locations = false
show_weather = false
show_disasters = false
disaster_radius_km = 25.0

[logging]
level = "debug"
file = "/tmp/safesphere.log"
"#;

        let config: Config = toml::from_str(full_toml).unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.api.timeout(), Duration::from_secs(4));
        assert!(!config.polling.enabled);
        assert_eq!(config.polling.interval_secs, 60);
        assert_eq!(config.notifications.max_visible, 2);
        assert_eq!(config.map.default_center(), Coordinates::new(40.7128, -74.006));
        assert!(!config.map.show_locations);
        assert_eq!(config.map.disaster_radius_km, 25.0);
        assert_eq!(config.logging.file, Some("/tmp/safesphere.log".to_string()));
    }

    #[test]
    fn test_zero_durations_are_clamped() {
        let config: Config = toml::from_str(
            "[polling]\ninterval_secs = 0\n[api]\ntimeout_secs = 0\n[notifications]\nduration_secs = 0\n",
        )
        .unwrap();
        assert_eq!(config.polling.interval(), Duration::from_secs(1));
        assert_eq!(config.api.timeout(), Duration::from_secs(1));
        assert_eq!(config.notifications.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_example_config_is_valid() {
        let example = Config::example_config();
        let parsed: Result<Config, _> = toml::from_str(&example);
        assert!(parsed.is_ok(), "Example config should be valid TOML");
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid [[ toml";
        let result: Result<Config, _> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }
}

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::models::SafetyStatus;
use crate::notify::Severity;

/// Theme configuration for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Theme name for identification
    pub name: String,

    /// Primary accent color (borders, titles)
    pub primary: String,

    /// Secondary accent color (locations, weather)
    pub secondary: String,

    /// Safe / success color
    pub safe: String,

    /// Needs-help / warning color
    pub warning: String,

    /// Danger / error color
    pub danger: String,

    /// Primary text color
    pub text: String,

    /// Secondary/muted text color
    pub text_muted: String,

    /// Coastlines on the map canvas
    pub map_outline: String,

    /// Border color for focused elements
    pub border_focused: String,

    /// Border color for normal elements
    pub border_normal: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            primary: "Cyan".to_string(),
            secondary: "Magenta".to_string(),
            safe: "Green".to_string(),
            warning: "Yellow".to_string(),
            danger: "Red".to_string(),
            text: "White".to_string(),
            text_muted: "Gray".to_string(),
            map_outline: "DarkGray".to_string(),
            border_focused: "Cyan".to_string(),
            border_normal: "DarkGray".to_string(),
        }
    }
}

impl Theme {
    /// Parse a color string to ratatui Color
    pub fn parse_color(color_str: &str) -> Color {
        match color_str.trim() {
            "Reset" => Color::Reset,
            "Black" => Color::Black,
            "Red" => Color::Red,
            "Green" => Color::Green,
            "Yellow" => Color::Yellow,
            "Blue" => Color::Blue,
            "Magenta" => Color::Magenta,
            "Cyan" => Color::Cyan,
            "Gray" | "Grey" => Color::Gray,
            "DarkGray" | "DarkGrey" => Color::DarkGray,
            "LightRed" => Color::LightRed,
            "LightGreen" => Color::LightGreen,
            "LightYellow" => Color::LightYellow,
            "LightBlue" => Color::LightBlue,
            "LightMagenta" => Color::LightMagenta,
            "LightCyan" => Color::LightCyan,
            "White" => Color::White,
            s if s.starts_with('#') => parse_hex_color(s)
                .map(|(r, g, b)| Color::Rgb(r, g, b))
                .unwrap_or(Color::Reset),
            s => s.parse::<u8>().map(Color::Indexed).unwrap_or(Color::Reset),
        }
    }

    pub fn primary(&self) -> Color {
        Self::parse_color(&self.primary)
    }

    pub fn secondary(&self) -> Color {
        Self::parse_color(&self.secondary)
    }

    pub fn safe(&self) -> Color {
        Self::parse_color(&self.safe)
    }

    pub fn warning(&self) -> Color {
        Self::parse_color(&self.warning)
    }

    pub fn danger(&self) -> Color {
        Self::parse_color(&self.danger)
    }

    pub fn text(&self) -> Color {
        Self::parse_color(&self.text)
    }

    pub fn text_muted(&self) -> Color {
        Self::parse_color(&self.text_muted)
    }

    pub fn map_outline(&self) -> Color {
        Self::parse_color(&self.map_outline)
    }

    pub fn border_focused(&self) -> Color {
        Self::parse_color(&self.border_focused)
    }

    pub fn border_normal(&self) -> Color {
        Self::parse_color(&self.border_normal)
    }

    pub fn safety_color(&self, status: SafetyStatus) -> Color {
        match status {
            SafetyStatus::Safe => self.safe(),
            SafetyStatus::Warning => self.warning(),
            SafetyStatus::Danger => self.danger(),
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Success => self.safe(),
            Severity::Error => self.danger(),
            Severity::Info => self.primary(),
        }
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.warning())
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused())
        } else {
            Style::default().fg(self.border_normal())
        }
    }

    // Built-in theme presets
    pub fn catppuccin_mocha() -> Self {
        Self {
            name: "catppuccin-mocha".to_string(),
            primary: "#89b4fa".to_string(),
            secondary: "#cba6f7".to_string(),
            safe: "#a6e3a1".to_string(),
            warning: "#f9e2af".to_string(),
            danger: "#f38ba8".to_string(),
            text: "#cdd6f4".to_string(),
            text_muted: "#a6adc8".to_string(),
            map_outline: "#585b70".to_string(),
            border_focused: "#89b4fa".to_string(),
            border_normal: "#585b70".to_string(),
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            primary: "#88c0d0".to_string(),
            secondary: "#b48ead".to_string(),
            safe: "#a3be8c".to_string(),
            warning: "#ebcb8b".to_string(),
            danger: "#bf616a".to_string(),
            text: "#eceff4".to_string(),
            text_muted: "#d8dee9".to_string(),
            map_outline: "#4c566a".to_string(),
            border_focused: "#81a1c1".to_string(),
            border_normal: "#3b4252".to_string(),
        }
    }

    pub fn gruvbox() -> Self {
        Self {
            name: "gruvbox".to_string(),
            primary: "#83a598".to_string(),
            secondary: "#d3869b".to_string(),
            safe: "#b8bb26".to_string(),
            warning: "#fabd2f".to_string(),
            danger: "#fb4934".to_string(),
            text: "#ebdbb2".to_string(),
            text_muted: "#a89984".to_string(),
            map_outline: "#665c54".to_string(),
            border_focused: "#fe8019".to_string(),
            border_normal: "#504945".to_string(),
        }
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "catppuccin" | "catppuccin-mocha" => Some(Self::catppuccin_mocha()),
            "nord" => Some(Self::nord()),
            "gruvbox" => Some(Self::gruvbox()),
            _ => None,
        }
    }
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors() {
        assert!(matches!(Theme::parse_color("Cyan"), Color::Cyan));
        assert!(matches!(Theme::parse_color("#ff0000"), Color::Rgb(255, 0, 0)));
        assert!(matches!(Theme::parse_color("42"), Color::Indexed(42)));
        assert!(matches!(Theme::parse_color("#12"), Color::Reset));
        assert!(matches!(Theme::parse_color("chartreuse"), Color::Reset));
    }

    #[test]
    fn test_safety_colors_follow_theme() {
        let theme = Theme::default();
        assert!(matches!(theme.safety_color(SafetyStatus::Safe), Color::Green));
        assert!(matches!(theme.safety_color(SafetyStatus::Warning), Color::Yellow));
        assert!(matches!(theme.safety_color(SafetyStatus::Danger), Color::Red));
        assert!(matches!(theme.severity_color(Severity::Error), Color::Red));
    }

    #[test]
    fn test_theme_presets() {
        assert!(Theme::from_preset("catppuccin").is_some());
        assert!(Theme::from_preset("nord").is_some());
        assert!(Theme::from_preset("gruvbox").is_some());
        assert!(Theme::from_preset("nonexistent").is_none());
    }

    #[test]
    fn test_partial_theme_uses_defaults() {
        let theme: Theme = toml::from_str("danger = \"#ff5555\"").unwrap();
        assert!(matches!(theme.danger(), Color::Rgb(255, 85, 85)));
        assert_eq!(theme.safe, "Green");
    }
}

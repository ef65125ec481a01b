use ratatui::style::Color;

use super::theme::Theme;
use crate::markers::Glyph;
use crate::models::{DisasterSeverity, LocationType};

/// Prefix for the selected row in sidebar lists
pub const SELECTED_INDICATOR: &str = "> ";

/// Single-cell symbol drawn on the map for a marker
pub fn glyph_symbol(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Friend(_) => "●",
        Glyph::Place(LocationType::Home) => "⌂",
        Glyph::Place(LocationType::Hospital) => "✚",
        Glyph::Place(_) => "■",
        Glyph::Weather => "☀",
        Glyph::Disaster(_) => "▲",
    }
}

pub fn glyph_color(glyph: Glyph, theme: &Theme) -> Color {
    match glyph {
        Glyph::Friend(status) => theme.safety_color(status),
        Glyph::Place(_) => theme.secondary(),
        Glyph::Weather => theme.primary(),
        Glyph::Disaster(DisasterSeverity::High) => theme.danger(),
        Glyph::Disaster(DisasterSeverity::Medium) => theme.warning(),
        Glyph::Disaster(_) => theme.text_muted(),
    }
}

pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

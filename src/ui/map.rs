use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, BorderType, Borders, Clear, Paragraph,
    },
    Frame,
};

use super::styles::{glyph_color, glyph_symbol};
use super::theme::Theme;
use crate::app::MapView;
use crate::markers::{Layer, Marker, MarkerKey};

pub struct MapViewState<'a> {
    pub view: &'a MapView,
    /// Markers currently attached to the surface
    pub markers: Vec<&'a Marker>,
    pub selected: Option<&'a Marker>,
    pub hidden_layers: Vec<Layer>,
}

pub fn render_map(f: &mut Frame, state: &MapViewState, area: Rect, theme: &Theme) {
    let title = if state.hidden_layers.is_empty() {
        format!(
            " Map {:.3}, {:.3} ",
            state.view.center.latitude, state.view.center.longitude
        )
    } else {
        let hidden: Vec<&str> = state.hidden_layers.iter().map(|l| l.title()).collect();
        format!(
            " Map {:.3}, {:.3} (hidden: {}) ",
            state.view.center.latitude,
            state.view.center.longitude,
            hidden.join(", ")
        )
    };

    let selected_key: Option<&MarkerKey> = state.selected.map(|m| &m.key);
    let outline = theme.map_outline();
    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme.border_style(true)),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(state.view.x_bounds())
        .y_bounds(state.view.y_bounds())
        .paint(|ctx| {
            ctx.draw(&Map {
                color: outline,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for marker in &state.markers {
                let mut style = Style::default().fg(glyph_color(marker.glyph, theme));
                if Some(&marker.key) == selected_key {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                ctx.print(
                    marker.position.longitude,
                    marker.position.latitude,
                    Line::from(vec![
                        Span::styled(glyph_symbol(marker.glyph), style),
                        Span::styled(
                            format!(" {}", marker.label),
                            Style::default().fg(theme.text_muted()),
                        ),
                    ]),
                );
            }
        });
    f.render_widget(canvas, area);

    if let Some(marker) = state.selected {
        render_popup(f, marker, area, theme);
    }
}

/// Popup of the selected marker, pinned to the map's bottom-left corner.
fn render_popup(f: &mut Frame, marker: &Marker, area: Rect, theme: &Theme) {
    let width = marker
        .popup
        .iter()
        .map(|l| l.chars().count() as u16)
        .max()
        .unwrap_or(0)
        .saturating_add(4)
        .min(area.width.saturating_sub(2));
    let height = (marker.popup.len() as u16 + 2).min(area.height.saturating_sub(2));
    if width < 5 || height < 3 {
        return;
    }
    let popup_area = Rect::new(area.x + 1, area.y + area.height - height - 1, width, height);

    let lines: Vec<Line> = marker
        .popup
        .iter()
        .enumerate()
        .map(|(i, text)| {
            if i == 0 {
                Line::from(Span::styled(
                    text.as_str(),
                    Style::default()
                        .fg(glyph_color(marker.glyph, theme))
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(text.as_str(), Style::default().fg(theme.text())))
            }
        })
        .collect();

    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(lines).alignment(Alignment::Left).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.primary())),
    );
    f.render_widget(popup, popup_area);
}

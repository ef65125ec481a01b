use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::theme::Theme;
use crate::models::{User, WeatherSnapshot};
use crate::safety::SafetySummary;

pub struct HeaderState<'a> {
    pub user: Option<&'a User>,
    pub safety: SafetySummary,
    pub weather: Option<&'a WeatherSnapshot>,
    pub last_sync: Option<String>,
}

pub fn render_header(f: &mut Frame, state: &HeaderState, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(inner);

    let who = match state.user {
        Some(user) => Line::from(vec![
            Span::styled(
                "SafeSphere",
                Style::default().fg(theme.primary()).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(user.name.as_str(), Style::default().fg(theme.text())),
            Span::styled(
                format!(" ({})", user.safety().label()),
                Style::default().fg(theme.safety_color(user.safety())),
            ),
        ]),
        None => Line::from(vec![
            Span::styled(
                "SafeSphere",
                Style::default().fg(theme.primary()).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  not signed in", Style::default().fg(theme.text_muted())),
        ]),
    };
    f.render_widget(Paragraph::new(who), chunks[0]);

    // Safety indicator
    let color = theme.safety_color(state.safety.status());
    let indicator = Paragraph::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(
            state.safety.text(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(indicator, chunks[1]);

    let mut right = Vec::new();
    if let Some(weather) = state.weather {
        right.push(Span::styled(
            format!("{} {}", weather.temperature_label(), weather.description),
            Style::default().fg(theme.secondary()),
        ));
    }
    if let Some(ref synced) = state.last_sync {
        right.push(Span::styled(
            format!("  synced {}", synced),
            Style::default().fg(theme.text_muted()),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        chunks[2],
    );
}

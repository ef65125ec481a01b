use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::theme::Theme;

pub struct StatusBarState {
    pub authenticated: bool,
    pub dialog_open: bool,
    pub polling: Option<u64>, // refresh period in seconds, None when paused
}

fn key_hint<'a>(key: &'a str, action: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(key, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(action),
    ]
}

pub fn render_status_bar(
    f: &mut Frame,
    state: &StatusBarState,
    area: ratatui::layout::Rect,
    theme: &Theme,
) {
    let mut spans: Vec<Span> = Vec::new();

    if state.dialog_open {
        spans.push(Span::styled(
            "INPUT",
            Style::default().fg(theme.warning()).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" | "));
        spans.extend(key_hint("Tab", ": next field | "));
        spans.extend(key_hint("Enter", ": submit | "));
        spans.extend(key_hint("Esc", ": cancel"));
    } else if !state.authenticated {
        spans.push(Span::styled(
            "SIGNED OUT",
            Style::default().fg(theme.danger()).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" | "));
        spans.extend(key_hint("L", ": sign in | "));
        spans.extend(key_hint("q", ": quit"));
    } else {
        spans.push(Span::styled(
            "MAP",
            Style::default().fg(theme.safe()).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" | "));
        spans.extend(key_hint("j/k", ": select | "));
        spans.extend(key_hint("Enter", ": focus | "));
        spans.extend(key_hint("m", ": pick marker | "));
        spans.extend(key_hint("+/-", ": zoom | "));
        spans.extend(key_hint("s", ": safe | "));
        spans.extend(key_hint("!", ": alert | "));
        spans.extend(key_hint("r", ": refresh | "));
        spans.extend(key_hint("?", ": help"));
        match state.polling {
            Some(secs) => spans.push(Span::styled(
                format!("  [auto {}s]", secs),
                Style::default().fg(theme.text_muted()),
            )),
            None => spans.push(Span::styled(
                "  [auto off]",
                Style::default().fg(theme.text_muted()),
            )),
        }
    }

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style(false)),
    );
    f.render_widget(status_bar, area);
}

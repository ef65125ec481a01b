use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use super::theme::Theme;
use crate::app::DialogMode;
use crate::models::LocationType;

pub struct DialogRenderState<'a> {
    pub mode: DialogMode,
    pub fields: &'a [String],
    pub focused: usize,
    pub location_kind: LocationType,
}

pub fn render_dialog(f: &mut Frame, state: &DialogRenderState, area: Rect, theme: &Theme) {
    match state.mode {
        DialogMode::None => {}
        DialogMode::Login => {
            render_form_dialog(f, "Sign In", state, None, "Ctrl+r: register instead", area, theme);
        }
        DialogMode::Register => {
            render_form_dialog(f, "Create Account", state, None, "Ctrl+r: sign in instead", area, theme);
        }
        DialogMode::AddFriend => {
            render_form_dialog(f, "Add Friend", state, None, "", area, theme);
        }
        DialogMode::AddLocation => {
            let kind = format!("Type: < {} >", state.location_kind);
            render_form_dialog(f, "Add Location", state, Some(kind), "Left/Right: type", area, theme);
        }
        DialogMode::ConfirmAlert => {
            render_confirm_dialog(
                f,
                "Emergency Alert",
                "Send an emergency alert to all your contacts?",
                area,
                theme,
            );
        }
        DialogMode::ConfirmDanger => {
            render_confirm_dialog(
                f,
                "Report Danger",
                "Tell all your contacts that you are in danger?",
                area,
                theme,
            );
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_form_dialog(
    f: &mut Frame,
    title: &str,
    state: &DialogRenderState,
    extra: Option<String>,
    extra_help: &str,
    area: Rect,
    theme: &Theme,
) {
    let labels = state.mode.field_labels();
    let extra_rows = if extra.is_some() { 1 } else { 0 };
    let popup_height = labels.len() as u16 * 2 + extra_rows + 4;
    let popup_area = centered(area, 56, popup_height);

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.primary()));

    f.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let mut constraints: Vec<Constraint> = labels.iter().map(|_| Constraint::Length(2)).collect();
    if extra.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, label) in labels.iter().enumerate() {
        let value = state.fields.get(i).map(|s| s.as_str()).unwrap_or("");
        let shown = if state.mode.is_secret(i) {
            "*".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let is_focused = i == state.focused;
        let value_style = if is_focused {
            Style::default().fg(theme.warning()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text())
        };
        let cursor = if is_focused { "_" } else { "" };

        let field = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{}:", label),
                Style::default().fg(theme.text_muted()),
            )),
            Line::from(Span::styled(format!("{}{}", shown, cursor), value_style)),
        ]);
        f.render_widget(field, chunks[i]);
    }

    if let Some(extra) = extra {
        let extra_line = Paragraph::new(extra).style(Style::default().fg(theme.secondary()));
        f.render_widget(extra_line, chunks[labels.len()]);
    }

    // Help text
    let mut help = String::from("Tab: next field | Enter: submit | Esc: cancel");
    if !extra_help.is_empty() {
        help.push_str(" | ");
        help.push_str(extra_help);
    }
    let help_text = Paragraph::new(help)
        .style(Style::default().fg(theme.text_muted()))
        .alignment(Alignment::Center);
    f.render_widget(help_text, chunks[chunks.len() - 1]);
}

fn render_confirm_dialog(f: &mut Frame, title: &str, message: &str, area: Rect, theme: &Theme) {
    let popup_area = centered(area, 50, 7);

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.danger()));

    f.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let msg = Paragraph::new(message)
        .style(Style::default().fg(theme.text()))
        .alignment(Alignment::Center);
    f.render_widget(msg, chunks[0]);

    let help_text = Paragraph::new("Enter/y: confirm | Esc/n: cancel")
        .style(Style::default().fg(theme.text_muted()))
        .alignment(Alignment::Center);
    f.render_widget(help_text, chunks[1]);
}

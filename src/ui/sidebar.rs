use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use super::styles::{truncate_str, SELECTED_INDICATOR};
use super::theme::Theme;
use crate::app::SidebarTab;
use crate::models::{Alert, FriendRequest, Location, User};

pub struct SidebarViewState<'a> {
    pub tab: SidebarTab,
    pub selected: usize,
    pub friends: &'a [User],
    pub requests: &'a [FriendRequest],
    pub locations: &'a [Location],
    pub alerts: &'a [Alert],
}

pub fn render_sidebar(f: &mut Frame, state: &SidebarViewState, area: Rect, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let titles: Vec<Line> = SidebarTab::ALL
        .iter()
        .map(|tab| {
            let count = match tab {
                SidebarTab::Friends => state.friends.len(),
                SidebarTab::Requests => state.requests.len(),
                SidebarTab::Locations => state.locations.len(),
                SidebarTab::Alerts => state.alerts.len(),
            };
            Line::from(format!("{} ({})", tab.title(), count))
        })
        .collect();
    let selected_tab = SidebarTab::ALL.iter().position(|t| *t == state.tab).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected_tab)
        .style(Style::default().fg(theme.text_muted()))
        .highlight_style(
            Style::default()
                .fg(theme.primary())
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme.border_style(false)),
        );
    f.render_widget(tabs, chunks[0]);

    let width = chunks[1].width.saturating_sub(6) as usize;
    let (items, empty_text): (Vec<ListItem>, &str) = match state.tab {
        SidebarTab::Friends => (
            state.friends.iter().map(|u| friend_item(u, width, theme)).collect(),
            "No friends yet. Press 'a' to add one.",
        ),
        SidebarTab::Requests => (
            state.requests.iter().map(|r| request_item(r, width, theme)).collect(),
            "No pending friend requests.",
        ),
        SidebarTab::Locations => (
            state.locations.iter().map(|l| location_item(l, width, theme)).collect(),
            "No saved locations. Press 'n' to add one.",
        ),
        SidebarTab::Alerts => (
            state.alerts.iter().map(|a| alert_item(a, width, theme)).collect(),
            "No alerts.",
        ),
    };

    let block = Block::default()
        .title(format!(" {} ", state.tab.title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style(true));

    if items.is_empty() {
        let empty = Paragraph::new(empty_text)
            .style(Style::default().fg(theme.text_muted()))
            .block(block);
        f.render_widget(empty, chunks[1]);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.highlight_style())
        .highlight_symbol(SELECTED_INDICATOR);
    let mut list_state = ListState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn friend_item<'a>(user: &'a User, width: usize, theme: &Theme) -> ListItem<'a> {
    let status = user.safety();
    let location = if user.position().is_some() { "" } else { " (no location)" };
    ListItem::new(vec![
        Line::from(vec![
            Span::styled("● ", Style::default().fg(theme.safety_color(status))),
            Span::styled(
                truncate_str(&user.name, width.saturating_sub(2)),
                Style::default().fg(theme.text()),
            ),
        ]),
        Line::from(Span::styled(
            format!("  {}{}", status.label(), location),
            Style::default().fg(theme.text_muted()),
        )),
    ])
}

fn request_item<'a>(request: &'a FriendRequest, width: usize, theme: &Theme) -> ListItem<'a> {
    ListItem::new(vec![
        Line::from(Span::styled(
            truncate_str(&request.from_user.name, width),
            Style::default().fg(theme.text()),
        )),
        Line::from(Span::styled(
            format!("  {}  [y] accept  [x] reject", truncate_str(&request.from_user.email, 24)),
            Style::default().fg(theme.text_muted()),
        )),
    ])
}

fn location_item<'a>(location: &'a Location, width: usize, theme: &Theme) -> ListItem<'a> {
    ListItem::new(vec![
        Line::from(Span::styled(
            truncate_str(&location.name, width),
            Style::default().fg(theme.text()),
        )),
        Line::from(Span::styled(
            format!(
                "  {} · {:.4}, {:.4}",
                location.kind, location.latitude, location.longitude
            ),
            Style::default().fg(theme.text_muted()),
        )),
    ])
}

fn alert_item<'a>(alert: &'a Alert, width: usize, theme: &Theme) -> ListItem<'a> {
    let color = if alert.kind == "danger" {
        theme.danger()
    } else {
        theme.warning()
    };
    let when = alert
        .created_at
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_default();
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                format!("{:<7}", alert.kind.to_uppercase()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(when, Style::default().fg(theme.text_muted())),
        ]),
        Line::from(Span::styled(
            format!("  {}", truncate_str(&alert.message, width.saturating_sub(2))),
            Style::default().fg(theme.text()),
        )),
    ])
}

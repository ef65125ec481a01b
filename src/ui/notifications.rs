use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::theme::Theme;
use crate::notify::{Notification, Severity};

const TOAST_WIDTH: u16 = 44;

/// Stack of toasts in the top-right corner, oldest at the top.
pub fn render_notifications(f: &mut Frame, items: &[&Notification], area: Rect, theme: &Theme) {
    let width = TOAST_WIDTH.min(area.width.saturating_sub(2));
    if width < 10 {
        return;
    }
    let x = area.x + area.width - width - 1;
    let mut y = area.y + 1;

    for notification in items {
        let text_width = width.saturating_sub(2) as usize;
        let lines = (notification.message.chars().count() / text_width.max(1)) as u16 + 1;
        let height = lines + 2;
        if y + height > area.y + area.height {
            break;
        }

        let color = theme.severity_color(notification.severity);
        let title = match notification.severity {
            Severity::Success => " ✓ ",
            Severity::Error => " ✗ ",
            Severity::Info => " i ",
        };
        let toast_area = Rect::new(x, y, width, height);
        f.render_widget(Clear, toast_area);
        let toast = Paragraph::new(Line::from(Span::styled(
            notification.message.as_str(),
            Style::default().fg(theme.text()),
        )))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
        f.render_widget(toast, toast_area);
        y += height;
    }
}

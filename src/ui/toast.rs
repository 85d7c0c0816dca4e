//! Transient error notification, anchored to the top-right corner.

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::theme::Theme;

const TOAST_DURATION: Duration = Duration::from_secs(5);
const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 5;

#[derive(Debug)]
pub(crate) struct Toast {
    pub message: String,
    deadline: Instant,
}

impl Toast {
    pub fn new(message: String) -> Self {
        Self { message, deadline: Instant::now() + TOAST_DURATION }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

pub(crate) fn render(frame: &mut Frame, theme: &Theme, toast: &Toast) {
    let screen = frame.area();
    let width = TOAST_WIDTH.min(screen.width.saturating_sub(2));
    let area = Rect {
        x: screen.right().saturating_sub(width + 1),
        y: screen.y + 1,
        width,
        height: TOAST_HEIGHT.min(screen.height),
    };

    let block = Block::bordered().border_style(Style::new().fg(theme.error_fg));
    let body = Paragraph::new(vec![
        Line::styled(
            "Error fetching recommendations",
            Style::new().fg(theme.error_fg).add_modifier(Modifier::BOLD),
        ),
        Line::styled(toast.message.clone(), Style::new().fg(theme.text)),
    ])
    .block(block)
    .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

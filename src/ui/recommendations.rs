//! Recommendations panel: one card with loading, error, and success states.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::types::RecommendationsResponse;
use crate::state::fetch::FetchState;
use crate::ui::theme::Theme;

const FAILURE_MESSAGE: &str = "Failed to load recommendations. Please try again later.";

pub(crate) fn render(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    state: &FetchState<RecommendationsResponse>,
) {
    match state {
        FetchState::Pending => {
            let placeholder =
                Paragraph::new("Loading recommendations...").style(Style::new().fg(theme.muted));
            frame.render_widget(placeholder, area);
        }
        FetchState::Failed(_) => {
            let block = Block::bordered().border_style(Style::new().fg(theme.error_fg));
            let card = Paragraph::new(FAILURE_MESSAGE)
                .style(Style::new().fg(theme.error_fg))
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(card, area);
        }
        FetchState::Ready(payload) => {
            let block = Block::bordered()
                .border_style(Style::new().fg(theme.card_border))
                .title("AI Recommendations")
                .title_style(Style::new().fg(theme.heading).add_modifier(Modifier::BOLD));
            let lines: Vec<Line> = recommendation_lines(&payload.recommendations)
                .into_iter()
                .map(|line| Line::styled(line, Style::new().fg(theme.text)))
                .collect();
            let card = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
            frame.render_widget(card, area);
        }
    }
}

/// One rendered line per newline-delimited segment of the payload.
pub(crate) fn recommendation_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_delimited_payload_renders_one_line_per_segment() {
        let lines = recommendation_lines("Buy BTC\nHold ETH\nSell XRP");
        assert_eq!(lines, vec!["Buy BTC", "Hold ETH", "Sell XRP"]);
    }

    #[test]
    fn single_segment_payload_is_one_line() {
        assert_eq!(recommendation_lines("Hold everything"), vec!["Hold everything"]);
    }
}

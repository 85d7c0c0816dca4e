//! Detail popup for the selected holding: balances, spot price, and a
//! sparkline of the last 24 hourly closes.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Sparkline};
use ratatui::Frame;

use crate::api::types::{Candle, Holding, SpotPrice};
use crate::state::fetch::FetchState;
use crate::ui::theme::Theme;

pub(crate) fn render(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    holding: &Holding,
    price: Option<&SpotPrice>,
    history: &FetchState<Vec<Candle>>,
) {
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .border_style(Style::new().fg(theme.selected_border))
        .title(format!("{}-GBP", holding.currency))
        .title_style(Style::new().fg(theme.heading).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [stats_area, spark_area] =
        Layout::vertical([Constraint::Length(5), Constraint::Min(2)]).areas(inner);

    let label = Style::new().fg(theme.muted);
    let value = Style::new().fg(theme.text);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Balance    ", label),
            Span::styled(holding.balance.clone(), value),
        ]),
        Line::from(vec![
            Span::styled("Available  ", label),
            Span::styled(holding.available.clone(), value),
        ]),
    ];
    match price {
        Some(price) => {
            lines.push(Line::from(vec![
                Span::styled("Price      ", label),
                Span::styled(format!("£{}", price.price), value),
            ]));
            if let Some(change) = price.change_24h {
                let style = if change >= 0.0 {
                    Style::new().fg(theme.gain)
                } else {
                    Style::new().fg(theme.loss)
                };
                lines.push(Line::from(vec![
                    Span::styled("24h change ", label),
                    Span::styled(format!("{change:+.2}%"), style),
                ]));
            }
        }
        None => lines.push(Line::styled("price unavailable", label)),
    }
    frame.render_widget(Paragraph::new(lines), stats_area);

    match history {
        FetchState::Pending => {
            frame.render_widget(Paragraph::new("Loading history...").style(label), spark_area);
        }
        FetchState::Failed(_) => {
            let message =
                Paragraph::new("History unavailable").style(Style::new().fg(theme.error_fg));
            frame.render_widget(message, spark_area);
        }
        FetchState::Ready(candles) => {
            let points = sparkline_points(candles);
            if points.is_empty() {
                frame.render_widget(Paragraph::new("No history").style(label), spark_area);
            } else {
                let spark = Sparkline::default()
                    .data(points)
                    .style(Style::new().fg(theme.selected_border));
                frame.render_widget(spark, spark_area);
            }
        }
    }
}

/// Hourly closes in chronological order, scaled to 0..=100 for the
/// sparkline. The backend sends candles newest first.
pub(crate) fn sparkline_points(candles: &[Candle]) -> Vec<u64> {
    let mut closes: Vec<(&str, f64)> = candles
        .iter()
        .filter_map(|candle| {
            candle.close.parse::<f64>().ok().map(|close| (candle.time.as_str(), close))
        })
        .collect();
    // ISO timestamps order lexicographically.
    closes.sort_by(|a, b| a.0.cmp(b.0));

    let values: Vec<f64> = closes.into_iter().map(|(_, close)| close).collect();
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().reduce(f64::max).unwrap_or(min);
    if max <= min {
        return vec![50; values.len()];
    }
    values
        .iter()
        .map(|value| ((value - min) / (max - min) * 100.0).round() as u64)
        .collect()
}

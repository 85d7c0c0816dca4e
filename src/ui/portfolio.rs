//! Portfolio panel: a responsive grid of per-holding stat cards.

use std::str::FromStr;

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::api::types::{Holding, PriceBook};
use crate::state::fetch::FetchState;
use crate::ui::theme::Theme;

const CARD_HEIGHT: u16 = 5;

#[derive(Debug, PartialEq)]
pub(crate) enum Direction {
    Up,
    Down,
}

/// Everything one stat card displays, computed before any widget is built.
#[derive(Debug, PartialEq)]
pub(crate) struct Card {
    pub title: String,
    /// `£`-prefixed GBP valuation, 2 decimal places. Absent until the
    /// symbol's price resolves.
    pub valuation: Option<String>,
    /// Coin balance, 4 decimal places, suffixed with the symbol.
    pub balance: Option<String>,
    /// Direction and magnitude of the 24h change. Only present when the
    /// backend sends the 24h field.
    pub change: Option<(Direction, String)>,
    /// The symbol's own price fetch failed; the rest of the grid is fine.
    pub price_failed: bool,
}

pub(crate) fn render(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    holdings: &FetchState<Vec<Holding>>,
    prices: &FetchState<PriceBook>,
    selected: usize,
) {
    // Nothing but the placeholder is rendered until the first settle.
    if matches!(holdings, FetchState::Pending) {
        let placeholder =
            Paragraph::new("Loading portfolio...").style(Style::new().fg(theme.muted));
        frame.render_widget(placeholder, area);
        return;
    }

    let [heading_area, grid_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

    let heading = Paragraph::new("Your Crypto Portfolio")
        .style(Style::new().fg(theme.heading).add_modifier(Modifier::BOLD));
    frame.render_widget(heading, heading_area);

    match holdings {
        FetchState::Pending => {}
        FetchState::Failed(reason) => {
            let message = Paragraph::new(format!("Portfolio unavailable: {reason}"))
                .style(Style::new().fg(theme.error_fg));
            frame.render_widget(message, grid_area);
        }
        FetchState::Ready(holdings) => {
            let cards = build_cards(holdings, prices.ready());
            render_grid(frame, grid_area, theme, &cards, selected);
        }
    }
}

fn render_grid(frame: &mut Frame, area: Rect, theme: &Theme, cards: &[Card], selected: usize) {
    let columns = grid_columns(area.width);
    for (row_index, row) in cards.chunks(columns).enumerate() {
        let y = area.y + row_index as u16 * CARD_HEIGHT;
        if y + CARD_HEIGHT > area.bottom() {
            break;
        }
        let row_area = Rect { x: area.x, y, width: area.width, height: CARD_HEIGHT };
        let cells =
            Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns]).split(row_area);
        for (column_index, card) in row.iter().enumerate() {
            let index = row_index * columns + column_index;
            render_card(frame, cells[column_index], theme, card, index == selected);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, theme: &Theme, card: &Card, selected: bool) {
    let border = if selected {
        Style::new().fg(theme.selected_border)
    } else {
        Style::new().fg(theme.card_border)
    };
    let block = Block::bordered().border_style(border).title(card.title.clone());

    let mut lines: Vec<Line> = Vec::new();
    if card.price_failed {
        lines.push(Line::styled("price unavailable", Style::new().fg(theme.muted)));
    } else {
        if let Some(valuation) = &card.valuation {
            lines.push(Line::styled(
                valuation.clone(),
                Style::new().fg(theme.text).add_modifier(Modifier::BOLD),
            ));
        }
        let mut spans: Vec<Span> = Vec::new();
        if let Some(balance) = &card.balance {
            spans.push(Span::styled(balance.clone(), Style::new().fg(theme.muted)));
        }
        if let Some((direction, magnitude)) = &card.change {
            spans.push(Span::raw(" "));
            spans.push(match direction {
                Direction::Up => {
                    Span::styled(format!("▲ {magnitude}"), Style::new().fg(theme.gain))
                }
                Direction::Down => {
                    Span::styled(format!("▼ {magnitude}"), Style::new().fg(theme.loss))
                }
            });
        }
        if !spans.is_empty() {
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// 1/2/3 card columns by panel width.
pub(crate) fn grid_columns(width: u16) -> usize {
    if width >= 96 {
        3
    } else if width >= 64 {
        2
    } else {
        1
    }
}

/// Build the view model for every holding. An empty holdings sequence
/// yields an empty grid, never an error.
pub(crate) fn build_cards(holdings: &[Holding], prices: Option<&PriceBook>) -> Vec<Card> {
    holdings
        .iter()
        .map(|holding| {
            match prices.and_then(|book| book.outcome(&holding.currency)) {
                None => Card {
                    title: holding.currency.clone(),
                    valuation: None,
                    balance: None,
                    change: None,
                    price_failed: false,
                },
                Some(Err(_)) => Card {
                    title: holding.currency.clone(),
                    valuation: None,
                    balance: None,
                    change: None,
                    price_failed: true,
                },
                Some(Ok(price)) => Card {
                    title: holding.currency.clone(),
                    valuation: valuation_text(&holding.balance, &price.price),
                    balance: balance_text(&holding.balance, &holding.currency),
                    change: change_indicator(price.change_24h),
                    price_failed: false,
                },
            }
        })
        .collect()
}

/// `balance × price`, rounded to 2 decimal places, `£`-prefixed.
pub(crate) fn valuation_text(balance: &str, price: &str) -> Option<String> {
    let balance = Decimal::from_str(balance).ok()?;
    let price = Decimal::from_str(price).ok()?;
    let value = (balance * price).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Some(format!("£{value:.2}"))
}

/// Coin balance rounded to 4 decimal places, suffixed with the symbol.
pub(crate) fn balance_text(balance: &str, currency: &str) -> Option<String> {
    let balance = Decimal::from_str(balance).ok()?;
    let rounded = balance.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    Some(format!("{rounded:.4} {currency}"))
}

/// Direction and 2-decimal magnitude of the 24h change, when present.
pub(crate) fn change_indicator(change_24h: Option<f64>) -> Option<(Direction, String)> {
    let change = change_24h?;
    let direction = if change >= 0.0 { Direction::Up } else { Direction::Down };
    Some((direction, format!("{:.2}%", change.abs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::api::types::SpotPrice;

    fn holding(currency: &str, balance: &str) -> Holding {
        Holding {
            currency: currency.to_string(),
            balance: balance.to_string(),
            available: balance.to_string(),
        }
    }

    fn spot(price: &str, change_24h: Option<f64>) -> SpotPrice {
        SpotPrice {
            price: price.to_string(),
            time: "2025-01-02T03:04:05".to_string(),
            change_24h,
            price_24h_ago: None,
        }
    }

    #[test]
    fn valuation_is_balance_times_price_to_two_places() {
        assert_eq!(valuation_text("0.5", "40123.40").unwrap(), "£20061.70");
        assert_eq!(valuation_text("2", "3").unwrap(), "£6.00");
        assert_eq!(valuation_text("1.2345", "2").unwrap(), "£2.47");
    }

    #[test]
    fn unparseable_decimal_yields_no_valuation() {
        assert!(valuation_text("not-a-number", "3").is_none());
    }

    #[test]
    fn balance_shows_four_decimal_places() {
        assert_eq!(balance_text("0.5", "BTC").unwrap(), "0.5000 BTC");
        assert_eq!(balance_text("12.123456", "ETH").unwrap(), "12.1235 ETH");
    }

    #[test]
    fn change_indicator_uses_sign_for_direction_and_abs_for_magnitude() {
        let (direction, magnitude) = change_indicator(Some(-3.456)).unwrap();
        assert_eq!(direction, Direction::Down);
        assert_eq!(magnitude, "3.46%");

        let (direction, _) = change_indicator(Some(0.2)).unwrap();
        assert_eq!(direction, Direction::Up);

        assert!(change_indicator(None).is_none());
    }

    #[test]
    fn empty_holdings_build_an_empty_grid() {
        assert!(build_cards(&[], None).is_empty());
    }

    #[test]
    fn card_shows_only_the_label_until_the_price_resolves() {
        let holdings = vec![holding("BTC", "0.5")];
        let cards = build_cards(&holdings, None);
        assert_eq!(cards[0].title, "BTC");
        assert!(cards[0].valuation.is_none());
        assert!(!cards[0].price_failed);
    }

    #[test]
    fn one_failed_price_marks_only_its_own_card() {
        let holdings = vec![holding("BTC", "0.5"), holding("XRP", "100")];
        let mut by_symbol = HashMap::new();
        by_symbol.insert("BTC".to_string(), Ok(spot("40123.40", Some(2.5))));
        by_symbol.insert("XRP".to_string(), Err("server error 500".to_string()));
        let book = PriceBook {
            identity: vec!["BTC".to_string(), "XRP".to_string()],
            by_symbol,
        };

        let cards = build_cards(&holdings, Some(&book));
        assert_eq!(cards[0].valuation.as_deref(), Some("£20061.70"));
        assert_eq!(cards[0].balance.as_deref(), Some("0.5000 BTC"));
        assert!(!cards[0].price_failed);
        assert!(cards[1].price_failed);
    }

    #[test]
    fn grid_columns_follow_width_breakpoints() {
        assert_eq!(grid_columns(40), 1);
        assert_eq!(grid_columns(64), 2);
        assert_eq!(grid_columns(96), 3);
        assert_eq!(grid_columns(200), 3);
    }
}

//! Terminal UI: composes the portfolio and recommendations panels,
//! multiplexes poller notifications with key input, and owns the toast
//! and detail-popup state.

mod detail;
mod portfolio;
mod recommendations;
mod theme;
mod toast;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Paragraph};
use ratatui::{DefaultTerminal, Frame};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::api::Backend;
use crate::poller::{history, UiEvent};
use crate::state::fetch::FetchState;
use crate::state::query_cache::QueryCache;
use theme::Theme;
use toast::Toast;

const INFO_TEXT: &str = "(Esc/q) quit | (↑/↓) select | (↵) details";

/// Stack the two panels vertically below this terminal width.
const SPLIT_BREAKPOINT: u16 = 100;

pub struct App {
    cache: QueryCache,
    backend: Arc<dyn Backend>,
    rx: mpsc::Receiver<UiEvent>,
    tx: mpsc::Sender<UiEvent>,
    theme: Theme,
    selected: usize,
    show_detail: bool,
    toast: Option<Toast>,
    seen_failure_token: u64,
}

impl App {
    pub fn new(
        cache: QueryCache,
        backend: Arc<dyn Backend>,
        rx: mpsc::Receiver<UiEvent>,
        tx: mpsc::Sender<UiEvent>,
    ) -> Self {
        Self {
            cache,
            backend,
            rx,
            tx,
            theme: Theme::new(),
            selected: 0,
            show_detail: false,
            toast: None,
            seen_failure_token: 0,
        }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut ticker = interval(Duration::from_millis(250));

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            select! {
                maybe_event = self.rx.recv() => {
                    match maybe_event {
                        Some(event) => self.on_event(event),
                        None => return Ok(()),
                    }
                }
                maybe_key = events.next() => {
                    if let Some(Ok(Event::Key(key))) = maybe_key {
                        if key.kind == KeyEventKind::Press && self.on_key(key) {
                            return Ok(());
                        }
                    }
                }
                _ = ticker.tick() => {
                    if self.toast.as_ref().is_some_and(Toast::expired) {
                        self.toast = None;
                    }
                }
            }
        }
    }

    /// Poller notifications. The toast is created here, at settle time,
    /// never during a draw, and at most once per failure token.
    fn on_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Settled(_) => {}
            UiEvent::RecommendationsFailed { token, message } => {
                if token > self.seen_failure_token {
                    self.seen_failure_token = token;
                    self.toast = Some(Toast::new(message));
                }
            }
        }
    }

    /// Returns true when the app should quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.show_detail {
                    self.show_detail = false;
                } else {
                    return true;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Enter => self.toggle_detail(),
            _ => {}
        }
        false
    }

    fn card_count(&self) -> usize {
        self.cache.portfolio().ready().map(Vec::len).unwrap_or(0)
    }

    fn move_selection(&mut self, direction: isize) {
        let len = self.card_count() as isize;
        if len == 0 {
            return;
        }
        self.selected = ((self.selected as isize + direction + len) % len) as usize;
    }

    fn toggle_detail(&mut self) {
        if self.show_detail {
            self.show_detail = false;
            return;
        }
        let holdings = self.cache.portfolio();
        let Some(holding) = holdings.ready().and_then(|h| h.get(self.selected)) else {
            return;
        };
        history::spawn_fetch(
            self.backend.clone(),
            self.cache.clone(),
            holding.currency.clone(),
            self.tx.clone(),
        );
        self.show_detail = true;
    }

    fn draw(&mut self, frame: &mut Frame) {
        let holdings = self.cache.portfolio();
        let prices = self.cache.prices();
        let recommendations = self.cache.recommendations();

        // Keep the selection inside the grid when holdings shrink.
        if let FetchState::Ready(holdings) = &holdings {
            self.selected = self.selected.min(holdings.len().saturating_sub(1));
        }

        let [body, footer_area] =
            Layout::vertical([Constraint::Min(8), Constraint::Length(3)]).areas(frame.area());

        // Responsive split: single column on narrow terminals, two columns
        // with the portfolio region wider otherwise.
        let (portfolio_area, recommendations_area) = if body.width < SPLIT_BREAKPOINT {
            let [top, bottom] =
                Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(body);
            (top, bottom)
        } else {
            let [left, right] =
                Layout::horizontal([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)]).areas(body);
            (left, right)
        };

        portfolio::render(frame, portfolio_area, &self.theme, &holdings, &prices, self.selected);
        recommendations::render(frame, recommendations_area, &self.theme, &recommendations);
        self.render_footer(frame, footer_area);

        if let Some(toast) = &self.toast {
            toast::render(frame, &self.theme, toast);
        }

        if self.show_detail {
            match holdings.ready().and_then(|h| h.get(self.selected)) {
                Some(holding) => {
                    let price = prices
                        .ready()
                        .and_then(|book| book.outcome(&holding.currency))
                        .and_then(|outcome| outcome.as_ref().ok());
                    let history = self.cache.history(&holding.currency);
                    let area = popup_area(
                        frame.area(),
                        Constraint::Percentage(60),
                        Constraint::Length(12),
                    );
                    detail::render(frame, area, &self.theme, holding, price, &history);
                }
                None => self.show_detail = false,
            }
        }
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let footer = Paragraph::new(Text::from(INFO_TEXT))
            .style(Style::new().fg(self.theme.muted))
            .centered()
            .block(
                Block::bordered()
                    .border_type(BorderType::Double)
                    .border_style(Style::new().fg(self.theme.footer_border)),
            );
        frame.render_widget(footer, area);
    }
}

/// Centered rect taking up the given fraction of `area`.
fn popup_area(area: Rect, x: Constraint, y: Constraint) -> Rect {
    let vertical = Layout::vertical([y]).flex(Flex::Center);
    let horizontal = Layout::horizontal([x]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

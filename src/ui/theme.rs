use ratatui::style::{palette::tailwind, Color};

/// Dashboard palette.
pub struct Theme {
    pub heading: Color,
    pub text: Color,
    pub muted: Color,
    pub card_border: Color,
    pub selected_border: Color,
    pub gain: Color,
    pub loss: Color,
    pub error_fg: Color,
    pub footer_border: Color,
}

impl Theme {
    pub const fn new() -> Self {
        Self {
            heading: tailwind::SLATE.c100,
            text: tailwind::SLATE.c200,
            muted: tailwind::SLATE.c400,
            card_border: tailwind::SLATE.c600,
            selected_border: tailwind::BLUE.c400,
            gain: tailwind::GREEN.c400,
            loss: tailwind::RED.c400,
            error_fg: tailwind::RED.c400,
            footer_border: tailwind::BLUE.c400,
        }
    }
}

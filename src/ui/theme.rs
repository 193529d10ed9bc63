use ratatui::style::Color;

use crate::models::Theme;

/// Colors used by every widget, resolved once per frame from the theme.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    pub(crate) background: Color,
    pub(crate) text: Color,
    pub(crate) muted: Color,
    pub(crate) active: Color,
    pub(crate) key: Color,
    pub(crate) border: Color,
    pub(crate) highlight: Color,
    pub(crate) success: Color,
    pub(crate) error: Color,
}

impl Palette {
    pub(crate) fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Gray,
                active: Color::Blue,
                key: Color::Magenta,
                border: Color::DarkGray,
                highlight: Color::LightBlue,
                success: Color::Green,
                error: Color::Red,
            },
            Theme::Dark => Self {
                background: Color::Black,
                text: Color::White,
                muted: Color::DarkGray,
                active: Color::Yellow,
                key: Color::Cyan,
                border: Color::Gray,
                highlight: Color::DarkGray,
                success: Color::LightGreen,
                error: Color::LightRed,
            },
        }
    }
}

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Padding};

pub struct Theme;

impl Theme {
    // ── Background ───────────────────────────────────────────────────
    pub const BG_SURFACE: Color = Color::Rgb(26, 32, 28);

    // ── Border ───────────────────────────────────────────────────────
    pub const BORDER_DIM: Color = Color::DarkGray;
    pub const BORDER_NORMAL: Color = Color::Rgb(58, 70, 62);
    pub const BORDER_ACCENT: Color = Color::Rgb(110, 200, 140);

    // ── Text hierarchy ───────────────────────────────────────────────
    pub const TEXT_PRIMARY: Color = Color::White;
    pub const TEXT_SECONDARY: Color = Color::Rgb(140, 150, 142);
    pub const TEXT_MUTED: Color = Color::Rgb(85, 95, 88);
    pub const TEXT_HINT: Color = Color::Rgb(62, 72, 65);

    // ── Key style (for footer hints) ─────────────────────────────────
    pub const TEXT_KEY: Color = Color::Rgb(140, 150, 142);
    pub const TEXT_KEY_DESC: Color = Color::DarkGray;

    // ── Accent ───────────────────────────────────────────────────────
    pub const ACCENT_GREEN: Color = Color::Rgb(110, 200, 140);
    pub const ACCENT_BLUE: Color = Color::Rgb(100, 170, 230);
    pub const ACCENT_YELLOW: Color = Color::Rgb(220, 185, 80);
    pub const ACCENT_RED: Color = Color::Rgb(215, 90, 85);
    pub const ACCENT_ORANGE: Color = Color::Rgb(222, 140, 75);

    // ── Weight bands ─────────────────────────────────────────────────
    pub const WEIGHT_LIGHT: Color = Color::Rgb(110, 200, 140);
    pub const WEIGHT_MID: Color = Color::Rgb(220, 185, 80);
    pub const WEIGHT_HEAVY: Color = Color::Rgb(215, 90, 85);

    // ── Tab style ────────────────────────────────────────────────────
    pub const TAB_INACTIVE: Color = Color::Rgb(120, 130, 122);
    pub const TAB_DIM: Color = Color::Rgb(70, 80, 72);

    // ── Padding ──────────────────────────────────────────────────────
    pub const PADDING_CARD: Padding = Padding::new(2, 2, 1, 1);

    // ── Block helpers ────────────────────────────────────────────────

    pub fn block() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_NORMAL))
    }

    pub fn block_dim() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_DIM))
    }

    pub fn block_accent() -> Block<'static> {
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Self::BORDER_ACCENT))
    }
}

// ── Entity icon / color ──────────────────────────────────────────────
// Card styling keys off the record's `type` field, the same switch the
// mobile cards make on their `type` prop.

pub fn entity_icon(entity_type: &str) -> &'static str {
    match entity_type {
        "pack" => " ◆ ",
        "trip" => " ▲ ",
        "template" => " ▣ ",
        _ => " ? ",
    }
}

pub fn entity_color(entity_type: &str) -> Color {
    match entity_type {
        "pack" => Theme::ACCENT_GREEN,
        "trip" => Theme::ACCENT_BLUE,
        "template" => Theme::ACCENT_YELLOW,
        _ => Color::White,
    }
}

/// Color for a total pack weight, in grams.
pub fn weight_color(grams: f64) -> Color {
    if grams < 9_000.0 {
        Theme::WEIGHT_LIGHT
    } else if grams < 16_000.0 {
        Theme::WEIGHT_MID
    } else {
        Theme::WEIGHT_HEAVY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_icon_maps_known_and_unknown_types() {
        assert_eq!(entity_icon("pack"), " ◆ ");
        assert_eq!(entity_icon("trip"), " ▲ ");
        assert_eq!(entity_icon("something-else"), " ? ");
    }

    #[test]
    fn entity_color_maps_known_and_unknown_types() {
        assert_eq!(entity_color("pack"), Theme::ACCENT_GREEN);
        assert_eq!(entity_color("trip"), Theme::ACCENT_BLUE);
        assert_eq!(entity_color("mystery"), Color::White);
    }

    #[test]
    fn weight_color_bands() {
        assert_eq!(weight_color(4_000.0), Theme::WEIGHT_LIGHT);
        assert_eq!(weight_color(12_000.0), Theme::WEIGHT_MID);
        assert_eq!(weight_color(20_000.0), Theme::WEIGHT_HEAVY);
    }
}

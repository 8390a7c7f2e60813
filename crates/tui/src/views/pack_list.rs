use crate::app::App;
use crate::theme::Theme;
use crate::views::pack_card::{self, CARD_HEIGHT};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Scrolling list of pack cards.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.packs.is_empty() {
        let empty = Paragraph::new("No packs yet — press r to refresh")
            .style(Style::new().fg(Theme::TEXT_MUTED))
            .centered();
        frame.render_widget(empty, area);
        return;
    }

    let visible = (area.height / CARD_HEIGHT).max(1) as usize;
    let first = app
        .selected_pack
        .saturating_sub(visible.saturating_sub(1));

    let mut y = area.y;
    for (offset, pack) in app.packs.iter().enumerate().skip(first).take(visible) {
        let remaining = (area.y + area.height).saturating_sub(y);
        if remaining < CARD_HEIGHT {
            break;
        }
        let card_area = Rect::new(area.x, y, area.width, CARD_HEIGHT);
        pack_card::render(frame, pack, card_area, offset == app.selected_pack);
        y += CARD_HEIGHT;
    }
}

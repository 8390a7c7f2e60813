use crate::theme::{entity_color, entity_icon, weight_color, Theme};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use trailpack_api::PackSummary;
use trailpack_core::weight::format_grams;

/// Large card for one pack: name, weight, favorites, score. The accent
/// color keys off the entity type.
pub fn render(frame: &mut Frame, pack: &PackSummary, area: Rect, selected: bool) {
    let block = if selected {
        Theme::block_accent()
    } else {
        Theme::block()
    }
    .padding(Theme::PADDING_CARD);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let accent = entity_color("pack");
    let title_line = Line::from(vec![
        Span::styled(entity_icon("pack"), Style::new().fg(accent)),
        Span::styled(
            truncate(&pack.name, inner.width.saturating_sub(6) as usize),
            Style::new().fg(Theme::TEXT_PRIMARY).bold(),
        ),
        Span::styled(
            if pack.is_public { "  public" } else { "  private" },
            Style::new().fg(Theme::TEXT_MUTED),
        ),
    ]);

    let stats_line = Line::from(vec![
        Span::styled(
            format_grams(pack.total_weight),
            Style::new().fg(weight_color(pack.total_weight)),
        ),
        Span::styled("   ♥ ", Style::new().fg(Theme::ACCENT_RED)),
        Span::styled(
            pack.favorites_count.to_string(),
            Style::new().fg(Theme::TEXT_SECONDARY),
        ),
        Span::styled(
            format!("   score {:.0}", pack.total_score),
            Style::new().fg(Theme::TEXT_SECONDARY),
        ),
    ]);

    let paragraph = Paragraph::new(vec![title_line, stats_line]);
    frame.render_widget(paragraph, inner);
}

/// Height one card occupies, borders and padding included.
pub const CARD_HEIGHT: u16 = 6;

fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    for ch in s.chars() {
        if out.width() + 1 >= max_width {
            break;
        }
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn pack() -> PackSummary {
        PackSummary {
            id: "p1".into(),
            name: "Alpine loadout".into(),
            owner_id: "u1".into(),
            is_public: true,
            total_weight: 8_400.0,
            total_score: 92.0,
            favorites_count: 7,
            created_at: "2026-08-01 00:00:00".into(),
        }
    }

    fn render_text(selected: bool) -> String {
        let backend = TestBackend::new(48, 6);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, &pack(), area, selected);
            })
            .expect("draw");
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn card_shows_name_weight_and_favorites() {
        let text = render_text(false);
        assert!(text.contains("Alpine loadout"));
        assert!(text.contains("8.40 kg"));
        assert!(text.contains('7'));
        assert!(text.contains("score 92"));
        assert!(text.contains("public"));
    }

    #[test]
    fn selection_does_not_change_the_content() {
        assert_eq!(
            render_text(false).replace(['╭', '╮', '╰', '╯', '─', '│'], ""),
            render_text(true).replace(['╭', '╮', '╰', '╯', '─', '│'], "")
        );
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate("short", 20), "short");
        let long = truncate("a very long pack name indeed", 10);
        assert!(long.ends_with('…'));
        assert!(long.width() <= 10);
    }
}

use crate::app::{Tab, View};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, active: &Tab, view: &View, area: Rect) {
    let tabs = [
        (Tab::Packs, "1:Packs", "Packs"),
        (Tab::Trips, "2:Trips", "Trips"),
        (Tab::Settings, "3:Settings", "Settings"),
    ];

    // In the detail view the number keys are free for future filters;
    // hide the prefixes there to match.
    let hide_numbers = matches!(view, View::PackDetail);

    let mut spans = vec![Span::styled(" ", Style::new())];

    for (tab, label_numbered, label_plain) in &tabs {
        let is_active = tab == active;
        let label = if hide_numbers {
            label_plain
        } else {
            label_numbered
        };
        let style = if is_active {
            Style::new()
                .fg(Color::Black)
                .bg(Theme::ACCENT_GREEN)
                .bold()
                .add_modifier(Modifier::UNDERLINED)
        } else if hide_numbers {
            Style::new().fg(Theme::TAB_DIM)
        } else {
            Style::new().fg(Theme::TAB_INACTIVE)
        };

        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::styled(" ", Style::new()));
    }

    let paragraph = Paragraph::new(Line::from(spans));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::app::{Tab, View};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn buffer_to_string(buffer: &Buffer) -> String {
        let area = *buffer.area();
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render_tab_text(active: Tab, view: View) -> String {
        let backend = TestBackend::new(80, 3);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, &active, &view, area);
            })
            .expect("draw");
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn list_views_show_numbered_tabs() {
        let text = render_tab_text(Tab::Packs, View::PackList);
        assert!(text.contains("1:Packs"));
        assert!(text.contains("2:Trips"));
        assert!(text.contains("3:Settings"));
    }

    #[test]
    fn detail_view_hides_number_prefixes() {
        let text = render_tab_text(Tab::Packs, View::PackDetail);
        assert!(text.contains("Packs"));
        assert!(text.contains("Trips"));
        assert!(!text.contains("1:Packs"));
        assert!(!text.contains("2:Trips"));
    }
}

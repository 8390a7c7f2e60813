use crate::app::{App, View};
use crate::theme::Theme;
use crate::views::{nav_list, pack_detail, pack_list, settings, tab_bar, trip_list};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, app: &App) {
    let [tab_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    // Tab bar
    tab_bar::render(frame, &app.active_tab, &app.view, tab_area);

    // Body: navigation rail + content
    let [nav_area, content_area] =
        Layout::horizontal([Constraint::Length(22), Constraint::Fill(1)]).areas(body_area);
    nav_list::render(frame, &app.navigation_items(), &app.active_tab, nav_area);

    match app.view {
        View::PackList => pack_list::render(frame, app, content_area),
        View::PackDetail => pack_detail::render(frame, app, content_area),
        View::TripList => trip_list::render(frame, app, content_area),
        View::Settings => settings::render(frame, app, content_area),
    }

    // Footer
    render_footer(frame, app, footer_area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref flash) = app.flash {
        let line = Line::from(Span::styled(
            format!(" {flash}"),
            Style::new().fg(Theme::ACCENT_RED),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints: &[(&str, &str)] = match app.view {
        View::PackList => &[
            ("j/k", "move"),
            ("enter", "open"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
        View::PackDetail => &[("esc", "back"), ("q", "back")],
        View::TripList => &[("j/k", "move"), ("r", "refresh"), ("q", "quit")],
        View::Settings => &[("r", "refresh"), ("q", "quit")],
    };

    let mut spans = Vec::with_capacity(hints.len() * 2 + 1);
    spans.push(Span::raw(" "));
    for (key, desc) in hints {
        spans.push(Span::styled(*key, Style::new().fg(Theme::TEXT_KEY).bold()));
        spans.push(Span::styled(
            format!(" {desc}  "),
            Style::new().fg(Theme::TEXT_KEY_DESC),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TuiConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn root_layout_renders_every_region() {
        let app = App::new(TuiConfig::default()).expect("app");

        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(frame, &app)).expect("draw");

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("1:Packs"));
        assert!(text.contains("trailpack"));
        assert!(text.contains("No packs yet"));
        assert!(text.contains("refresh"));
    }
}

use crate::app::App;
use crate::theme::{entity_color, entity_icon, Theme};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};

/// Compact trip rows: name, dates, destination.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.trips.is_empty() {
        let empty = Paragraph::new("No trips yet — press r to refresh")
            .style(Style::new().fg(Theme::TEXT_MUTED))
            .centered();
        frame.render_widget(empty, area);
        return;
    }

    let accent = entity_color("trip");
    let rows: Vec<ListItem> = app
        .trips
        .iter()
        .enumerate()
        .map(|(i, trip)| {
            let selected = i == app.selected_trip;
            let marker_style = if selected {
                Style::new().fg(accent).bold()
            } else {
                Style::new().fg(Theme::TEXT_MUTED)
            };
            let dates = match (trip.start_date.as_deref(), trip.end_date.as_deref()) {
                (Some(start), Some(end)) => format!("{start} → {end}"),
                (Some(start), None) => start.to_string(),
                _ => String::new(),
            };
            let line = Line::from(vec![
                Span::styled(entity_icon("trip"), marker_style),
                Span::styled(
                    format!("{:<24}", trip.name),
                    if selected {
                        Style::new().fg(Theme::TEXT_PRIMARY).bold()
                    } else {
                        Style::new().fg(Theme::TEXT_PRIMARY)
                    },
                ),
                Span::styled(format!("{dates:<26}"), Style::new().fg(Theme::TEXT_SECONDARY)),
                Span::styled(
                    trip.destination.clone().unwrap_or_default(),
                    Style::new().fg(Theme::TEXT_MUTED),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let block = Theme::block().title(format!(" trips ({}) ", app.trips.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(List::new(rows), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::config::TuiConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use trailpack_api::TripSummary;

    #[test]
    fn trips_render_with_dates_and_destination() {
        let mut app = App::new(TuiConfig::default()).expect("app");
        app.trips = vec![TripSummary {
            id: "t1".into(),
            name: "North loop".into(),
            description: None,
            duration: None,
            weather: None,
            start_date: Some("2026-06-01".into()),
            end_date: Some("2026-06-03".into()),
            destination: Some("North Cascades".into()),
            owner_id: "u1".into(),
            is_public: true,
            created_at: "2026-05-01 00:00:00".into(),
        }];

        let backend = TestBackend::new(90, 6);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, &app, area);
            })
            .expect("draw");

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("North loop"));
        assert!(text.contains("2026-06-01 → 2026-06-03"));
        assert!(text.contains("North Cascades"));
    }
}

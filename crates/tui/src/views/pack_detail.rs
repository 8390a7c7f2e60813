use crate::app::App;
use crate::theme::{weight_color, Theme};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};

use trailpack_core::weight::{format_grams, to_grams, WeightUnit};

/// Pack detail: score breakdown plus the item roster.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref detail) = app.pack_detail else {
        return;
    };

    let [header_area, items_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Fill(1)]).areas(area);

    let header = Theme::block_accent().title(format!(" {} ", detail.pack.name));
    let header_inner = header.inner(header_area);
    frame.render_widget(header, header_area);

    let summary = Line::from(vec![
        Span::styled(
            format_grams(detail.pack.total_weight),
            Style::new().fg(weight_color(detail.pack.total_weight)),
        ),
        Span::styled(
            format!(
                "   score {:.0}  (weight {:.0} · essentials {:.0} · redundancy -{:.0})",
                detail.score.total,
                detail.score.weight_score,
                detail.score.essentials_score,
                detail.score.redundancy_penalty,
            ),
            Style::new().fg(Theme::TEXT_SECONDARY),
        ),
    ]);
    frame.render_widget(Paragraph::new(summary), header_inner);

    let rows: Vec<ListItem> = detail
        .items
        .iter()
        .map(|item| {
            let grams = to_grams(item.weight, WeightUnit::parse(&item.unit)) * f64::from(item.quantity);
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<28}", item.name),
                    Style::new().fg(Theme::TEXT_PRIMARY),
                ),
                Span::styled(
                    format!("×{:<3}", item.quantity),
                    Style::new().fg(Theme::TEXT_MUTED),
                ),
                Span::styled(format_grams(grams), Style::new().fg(weight_color(grams))),
                Span::styled(
                    item.category
                        .as_deref()
                        .map(|c| format!("  {c}"))
                        .unwrap_or_default(),
                    Style::new().fg(Theme::TEXT_MUTED),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let block = Theme::block().title(format!(" items ({}) ", detail.items.len()));
    let inner = block.inner(items_area);
    frame.render_widget(block, items_area);
    frame.render_widget(List::new(rows), inner);
}

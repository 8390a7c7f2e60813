use crate::app::{NavItem, Tab};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem};

/// Vertical navigation list over labeled destinations, the terminal
/// sibling of the mobile navigation drawer.
pub fn render(frame: &mut Frame, items: &[NavItem], active: &Tab, area: Rect) {
    let block = Theme::block_dim().title(" trailpack ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let is_active = item.tab == *active;
            let marker = if is_active { "▸ " } else { "  " };
            let mut spans = vec![Span::styled(
                format!("{marker}{}", item.label),
                if is_active {
                    Style::new().fg(Theme::ACCENT_GREEN).bold()
                } else {
                    Style::new().fg(Theme::TEXT_SECONDARY)
                },
            )];
            if let Some(count) = item.count {
                spans.push(Span::styled(
                    format!("  {count}"),
                    Style::new().fg(Theme::TEXT_MUTED),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(rows), inner);
}

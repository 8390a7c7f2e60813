use crate::app::App;
use crate::config;
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Server and session info.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Theme::block().title(" settings ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let session = match app.session_user {
        Some(ref user) => format!("{} <{}>", user.username, user.email),
        None => "not signed in".to_string(),
    };

    let lines = vec![
        field("server", &config::resolve_server_url(&app.config)),
        field("session", &session),
        field(
            "config",
            &config::config_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "unavailable".to_string()),
        ),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn field<'a>(name: &str, value: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{name:<10}"), Style::new().fg(Theme::TEXT_MUTED)),
        Span::styled(value.to_string(), Style::new().fg(Theme::TEXT_PRIMARY)),
    ])
}

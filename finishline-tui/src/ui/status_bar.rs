//! Bottom status bar: key hints and the last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Focus, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let keys = match app.focus {
        Focus::Chart => " q:Quit Tab:Field ←/→:Drag Shift:×5 r:Reset Enter:Calculate",
        _ => " q:Quit Tab:Field ↑/↓:Change Enter:Calculate",
    };
    let mut spans = vec![Span::styled(keys, theme::muted()), Span::raw(" | ")];

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

//! Calculation form: race, distance, gender, age and goal pace.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use finishline_core::Gender;

use crate::app::{AppState, Focus, LoadState};
use crate::theme;
use crate::ui::panel_block;

const LABEL_WIDTH: usize = 10;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.focus != Focus::Chart;
    let block = panel_block()
        .border_style(theme::panel_border(focused))
        .title(" Estimate ")
        .title_style(theme::panel_title(focused));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.catalog.is_empty() {
        let msg = match &app.load_state {
            LoadState::Loading(source) => format!("Loading {source}..."),
            _ => "No results loaded.".to_string(),
        };
        f.render_widget(Paragraph::new(Span::styled(msg, theme::muted())), inner);
        return;
    }

    let race = app
        .selected_race()
        .map(|r| format!("{} ({}/{})", r.name, app.form.race_idx + 1, app.catalog.len()))
        .unwrap_or_default();
    let gender = match app.form.gender {
        Gender::F => "Female",
        _ => "Male",
    };

    let mut lines = vec![
        field(app, Focus::Race, race),
        field(app, Focus::Distance, app.form.distance.label().to_string()),
        field(app, Focus::Gender, gender.to_string()),
        field(app, Focus::Age, app.form.age.clone()),
        field(app, Focus::Pace, format!("{} min/mi", app.form.pace_text())),
        Line::from(""),
    ];
    lines.push(Line::from(Span::styled(" Enter  calculate", theme::secondary())));
    lines.push(Line::from(Span::styled(" Tab    next field", theme::muted())));
    lines.push(Line::from(Span::styled(" ↑/↓    change value", theme::muted())));
    lines.push(Line::from(Span::styled(" PgUp   pace ±0:30", theme::muted())));

    f.render_widget(Paragraph::new(lines), inner);
}

fn field(app: &AppState, which: Focus, value: String) -> Line<'static> {
    let focused = app.focus == which;
    let marker = if focused { "▸" } else { " " };
    Line::from(vec![
        Span::styled(format!("{marker}{:<LABEL_WIDTH$}", which.label()), theme::secondary()),
        Span::styled(format!(" {value} "), theme::field_value(focused)),
    ])
}

//! Results: summary sentence, the three placements and the field cards.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use finishline_core::{CandidateResult, Standing};

use crate::app::{AppState, StatusLevel};
use crate::theme;
use crate::ui::panel_block;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let block = panel_block()
        .border_style(theme::panel_border(false))
        .title(" Results ")
        .title_style(theme::panel_title(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(result) = &app.result else {
        let text = match (&app.calc_error, &app.status_message) {
            (Some(msg), _) | (None, Some((msg, StatusLevel::Error))) => {
                Span::styled(msg.clone(), theme::negative())
            }
            _ => Span::styled("Fill in the form and press Enter.", theme::muted()),
        };
        f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
        return;
    };

    // A failed recalculation leaves the last result on screen; flag it.
    let inner = match &app.calc_error {
        Some(msg) => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(0)])
                .split(inner);
            let lines = vec![
                Line::from(Span::styled(msg.clone(), theme::negative())),
                Line::from(Span::styled(
                    "Showing the previous result; fix the form and press Enter.",
                    theme::muted(),
                )),
            ];
            f.render_widget(Paragraph::new(lines), split[0]);
            split[1]
        }
        None => inner,
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(3),
        ])
        .split(inner);

    let summary = Paragraph::new(Span::styled(result.summary_sentence(), theme::text()))
        .wrap(Wrap { trim: true });
    f.render_widget(summary, rows[0]);
    f.render_widget(Paragraph::new(placement_lines(result)), rows[1]);
    render_cards(f, rows[2], result);
}

fn placement_lines(result: &CandidateResult) -> Vec<Line<'static>> {
    let overall = result.overall;
    vec![
        Line::from(vec![
            Span::styled("Overall   ", theme::secondary()),
            Span::styled(format!("#{} out of {}", overall.place, overall.total), theme::text()),
            Span::raw("  "),
            top_span(overall.top_percent(), format!("Top {:.1}%", overall.top_percent())),
        ]),
        standing_line("Gender    ", &result.gender, result.gender.total().to_string()),
        standing_line("Division  ", &result.division, result.division_label.clone()),
    ]
}

fn standing_line(title: &'static str, standing: &Standing, of: String) -> Line<'static> {
    let top = match standing.top_percent() {
        Some(p) => top_span(p, standing.top_text()),
        None => Span::styled(standing.top_text(), theme::muted()),
    };
    Line::from(vec![
        Span::styled(title, theme::secondary()),
        Span::styled(format!("{} out of {of}", standing.place_text()), theme::text()),
        Span::raw("  "),
        top,
    ])
}

fn top_span(top_percent: f64, text: String) -> Span<'static> {
    Span::styled(
        text,
        theme::bold(Style::default().fg(theme::placement_color(top_percent))),
    )
}

fn render_cards(f: &mut Frame, area: Rect, result: &CandidateResult) {
    let b = &result.breakdown;
    let cards = [
        ("Age", b.age_card()),
        ("Gender", b.gender_card()),
        ("Top divisions", b.division_card()),
        ("Finish time", b.finish_time_card()),
        ("Pace", b.pace_card()),
    ];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cards.len() as u32); 5])
        .split(area);

    for ((title, lines), col) in cards.into_iter().zip(columns.iter()) {
        let block = panel_block()
            .border_style(theme::muted())
            .title(format!(" {title} "))
            .title_style(theme::secondary());
        let body: Vec<Line> = lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, theme::text())))
            .collect();
        f.render_widget(Paragraph::new(body).block(block), *col);
    }
}

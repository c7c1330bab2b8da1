//! Top-level UI layout: form and results on top, the distribution chart
//! below, status bar at the bottom.

pub mod chart_panel;
pub mod form_panel;
pub mod results_panel;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::AppState;

const TOP_HEIGHT: u16 = 16;
const FORM_WIDTH: u16 = 38;

/// Screen regions. Computed the same way for drawing and for mouse hit
/// testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub form: Rect,
    pub results: Rect,
    pub chart: Rect,
    pub status: Rect,
}

/// Rows inside the chart panel border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartAreas {
    pub label: Rect,
    pub plot: Rect,
    pub axis: Rect,
    pub hint: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TOP_HEIGHT),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FORM_WIDTH), Constraint::Min(20)])
        .split(rows[0]);
    Areas {
        form: top[0],
        results: top[1],
        chart: rows[1],
        status: rows[2],
    }
}

/// Border used by every panel.
pub fn panel_block() -> Block<'static> {
    Block::default().borders(Borders::ALL)
}

pub fn chart_areas(chart: Rect) -> ChartAreas {
    let inner = panel_block().inner(chart);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    ChartAreas {
        label: rows[0],
        plot: rows[1],
        axis: rows[2],
        hint: rows[3],
    }
}

/// The rectangle pointer samples are measured against.
pub fn plot_area(frame: Rect) -> Rect {
    chart_areas(layout(frame).chart).plot
}

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let areas = layout(f.area());
    form_panel::render(f, areas.form, app);
    results_panel::render(f, areas.results, app);
    chart_panel::render(f, areas.chart, app);
    status_bar::render(f, areas.status, app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use finishline_core::{synthetic, EstimatorConfig};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render(app: &AppState) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn demo_app() -> AppState {
        let mut app = AppState::new(EstimatorConfig::default());
        app.apply_table(synthetic::demo_table(3));
        app.set_plot_width(f64::from(plot_area(Rect::new(0, 0, 120, 40)).width));
        app
    }

    #[test]
    fn plot_sits_inside_the_chart_border() {
        let frame = Rect::new(0, 0, 120, 40);
        let areas = layout(frame);
        let plot = plot_area(frame);
        assert_eq!(plot.x, areas.chart.x + 1);
        assert_eq!(plot.width, areas.chart.width - 2);
        assert_eq!(plot.y, areas.chart.y + 2);
        assert_eq!(areas.status.height, 1);
        assert_eq!(areas.status.y, 39);
    }

    #[test]
    fn empty_chart_prompts_for_a_calculation() {
        let text = render(&demo_app());
        assert!(text.contains("Lakeshore"));
        assert!(text.contains("Press Enter to calculate"));
    }

    #[test]
    fn calculated_view_shows_placement_and_hint() {
        let mut app = demo_app();
        app.calculate();
        let text = render(&app);
        assert!(text.contains("out of 1800"));
        assert!(text.contains("Top "));
        assert!(text.contains("drag to compare"));
        assert!(text.contains("Lakeshore Marathon"));
    }

    #[test]
    fn failed_calculation_shows_its_message() {
        let mut app = demo_app();
        app.form.age = "0".to_string();
        app.calculate();
        let text = render(&app);
        assert!(text.contains("age must be a whole number"));
    }

    #[test]
    fn failed_recalculation_flags_the_previous_result() {
        let mut app = demo_app();
        app.calculate();
        app.form.age = "0".to_string();
        app.calculate();
        let text = render(&app);
        assert!(text.contains("age must be a whole number"));
        assert!(text.contains("Showing the previous result"));
        assert!(text.contains("out of 1800"));
    }

    #[test]
    fn compare_label_renders_above_the_plot() {
        let mut app = demo_app();
        app.calculate();
        let base = app.result.as_ref().unwrap().finish_time_seconds;
        app.drag.as_mut().unwrap().set_compare_time(base * 1.05);
        let text = render(&app);
        assert!(text.contains("+5.0% slower"));
        assert!(text.contains("min/mi"));
    }
}

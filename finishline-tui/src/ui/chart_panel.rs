//! Finish-time distribution with the base and compare markers.
//!
//! The drag controller pushes its state into a [`ChartView`] through the
//! render-sink trait; this module only turns that view into widgets.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use finishline_core::drag::Direction;
use finishline_core::time::format_tick;
use finishline_core::{display_title, format_clock, HintCue, Histogram, LiveLabel, RenderSink};

use crate::app::{AppState, Focus};
use crate::theme;
use crate::ui::{chart_areas, panel_block};

const HINT_TEXT: &str = "◂ drag to compare ▸  (mouse, or ←/→ with the chart focused)";
/// Vertical lines drawn per marker band.
const BAND_STROKES: usize = 5;

/// Everything the chart needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct ChartView {
    pub visible: bool,
    /// `(bin centre, count)`.
    pub bars: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub max_count: usize,
    pub base: Option<[f64; 2]>,
    pub compare: Option<[f64; 2]>,
    pub label: Option<LiveLabel>,
    pub hint: HintCue,
}

impl RenderSink for ChartView {
    fn apply_bins(&mut self, histogram: &Histogram, base_time: f64, compare_time: Option<f64>) {
        self.bars = histogram.points();
        self.x_bounds = histogram.x_bounds();
        self.max_count = histogram.max_count();
        self.base = Some(histogram.band(base_time));
        self.compare = compare_time.map(|t| histogram.band(t));
    }

    fn set_label(&mut self, label: Option<&LiveLabel>) {
        self.label = label.cloned();
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_hint(&mut self, hint: HintCue) {
        self.hint = hint;
    }
}

impl ChartView {
    /// Column offset of time `t` within a plot `width` cells wide.
    fn column_of(&self, t: f64, width: u16) -> u16 {
        let [lo, hi] = self.x_bounds;
        if hi <= lo || width == 0 {
            return width / 2;
        }
        let frac = ((t - lo) / (hi - lo)).clamp(0.0, 1.0);
        ((frac * f64::from(width)).round() as u16).min(width - 1)
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.focus == Focus::Chart;
    let title = match &app.result {
        Some(r) => format!(
            " {} · you: {} ",
            display_title(&r.selection.event_name, r.selection.event_type),
            format_clock(r.finish_time_seconds)
        ),
        None => " Finish times ".to_string(),
    };
    let block = panel_block()
        .border_style(theme::panel_border(focused))
        .title(title)
        .title_style(theme::panel_title(focused));
    f.render_widget(block, area);

    let areas = chart_areas(area);
    let Some(ctl) = &app.drag else {
        render_empty(f, areas.plot);
        return;
    };

    let mut view = ChartView::default();
    ctl.present(&mut view);
    if !view.visible {
        render_empty(f, areas.plot);
        return;
    }

    render_label(f, areas.label, &view);
    render_plot(f, areas.plot, &view);
    render_axis(f, areas.axis, &view);
    render_hint(f, areas.hint, &view, app.frame);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Press Enter to calculate.", theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_plot(f: &mut Frame, area: Rect, view: &ChartView) {
    let y_max = (view.max_count.max(1) as f64) * 1.1;
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(view.x_bounds)
        .y_bounds([0.0, y_max])
        .paint(|ctx| {
            for (x, count) in &view.bars {
                ctx.draw(&CanvasLine::new(*x, 0.0, *x, *count, theme::NEUTRAL));
            }
            ctx.layer();
            if let Some(band) = view.base {
                draw_band(ctx, band, y_max, theme::ACCENT);
            }
            if let Some(band) = view.compare {
                draw_band(ctx, band, y_max, theme::WARNING);
            }
        });
    f.render_widget(canvas, area);
}

fn draw_band(
    ctx: &mut ratatui::widgets::canvas::Context<'_>,
    [from, to]: [f64; 2],
    height: f64,
    color: Color,
) {
    for i in 0..BAND_STROKES {
        let x = from + (to - from) * i as f64 / (BAND_STROKES - 1) as f64;
        ctx.draw(&CanvasLine::new(x, 0.0, x, height, color));
    }
}

fn render_label(f: &mut Frame, area: Rect, view: &ChartView) {
    let Some(label) = &view.label else {
        return;
    };
    let speed = label.speed_text();
    let rest = format!(" | {} | {}", label.formatted_pace, label.top_percent_string);
    let len = (speed.chars().count() + rest.chars().count()) as u16;

    // Centre on the marker, kept inside the plot.
    let centre = label.pixel_x.max(0.0).round() as u16;
    let offset = centre
        .saturating_sub(len / 2)
        .min(area.width.saturating_sub(len));

    let speed_style = Style::default().fg(theme::direction_color(label.direction()));
    let line = Line::from(vec![
        Span::raw(" ".repeat(offset as usize)),
        Span::styled(speed, theme::bold(speed_style)),
        Span::styled(rest, theme::text()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_axis(f: &mut Frame, area: Rect, view: &ChartView) {
    let [lo, hi] = view.x_bounds;
    let mut cells = vec![' '; area.width as usize];
    for t in [lo, (lo + hi) / 2.0, hi] {
        let text: Vec<char> = format_tick(t).chars().collect();
        let col = view.column_of(t, area.width) as usize;
        let start = col
            .saturating_sub(text.len() / 2)
            .min(cells.len().saturating_sub(text.len()));
        for (i, c) in text.into_iter().enumerate() {
            if let Some(cell) = cells.get_mut(start + i) {
                *cell = c;
            }
        }
    }
    let axis: String = cells.into_iter().collect();
    f.render_widget(Paragraph::new(Span::styled(axis, theme::muted())), area);
}

fn render_hint(f: &mut Frame, area: Rect, view: &ChartView, frame: u64) {
    let line = if view.hint.visible {
        Line::from(Span::styled(HINT_TEXT, theme::hint(view.hint.pulsing, frame)))
    } else if let Some(label) = &view.label {
        let arrow = match label.direction() {
            Direction::Faster => "◂",
            Direction::Slower => "▸",
        };
        Line::from(vec![
            Span::styled(format!("{arrow} compare {}", label.clock_text()), theme::warning()),
            Span::styled("   r: reset", theme::muted()),
        ])
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use finishline_core::{ChartState, DragController, EstimatorConfig};

    fn controller() -> DragController {
        let times: Vec<f64> = (0..100).map(|i| 10_000.0 + f64::from(i) * 60.0).collect();
        let chart = ChartState::new(times, 12_000.0, 26.2, 20, 1.0);
        DragController::new(chart, 100.0, &EstimatorConfig::default())
    }

    #[test]
    fn present_fills_the_view() {
        let mut ctl = controller();
        let mut view = ChartView::default();
        ctl.present(&mut view);
        assert!(view.visible);
        assert_eq!(view.bars.len(), 20);
        assert!(view.base.is_some());
        assert!(view.compare.is_none());
        assert!(view.hint.visible);

        ctl.set_compare_time(13_000.0);
        ctl.present(&mut view);
        let [from, to] = view.compare.unwrap();
        assert!(from < 13_000.0 && 13_000.0 < to);
        assert!(view.label.is_some());
    }

    #[test]
    fn column_mapping_clamps_to_the_plot() {
        let mut view = ChartView::default();
        controller().present(&mut view);
        let [lo, hi] = view.x_bounds;
        assert_eq!(view.column_of(lo, 50), 0);
        assert_eq!(view.column_of(hi, 50), 49);
        assert_eq!(view.column_of(hi + 1e6, 50), 49);
        assert_eq!(view.column_of((lo + hi) / 2.0, 50), 25);
    }
}

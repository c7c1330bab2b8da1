//! Drag-to-compare state machine.
//!
//! One [`DragController`] owns the [`ChartState`] of the latest calculation.
//! Pointer samples from any input device (mouse, touch, keyboard nudges)
//! arrive as [`PointerSample`]s; the controller moves the compare time and
//! exposes a [`LiveLabel`]. Drawing happens behind the [`RenderSink`] seam.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::EstimatorConfig;
use crate::histogram::Histogram;
use crate::ranking::CandidateResult;
use crate::time::{format_clock, format_pace};

// ─── Pointer input ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Pointer lost (touch lifted off-surface, focus change). Ends a drag like `Up`.
    Cancel,
}

/// One pointer event in overlay-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Horizontal offset from the overlay's left edge, px.
    pub x: f64,
    pub phase: PointerPhase,
}

impl PointerSample {
    pub fn new(x: f64, phase: PointerPhase) -> Self {
        Self { x, phase }
    }

    /// Translate a client (screen) x into the overlay's local space,
    /// clamped to `[0, overlay_width]`. Touch and mouse share this path.
    pub fn from_client(client_x: f64, overlay_left: f64, overlay_width: f64, phase: PointerPhase) -> Self {
        let local = (client_x - overlay_left).clamp(0.0, overlay_width.max(0.0));
        Self { x: local, phase }
    }
}

// ─── Chart state ────────────────────────────────────────────────────

/// Histogram plus the base/compare markers of one calculation.
///
/// Rebuilt on every calculation; `compare_time` survives drags and is
/// cleared only when a new calculation replaces the base time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartState {
    pub histogram: Histogram,
    pub base_time: f64,
    pub compare_time: Option<f64>,
    pub distance_miles: f64,
    /// Every chip time of the field, ascending (untrimmed, for live Top%).
    times: Vec<f64>,
}

impl ChartState {
    pub fn new(times: Vec<f64>, base_time: f64, distance_miles: f64, bins: usize, trim_quantile: f64) -> Self {
        let histogram = Histogram::from_sorted(&times, bins, trim_quantile);
        Self {
            histogram,
            base_time,
            compare_time: None,
            distance_miles,
            times,
        }
    }

    pub fn from_result(result: &CandidateResult, config: &EstimatorConfig) -> Self {
        Self::new(
            result.times.clone(),
            result.finish_time_seconds,
            result.distance_miles(),
            config.bins,
            config.trim_quantile,
        )
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Where the next drag starts: the compare time if one exists, else base.
    pub fn anchor(&self) -> f64 {
        self.compare_time.unwrap_or(self.base_time)
    }

    /// Linear pixel-to-time scale over the trimmed range.
    pub fn seconds_per_pixel(&self, overlay_width: f64) -> f64 {
        if overlay_width > 0.0 {
            self.histogram.range() / overlay_width
        } else {
            0.0
        }
    }

    /// Share of the field at or faster than `t`, 0..=100.
    pub fn top_percent_at(&self, t: f64) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        let at_or_faster = self.times.partition_point(|x| *x <= t);
        at_or_faster as f64 / self.times.len() as f64 * 100.0
    }

    /// Overlay x of time `t` on the padded axis.
    pub fn pixel_of(&self, t: f64, overlay_width: f64) -> f64 {
        let [lo, hi] = self.histogram.x_bounds();
        if hi <= lo {
            return overlay_width / 2.0;
        }
        (t - lo) / (hi - lo) * overlay_width
    }

    pub fn label_at(&self, compare_time: f64, overlay_width: f64) -> LiveLabel {
        let percent_delta = if self.base_time > 0.0 {
            (compare_time - self.base_time) / self.base_time * 100.0
        } else {
            0.0
        };
        let top_percent = self.top_percent_at(compare_time);
        LiveLabel {
            compare_time,
            percent_delta,
            formatted_pace: format_pace(compare_time / self.distance_miles),
            top_percent,
            top_percent_string: format!("Top {top_percent:.1}%"),
            pixel_x: self.pixel_of(compare_time, overlay_width),
        }
    }
}

// ─── Live label ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Slower,
    Faster,
}

/// Values shown next to the compare marker while dragging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveLabel {
    pub compare_time: f64,
    /// Signed, vs. the base time. Positive is slower.
    pub percent_delta: f64,
    pub formatted_pace: String,
    pub top_percent: f64,
    pub top_percent_string: String,
    /// Overlay x of the compare marker, for label placement.
    pub pixel_x: f64,
}

impl LiveLabel {
    fn rounded_delta(&self) -> f64 {
        (self.percent_delta * 10.0).round() / 10.0
    }

    pub fn direction(&self) -> Direction {
        if self.rounded_delta() > 0.0 {
            Direction::Slower
        } else {
            Direction::Faster
        }
    }

    /// `"+2.5% slower"` / `"1.0% faster"`.
    pub fn speed_text(&self) -> String {
        let d = self.rounded_delta();
        match self.direction() {
            Direction::Slower => format!("+{d:.1}% slower"),
            Direction::Faster => format!("{:.1}% faster", d.abs()),
        }
    }

    pub fn clock_text(&self) -> String {
        format_clock(self.compare_time)
    }
}

impl fmt::Display for LiveLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.speed_text(),
            self.formatted_pace,
            self.top_percent_string
        )
    }
}

// ─── Render sink ────────────────────────────────────────────────────

/// What the controller needs from a renderer. Holds no drawing details.
pub trait RenderSink {
    fn apply_bins(&mut self, histogram: &Histogram, base_time: f64, compare_time: Option<f64>);
    fn set_label(&mut self, label: Option<&LiveLabel>);
    fn set_overlay_visible(&mut self, visible: bool);
    fn set_hint(&mut self, _hint: HintCue) {}
}

// ─── Drag hint ──────────────────────────────────────────────────────

/// How the "drag to compare" cue should look right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HintCue {
    pub visible: bool,
    pub pulsing: bool,
}

/// Cue shown until the first real drag; dismissal lasts for the session.
/// After a drag ends the pulse re-arms once the pointer has been idle long
/// enough.
#[derive(Debug, Clone)]
pub struct DragHint {
    threshold_px: f64,
    idle: Duration,
    dismissed: bool,
    pending: bool,
    pulsing: bool,
    idle_since: Option<Instant>,
}

impl DragHint {
    pub fn new(threshold_px: f64, idle: Duration) -> Self {
        Self {
            threshold_px,
            idle,
            dismissed: false,
            pending: false,
            pulsing: true,
            idle_since: None,
        }
    }

    pub fn cue(&self) -> HintCue {
        HintCue {
            visible: !self.dismissed,
            pulsing: !self.dismissed && self.pulsing,
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    fn press(&mut self) {
        self.pending = true;
        self.idle_since = None;
    }

    fn moved(&mut self, distance_px: f64) {
        if self.pending && distance_px.abs() > self.threshold_px {
            self.dismissed = true;
            self.pending = false;
        }
    }

    fn release(&mut self, now: Instant) {
        self.pending = false;
        self.pulsing = false;
        self.idle_since = Some(now);
    }

    /// Re-arm the pulse after the idle interval. Returns true on change.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.idle_since {
            Some(since) if !self.dismissed && now.duration_since(since) >= self.idle => {
                self.idle_since = None;
                let changed = !self.pulsing;
                self.pulsing = true;
                changed
            }
            _ => false,
        }
    }
}

// ─── Controller ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        start_x: f64,
        /// Compare time at press, or base time when there was none.
        anchor: f64,
    },
}

/// Single writer of the chart state.
#[derive(Debug, Clone)]
pub struct DragController {
    chart: ChartState,
    state: DragState,
    overlay_width: f64,
    label: Option<LiveLabel>,
    hint: DragHint,
}

impl DragController {
    pub fn new(chart: ChartState, overlay_width: f64, config: &EstimatorConfig) -> Self {
        Self {
            chart,
            state: DragState::Idle,
            overlay_width,
            label: None,
            hint: DragHint::new(
                config.drag_threshold_px,
                Duration::from_secs(config.hint_idle_secs),
            ),
        }
    }

    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn label(&self) -> Option<&LiveLabel> {
        self.label.as_ref()
    }

    pub fn hint(&self) -> &DragHint {
        &self.hint
    }

    pub fn overlay_width(&self) -> f64 {
        self.overlay_width
    }

    /// Resize the overlay. Takes effect from the next sample.
    pub fn set_overlay_width(&mut self, width: f64) {
        self.overlay_width = width.max(0.0);
    }

    /// Swap in a new calculation's chart. Compare time and label reset;
    /// the hint keeps its session state.
    pub fn reset_chart(&mut self, chart: ChartState) {
        self.chart = chart;
        self.state = DragState::Idle;
        self.label = None;
    }

    pub fn on_pointer(&mut self, sample: PointerSample) -> Option<&LiveLabel> {
        self.on_pointer_at(sample, Instant::now())
    }

    pub fn on_pointer_at(&mut self, sample: PointerSample, now: Instant) -> Option<&LiveLabel> {
        match (sample.phase, self.state) {
            (PointerPhase::Down, _) => {
                self.state = DragState::Dragging {
                    start_x: sample.x,
                    anchor: self.chart.anchor(),
                };
                self.hint.press();
            }
            (PointerPhase::Move, DragState::Dragging { start_x, .. }) => {
                let delta = sample.x - start_x;
                self.hint.moved(delta);
                self.on_drag_sample(delta);
            }
            (PointerPhase::Move, DragState::Idle) => {}
            (PointerPhase::Up | PointerPhase::Cancel, DragState::Dragging { .. }) => {
                self.state = DragState::Idle;
                self.hint.release(now);
            }
            (PointerPhase::Up | PointerPhase::Cancel, DragState::Idle) => {}
        }
        self.label.as_ref()
    }

    /// Move the compare time `pixel_delta` px from the drag anchor.
    /// Ignored unless a drag is in progress.
    pub fn on_drag_sample(&mut self, pixel_delta: f64) -> Option<&LiveLabel> {
        let DragState::Dragging { anchor, .. } = self.state else {
            return None;
        };
        let spp = self.chart.seconds_per_pixel(self.overlay_width);
        let compare = (anchor + pixel_delta * spp).max(0.0);
        self.set_compare_time(compare)
    }

    /// Jump the compare marker straight to `t` seconds.
    pub fn set_compare_time(&mut self, t: f64) -> Option<&LiveLabel> {
        self.chart.compare_time = Some(t);
        self.label = Some(self.chart.label_at(t, self.overlay_width));
        self.label.as_ref()
    }

    /// Advance idle timers. Returns true when the hint cue changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.hint.tick(now)
    }

    /// Push the current state to a renderer.
    pub fn present(&self, sink: &mut dyn RenderSink) {
        sink.set_overlay_visible(!self.chart.histogram.is_empty());
        sink.apply_bins(&self.chart.histogram, self.chart.base_time, self.chart.compare_time);
        sink.set_label(self.label.as_ref());
        sink.set_hint(self.hint.cue());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 101 times from 1000 to 2000 s; with no trimming the range is 1000 s.
    fn chart() -> ChartState {
        let times: Vec<f64> = (0..=100).map(|i| 1_000.0 + i as f64 * 10.0).collect();
        ChartState::new(times, 1_500.0, 13.1, 80, 1.0)
    }

    fn controller() -> DragController {
        DragController::new(chart(), 500.0, &EstimatorConfig::default())
    }

    #[test]
    fn maps_pixels_linearly() {
        let mut c = controller();
        assert_eq!(c.chart().seconds_per_pixel(500.0), 2.0);

        c.on_pointer(PointerSample::new(100.0, PointerPhase::Down));
        let label = c.on_pointer(PointerSample::new(150.0, PointerPhase::Move)).unwrap();
        assert_eq!(label.compare_time, 1_600.0);
        assert!((label.percent_delta - 6.666_666).abs() < 1e-3);
        assert_eq!(label.speed_text(), "+6.7% slower");
        // 1000..=1600 step 10 -> 61 of 101.
        assert_eq!(label.top_percent_string, "Top 60.4%");
    }

    #[test]
    fn drag_is_sticky_across_releases() {
        let mut c = controller();
        c.on_pointer(PointerSample::new(200.0, PointerPhase::Down));
        c.on_pointer(PointerSample::new(150.0, PointerPhase::Move));
        c.on_pointer(PointerSample::new(150.0, PointerPhase::Up));
        assert_eq!(c.state(), DragState::Idle);
        assert_eq!(c.chart().compare_time, Some(1_400.0));
        // Label survives release.
        assert!(c.label().is_some());

        c.on_pointer(PointerSample::new(10.0, PointerPhase::Down));
        assert_eq!(
            c.state(),
            DragState::Dragging {
                start_x: 10.0,
                anchor: 1_400.0
            }
        );
        let label = c.on_pointer(PointerSample::new(20.0, PointerPhase::Move)).unwrap();
        assert_eq!(label.compare_time, 1_420.0);
        assert_eq!(label.speed_text(), "5.3% faster");
    }

    #[test]
    fn moves_while_idle_are_ignored() {
        let mut c = controller();
        assert!(c.on_pointer(PointerSample::new(50.0, PointerPhase::Move)).is_none());
        assert!(c.on_drag_sample(30.0).is_none());
        assert_eq!(c.chart().compare_time, None);
    }

    #[test]
    fn cancel_ends_drag() {
        let mut c = controller();
        c.on_pointer(PointerSample::new(0.0, PointerPhase::Down));
        c.on_pointer(PointerSample::new(5.0, PointerPhase::Move));
        c.on_pointer(PointerSample::new(5.0, PointerPhase::Cancel));
        assert_eq!(c.state(), DragState::Idle);
        assert_eq!(c.chart().compare_time, Some(1_510.0));
    }

    #[test]
    fn new_chart_resets_compare() {
        let mut c = controller();
        c.on_pointer(PointerSample::new(0.0, PointerPhase::Down));
        c.on_pointer(PointerSample::new(40.0, PointerPhase::Move));
        c.reset_chart(chart());
        assert_eq!(c.chart().compare_time, None);
        assert!(c.label().is_none());
        assert_eq!(c.chart().anchor(), 1_500.0);
    }

    #[test]
    fn client_coordinates_are_clamped() {
        let s = PointerSample::from_client(50.0, 100.0, 300.0, PointerPhase::Down);
        assert_eq!(s.x, 0.0);
        let s = PointerSample::from_client(250.0, 100.0, 300.0, PointerPhase::Move);
        assert_eq!(s.x, 150.0);
        let s = PointerSample::from_client(900.0, 100.0, 300.0, PointerPhase::Up);
        assert_eq!(s.x, 300.0);
    }

    #[test]
    fn hint_dismissed_only_past_threshold() {
        let mut c = controller();
        assert!(c.hint().cue().visible);
        c.on_pointer(PointerSample::new(100.0, PointerPhase::Down));
        c.on_pointer(PointerSample::new(103.0, PointerPhase::Move));
        assert!(!c.hint().is_dismissed());
        c.on_pointer(PointerSample::new(105.0, PointerPhase::Move));
        assert!(c.hint().is_dismissed());
        assert_eq!(c.hint().cue(), HintCue::default());
    }

    #[test]
    fn hint_pulse_rearms_after_idle() {
        let mut c = controller();
        let t0 = Instant::now();
        c.on_pointer_at(PointerSample::new(100.0, PointerPhase::Down), t0);
        c.on_pointer_at(PointerSample::new(101.0, PointerPhase::Up), t0);
        assert!(!c.hint().cue().pulsing);
        assert!(!c.tick(t0 + Duration::from_secs(5)));
        assert!(c.tick(t0 + Duration::from_secs(10)));
        assert!(c.hint().cue().pulsing);
    }

    #[test]
    fn zero_width_overlay_does_not_move() {
        let mut c = controller();
        c.set_overlay_width(0.0);
        c.on_pointer(PointerSample::new(0.0, PointerPhase::Down));
        let label = c.on_pointer(PointerSample::new(80.0, PointerPhase::Move)).unwrap();
        assert_eq!(label.compare_time, 1_500.0);
        assert_eq!(label.speed_text(), "0.0% faster");
    }

    #[derive(Default)]
    struct Recorder {
        bins: usize,
        compare: Option<f64>,
        label: Option<String>,
        visible: bool,
    }

    impl RenderSink for Recorder {
        fn apply_bins(&mut self, histogram: &Histogram, _base: f64, compare: Option<f64>) {
            self.bins = histogram.bins();
            self.compare = compare;
        }
        fn set_label(&mut self, label: Option<&LiveLabel>) {
            self.label = label.map(|l| l.to_string());
        }
        fn set_overlay_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
    }

    #[test]
    fn presents_to_sink() {
        let mut c = controller();
        c.set_compare_time(1_500.0);
        let mut sink = Recorder::default();
        c.present(&mut sink);
        assert!(sink.visible);
        assert_eq!(sink.bins, 80);
        assert_eq!(sink.compare, Some(1_500.0));
        assert_eq!(
            sink.label.as_deref(),
            Some("0.0% faster | 1:55 min/mi | Top 50.5%")
        );
    }
}

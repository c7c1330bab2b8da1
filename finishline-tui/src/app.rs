//! Application state. Single owner, main thread only.
//!
//! Results loading runs on the worker thread; everything else (form edits,
//! calculation, drag handling) happens here.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use finishline_core::time::format_pace_input;
use finishline_core::{
    compute_candidate, CandidateResult, ChartState, DragController, EstimatorConfig, EventCatalog,
    EventType, Gender, IngestReport, RaceSelection, ResultTable,
};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Pace arrow-key step, minutes per mile.
pub const PACE_STEP: f64 = 0.05;
/// Pace page-key step, minutes per mile.
pub const PACE_PAGE_STEP: f64 = 0.5;
const PACE_MIN: f64 = 3.0;
const PACE_MAX: f64 = 30.0;
const AGE_MAX_DIGITS: usize = 3;

/// Which widget has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Race,
    Distance,
    Gender,
    Age,
    Pace,
    Chart,
}

impl Focus {
    const ALL: [Focus; 6] = [
        Focus::Race,
        Focus::Distance,
        Focus::Gender,
        Focus::Age,
        Focus::Pace,
        Focus::Chart,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::Race => "Race",
            Focus::Distance => "Distance",
            Focus::Gender => "Gender",
            Focus::Age => "Age",
            Focus::Pace => "Pace",
            Focus::Chart => "Chart",
        }
    }

    pub fn next(self) -> Focus {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// The calculation form.
#[derive(Debug, Clone)]
pub struct FormState {
    pub race_idx: usize,
    pub distance: EventType,
    pub gender: Gender,
    /// Typed digits; validated on calculate.
    pub age: String,
    /// Minutes per mile.
    pub pace: f64,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            race_idx: 0,
            distance: EventType::Full,
            gender: Gender::M,
            age: "35".to_string(),
            pace: 9.0,
        }
    }
}

impl FormState {
    pub fn pace_text(&self) -> String {
        format_pace_input(self.pace)
    }

    pub fn step_pace(&mut self, delta: f64) {
        // Snap to the step grid so repeated presses don't drift.
        let stepped = ((self.pace + delta) / PACE_STEP).round() * PACE_STEP;
        self.pace = stepped.clamp(PACE_MIN, PACE_MAX);
    }

    pub fn toggle_gender(&mut self) {
        self.gender = match self.gender {
            Gender::M => Gender::F,
            _ => Gender::M,
        };
    }

    pub fn push_age_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.age.len() < AGE_MAX_DIGITS {
            self.age.push(c);
        }
    }
}

/// Loading progress for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading(String),
    Ready,
}

pub struct AppState {
    pub running: bool,
    pub config: EstimatorConfig,
    pub focus: Focus,
    pub form: FormState,
    pub table: Option<Arc<ResultTable>>,
    pub catalog: EventCatalog,
    pub load_state: LoadState,
    pub result: Option<CandidateResult>,
    /// Message from the last failed calculation. `result` may still hold the
    /// previous run, which no longer matches the form.
    pub calc_error: Option<String>,
    pub drag: Option<DragController>,
    /// Width of the chart plot in terminal cells; the drag overlay width.
    pub plot_width: f64,
    pub status_message: Option<(String, StatusLevel)>,
    /// Render frame counter, drives the hint pulse.
    pub frame: u64,

    // Worker channels
    pub worker_tx: Option<Sender<WorkerCommand>>,
    pub worker_rx: Option<Receiver<WorkerResponse>>,
}

impl AppState {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            running: true,
            config,
            focus: Focus::Race,
            form: FormState::default(),
            table: None,
            catalog: EventCatalog::default(),
            load_state: LoadState::Idle,
            result: None,
            calc_error: None,
            drag: None,
            plot_width: 0.0,
            status_message: None,
            frame: 0,
            worker_tx: None,
            worker_rx: None,
        }
    }

    pub fn with_worker(mut self, tx: Sender<WorkerCommand>, rx: Receiver<WorkerResponse>) -> Self {
        self.worker_tx = Some(tx);
        self.worker_rx = Some(rx);
        self
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    // ── Data ─────────────────────────────────────────────────────────

    /// Ask the worker to load results. Falls back to an error status when
    /// no worker is attached.
    pub fn request_load(&mut self, source: finishline_core::DataSource) {
        let label = source.to_string();
        let sent = self
            .worker_tx
            .as_ref()
            .map(|tx| tx.send(WorkerCommand::Load { source }).is_ok())
            .unwrap_or(false);
        if sent {
            self.load_state = LoadState::Loading(label.clone());
            self.set_status(format!("Loading {label}..."));
        } else {
            self.set_error("Results loader is not running");
        }
    }

    /// Install a freshly loaded table and reset everything derived from it.
    pub fn apply_table(&mut self, table: ResultTable) {
        self.catalog = EventCatalog::from_rows(&table);
        self.table = Some(Arc::new(table));
        self.load_state = LoadState::Ready;
        self.result = None;
        self.calc_error = None;
        self.drag = None;
        self.form.race_idx = 0;
        self.sync_distance();
        info!(races = self.catalog.len(), "results table installed");
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Loaded { report } => {
                let dropped = report.dropped();
                let IngestReport { rows, .. } = *report;
                let kept = rows.len();
                self.apply_table(rows);
                if dropped > 0 {
                    self.set_warning(format!("Loaded {kept} results ({dropped} rows skipped)"));
                } else {
                    self.set_status(format!("Loaded {kept} results"));
                }
            }
            WorkerResponse::LoadFailed { source, error } => {
                warn!(%source, %error, "results load failed");
                self.load_state = LoadState::Idle;
                self.set_error(format!("Could not load {source}: {error}"));
            }
        }
    }

    /// Drain pending worker responses without blocking.
    pub fn drain_worker(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = &self.worker_rx {
            while let Ok(resp) = rx.try_recv() {
                pending.push(resp);
            }
        }
        for resp in pending {
            self.handle_worker_response(resp);
        }
    }

    // ── Form ─────────────────────────────────────────────────────────

    pub fn selected_race(&self) -> Option<&finishline_core::RaceEntry> {
        self.catalog.races().get(self.form.race_idx)
    }

    /// Move the race cursor, wrapping at both ends.
    pub fn cycle_race(&mut self, forward: bool) {
        let n = self.catalog.len();
        if n == 0 {
            return;
        }
        self.form.race_idx = if forward {
            (self.form.race_idx + 1) % n
        } else {
            (self.form.race_idx + n - 1) % n
        };
        self.sync_distance();
    }

    /// Switch distance when the race has results for the other one.
    pub fn toggle_distance(&mut self) {
        let other = match self.form.distance {
            EventType::Full => EventType::Half,
            EventType::Half => EventType::Full,
        };
        match self.selected_race() {
            Some(race) if race.has(other) => self.form.distance = other,
            Some(race) => {
                let msg = format!("{} has no {} results", race.name, other.label());
                self.set_warning(msg);
            }
            None => {}
        }
    }

    /// Keep the distance valid for the selected race.
    fn sync_distance(&mut self) {
        let Some(race) = self.selected_race() else {
            return;
        };
        if !race.has(self.form.distance) {
            if let Some(d) = self.catalog.default_distance(&race.name) {
                self.form.distance = d;
            }
        }
    }

    // ── Calculation ──────────────────────────────────────────────────

    /// Run a calculation from the form. Replaces the chart but keeps the
    /// controller (and its hint state) when one exists.
    pub fn calculate(&mut self) {
        let Some(table) = self.table.clone() else {
            self.set_warning("No results loaded yet");
            return;
        };
        let Some(race) = self.selected_race() else {
            self.set_warning("No race selected");
            return;
        };
        let selection = match RaceSelection::from_inputs(
            &race.name,
            self.form.distance,
            self.form.gender,
            &self.form.age,
            &self.form.pace_text(),
        ) {
            Ok(s) => s,
            Err(e) => {
                self.fail_calculation(e.to_string());
                return;
            }
        };

        match compute_candidate(&table, &selection, self.config.tie_rule) {
            Ok(result) => {
                let chart = ChartState::from_result(&result, &self.config);
                match &mut self.drag {
                    Some(ctl) => ctl.reset_chart(chart),
                    None => {
                        self.drag = Some(DragController::new(chart, self.plot_width, &self.config))
                    }
                }
                debug!(place = result.overall.place, total = result.overall.total, "calculated");
                self.set_status(format!(
                    "#{} of {}  Top {:.1}%",
                    result.overall.place,
                    result.overall.total,
                    result.overall.top_percent()
                ));
                self.result = Some(result);
                self.calc_error = None;
            }
            Err(e) => {
                self.result = None;
                self.drag = None;
                self.fail_calculation(e.to_string());
            }
        }
    }

    fn fail_calculation(&mut self, msg: String) {
        self.set_error(msg.clone());
        self.calc_error = Some(msg);
    }

    // ── Chart ────────────────────────────────────────────────────────

    /// Record the current plot width so drag distances map to the drawn axis.
    pub fn set_plot_width(&mut self, width: f64) {
        self.plot_width = width;
        if let Some(ctl) = &mut self.drag {
            ctl.set_overlay_width(width);
        }
    }

    /// Advance per-frame timers.
    pub fn tick(&mut self, now: Instant) {
        self.frame = self.frame.wrapping_add(1);
        if let Some(ctl) = &mut self.drag {
            ctl.tick(now);
        }
    }

    /// Drop the compare marker and go back to the base time alone.
    pub fn clear_compare(&mut self) {
        let (Some(result), Some(ctl)) = (&self.result, &mut self.drag) else {
            return;
        };
        ctl.reset_chart(ChartState::from_result(result, &self.config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finishline_core::synthetic;

    fn demo_app() -> AppState {
        let mut app = AppState::new(EstimatorConfig::default());
        app.apply_table(synthetic::demo_table(7));
        app.set_plot_width(80.0);
        app
    }

    #[test]
    fn focus_cycle() {
        assert_eq!(Focus::Race.next(), Focus::Distance);
        assert_eq!(Focus::Chart.next(), Focus::Race);
        assert_eq!(Focus::Race.prev(), Focus::Chart);
        assert_eq!(Focus::Pace.index(), 4);
    }

    #[test]
    fn pace_steps_snap_and_clamp() {
        let mut form = FormState::default();
        form.step_pace(PACE_STEP);
        assert!((form.pace - 9.05).abs() < 1e-9);
        form.pace = 3.02;
        form.step_pace(-PACE_PAGE_STEP);
        assert_eq!(form.pace, PACE_MIN);
        assert_eq!(FormState::default().pace_text(), "9:00");
    }

    #[test]
    fn age_input_keeps_three_digits() {
        let mut form = FormState::default();
        form.age.clear();
        for c in "1x234".chars() {
            form.push_age_digit(c);
        }
        assert_eq!(form.age, "123");
    }

    #[test]
    fn race_only_half_forces_half_distance() {
        let mut app = demo_app();
        assert_eq!(app.selected_race().unwrap().name, "Lakeshore");
        assert_eq!(app.form.distance, EventType::Full);
        app.cycle_race(true);
        assert_eq!(app.form.distance, EventType::Half);
        app.toggle_distance();
        assert_eq!(app.form.distance, EventType::Half);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn calculate_builds_result_and_controller() {
        let mut app = demo_app();
        app.calculate();
        let result = app.result.as_ref().unwrap();
        assert_eq!(result.overall.total, 1800);
        let ctl = app.drag.as_ref().unwrap();
        assert_eq!(ctl.overlay_width(), 80.0);
        assert_eq!(ctl.chart().compare_time, None);
    }

    #[test]
    fn recalculate_keeps_hint_dismissal() {
        let mut app = demo_app();
        app.calculate();
        let ctl = app.drag.as_mut().unwrap();
        ctl.on_pointer(finishline_core::PointerSample::new(10.0, finishline_core::PointerPhase::Down));
        ctl.on_pointer(finishline_core::PointerSample::new(30.0, finishline_core::PointerPhase::Move));
        ctl.on_pointer(finishline_core::PointerSample::new(30.0, finishline_core::PointerPhase::Up));
        assert!(ctl.hint().is_dismissed());

        app.form.step_pace(PACE_PAGE_STEP);
        app.calculate();
        let ctl = app.drag.as_ref().unwrap();
        assert!(ctl.hint().is_dismissed());
        assert!(ctl.label().is_none());
    }

    #[test]
    fn bad_age_marks_previous_result_stale() {
        let mut app = demo_app();
        app.calculate();
        assert!(app.calc_error.is_none());
        app.form.age.clear();
        app.calculate();
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);
        assert!(app.result.is_some());
        assert!(app.calc_error.as_deref().unwrap().contains("age"));

        app.form.age = "35".to_string();
        app.calculate();
        assert!(app.calc_error.is_none());
    }

    #[test]
    fn calculate_without_table_warns() {
        let mut app = AppState::new(EstimatorConfig::default());
        app.calculate();
        assert!(app.result.is_none());
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn worker_responses_update_state() {
        let mut app = AppState::new(EstimatorConfig::default());
        let report = finishline_core::data::ingest_str(
            "event_name,event_type,Chip Time,Gender,Age\nHarbor,Marathon,3:00:00,M,30-34\nHarbor,Marathon,,F,30-34\n",
            "inline",
        )
        .unwrap();
        app.handle_worker_response(WorkerResponse::Loaded {
            report: Box::new(report),
        });
        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.catalog.len(), 1);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);

        app.handle_worker_response(WorkerResponse::LoadFailed {
            source: "x.csv".into(),
            error: "gone".into(),
        });
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);
    }

    #[test]
    fn request_load_without_worker_is_an_error() {
        let mut app = AppState::new(EstimatorConfig::default());
        app.request_load(finishline_core::DataSource::parse("results.csv"));
        assert_eq!(app.load_state, LoadState::Idle);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);
    }
}

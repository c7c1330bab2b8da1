//! Input dispatch: global keys, then the focused field; mouse drags over
//! the plot go to the drag controller.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use finishline_core::{DragState, PointerPhase, PointerSample};

use crate::app::{AppState, Focus, PACE_PAGE_STEP, PACE_STEP};

/// Cells moved per arrow press on the chart; Shift multiplies by five.
const KEY_DRAG_CELLS: f64 = 1.0;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Global keys.
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Tab => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev();
            return;
        }
        KeyCode::Enter => {
            app.calculate();
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Race => match key.code {
            KeyCode::Up | KeyCode::Left => app.cycle_race(false),
            KeyCode::Down | KeyCode::Right => app.cycle_race(true),
            _ => {}
        },
        Focus::Distance => {
            if matches!(key.code, KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) {
                app.toggle_distance();
            }
        }
        Focus::Gender => match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                app.form.toggle_gender()
            }
            KeyCode::Char('m') | KeyCode::Char('M') => app.form.gender = finishline_core::Gender::M,
            KeyCode::Char('f') | KeyCode::Char('F') => app.form.gender = finishline_core::Gender::F,
            _ => {}
        },
        Focus::Age => match key.code {
            KeyCode::Char(c) => app.form.push_age_digit(c),
            KeyCode::Backspace => {
                app.form.age.pop();
            }
            _ => {}
        },
        Focus::Pace => match key.code {
            // Up is a slower pace: more minutes per mile.
            KeyCode::Up | KeyCode::Right => app.form.step_pace(PACE_STEP),
            KeyCode::Down | KeyCode::Left => app.form.step_pace(-PACE_STEP),
            KeyCode::PageUp => app.form.step_pace(PACE_PAGE_STEP),
            KeyCode::PageDown => app.form.step_pace(-PACE_PAGE_STEP),
            _ => {}
        },
        Focus::Chart => handle_chart_key(app, key),
    }
}

/// Arrow keys on the chart act as a short drag from the current marker.
fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    let cells = if key.modifiers.contains(KeyModifiers::SHIFT) {
        KEY_DRAG_CELLS * 5.0
    } else {
        KEY_DRAG_CELLS
    };
    let delta = match key.code {
        KeyCode::Left | KeyCode::Char('h') => -cells,
        KeyCode::Right | KeyCode::Char('l') => cells,
        KeyCode::Char('r') => {
            app.clear_compare();
            return;
        }
        _ => return,
    };
    let Some(ctl) = &mut app.drag else {
        return;
    };
    let start = ctl.overlay_width() / 2.0;
    ctl.on_pointer(PointerSample::new(start, PointerPhase::Down));
    ctl.on_pointer(PointerSample::new(start + delta, PointerPhase::Move));
    ctl.on_pointer(PointerSample::new(start + delta, PointerPhase::Up));
}

/// Route a mouse event. `plot` is the chart's plot rectangle this frame.
///
/// A drag only starts on a press inside the plot; once started, moves
/// anywhere keep it going (clamped to the plot edges) until release.
pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent, plot: Rect) {
    let Some(ctl) = &mut app.drag else {
        return;
    };
    let phase = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if !plot.contains(Position::new(mouse.column, mouse.row)) {
                return;
            }
            app.focus = Focus::Chart;
            PointerPhase::Down
        }
        MouseEventKind::Drag(MouseButton::Left) => PointerPhase::Move,
        MouseEventKind::Up(MouseButton::Left) => PointerPhase::Up,
        _ => return,
    };
    let sample = PointerSample::from_client(
        f64::from(mouse.column),
        f64::from(plot.x),
        f64::from(plot.width),
        phase,
    );
    ctl.on_pointer(sample);
}

/// The terminal lost focus, so a button release may never arrive. Cancel any
/// drag in progress.
pub fn handle_focus_lost(app: &mut AppState) {
    let Some(ctl) = &mut app.drag else {
        return;
    };
    if matches!(ctl.state(), DragState::Dragging { .. }) {
        ctl.on_pointer(PointerSample::new(0.0, PointerPhase::Cancel));
    }
}

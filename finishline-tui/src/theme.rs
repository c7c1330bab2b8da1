//! Parrot/neon theme tokens for the Finishline TUI.
//!
//! # Color Palette
//! - **Accent**: Electric cyan (focus, the candidate's own time)
//! - **Positive**: Neon green (faster, front of the field)
//! - **Negative**: Hot pink (slower, errors)
//! - **Warning**: Neon orange (compare marker, warnings)
//! - **Neutral**: Cool purple (histogram bars)
//! - **Muted**: Steel blue (axis, hints, secondary text)

use ratatui::style::{Color, Modifier, Style};

use finishline_core::drag::Direction;

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn text() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn secondary() -> Style {
    Style::default().fg(TEXT_SECONDARY)
}

pub fn bold(style: Style) -> Style {
    style.add_modifier(Modifier::BOLD)
}

pub fn panel_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn panel_title(focused: bool) -> Style {
    if focused {
        bold(accent())
    } else {
        secondary()
    }
}

/// Form field value: highlighted when it has focus.
pub fn field_value(focused: bool) -> Style {
    if focused {
        Style::default().fg(BACKGROUND).bg(ACCENT)
    } else {
        text()
    }
}

/// Colour for a "Top X%" figure: the further forward, the greener.
pub fn placement_color(top_percent: f64) -> Color {
    match top_percent {
        p if p <= 10.0 => POSITIVE,
        p if p <= 33.0 => ACCENT,
        p if p <= 66.0 => NEUTRAL,
        p if p <= 90.0 => MUTED,
        _ => WARNING,
    }
}

/// Colour for the compare label's speed text.
pub fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::Faster => POSITIVE,
        Direction::Slower => NEGATIVE,
    }
}

/// Hint text style; the pulse alternates between bold and dim.
pub fn hint(pulsing: bool, frame: u64) -> Style {
    if pulsing && (frame / 10) % 2 == 0 {
        bold(warning())
    } else {
        muted().add_modifier(Modifier::DIM)
    }
}

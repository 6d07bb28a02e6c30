//! TUI color theme
//!
//! HUD-inspired color scheme for the terminal interface

use ratatui::style::Color;

pub const ACCENT_GREEN: Color = Color::Rgb(0, 255, 0);
pub const ACCENT_CYAN: Color = Color::Rgb(0, 220, 220);
pub const CRITICAL_RED: Color = Color::Rgb(255, 0, 0);
pub const CAUTION_AMBER: Color = Color::Rgb(255, 191, 0);
pub const INFO_DIM: Color = Color::Rgb(0, 180, 0);

/// Selection brackets around the row under the cursor
pub const SEL_LEFT: &str = "▶";
pub const SEL_RIGHT: &str = " ";

/// Color for a goroutine state
///
/// - On-CPU (`running`, `runnable`, `syscall`): green
/// - Parked on I/O, locks or channels: amber
/// - Anything else (sleeping, idle GC workers, select): dim
#[must_use]
pub fn state_color(state: &str) -> Color {
    match state {
        "running" | "runnable" | "syscall" => ACCENT_GREEN,
        s if s.starts_with("chan ")
            || s.starts_with("sync.")
            || s.starts_with("semacquire")
            || s == "IO wait" =>
        {
            CAUTION_AMBER
        }
        _ => INFO_DIM,
    }
}

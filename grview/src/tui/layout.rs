//! Responsive layout for the goroutine table.
//!
//! Adapts which columns and bars are shown to the terminal dimensions so the
//! table stays readable from minimal (40x8) to full-screen.

use ratatui::layout::Constraint;

// Width breakpoints
const WIDTH_NARROW: u16 = 80; // Below this: drop the state column
const WIDTH_WIDE: u16 = 140; // Above this: add the created-by column

// Height breakpoint
const HEIGHT_MINIMAL: u16 = 12; // Below this: table only

/// Computed layout configuration based on terminal dimensions.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Header bar with mode, source and refresh age
    pub show_header: bool,

    /// Key hints at the bottom
    pub show_status_bar: bool,

    /// State column (states are still color-coded without it)
    pub show_state: bool,

    /// Created-by column, only when there is room to spare
    pub show_created_by: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            show_header: true,
            show_status_bar: true,
            show_state: true,
            show_created_by: false,
        }
    }
}

impl LayoutConfig {
    /// Vertical split: header, table, status bar
    pub fn row_constraints(&self) -> [Constraint; 3] {
        [
            Constraint::Length(if self.show_header { 3 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(if self.show_status_bar { 3 } else { 0 }),
        ]
    }
}

/// Compute layout configuration based on terminal dimensions.
///
/// | Terminal Size | Behavior |
/// |---------------|----------|
/// | Width < 80    | id + summary only |
/// | Width > 140   | adds created-by column |
/// | Height < 12   | no header or status bar |
pub fn compute_layout(width: u16, height: u16) -> LayoutConfig {
    let mut config = LayoutConfig::default();

    if width < WIDTH_NARROW {
        config.show_state = false;
    } else if width > WIDTH_WIDE {
        config.show_created_by = true;
    }

    if height < HEIGHT_MINIMAL {
        config.show_header = false;
        config.show_status_bar = false;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_layout() {
        let config = compute_layout(120, 40);
        assert!(config.show_header);
        assert!(config.show_status_bar);
        assert!(config.show_state);
        assert!(!config.show_created_by);
    }

    #[test]
    fn test_narrow_layout() {
        let config = compute_layout(60, 40);
        assert!(!config.show_state);
        assert!(!config.show_created_by);
    }

    #[test]
    fn test_wide_layout() {
        assert!(compute_layout(200, 40).show_created_by);
    }

    #[test]
    fn test_minimal_height() {
        let config = compute_layout(120, 8);
        assert!(!config.show_header);
        assert!(!config.show_status_bar);
        assert_eq!(config.row_constraints()[0], Constraint::Length(0));
    }
}

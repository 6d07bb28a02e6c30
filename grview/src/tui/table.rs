//! Goroutine table - one line per visible goroutine.
//!
//! # Rendering Pattern
//!
//! ```text
//! ▶    17 chan receive   main.worker(0xc000010000) /src/worker.go:31 +0x45
//!          sleeping                                   <- expanded: state,
//!          main.main() /src/main.go:12 +0x8f          <- then outer frames
//! ```
//!
//! Rows expand only while paused, so the line count per row is stable while
//! the cursor moves over them.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph},
    Frame,
};

use super::layout::LayoutConfig;
use super::theme::{
    state_color, ACCENT_CYAN, ACCENT_GREEN, CAUTION_AMBER, INFO_DIM, SEL_LEFT, SEL_RIGHT,
};
use crate::app::Row;

const ID_WIDTH: usize = 6;
const STATE_WIDTH: usize = 16;
const CREATED_BY_WIDTH: usize = 40;
/// Indent of expanded detail lines (selector + id + gap)
const DETAIL_INDENT: usize = ID_WIDTH + 3;

/// Truncate a string for display, adding "..." if too long
pub(crate) fn truncate_for_display(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// First visible line so that `selected` stays on screen
fn visible_scroll_offset(selected: Option<usize>, visible_count: usize) -> usize {
    match selected {
        Some(line) if visible_count > 0 && line >= visible_count => line + 1 - visible_count,
        _ => 0,
    }
}

/// Build all table lines; also returns the line index of the selected row.
fn build_lines<'a>(
    rows: impl Iterator<Item = Row<'a>>,
    layout: &LayoutConfig,
    width: usize,
) -> (Vec<Line<'static>>, Option<usize>) {
    let mut fixed = ID_WIDTH + 3;
    if layout.show_state {
        fixed += STATE_WIDTH + 1;
    }
    if layout.show_created_by {
        fixed += CREATED_BY_WIDTH + 1;
    }
    let summary_width = width.saturating_sub(fixed).max(10);

    let mut lines = Vec::new();
    let mut selected_line = None;

    for row in rows {
        if row.selected {
            selected_line = Some(lines.len());
        }
        let color = state_color(row.state);
        let (sel_l, sel_r) = if row.selected { (SEL_LEFT, SEL_RIGHT) } else { (" ", " ") };
        let summary_style = if row.selected {
            Style::default().fg(ACCENT_GREEN).add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(ACCENT_GREEN)
        };

        let mut spans = vec![
            Span::styled(sel_l, Style::default().fg(CAUTION_AMBER)),
            Span::styled(format!("{:>ID_WIDTH$} ", row.id), Style::default().fg(ACCENT_CYAN)),
        ];
        if layout.show_state {
            let state = truncate_for_display(row.state, STATE_WIDTH);
            spans.push(Span::styled(format!("{state:<STATE_WIDTH$} "), Style::default().fg(color)));
        }
        if layout.show_created_by {
            let created = truncate_for_display(row.created_by.unwrap_or("-"), CREATED_BY_WIDTH);
            spans.push(Span::styled(
                format!("{created:<CREATED_BY_WIDTH$} "),
                Style::default().fg(INFO_DIM),
            ));
        }
        spans.push(Span::styled(truncate_for_display(row.summary, summary_width), summary_style));
        spans.push(Span::styled(sel_r, Style::default().fg(CAUTION_AMBER)));
        lines.push(Line::from(spans));

        let detail_width = width.saturating_sub(DETAIL_INDENT).max(10);
        for (idx, detail) in row.detail.iter().enumerate() {
            // First detail line is the state
            let style = if idx == 0 {
                Style::default().fg(color)
            } else {
                Style::default().fg(INFO_DIM)
            };
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(DETAIL_INDENT)),
                Span::styled(truncate_for_display(detail, detail_width), style),
            ]));
        }
    }

    (lines, selected_line)
}

/// Render the goroutine table into `area`.
pub fn render<'a>(
    f: &mut Frame,
    area: Rect,
    rows: impl Iterator<Item = Row<'a>>,
    layout: &LayoutConfig,
    title: String,
) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    let (lines, selected_line) = build_lines(rows, layout, inner_width);
    let offset = visible_scroll_offset(selected_line, inner_height);
    let visible: Vec<Line<'static>> = lines.into_iter().skip(offset).take(inner_height).collect();

    let paragraph = Paragraph::new(visible).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Plain)
            .title(title)
            .border_style(Style::default().fg(ACCENT_GREEN)),
    );

    f.render_widget(paragraph, area);
}

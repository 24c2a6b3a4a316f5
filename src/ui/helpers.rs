use anyhow::Error;
use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::inventory::StockStatus;
use crate::models::ActionType;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Pill color for a stock status.
pub(crate) fn status_style(status: StockStatus) -> Style {
    match status {
        StockStatus::Empty | StockStatus::Red => Style::default().fg(Color::Red),
        StockStatus::Yellow => Style::default().fg(Color::Yellow),
        StockStatus::Green => Style::default().fg(Color::Green),
    }
}

/// Gauge color: red below half, yellow below full, green when full.
pub(crate) fn gauge_style(percent: f64) -> Style {
    if percent < 50.0 {
        Style::default().fg(Color::Red)
    } else if percent < 100.0 {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    }
}

pub(crate) fn action_style(action: ActionType) -> Style {
    match action {
        ActionType::Take => Style::default().fg(Color::Red),
        ActionType::Return => Style::default().fg(Color::Green),
    }
}

/// Text progress bar `width` cells wide, filled to `percent`.
pub(crate) fn stock_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let mut bar = "█".repeat(filled.min(width));
    bar.push_str(&"░".repeat(width - filled.min(width)));
    bar
}

/// Cursor column after `widths` cells of text starting at `area.x`, kept
/// inside `area`. Widths beyond `u16` saturate instead of wrapping.
pub(crate) fn cursor_column(area: Rect, widths: &[usize]) -> u16 {
    let column = widths.iter().fold(area.x, |column, width| {
        column.saturating_add(u16::try_from(*width).unwrap_or(u16::MAX))
    });
    column.min(area.right().saturating_sub(1))
}

/// Local wall-clock rendering of a stored timestamp.
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_bar_fills_proportionally() {
        assert_eq!(stock_bar(0.0, 4), "░░░░");
        assert_eq!(stock_bar(50.0, 4), "██░░");
        assert_eq!(stock_bar(100.0, 4), "████");
        assert_eq!(stock_bar(250.0, 4), "████");
    }

    #[test]
    fn cursor_column_stays_inside_area() {
        let area = Rect::new(2, 0, 20, 1);
        assert_eq!(cursor_column(area, &[5, 3]), 10);
        assert_eq!(cursor_column(area, &[5, 70_000]), 21);
        assert_eq!(cursor_column(area, &[usize::MAX, usize::MAX]), 21);
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = anyhow::anyhow!("disk full").context("failed to insert transaction");
        assert_eq!(surface_error(&err), "disk full");
    }
}

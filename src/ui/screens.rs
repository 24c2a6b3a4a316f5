use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Row};

use super::helpers::{action_style, format_timestamp, gauge_style, status_style, stock_bar};
use crate::inventory::{stock_percent, Dashboard, StockStatus};
use crate::models::{Equipment, RecentTransaction};

/// Width of the text gauge in the stock column.
const GAUGE_WIDTH: usize = 10;

/// Message shown in place of the dashboard when loading fails.
pub(crate) const CONNECTION_LOST: &str = "Connection Lost. Check configuration and database.";

/// Either a full snapshot or the terminal error panel; never half of each.
pub(crate) enum AdminView {
    Ready(Dashboard),
    Failed(String),
}

/// State behind the admin tab.
pub(crate) struct AdminScreen {
    pub(crate) view: AdminView,
    pub(crate) log_scroll: u16,
}

impl AdminScreen {
    pub(crate) fn new(view: AdminView) -> Self {
        Self {
            view,
            log_scroll: 0,
        }
    }

    pub(crate) fn scroll_log(&mut self, delta: i32) {
        let max = match &self.view {
            AdminView::Ready(dashboard) => dashboard.recent.len().saturating_sub(1) as i32,
            AdminView::Failed(_) => 0,
        };
        self.log_scroll = (self.log_scroll as i32 + delta).clamp(0, max) as u16;
    }
}

/// One inventory table row: names, status pill, gauge and counts.
pub(crate) fn inventory_row(item: &Equipment, status: StockStatus) -> Row<'static> {
    let percent = stock_percent(item.available_quantity, item.total_quantity);

    let mut name_lines = vec![Line::from(item.name_en.clone())];
    if let Some(name_ar) = &item.name_ar {
        name_lines.push(Line::from(Span::styled(
            name_ar.clone(),
            Style::default().fg(Color::Gray),
        )));
    }

    let status_cell = Line::from(Span::styled(
        format!("[{}]", status.label()),
        status_style(status).add_modifier(Modifier::BOLD),
    ));

    let stock_cell = Line::from(vec![
        Span::styled(stock_bar(percent, GAUGE_WIDTH), gauge_style(percent)),
        Span::raw(format!(
            " {} / {}",
            item.available_quantity, item.total_quantity
        )),
    ]);

    let height = name_lines.len() as u16;
    Row::new(vec![
        Cell::from(name_lines),
        Cell::from(status_cell),
        Cell::from(stock_cell),
    ])
    .height(height)
}

/// Feed line: who, what, how many of which item, and when.
pub(crate) fn log_line(entry: &RecentTransaction) -> Line<'static> {
    let tx = &entry.transaction;
    Line::from(vec![
        Span::styled(
            tx.user_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            tx.action_type.as_str().to_uppercase(),
            action_style(tx.action_type),
        ),
        Span::raw(format!(" {}x {} ", tx.quantity, entry.equipment_label())),
        Span::styled(
            format_timestamp(&tx.created_at),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

/// Search result line with both names and the stock count.
pub(crate) fn result_line(item: &Equipment, highlighted: bool) -> Line<'static> {
    let name_style = if highlighted {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut spans = vec![Span::styled(item.name_en.clone(), name_style)];
    if let Some(name_ar) = &item.name_ar {
        spans.push(Span::styled(
            format!("  {name_ar}"),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::styled(
        format!(
            "  Available: {} / {}",
            item.available_quantity, item.total_quantity
        ),
        Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{ActionType, Transaction};

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn log_line_falls_back_to_item() {
        let entry = RecentTransaction {
            transaction: Transaction {
                id: "1".into(),
                equipment_id: "gone".into(),
                user_name: "Sara".into(),
                quantity: 2,
                action_type: ActionType::Return,
                created_at: Utc::now(),
            },
            equipment_name_en: None,
            equipment_name_ar: None,
        };
        let text = line_text(&log_line(&entry));
        assert!(text.starts_with("Sara RETURN 2x Item "));
    }

    #[test]
    fn result_line_shows_stock() {
        let item = Equipment {
            id: "t".into(),
            name_en: "Tent".into(),
            name_ar: Some("خيمة".into()),
            location: None,
            total_quantity: 10,
            available_quantity: 4,
        };
        let text = line_text(&result_line(&item, false));
        assert_eq!(text, "Tent  خيمة  Available: 4 / 10");
    }

    #[test]
    fn log_scroll_is_clamped() {
        let mut screen = AdminScreen::new(AdminView::Failed(CONNECTION_LOST.into()));
        screen.scroll_log(3);
        assert_eq!(screen.log_scroll, 0);
    }
}

use std::mem;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::error::WorkflowError;
use crate::inventory::{
    clear_log, submit, ClearOutcome, Dashboard, EquipmentDirectory, SearchOutcome,
    TransactionRequest,
};
use crate::models::ActionType;
use crate::router::{Session, Tab, Transition};

use super::forms::{ActionForm, FormField, PassphraseForm};
use super::helpers::{centered_rect, cursor_column, surface_error};
use super::screens::{
    inventory_row, log_line, result_line, AdminScreen, AdminView, CONNECTION_LOST,
};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab bar.
const TAB_BAR_HEIGHT: u16 = 3;
/// Rows given to the search results box under the form.
const RESULTS_HEIGHT: u16 = 8;

/// What the content area is showing.
enum Screen {
    Form { action: ActionType, form: ActionForm },
    Admin(AdminScreen),
}

/// Modal overlays on top of the current screen.
enum Mode {
    Normal,
    Passphrase(PassphraseForm),
    ConfirmClear,
}

/// Holds the footer toast text plus its severity and when it appeared.
struct StatusMessage {
    text: String,
    kind: StatusKind,
    shown_at: Instant,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    session: Session,
    directory: EquipmentDirectory,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    recent_limit: usize,
    toast_ttl: Duration,
}

impl App {
    /// Build the app and enter the initial take tab, which performs the first
    /// directory load.
    pub fn new(conn: Connection, session: Session, recent_limit: usize, toast_ttl: Duration) -> Self {
        let mut app = Self {
            conn,
            session,
            directory: EquipmentDirectory::new(),
            screen: Screen::Form {
                action: ActionType::Take,
                form: ActionForm::default(),
            },
            mode: Mode::Normal,
            status: None,
            recent_limit,
            toast_ttl,
        };
        let initial = app.session.tab();
        app.enter(initial);
        app
    }

    /// Route a key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::F(1) => return self.switch_tab(Tab::Take).map(|_| false),
            KeyCode::F(2) => return self.switch_tab(Tab::Return).map(|_| false),
            KeyCode::F(3) => return self.switch_tab(Tab::Admin).map(|_| false),
            _ => {}
        }

        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Passphrase(form) => self.handle_passphrase(code, form)?,
            Mode::ConfirmClear => self.handle_confirm_clear(code)?,
        };
        Ok(exit)
    }

    /// Ask the router for `tab`; opens the passphrase prompt when admin is
    /// still locked.
    pub fn switch_tab(&mut self, tab: Tab) -> Result<()> {
        match self.session.request(tab) {
            Transition::Enter(target) => {
                self.mode = Mode::Normal;
                self.enter(target);
            }
            Transition::PassphraseRequired => {
                self.mode = Mode::Passphrase(PassphraseForm::default());
            }
        }
        Ok(())
    }

    /// Drop the toast once it has been visible long enough.
    pub fn tick(&mut self) {
        if let Some(status) = &self.status {
            if status.shown_at.elapsed() >= self.toast_ttl {
                self.status = None;
            }
        }
    }

    /// Refresh the directory and render a clean view of `tab`.
    fn enter(&mut self, tab: Tab) {
        if let Err(err) = self.directory.refresh(&self.conn) {
            tracing::error!(error = ?err, "equipment refresh failed");
            self.set_status("System Error: Database unreachable.", StatusKind::Error);
        }

        self.screen = match tab.action() {
            Some(action) => Screen::Form {
                action,
                form: ActionForm::default(),
            },
            None => Screen::Admin(self.load_admin()),
        };
    }

    fn load_admin(&self) -> AdminScreen {
        match Dashboard::load(&self.conn, self.recent_limit) {
            Ok(dashboard) => AdminScreen::new(AdminView::Ready(dashboard)),
            Err(err) => {
                tracing::error!(error = ?err, "dashboard load failed");
                AdminScreen::new(AdminView::Failed(CONNECTION_LOST.to_string()))
            }
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match &mut self.screen {
            Screen::Form { action, form } => {
                let action = *action;
                match code {
                    KeyCode::Esc => {
                        if form.results_visible() {
                            form.hide_results();
                        } else {
                            *exit = true;
                        }
                    }
                    KeyCode::Tab => form.next_field(),
                    KeyCode::BackTab => form.previous_field(),
                    KeyCode::Up if form.active == FormField::Item => form.move_highlight(-1),
                    KeyCode::Down if form.active == FormField::Item => form.move_highlight(1),
                    KeyCode::Enter if form.active == FormField::Item && !form.matches().is_empty() => {
                        form.select_highlighted();
                        form.next_field();
                    }
                    KeyCode::Enter => self.submit_form(action),
                    KeyCode::Backspace => {
                        if form.backspace() {
                            form.refresh_results(self.directory.items(), action);
                        }
                    }
                    KeyCode::Char(ch) => {
                        if form.push_char(ch) {
                            form.refresh_results(self.directory.items(), action);
                        }
                    }
                    _ => {}
                }
            }
            Screen::Admin(admin) => match code {
                KeyCode::Esc | KeyCode::Char('q') => *exit = true,
                KeyCode::Up => admin.scroll_log(-1),
                KeyCode::Down => admin.scroll_log(1),
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.clear_status();
                    self.enter(Tab::Admin);
                }
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    if !self.session.lock().is_held() {
                        return Ok(Mode::ConfirmClear);
                    }
                }
                _ => {}
            },
        }
        Ok(Mode::Normal)
    }

    fn submit_form(&mut self, action: ActionType) {
        let Screen::Form { form, .. } = &self.screen else {
            return;
        };
        let request = TransactionRequest {
            action,
            user_name: &form.user_name,
            item: form.selected.as_ref(),
            quantity: form.quantity_value(),
        };

        match submit(&mut self.conn, self.session.lock(), &request) {
            Ok(_) => {
                self.set_status("Success! Record updated.", StatusKind::Info);
                self.enter(self.session.tab());
            }
            Err(WorkflowError::Busy) => {}
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    fn handle_passphrase(&mut self, code: KeyCode, mut form: PassphraseForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => Ok(Mode::Normal),
            KeyCode::Backspace => {
                form.backspace();
                Ok(Mode::Passphrase(form))
            }
            KeyCode::Enter => match self.session.unlock(&form.input) {
                Some(Transition::Enter(tab)) => {
                    self.clear_status();
                    self.enter(tab);
                    Ok(Mode::Normal)
                }
                Some(Transition::PassphraseRequired) | None => {
                    self.set_status("Invalid Credentials", StatusKind::Error);
                    form.clear();
                    Ok(Mode::Passphrase(form))
                }
            },
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Ok(Mode::Passphrase(form))
            }
            _ => Ok(Mode::Passphrase(form)),
        }
    }

    fn handle_confirm_clear(&mut self, code: KeyCode) -> Result<Mode> {
        let confirmed = match code {
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => false,
            _ => return Ok(Mode::ConfirmClear),
        };

        match clear_log(&self.conn, self.session.lock(), confirmed) {
            Ok(ClearOutcome::Cleared(_)) => {
                self.set_status("History cleared successfully.", StatusKind::Info);
                self.screen = Screen::Admin(self.load_admin());
            }
            Ok(ClearOutcome::Declined) => {
                self.set_status("Clear cancelled.", StatusKind::Info);
            }
            Err(WorkflowError::Busy) => {}
            Err(WorkflowError::Storage(err)) => {
                self.set_status(
                    format!("Delete failed. {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
        Ok(Mode::Normal)
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match &self.screen {
            Screen::Form { action, form } => self.draw_form(frame, chunks[1], *action, form),
            Screen::Admin(admin) => self.draw_admin(frame, chunks[1], admin),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Passphrase(form) => self.draw_passphrase(frame, area, form),
            Mode::ConfirmClear => self.draw_confirm_clear(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = Tab::ALL.iter().enumerate().map(|(idx, tab)| {
            let lock = if *tab == Tab::Admin && !self.session.admin_unlocked() {
                " [locked]"
            } else {
                ""
            };
            Line::from(format!("F{} {}{}", idx + 1, tab.title(), lock))
        });
        let selected = Tab::ALL
            .iter()
            .position(|tab| *tab == self.session.tab())
            .unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Equipment Tracker"))
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, action: ActionType, form: &ActionForm) {
        let (title, button) = match action {
            ActionType::Take => ("Take Equipment", "Confirm Take"),
            ActionType::Return => ("Return Equipment", "Confirm Return"),
        };

        let results_height = if form.results_visible() {
            RESULTS_HEIGHT.min(area.height.saturating_sub(8))
        } else {
            0
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Length(results_height),
                Constraint::Min(0),
            ])
            .split(area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), chunks[0]);
        let inner = block.inner(chunks[0]);

        let location = match form.location_display() {
            Some(location) => Span::raw(location.to_string()),
            None => Span::styled("Select an item above", Style::default().fg(Color::DarkGray)),
        };

        let button_line = if self.session.lock().is_held() {
            Line::from(Span::styled(
                format!("[ {button} ] (working...)"),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(Span::styled(
                format!("[ {button} ]  press Enter"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))
        };

        let lines = vec![
            form.build_line("Your Name", FormField::Name),
            form.build_line("Search Item", FormField::Item),
            Line::from(vec![Span::raw("Location: "), location]),
            form.build_line("How many?", FormField::Quantity),
            Line::from(""),
            button_line,
        ];
        frame.render_widget(Paragraph::new(lines), inner);

        if let Some(results) = &form.results {
            self.draw_results(frame, chunks[1], results, form.highlighted);
        }

        let (prefix, row, field) = match form.active {
            FormField::Name => ("Your Name: ", 0, FormField::Name),
            FormField::Item => ("Search Item: ", 1, FormField::Item),
            FormField::Quantity => ("How many?: ", 3, FormField::Quantity),
        };
        let cursor_x = cursor_column(inner, &[prefix.chars().count(), form.value_len(field)]);
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_results(&self, frame: &mut Frame, area: Rect, results: &SearchOutcome, highlighted: usize) {
        if area.height == 0 {
            return;
        }
        let lines: Vec<Line> = match results {
            SearchOutcome::Matches(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| result_line(item, idx == highlighted))
                .collect(),
            SearchOutcome::NoMatches | SearchOutcome::Hidden => vec![Line::from(Span::styled(
                "No matches found",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let visible = area.height.saturating_sub(2) as usize;
        let scroll = highlighted.saturating_sub(visible.saturating_sub(1)) as u16;
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Matches"))
            .scroll((scroll, 0));
        frame.render_widget(paragraph, area);
    }

    fn draw_admin(&self, frame: &mut Frame, area: Rect, admin: &AdminScreen) {
        let dashboard = match &admin.view {
            AdminView::Ready(dashboard) => dashboard,
            AdminView::Failed(message) => {
                let paragraph = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Red))
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Admin"))
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, area);
                return;
            }
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let rows: Vec<Row> = dashboard
            .rows()
            .map(|(item, status)| inventory_row(item, status))
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(40),
                Constraint::Length(10),
                Constraint::Min(18),
            ],
        )
        .header(
            Row::new(vec!["Item", "Status", "Stock"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Live Inventory"));
        frame.render_widget(table, chunks[0]);

        let log: Vec<Line> = if dashboard.recent.is_empty() {
            vec![Line::from(Span::styled(
                "No transactions recorded.",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            dashboard.recent.iter().map(log_line).collect()
        };
        let paragraph = Paragraph::new(log)
            .block(Block::default().borders(Borders::ALL).title("Recent History"))
            .wrap(Wrap { trim: true })
            .scroll((admin.log_scroll, 0));
        frame.render_widget(paragraph, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match (&self.screen, &self.mode) {
            (_, Mode::Passphrase(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Unlock   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::ConfirmClear) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Clear all   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Keep"),
            ]),
            (Screen::Form { .. }, Mode::Normal) => Line::from(vec![
                Span::styled("[F1-F3]", key_style),
                Span::raw(" Tabs   "),
                Span::styled("[Tab]", key_style),
                Span::raw(" Next field   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Results   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Select/Submit   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Admin(_), Mode::Normal) => Line::from(vec![
                Span::styled("[F1-F3]", key_style),
                Span::raw(" Tabs   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Scroll log   "),
                Span::styled("[R]", key_style),
                Span::raw(" Reload   "),
                Span::styled("[C]", key_style),
                Span::raw(" Clear logs   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_passphrase(&self, frame: &mut Frame, area: Rect, form: &PassphraseForm) {
        let popup_area = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Admin Access").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let masked = form.masked();
        let lines = vec![
            Line::from(vec![
                Span::raw("Passphrase: "),
                Span::styled(masked.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to unlock • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = cursor_column(inner, &["Passphrase: ".len(), masked.chars().count()]);
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_confirm_clear(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Clear Recent Logs")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Are you sure you want to clear ALL transaction records?"),
            Line::from("This frees up storage space but the history is lost for good."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

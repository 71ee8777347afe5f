use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::warn;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::dashboard;
use crate::filter::Filter;
use crate::models::{ApplicationRecord, Status};
use crate::stats::StatsReport;
use crate::tracker::Tracker;
use crate::view::{CardMode, CardModes, Selection, StatusDraft};

enum InputMode {
    Normal,
    Search,
    Editing(StatusDraft),
}

struct AppState {
    filter: Filter,
    visible: Vec<ApplicationRecord>,
    selected: usize,
    scroll_offset: u16,
    cards: CardModes,
    selection: Selection,
    mode: InputMode,
    report: StatsReport,
    message: Option<String>,
}

impl AppState {
    fn new(tracker: &Tracker) -> Self {
        let filter = Filter::default();
        Self {
            visible: tracker.filtered(&filter),
            filter,
            selected: 0,
            scroll_offset: 0,
            cards: CardModes::default(),
            selection: Selection::default(),
            mode: InputMode::Normal,
            report: tracker.stats(Utc::now()),
            message: None,
        }
    }

    /// Re-run the filter and the stats after any change.
    fn refresh(&mut self, tracker: &Tracker) {
        self.visible = tracker.filtered(&self.filter);
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
        self.selection.prune(tracker.applications());
        self.report = tracker.stats(Utc::now());
    }

    fn current(&self) -> Option<&ApplicationRecord> {
        self.visible.get(self.selected)
    }

    fn next(&mut self) {
        if !self.visible.is_empty() && self.selected < self.visible.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn report_result<T>(&mut self, result: Result<T>, ok: impl FnOnce(T) -> String) {
        self.message = Some(match result {
            Ok(value) => ok(value),
            Err(e) => {
                warn!("{:#}", e);
                format!("Error: {}", e)
            }
        });
    }
}

pub fn run_browse(tracker: &mut Tracker) -> Result<()> {
    let mut state = AppState::new(tracker);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, tracker);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    tracker: &mut Tracker,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(if state.visible.is_empty() { None } else { Some(state.selected) });
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if matches!(state.mode, InputMode::Search) {
                handle_search(key, state, tracker);
            } else if matches!(state.mode, InputMode::Editing(_)) {
                handle_editing(key, state, tracker);
            } else if handle_normal(key, state, tracker) {
                break;
            }
        }
    }
    Ok(())
}

fn handle_normal(key: KeyEvent, state: &mut AppState, tracker: &mut Tracker) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Down | KeyCode::Char('j') => state.next(),
        KeyCode::Up | KeyCode::Char('k') => state.prev(),
        KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
        KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
        KeyCode::Char('/') => {
            state.mode = InputMode::Search;
            state.message = None;
        }
        KeyCode::Char('f') => {
            state.filter.cycle_status();
            state.selected = 0;
            state.refresh(tracker);
        }
        KeyCode::Char('c') => {
            state.filter = Filter::default();
            state.refresh(tracker);
        }
        KeyCode::Char(' ') => {
            if let Some(id) = state.current().map(|r| r.id) {
                state.selection.toggle(id);
            }
        }
        KeyCode::Char('u') | KeyCode::Enter => {
            if let Some(record) = state.current() {
                let draft = StatusDraft::for_record(record);
                state.cards.open(draft.id);
                state.mode = InputMode::Editing(draft);
                state.message = None;
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = state.current().map(|r| r.id) {
                let result = tracker.delete(id);
                state.report_result(result, |_| format!("Deleted #{}", id));
                state.refresh(tracker);
            }
        }
        KeyCode::Char('D') => {
            if state.selection.is_empty() {
                state.message = Some("Nothing selected".to_string());
            } else {
                let ids = state.selection.ids();
                let result = tracker.delete_many(&ids);
                state.selection.clear();
                state.report_result(result, |n| format!("Deleted {} application(s)", n));
                state.refresh(tracker);
            }
        }
        _ => {}
    }
    false
}

fn handle_search(key: KeyEvent, state: &mut AppState, tracker: &Tracker) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => state.mode = InputMode::Normal,
        KeyCode::Backspace => {
            state.filter.search.pop();
            state.selected = 0;
            state.refresh(tracker);
        }
        KeyCode::Char(c) => {
            state.filter.search.push(c);
            state.selected = 0;
            state.refresh(tracker);
        }
        _ => {}
    }
}

fn handle_editing(key: KeyEvent, state: &mut AppState, tracker: &mut Tracker) {
    let InputMode::Editing(draft) = &mut state.mode else { return };

    match key.code {
        KeyCode::Left => draft.status = draft.status.prev(),
        KeyCode::Right | KeyCode::Tab => draft.status = draft.status.next(),
        KeyCode::Backspace => {
            draft.specific_salary.pop();
        }
        KeyCode::Char(c) => draft.specific_salary.push(c),
        KeyCode::Esc => {
            let id = draft.id;
            state.cards.close(id);
            state.mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let draft = draft.clone();
            let result = tracker.update_status(draft.id, draft.status, &draft.specific_salary);
            state.report_result(result, |_| format!("#{} updated to {}", draft.id, draft.status));
            state.cards.close(draft.id);
            state.mode = InputMode::Normal;
            state.refresh(tracker);
        }
        _ => {}
    }
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_filter_bar(frame, state, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(40),
            Constraint::Percentage(25),
        ])
        .split(rows[1]);

    // Left panel: application list
    let items: Vec<ListItem> = state
        .visible
        .iter()
        .map(|app| {
            let check = if state.selection.is_selected(app.id) { "[x]" } else { "[ ]" };
            let title = dashboard::truncate(&app.job_title, 30);
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} #{:<4} ", check, app.id)),
                Span::styled(format!("{:<13}", app.status.as_str()), status_style(app.status)),
                Span::raw(format!("{} | {}", title, app.company)),
            ]))
        })
        .collect();

    let list_title = if state.selection.is_empty() {
        format!(" Applications ({}) ", state.visible.len())
    } else {
        format!(
            " Applications ({}) - {} selected ",
            state.visible.len(),
            state.selection.len()
        )
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, columns[0], list_state);

    // Middle panel: application card
    let detail = Paragraph::new(build_detail(state))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(detail, columns[1]);

    // Right panel: dashboard
    let stats = Paragraph::new(build_stats(&state.report))
        .block(Block::default().borders(Borders::ALL).title(" Stats "))
        .wrap(Wrap { trim: false });
    frame.render_widget(stats, columns[2]);

    let help_text = match state.mode {
        InputMode::Normal => {
            " j/k:navigate  /:search  f:status filter  c:clear  space:select  u:update  d:delete  D:delete selected  q:quit"
        }
        InputMode::Search => " type to search  enter/esc:done",
        InputMode::Editing(_) => " left/right:status  type:salary  enter:save  esc:cancel",
    };
    let footer = match &state.message {
        Some(msg) => format!(" {}  |{}", msg, help_text),
        None => help_text.to_string(),
    };
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );
}

fn draw_filter_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let status = state.filter.status.map_or("All", |s| s.as_str());
    let cursor = if matches!(state.mode, InputMode::Search) { "_" } else { "" };
    let text = format!("Search: {}{}    Status: {}", state.filter.search, cursor, status);
    let style = if state.filter.is_active() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    frame.render_widget(
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(" Filter ")),
        area,
    );
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Applied => Style::default().fg(Color::Cyan),
        Status::Interviewing => Style::default().fg(Color::Yellow),
        Status::Offer => Style::default().fg(Color::Magenta),
        Status::Rejected => Style::default().fg(Color::Red),
        Status::Accepted => Style::default().fg(Color::Green),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { dashboard::PLACEHOLDER } else { value }
}

fn build_detail(state: &AppState) -> Text<'_> {
    let Some(app) = state.current() else {
        return Text::raw("No applications");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        app.job_title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", app.company)));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", app.status),
        status_style(app.status),
    )));
    lines.push(Line::from(""));

    let fields = [
        ("Location", app.location.as_str()),
        ("Salary Range", app.salary_range.as_str()),
        ("Specific Salary", app.specific_salary.as_str()),
        ("Date Applied", app.date_applied.as_str()),
        ("Link", app.application_link.as_str()),
    ];
    for (label, value) in fields {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", label), Style::default().fg(Color::DarkGray)),
            Span::raw(or_dash(value).to_string()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Notes",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if app.notes.is_empty() {
        lines.push(Line::from(format!("  {}", dashboard::PLACEHOLDER)));
    } else {
        for line in textwrap::fill(&app.notes, 60).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    if state.cards.mode(app.id) == CardMode::Editing {
        if let InputMode::Editing(draft) = &state.mode {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Update Status",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(vec![
                Span::raw("  Status:          < "),
                Span::styled(draft.status.as_str(), status_style(draft.status)),
                Span::raw(" >"),
            ]));
            lines.push(Line::from(format!(
                "  Specific Salary: {}_",
                draft.specific_salary
            )));
        }
    }

    Text::from(lines)
}

fn build_stats(report: &StatsReport) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    for (title, rows) in dashboard::sections(report) {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for (label, value) in rows {
            lines.push(Line::from(format!(" {:<18}{:>8}", label, value)));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Locations",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    for line in dashboard::location_lines(report) {
        lines.push(Line::from(format!(" {}", line)));
    }

    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::NewApplication;
    use ratatui::backend::TestBackend;

    fn render(state: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        terminal.draw(|frame| draw(frame, state, &mut list_state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_truncates_non_ascii_titles_on_char_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = Tracker::load(Database::open(&dir.path().join("jobtrack.db")).unwrap());
        tracker
            .add(NewApplication {
                job_title: "Senior Software Engineer Ié Développement".to_string(),
                company: "Acme".to_string(),
                date_applied: "2024-06-01".to_string(),
                ..Default::default()
            })
            .unwrap();

        let state = AppState::new(&tracker);
        let screen = render(&state, 200, 40);
        assert!(screen.contains("Senior Software Engineer Ié..."));
        assert!(screen.contains("Applications (1)"));
    }

    #[test]
    fn test_draw_with_no_applications() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = Tracker::load(Database::open(&dir.path().join("jobtrack.db")).unwrap());
        let state = AppState::new(&tracker);
        let screen = render(&state, 160, 40);
        assert!(screen.contains("No applications"));
        assert!(screen.contains(dashboard::NO_LOCATION_DATA));
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use userlist_app::{
    ALL_CITIES_LABEL, AppCommand, AppEvent, AppMode, AppState, Directory, LoadError, LoadStatus,
    Page, User,
};

const PREV_ARROW: &str = "◀";
const NEXT_ARROW: &str = "▶";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Where the UI gets its users from.
pub trait AppRuntime {
    /// Short label for the header, such as the endpoint URL.
    fn describe_source(&self) -> String;
    fn load_users(&mut self) -> Result<Vec<User>, LoadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CityPickerUiState {
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    source_label: String,
    city_picker: CityPickerUiState,
    help_visible: bool,
    load_pending: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime + ?Sized>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    // The first frame shows "Loading..." before the blocking fetch runs.
    let mut view_data = ViewData {
        source_label: runtime.describe_source(),
        load_pending: true,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        if view_data.load_pending {
            load_users(state, runtime, &mut view_data, &internal_tx);
            continue;
        }

        match next_key_event() {
            Ok(Some(key)) => {
                if handle_key_event(state, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    tracing::info!("user interface closed");
    result
}

fn next_key_event() -> Result<Option<KeyEvent>> {
    if !event::poll(Duration::from_millis(120)).context("poll event")? {
        return Ok(None);
    }
    match event::read().context("read event")? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn load_users<R: AppRuntime + ?Sized>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.load_pending = false;
    view_data.city_picker = CityPickerUiState::default();

    let started = Instant::now();
    let command = match runtime.load_users() {
        Ok(users) => {
            tracing::info!(count = users.len(), elapsed = ?started.elapsed(), "users loaded");
            AppCommand::UsersLoaded {
                users,
                fetched_at: OffsetDateTime::now_utc(),
            }
        }
        Err(error) => {
            tracing::warn!(%error, kind = error.kind().as_str(), "user load failed");
            AppCommand::LoadFailed(error)
        }
    };
    dispatch(state, view_data, internal_tx, command);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn dispatch(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
    events
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    dispatch(
        state,
        view_data,
        internal_tx,
        AppCommand::SetStatus(message.into()),
    );
}

/// Returns true when the app should quit.
fn handle_key_event(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    match state.mode {
        AppMode::Search => {
            handle_search_key(state, view_data, internal_tx, key);
            false
        }
        AppMode::CityPicker => {
            handle_city_picker_key(state, view_data, internal_tx, key);
            false
        }
        AppMode::Nav => handle_nav_key(state, view_data, internal_tx, key),
    }
}

fn handle_nav_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('/'), _) => {
            dispatch(state, view_data, internal_tx, AppCommand::EnterSearch);
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            view_data.city_picker.cursor = selected_city_choice(&state.directory);
            dispatch(state, view_data, internal_tx, AppCommand::OpenCityPicker);
        }
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            dispatch(state, view_data, internal_tx, AppCommand::ResetFilters);
        }
        (KeyCode::Char('l' | 'n') | KeyCode::Right | KeyCode::PageDown, _) => {
            dispatch(state, view_data, internal_tx, AppCommand::NextPage);
        }
        (KeyCode::Char('h' | 'p') | KeyCode::Left | KeyCode::PageUp, _) => {
            dispatch(state, view_data, internal_tx, AppCommand::PrevPage);
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            view_data.load_pending = true;
            emit_status(state, view_data, internal_tx, "reloading users");
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        _ => {}
    }
    false
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match (key.code, key.modifiers) {
        (KeyCode::Esc | KeyCode::Enter, _) => AppCommand::ExitToNav,
        (KeyCode::Backspace, _) => AppCommand::PopNameChar,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => AppCommand::SetNameQuery(String::new()),
        (KeyCode::Char(ch), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            AppCommand::PushNameChar(ch)
        }
        _ => return,
    };
    let events = dispatch(state, view_data, internal_tx, command);
    if let Some(AppEvent::FilterChanged { visible }) = events.first() {
        tracing::debug!(visible, "name filter changed");
    }
}

fn handle_city_picker_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let last = state.directory.cities().len();
    let cursor = &mut view_data.city_picker.cursor;
    match key.code {
        KeyCode::Esc => {
            dispatch(state, view_data, internal_tx, AppCommand::ExitToNav);
        }
        KeyCode::Char('j') | KeyCode::Down => *cursor = (*cursor + 1).min(last),
        KeyCode::Char('k') | KeyCode::Up => *cursor = cursor.saturating_sub(1),
        KeyCode::Char('g') | KeyCode::Home => *cursor = 0,
        KeyCode::Char('G') | KeyCode::End => *cursor = last,
        KeyCode::Enter => {
            let city = city_for_choice(&state.directory, *cursor);
            let label = if city.is_empty() {
                ALL_CITIES_LABEL.to_owned()
            } else {
                city.clone()
            };
            dispatch(state, view_data, internal_tx, AppCommand::SetCityQuery(city));
            dispatch(state, view_data, internal_tx, AppCommand::ExitToNav);
            tracing::debug!(city = %label, visible = state.directory.visible_len(), "city filter changed");
            emit_status(state, view_data, internal_tx, format!("city: {label}"));
        }
        _ => {}
    }
}

/// Selector entries: the "all cities" sentinel followed by the loaded cities.
fn city_choices(directory: &Directory) -> Vec<&str> {
    std::iter::once(ALL_CITIES_LABEL)
        .chain(directory.cities().iter().map(String::as_str))
        .collect()
}

/// Choice 0 is the sentinel and maps to an empty city query.
fn city_for_choice(directory: &Directory, choice: usize) -> String {
    choice
        .checked_sub(1)
        .and_then(|index| directory.cities().get(index))
        .cloned()
        .unwrap_or_default()
}

fn selected_city_choice(directory: &Directory) -> usize {
    directory
        .filter()
        .city_constraint()
        .and_then(|city| directory.cities().iter().position(|option| option == city))
        .map_or(0, |index| index + 1)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header_style = if state.mode == AppMode::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let header = Paragraph::new(filter_bar_text(state)).block(
        Block::default()
            .title(header_title(view_data))
            .borders(Borders::ALL)
            .border_style(header_style),
    );
    frame.render_widget(header, layout[0]);

    let page = state.directory.current_page();
    render_table(frame, layout[1], &state.directory, &page);

    let indicator = Paragraph::new(page_indicator_line(&page)).alignment(Alignment::Center);
    frame.render_widget(indicator, layout[2]);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    if state.mode == AppMode::CityPicker {
        let area = centered_rect(40, 60, frame.area());
        frame.render_widget(Clear, area);
        let visible_rows = area.height.saturating_sub(2) as usize;
        let offset = view_data
            .city_picker
            .cursor
            .saturating_sub(visible_rows.saturating_sub(1));
        let picker = Paragraph::new(render_city_picker_text(
            &state.directory,
            view_data.city_picker.cursor,
        ))
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
        .block(
            Block::default()
                .title("city")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(picker, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, directory: &Directory, page: &Page<'_>) {
    let block = Block::default()
        .title(table_title(directory))
        .borders(Borders::ALL);

    if page.is_empty() {
        let style = if directory.load_status().error().is_some() && directory.users().is_empty() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let empty = Paragraph::new(empty_body_text(directory))
            .style(style)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["ID", "Name", "Email", "City"].map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let rows = page.rows.iter().map(|user| {
        Row::new([
            Cell::from(user.id.to_string()),
            Cell::from(user.name.clone()),
            Cell::from(user.email.clone()),
            Cell::from(user.city.clone()),
        ])
    });
    let widths = [
        Constraint::Length(6),
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Fill(2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn header_title(view_data: &ViewData) -> String {
    if view_data.source_label.is_empty() {
        "User List".to_owned()
    } else {
        format!("User List · {}", view_data.source_label)
    }
}

fn filter_bar_text(state: &AppState) -> String {
    let filter = state.directory.filter();
    let search = if state.mode == AppMode::Search {
        format!("{}_", filter.name_query)
    } else if filter.name_query.is_empty() {
        "-".to_owned()
    } else {
        filter.name_query.clone()
    };
    let city = filter.city_constraint().unwrap_or(ALL_CITIES_LABEL);
    format!(
        "search: {search} | city: {city} | Total Users: {}",
        state.directory.visible_len()
    )
}

fn table_title(directory: &Directory) -> String {
    match directory.load_status() {
        LoadStatus::NotLoaded => "users".to_owned(),
        LoadStatus::Loaded { fetched_at, .. } => {
            format!("users (fetched {})", format_fetched_at(*fetched_at))
        }
        LoadStatus::Failed(_) if !directory.users().is_empty() => {
            "users (reload failed, showing previous results)".to_owned()
        }
        LoadStatus::Failed(_) => "users (load failed)".to_owned(),
    }
}

fn format_fetched_at(at: OffsetDateTime) -> String {
    at.format(&time::macros::format_description!(
        "[hour]:[minute]:[second] UTC"
    ))
    .unwrap_or_else(|_| "unknown".to_owned())
}

/// Body shown when the current page has no rows.
fn empty_body_text(directory: &Directory) -> String {
    match directory.load_status() {
        LoadStatus::NotLoaded => "Loading...".to_owned(),
        LoadStatus::Failed(error) if directory.users().is_empty() => {
            format!("Load failed: {error}\n\npress r to retry")
        }
        LoadStatus::Failed(_) | LoadStatus::Loaded { .. } => "No users found".to_owned(),
    }
}

fn page_indicator_line(page: &Page<'_>) -> Line<'static> {
    let arrow_style = |enabled: bool| {
        if enabled {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    Line::from(vec![
        Span::styled(PREV_ARROW, arrow_style(page.has_prev)),
        Span::raw(format!(
            " page {} of {} ",
            page.number(),
            page.page_count.max(1)
        )),
        Span::styled(NEXT_ARROW, arrow_style(page.has_next)),
    ])
}

fn render_city_picker_text(directory: &Directory, cursor: usize) -> String {
    let selected = selected_city_choice(directory);
    city_choices(directory)
        .into_iter()
        .enumerate()
        .map(|(index, label)| {
            let marker = if index == cursor { ">" } else { " " };
            let active = if index == selected { " *" } else { "" };
            format!("{marker} {label}{active}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let hints = match state.mode {
        AppMode::Nav => "/ search | c city | x reset | h/l page | r reload | ? help | q quit",
        AppMode::Search => "type to filter | backspace | ctrl+u clear | enter/esc done",
        AppMode::CityPicker => "j/k move | g/G first/last | enter select | esc cancel",
    };
    match &state.status_line {
        Some(status) => format!("{} | {status} | {hints}", state.mode.label()),
        None => format!("{} | {hints}", state.mode.label()),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
nav: / search name | c pick city | x reset filters | r reload | q quit\n\
nav: l/n/right/pgdn next page | h/p/left/pgup previous page\n\
search: type to filter | backspace delete | ctrl+u clear | enter/esc done\n\
city: j/k or up/down move | g/G first/last | enter select | esc cancel"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use crate::board::TaskBoard;
use crate::clock::{format_date, format_time, SystemClock, Ticker};
use crate::config::Config;
use crate::editor::LineInput;
use crate::models::{Focus, TaskId};
use crate::row::{edit_spans, TaskRow};

pub struct App {
    pub board: TaskBoard,
    pub focus: Focus,
    pub task_list_state: ListState,
    pub should_quit: bool,
}

impl App {
    pub fn new(board: TaskBoard) -> Self {
        App {
            board,
            focus: Focus::Input,
            task_list_state: ListState::default(),
            should_quit: false,
        }
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.task_list_state
            .selected()
            .and_then(|i| self.board.tasks().get(i))
            .map(|t| t.id)
    }

    pub fn next_item(&mut self) {
        let len = self.board.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.task_list_state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let len = self.board.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(i) if i > 0 && i < len => i - 1,
            _ => len - 1,
        };
        self.task_list_state.select(Some(i));
    }

    fn clamp_selection(&mut self) {
        let len = self.board.tasks().len();
        let selected = match self.task_list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.task_list_state.select(selected);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.board.commit_edit();
            self.should_quit = true;
            return;
        }

        if self.board.editing().is_some() {
            self.handle_edit_key(key);
            return;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Tasks => self.handle_list_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if self.board.submit_input().is_some() {
                    let last = self.board.tasks().len() - 1;
                    self.task_list_state.select(Some(last));
                }
            }
            KeyCode::Tab | KeyCode::Esc => {
                self.focus = Focus::Tasks;
                self.clamp_selection();
            }
            code => edit_line(self.board.input_mut(), code, key.modifiers),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.next_item();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous_item();
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some(id) = self.selected_id() {
                    self.board.toggle_completion(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.board.remove_task(id);
                    self.clamp_selection();
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.board.begin_edit(id);
                }
            }
            KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Tab => {
                self.focus = Focus::Input;
            }
            _ => {}
        }
    }

    // Anything that moves focus away from the edit field commits it, like a blur.
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.board.commit_edit();
            }
            KeyCode::Up => {
                self.board.commit_edit();
                self.previous_item();
            }
            KeyCode::Down => {
                self.board.commit_edit();
                self.next_item();
            }
            KeyCode::Tab => {
                self.board.commit_edit();
                self.focus = Focus::Input;
            }
            code => {
                if let Some(buffer) = self.board.edit_buffer_mut() {
                    edit_line(buffer, code, key.modifiers);
                }
            }
        }
    }
}

fn edit_line(input: &mut LineInput, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Delete => input.delete_forward(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_to_start_of_line(),
        KeyCode::End => input.move_to_end_of_line(),
        _ => {}
    }
}

pub fn run_tui(config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(TaskBoard::new(Box::new(SystemClock)));
    let res = runtime.block_on(run_app(&mut terminal, &mut app, config.tick_interval));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("board closed with {} task(s)", app.board.tasks().len());
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<()> {
    let mut ticker = Ticker::start(tick);
    let res = event_loop(terminal, app, &mut ticker).await;
    ticker.stop().await?;
    res
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ticker: &mut Ticker,
) -> Result<()> {
    let mut events = EventStream::new();

    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("failed to read terminal event"),
                None => break,
            },
            Some(now) = ticker.next() => app.board.tick(now),
        }
    }
    Ok(())
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    render_clock(f, app, chunks[0]);

    let title = Paragraph::new("TODO APP")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(title, chunks[1]);

    render_input(f, app, chunks[2]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[3]);
    render_tasks(f, app, body[0]);
    render_pending(f, app, body[1]);

    render_help(f, app, chunks[4]);
}

fn render_clock(f: &mut Frame, app: &App, area: Rect) {
    let now = app.board.current_time();
    let clock = Paragraph::new(vec![
        Line::from(format_date(&now)),
        Line::from(Span::styled(
            format_time(&now),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::White));
    f.render_widget(clock, area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Input && app.board.editing().is_none();
    let input = app.board.input();

    let line = if focused {
        Line::from(edit_spans(input))
    } else if input.is_empty() {
        Line::from(Span::styled(
            "Add a new task",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(input.as_str().to_string())
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(focused))
            .title("New Task (Enter: Add)"),
    );
    f.render_widget(paragraph, area);
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let board = &app.board;
    let tasks: Vec<ListItem> = board
        .tasks()
        .iter()
        .map(|task| TaskRow::new(board, task).into())
        .collect();

    let tasks_list = List::new(tasks)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(app.focus == Focus::Tasks))
                .title("Tasks"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(tasks_list, area, &mut app.task_list_state);
}

fn render_pending(f: &mut Frame, app: &App, area: Rect) {
    let pending: Vec<ListItem> = app
        .board
        .pending_tasks()
        .into_iter()
        .map(|task| ListItem::new(task.text.clone()))
        .collect();

    let pending_list = List::new(pending)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pending Tasks (Last 24 hours)"),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(pending_list, area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let hints = if app.board.editing().is_some() {
        "Enter: Save • Esc/↑/↓/Tab: Save and leave • Ctrl+C: Quit"
    } else {
        match app.focus {
            Focus::Input => "Enter: Add • Tab/Esc: Tasks • Ctrl+C: Quit",
            Focus::Tasks => concat!(
                "↑/↓: Navigate • Space: Done • e: Edit • d: Delete • ",
                "a/Tab: New task • q: Quit"
            ),
        }
    };
    let help = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for follow mode.
//!
//! Provides a ratatui-based terminal interface with the library browser,
//! the open sheet with its cursor, and a status line. The UI only reads the
//! session projection and turns terminal input into session events.

mod library;
mod sheet;
mod status;

pub use library::LibraryWidget;
pub use sheet::{scroll_offset, SheetWidget};
pub use status::{StatusInfo, StatusWidget};

use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::control::{ControlAction, KeyboardController};
use crate::input::KeyPress;
use crate::library::LibraryWatcher;
use crate::playback::SheetView;
use crate::session::{Session, SessionEvent};

/// How long a status message stays up
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// How often the forwarder checks its stop flag
const FORWARD_POLL: Duration = Duration::from_millis(50);

/// Terminal UI application
pub struct App {
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Hotkeys
    controller: KeyboardController,
    /// Target frame rate
    frame_rate: u32,
    /// Inner area of the sheet panel at the last draw
    sheet_area: Rect,
    /// First sheet line drawn at the last draw
    sheet_scroll: usize,
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new app, taking over the terminal
    pub fn new(controller: KeyboardController) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            controller,
            frame_rate: 60,
            sheet_area: Rect::default(),
            sheet_scroll: 0,
            status_message: None,
        })
    }

    /// Set frame rate
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 120);
    }

    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn clear_expired_status(&mut self) {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }

    /// Run until the session asks to quit
    pub fn run(&mut self, session: &mut Session, watcher: Option<LibraryWatcher>) -> Result<()> {
        let forwarder = watcher.map(|w| LibraryForwarder::spawn(w, session.channel()));
        let result = self.event_loop(session);
        if let Some(forwarder) = forwarder {
            forwarder.stop();
        }
        result
    }

    fn event_loop(&mut self, session: &mut Session) -> Result<()> {
        while !session.should_quit() {
            session.drain();
            self.clear_expired_status();
            self.draw(session)?;

            let Some(event) = self.poll_event()? else {
                continue;
            };
            let view = session.view();
            if let Some(event) = self.translate(event, &view) {
                if let SessionEvent::Action(action) = &event {
                    self.announce(*action, session);
                }
                if let Err(e) = session.handle(event) {
                    warn!("{:#}", e);
                    self.set_status(format!("Error: {}", e));
                }
            }
        }
        Ok(())
    }

    fn announce(&mut self, action: ControlAction, session: &Session) {
        match action {
            ControlAction::ToggleNoobMode => {
                let state = if session.noob_mode() { "off" } else { "on" };
                self.set_status(format!("Noob mode {}", state));
            }
            ControlAction::TogglePlay if session.sheet().is_none() => {
                self.set_status("Open a sheet first (Enter)");
            }
            _ => {}
        }
    }

    /// Poll for events with timeout
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Turn a terminal event into a session event
    fn translate(&self, event: Event, view: &SheetView) -> Option<SessionEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                resolve_key(&self.controller, key.code, key.modifiers)
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                click_target(view, self.sheet_area, self.sheet_scroll, mouse.column, mouse.row)
                    .map(|(line, token)| SessionEvent::Seek { line, token })
            }
            _ => None,
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, session: &Session) -> io::Result<()> {
        let view = session.view();
        let status = status_info(session, &view);
        let message = self.status_message.as_ref().map(|(m, _)| m.clone());
        let controller = &self.controller;
        let mut sheet_area = Rect::default();
        let mut sheet_scroll = 0;

        self.terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: header, content, footer
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Status
                    Constraint::Min(5),    // Library + sheet
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            frame.render_widget(
                StatusWidget::new(&status).block(Block::default().borders(Borders::ALL)),
                chunks[0],
            );

            let panels = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(chunks[1]);

            frame.render_widget(
                LibraryWidget::new(session.library())
                    .selected(Some(session.selected()))
                    .block(Block::default().borders(Borders::ALL).title(" Library ")),
                panels[0],
            );

            let block = Block::default().borders(Borders::ALL).title(" Sheet ");
            sheet_area = block.inner(panels[1]);
            sheet_scroll = scroll_offset(&view, sheet_area.height);
            frame.render_widget(
                SheetWidget::new(&view).scroll(sheet_scroll).block(block),
                panels[1],
            );

            render_status_bar(frame, chunks[2], message.as_deref());

            if session.show_help() {
                render_help_overlay(frame, area, controller);
            }
        })?;

        self.sheet_area = sheet_area;
        self.sheet_scroll = sheet_scroll;
        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Thread moving watcher events onto the session channel.
///
/// Runs until stopped, until the watcher disconnects or until the session
/// channel is closed.
struct LibraryForwarder {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl LibraryForwarder {
    fn spawn(watcher: LibraryWatcher, tx: Sender<SessionEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                match watcher.recv_timeout(FORWARD_POLL) {
                    Ok(event) => {
                        debug!(?event, "library event");
                        if tx.send(SessionEvent::LibraryChanged(event)).is_err() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("library watcher stopped");
                        break;
                    }
                }
            }
        });

        Self { stop, handle }
    }

    /// Ask the thread to finish and wait for it
    fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.handle.join().is_err() {
            warn!("library forwarder thread panicked");
        }
    }
}

/// Hotkeys win; other plain keys go to follow mode
pub fn resolve_key(
    controller: &KeyboardController,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<SessionEvent> {
    if let Some(action) = controller.get_action(code, modifiers) {
        return Some(SessionEvent::Action(action));
    }
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match code {
        KeyCode::Char(_) => Some(SessionEvent::Key(KeyPress::from_key_event(code, modifiers))),
        _ => None,
    }
}

/// Line and token under a click inside the sheet panel
pub fn click_target(
    view: &SheetView,
    area: Rect,
    scroll: usize,
    column: u16,
    row: u16,
) -> Option<(usize, usize)> {
    let inside = column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height;
    if !inside {
        return None;
    }

    let line = scroll + (row - area.y) as usize;
    let line_view = view.lines.get(line)?;
    let token = line_view
        .token_at_column((column - area.x) as usize)
        .unwrap_or(0);
    Some((line, token))
}

fn status_info(session: &Session, view: &SheetView) -> StatusInfo {
    StatusInfo {
        title: session.sheet().map(|s| {
            if s.artist.is_empty() {
                s.title.clone()
            } else {
                format!("{} - {}", s.title, s.artist)
            }
        }),
        status: view.status,
        playing: session.is_playing(),
        noob_mode: session.noob_mode(),
        transpose: view.transpose,
        pending: view
            .pending_chord
            .as_ref()
            .map(|notes| notes.iter().collect()),
    }
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, message: Option<&str>) {
    let text = if let Some(msg) = message {
        Span::styled(msg.to_string(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Enter: Open | Ctrl+P: Play/Pause | Ctrl+R: Restart | Ctrl+N: Noob | F1: Help | Ctrl+Q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Help lines, one per action, grouped by category
fn help_lines(controller: &KeyboardController) -> Vec<Line<'static>> {
    let grouped = controller.bindings_by_category();
    let mut lines = Vec::new();

    for category in ["Playback", "Library", "UI"] {
        let Some(bindings) = grouped.get(category) else {
            continue;
        };
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            category.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));

        for action in ControlAction::ALL {
            let Some(binding) = bindings.iter().find(|b| b.action == action) else {
                continue;
            };
            let keys = controller.shortcuts_for(action).join("/");
            lines.push(Line::from(format!("  {:<16}{}", keys, binding.description)));
        }
    }

    lines
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, controller: &KeyboardController) {
    let help_text = help_lines(controller);

    // Calculate centered area
    let width = 50.min(area.width.saturating_sub(4));
    let height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);
    frame.render_widget(Paragraph::new(help_text), inner);
}

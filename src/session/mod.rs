// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Single owner of library, open sheet and follow-mode state.
//!
//! Key presses, hotkeys, clicks and file-system changes all arrive as
//! [`SessionEvent`]s and are applied one at a time. Producers on other
//! threads send through [`Session::channel`]; the owning thread applies
//! queued events with [`Session::drain`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::control::ControlAction;
use crate::input::KeyPress;
use crate::library::{load_sheet, LibraryEvent, SheetLibrary};
use crate::playback::{
    KeyOutcome, Matcher, MatcherOptions, PlaybackSnapshot, PlayerStatus, SheetLine, SheetView,
};
use crate::sheet::{Sheet, SheetDraft};

/// Input applied to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A key that no hotkey claimed
    Key(KeyPress),
    /// A resolved hotkey
    Action(ControlAction),
    /// Click on a token
    Seek { line: usize, token: usize },
    /// Open a sheet file
    Open(PathBuf),
    /// Something changed under the library root
    LibraryChanged(LibraryEvent),
    /// Write a new sheet, or overwrite `existing`
    Save {
        draft: SheetDraft,
        existing: Option<PathBuf>,
    },
    /// Remove a sheet file
    Delete(PathBuf),
}

/// Follow-mode session
pub struct Session {
    library: SheetLibrary,
    sheet: Option<Sheet>,
    matcher: Matcher,
    playing: bool,
    selected: usize,
    show_help: bool,
    quit: bool,
    last_outcome: Option<KeyOutcome>,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
}

impl Session {
    /// Create a session over a scanned library
    pub fn new(library: SheetLibrary, options: MatcherOptions) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            library,
            sheet: None,
            matcher: Matcher::new(options),
            playing: false,
            selected: 0,
            show_help: false,
            quit: false,
            last_outcome: None,
            event_tx,
            event_rx,
        }
    }

    /// Sender for events produced on other threads
    pub fn channel(&self) -> Sender<SessionEvent> {
        self.event_tx.clone()
    }

    /// Apply every queued event, returning how many were handled
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            if let Err(e) = self.handle(event) {
                warn!("Session event failed: {:#}", e);
            }
            handled += 1;
        }
        handled
    }

    /// Apply one event
    pub fn handle(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::Key(press) => self.key(&press),
            SessionEvent::Action(action) => self.action(action),
            SessionEvent::Seek { line, token } => {
                self.matcher.seek(line, token);
            }
            SessionEvent::Open(path) => self.open(&path),
            SessionEvent::LibraryChanged(event) => self.library_changed(&event)?,
            SessionEvent::Save { draft, existing } => {
                self.save_sheet(&draft, existing.as_deref())?;
            }
            SessionEvent::Delete(path) => self.delete_sheet(&path)?,
        }
        Ok(())
    }

    fn key(&mut self, press: &KeyPress) {
        if !self.playing {
            return;
        }
        let outcome = self.matcher.press(press);
        if outcome.snapshot.status == PlayerStatus::End {
            debug!("sheet finished");
            self.playing = false;
        }
        self.last_outcome = Some(outcome);
    }

    fn action(&mut self, action: ControlAction) {
        debug!(action = action.name(), "hotkey");
        match action {
            ControlAction::TogglePlay => self.toggle_play(),
            ControlAction::Restart => {
                self.matcher.restart();
            }
            ControlAction::ToggleNoobMode => {
                let noob = !self.matcher.options().noob_mode;
                self.matcher.set_noob_mode(noob);
                info!(noob, "noob mode");
            }
            ControlAction::SeekPreviousLine => self.seek_previous_line(),
            ControlAction::SeekNextLine => {
                let line = self.matcher.state().current_line;
                if line < self.matcher.lines().len() {
                    self.matcher.seek(line + 1, 0);
                }
            }
            ControlAction::SelectPrevious => {
                self.selected = self.selected.saturating_sub(1);
            }
            ControlAction::SelectNext => {
                let count = self.library.sheets().count();
                if self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            ControlAction::OpenSelected => {
                if let Some(path) = self.selected_sheet().and_then(|s| s.path.clone()) {
                    self.open(&path);
                }
            }
            ControlAction::ToggleHelp => self.show_help = !self.show_help,
            ControlAction::Quit => self.quit = true,
        }
    }

    fn toggle_play(&mut self) {
        if !self.matcher.is_loaded() {
            warn!("No sheet open");
            return;
        }
        if self.playing {
            self.playing = false;
        } else {
            if self.matcher.status() == PlayerStatus::End {
                self.matcher.restart();
            }
            self.playing = true;
        }
        info!(playing = self.playing, "follow mode");
    }

    /// Previous line with something to press, or the start
    fn seek_previous_line(&mut self) {
        let current = self.matcher.state().current_line;
        let target = self.matcher.lines()[..current.min(self.matcher.lines().len())]
            .iter()
            .rposition(|line| match line {
                SheetLine::Notes { tokens, .. } => tokens.iter().any(|t| !t.is_skippable()),
                SheetLine::Directive { .. } => false,
            })
            .unwrap_or(0);
        self.matcher.seek(target, 0);
    }

    /// Read a sheet from disk and start from its beginning
    pub fn open(&mut self, path: &Path) {
        let sheet = load_sheet(path);
        info!(path = %path.display(), title = %sheet.title, "sheet opened");

        self.matcher.load(&sheet);
        self.playing = false;
        self.last_outcome = None;
        if let Some(index) = self
            .library
            .sheets()
            .position(|s| s.path.as_deref().is_some_and(|p| same_path(p, path)))
        {
            self.selected = index;
        }
        self.sheet = Some(sheet);
    }

    /// Save a draft through the library.
    ///
    /// Saving over the open sheet reloads it and resets playback.
    pub fn save_sheet(&mut self, draft: &SheetDraft, existing: Option<&Path>) -> Result<PathBuf> {
        let path = self.library.save(draft, existing)?;
        self.clamp_selection();
        if self.is_open(&path) {
            self.open(&path);
        }
        Ok(path)
    }

    /// Delete a sheet file, closing it if it is open
    pub fn delete_sheet(&mut self, path: &Path) -> Result<()> {
        let was_open = self.is_open(path);
        self.library.delete(path)?;
        self.clamp_selection();
        if was_open {
            info!(path = %path.display(), "open sheet deleted");
            self.sheet = None;
            self.matcher.unload();
            self.playing = false;
            self.last_outcome = None;
        }
        Ok(())
    }

    fn is_open(&self, path: &Path) -> bool {
        self.sheet
            .as_ref()
            .and_then(|s| s.path.as_deref())
            .is_some_and(|open| same_path(open, path))
    }

    fn clamp_selection(&mut self) {
        let count = self.library.sheets().count();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    fn library_changed(&mut self, event: &LibraryEvent) -> Result<()> {
        if let LibraryEvent::Error(e) = event {
            warn!("Library watcher error: {}", e);
            return Ok(());
        }

        self.library.scan()?;
        self.clamp_selection();

        if let Some(changed) = event.path() {
            if self.is_open(changed) {
                debug!(path = %changed.display(), "open sheet changed on disk");
                let open = self.sheet.as_ref().and_then(|s| s.path.clone());
                if let Some(open) = open {
                    self.open(&open);
                }
            }
        }
        Ok(())
    }

    pub fn library(&self) -> &SheetLibrary {
        &self.library
    }

    /// Open sheet, if any
    pub fn sheet(&self) -> Option<&Sheet> {
        self.sheet.as_ref()
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Whether key presses are being followed
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn noob_mode(&self) -> bool {
        self.matcher.options().noob_mode
    }

    /// Index of the highlighted sheet in library order
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_sheet(&self) -> Option<&Sheet> {
        self.library.sheets().nth(self.selected)
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Outcome of the last followed key press
    pub fn last_outcome(&self) -> Option<&KeyOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.matcher.snapshot()
    }

    pub fn view(&self) -> SheetView {
        self.matcher.view()
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::tempdir;

    fn session_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Session) {
        let dir = tempdir().unwrap();
        for (name, text) in files {
            fs::write(dir.path().join(name), text).unwrap();
        }
        let library = SheetLibrary::open(dir.path(), "txt").unwrap();
        (dir, Session::new(library, MatcherOptions::default()))
    }

    fn type_text(session: &mut Session, text: &str) {
        for c in text.chars() {
            session.handle(SessionEvent::Key(KeyPress::from_char(c))).unwrap();
        }
    }

    #[test]
    fn test_keys_ignored_until_playing() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\n")]);
        session.open(&dir.path().join("a.txt"));
        assert_eq!(session.snapshot().status, PlayerStatus::AwaitingToken);

        type_text(&mut session, "a");
        assert_eq!(session.matcher().state().current_token, 0);

        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        assert!(session.is_playing());
        type_text(&mut session, "a");
        assert_eq!(session.matcher().state().current_token, 1);
    }

    #[test]
    fn test_finishing_stops_playing_and_replay_restarts() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\n")]);
        session.open(&dir.path().join("a.txt"));
        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        type_text(&mut session, "ab");

        assert_eq!(session.snapshot().status, PlayerStatus::End);
        assert!(!session.is_playing());

        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        assert!(session.is_playing());
        assert_eq!(session.snapshot().status, PlayerStatus::AwaitingToken);
        assert_eq!(session.matcher().state().current_line, 0);
    }

    #[test]
    fn test_toggle_play_without_sheet() {
        let (_dir, mut session) = session_with(&[]);
        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        assert!(!session.is_playing());
        assert_eq!(session.snapshot().status, PlayerStatus::Idle);
    }

    #[test]
    fn test_select_and_open() {
        let (_dir, mut session) = session_with(&[
            ("b.txt", "title=Beta\nqw\n"),
            ("a.txt", "title=Alpha\nas\n"),
        ]);
        assert_eq!(session.selected_sheet().unwrap().title, "Alpha");

        session.handle(SessionEvent::Action(ControlAction::SelectNext)).unwrap();
        session.handle(SessionEvent::Action(ControlAction::SelectNext)).unwrap();
        assert_eq!(session.selected(), 1);

        session.handle(SessionEvent::Action(ControlAction::OpenSelected)).unwrap();
        assert_eq!(session.sheet().unwrap().title, "Beta");

        session.handle(SessionEvent::Action(ControlAction::SelectPrevious)).unwrap();
        session.handle(SessionEvent::Action(ControlAction::SelectPrevious)).unwrap();
        assert_eq!(session.selected(), 0);
    }

    #[test]
    fn test_line_seeking() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\n+2\ncd\nef\n")]);
        session.open(&dir.path().join("a.txt"));

        session.handle(SessionEvent::Action(ControlAction::SeekNextLine)).unwrap();
        // Directive line is passed over
        assert_eq!(session.matcher().state().current_line, 2);
        assert_eq!(session.matcher().state().transpose, 2);

        session.handle(SessionEvent::Action(ControlAction::SeekPreviousLine)).unwrap();
        assert_eq!(session.matcher().state().current_line, 0);
        assert_eq!(session.matcher().state().transpose, 0);

        session.handle(SessionEvent::Seek { line: 3, token: 1 }).unwrap();
        assert_eq!(session.matcher().state().current_line, 3);
        assert_eq!(session.matcher().state().current_token, 1);
    }

    #[test]
    fn test_noob_mode_toggle() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nA\n")]);
        session.open(&dir.path().join("a.txt"));
        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();

        type_text(&mut session, "a");
        assert_eq!(session.snapshot().status, PlayerStatus::AwaitingToken);

        session.handle(SessionEvent::Action(ControlAction::ToggleNoobMode)).unwrap();
        assert!(session.noob_mode());
        type_text(&mut session, "a");
        assert_eq!(session.snapshot().status, PlayerStatus::End);
    }

    #[test]
    fn test_open_sheet_reloads_on_change() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\n")]);
        let path = dir.path().join("a.txt");
        session.open(&path);
        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        type_text(&mut session, "a");
        assert_eq!(session.matcher().state().current_token, 1);

        fs::write(&path, "title=A2\nxyz\n").unwrap();
        session
            .handle(SessionEvent::LibraryChanged(LibraryEvent::Changed(path.clone())))
            .unwrap();

        assert_eq!(session.sheet().unwrap().title, "A2");
        assert_eq!(session.matcher().state().current_token, 0);
        assert!(!session.is_playing());
        assert_eq!(session.library().sheets().next().unwrap().title, "A2");
    }

    #[test]
    fn test_other_change_keeps_position() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\n")]);
        session.open(&dir.path().join("a.txt"));
        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        type_text(&mut session, "a");

        let new_path = dir.path().join("b.txt");
        fs::write(&new_path, "title=B\nq\n").unwrap();
        session
            .handle(SessionEvent::LibraryChanged(LibraryEvent::Created(new_path)))
            .unwrap();

        assert_eq!(session.library().sheets().count(), 2);
        assert_eq!(session.matcher().state().current_token, 1);
        assert!(session.is_playing());
    }

    #[test]
    fn test_events_from_other_threads() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\n")]);
        let tx = session.channel();
        let path = dir.path().join("a.txt");

        let producer = thread::spawn(move || {
            tx.send(SessionEvent::Open(path)).unwrap();
            tx.send(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
            for c in "ab".chars() {
                tx.send(SessionEvent::Key(KeyPress::from_char(c))).unwrap();
            }
        });
        producer.join().unwrap();

        assert_eq!(session.drain(), 4);
        assert_eq!(session.snapshot().status, PlayerStatus::End);
        assert_eq!(session.drain(), 0);
    }

    #[test]
    fn test_saving_open_sheet_resets_playback() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\ncd\n")]);
        let path = dir.path().join("a.txt");
        session.open(&path);
        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        type_text(&mut session, "abc");
        assert_eq!(session.matcher().state().current_line, 1);

        let mut draft = SheetDraft::from_sheet(session.sheet().unwrap());
        draft.body = "+2\nqw\ncd".to_string();
        session
            .handle(SessionEvent::Save {
                draft,
                existing: Some(path.clone()),
            })
            .unwrap();

        let state = session.matcher().state();
        assert_eq!((state.current_line, state.current_token), (1, 0));
        assert_eq!(state.transpose, 2);
        assert!(!session.is_playing());
        assert_eq!(session.sheet().unwrap().notes, vec!["+2", "qw", "cd"]);
    }

    #[test]
    fn test_saving_new_sheet_keeps_position() {
        let (dir, mut session) = session_with(&[("a.txt", "title=A\nab\n")]);
        session.open(&dir.path().join("a.txt"));
        session.handle(SessionEvent::Action(ControlAction::TogglePlay)).unwrap();
        type_text(&mut session, "a");

        let draft = SheetDraft {
            title: "B".to_string(),
            body: "zx".to_string(),
            ..Default::default()
        };
        let path = session.save_sheet(&draft, None).unwrap();

        assert_eq!(path, dir.path().join("B.txt"));
        assert_eq!(session.library().sheets().count(), 2);
        assert_eq!(session.matcher().state().current_token, 1);
        assert!(session.is_playing());
    }

    #[test]
    fn test_invalid_draft_is_rejected() {
        let (_dir, mut session) = session_with(&[]);
        let draft = SheetDraft {
            title: "  ".to_string(),
            body: "qw".to_string(),
            ..Default::default()
        };
        let result = session.handle(SessionEvent::Save {
            draft,
            existing: None,
        });
        assert!(result.is_err());
        assert!(session.library().is_empty());
    }

    #[test]
    fn test_deleting_open_sheet_closes_it() {
        let (dir, mut session) = session_with(&[
            ("a.txt", "title=A\nab\n"),
            ("b.txt", "title=B\nqw\n"),
        ]);
        let path = dir.path().join("b.txt");
        session.open(&path);
        assert_eq!(session.selected(), 1);

        session.handle(SessionEvent::Delete(path.clone())).unwrap();

        assert!(!path.exists());
        assert!(session.sheet().is_none());
        assert_eq!(session.snapshot().status, PlayerStatus::Idle);
        assert_eq!(session.selected(), 0);
        assert_eq!(session.library().sheets().count(), 1);
    }

    #[test]
    fn test_help_and_quit() {
        let (_dir, mut session) = session_with(&[]);
        session.handle(SessionEvent::Action(ControlAction::ToggleHelp)).unwrap();
        assert!(session.show_help());
        session.handle(SessionEvent::Action(ControlAction::Quit)).unwrap();
        assert!(session.should_quit());
    }
}

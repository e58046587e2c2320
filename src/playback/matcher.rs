// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cursor state machine for follow mode.
//!
//! The matcher owns a classified copy of the sheet lines and a
//! [`PlaybackState`]. Every transition (load, key press, seek) runs to
//! completion and leaves the cursor either on a token that needs a key press
//! or at the end of the sheet. It is not thread-safe; hosts deliver events
//! to it one at a time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PlaybackSnapshot, PlaybackState, PlayerStatus, SheetLine, SheetView, TransposeMode};
use crate::input::KeyPress;
use crate::sheet::{Sheet, Token};

/// Matching options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherOptions {
    /// Accept letters in either case and ignore shift on other keys.
    ///
    /// Chords capture this flag when they are first visited; toggling it
    /// while a chord is half pressed does not change that chord.
    pub noob_mode: bool,
    /// How directives combine
    pub transpose_mode: TransposeMode,
}

/// Result of offering a key press to the matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The cursor moved past a token
    pub advanced: bool,
    /// A chord accepted at least one note without completing
    pub matched: bool,
    /// State after the press
    pub snapshot: PlaybackSnapshot,
}

/// Follow-mode cursor over a loaded sheet
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    lines: Vec<SheetLine>,
    loaded: bool,
    state: PlaybackState,
    options: MatcherOptions,
}

impl Matcher {
    /// Create a matcher with no sheet loaded
    pub fn new(options: MatcherOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Load a sheet and move to its first playable token
    pub fn load(&mut self, sheet: &Sheet) -> PlaybackSnapshot {
        self.load_lines(&sheet.notes)
    }

    /// Load raw note lines and move to the first playable token
    pub fn load_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> PlaybackSnapshot {
        self.lines = lines.iter().map(|l| SheetLine::classify(l.as_ref())).collect();
        self.loaded = true;
        debug!(lines = self.lines.len(), "sheet loaded into matcher");
        self.restart()
    }

    /// Drop the loaded sheet
    pub fn unload(&mut self) {
        self.lines.clear();
        self.loaded = false;
        self.state = PlaybackState::default();
    }

    /// Reset to the start of the loaded sheet
    pub fn restart(&mut self) -> PlaybackSnapshot {
        self.state = PlaybackState::default();
        if self.loaded {
            self.settle();
        }
        self.snapshot()
    }

    /// Classified lines of the loaded sheet
    pub fn lines(&self) -> &[SheetLine] {
        &self.lines
    }

    /// Check if a sheet is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current playback state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Current options
    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Change noob mode for chords visited from now on
    pub fn set_noob_mode(&mut self, noob_mode: bool) {
        self.options.noob_mode = noob_mode;
    }

    /// Change how directives combine. Applies from the next load, restart or seek.
    pub fn set_transpose_mode(&mut self, mode: TransposeMode) {
        self.options.transpose_mode = mode;
    }

    /// Current status
    pub fn status(&self) -> PlayerStatus {
        if !self.loaded {
            PlayerStatus::Idle
        } else if self.current_token().is_some() {
            PlayerStatus::AwaitingToken
        } else {
            PlayerStatus::End
        }
    }

    /// Copy of the state for presentation
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status(),
            state: self.state.clone(),
        }
    }

    /// Read-only projection for rendering
    pub fn view(&self) -> SheetView {
        SheetView::build(self)
    }

    /// Token the cursor is waiting on
    pub fn current_token(&self) -> Option<&Token> {
        self.lines
            .get(self.state.current_line)
            .and_then(|line| line.tokens().get(self.state.current_token))
    }

    /// Notes of the current chord that are still unpressed
    pub fn remaining_chord_notes(&self) -> Option<&BTreeSet<char>> {
        self.state.active_chord.get(&self.state.current_token)
    }

    /// Normalize a physical press with the current mode and offer it
    pub fn press(&mut self, press: &KeyPress) -> KeyOutcome {
        let candidates = press.candidates(self.options.noob_mode);
        self.on_key(&candidates)
    }

    /// Offer normalized key candidates to the current token.
    ///
    /// At most one token is passed per press; filler, empty chords,
    /// directives and exhausted lines after it are skipped without input.
    pub fn on_key<S: AsRef<str>>(&mut self, candidates: &[S]) -> KeyOutcome {
        let keys: Vec<char> = candidates.iter().filter_map(|c| single_char(c.as_ref())).collect();
        let index = self.state.current_token;

        let (advanced, matched) = match self.current_token().cloned() {
            None => (false, false),
            Some(Token::Char(c)) => (keys.contains(&c), false),
            Some(Token::Filler(_)) => (false, false),
            Some(Token::Chord { notes, .. }) => {
                let noob = self.options.noob_mode;
                let remaining = self
                    .state
                    .active_chord
                    .entry(index)
                    .or_insert_with(|| materialize_chord(&notes, noob));

                let before = remaining.len();
                for key in &keys {
                    remaining.remove(key);
                }
                let complete = remaining.is_empty();
                (complete, !complete && remaining.len() < before)
            }
        };

        if advanced {
            self.state.active_chord.remove(&index);
            self.state.current_token += 1;
            self.settle();
            debug!(
                line = self.state.current_line,
                token = self.state.current_token,
                "cursor advanced"
            );
        }

        KeyOutcome {
            advanced,
            matched,
            snapshot: self.snapshot(),
        }
    }

    /// Jump to a token chosen by the user.
    ///
    /// Transpose is rebuilt from the directives above the target line, then
    /// the cursor moves forward to the first playable token at or after the
    /// target. A line past the end lands on the end.
    pub fn seek(&mut self, line: usize, token: usize) -> PlaybackSnapshot {
        if !self.loaded {
            return self.snapshot();
        }

        let line = line.min(self.lines.len());
        let mode = self.options.transpose_mode;
        let transpose = self.lines[..line]
            .iter()
            .filter_map(SheetLine::directive)
            .fold(0, |acc, value| mode.apply(acc, value));

        self.state = PlaybackState {
            current_line: line,
            current_token: if line < self.lines.len() { token } else { 0 },
            transpose,
            active_chord: Default::default(),
        };
        self.settle();
        debug!(line, token, transpose, "seek");
        self.snapshot()
    }

    /// Move forward until the cursor rests on a token needing input, or the end.
    ///
    /// Directives are consumed before filler skipping on every line entered,
    /// and the two repeat until neither moves the cursor.
    fn settle(&mut self) {
        let mode = self.options.transpose_mode;

        while let Some(line) = self.lines.get(self.state.current_line) {
            match line {
                SheetLine::Directive { value, .. } => {
                    self.state.transpose = mode.apply(self.state.transpose, *value);
                }
                SheetLine::Notes { tokens, .. } => {
                    let skipped = tokens[self.state.current_token.min(tokens.len())..]
                        .iter()
                        .take_while(|t| t.is_skippable())
                        .count();
                    self.state.current_token += skipped;
                    if self.state.current_token < tokens.len() {
                        return;
                    }
                }
            }
            self.state.current_line += 1;
            self.state.current_token = 0;
        }

        self.state.current_line = self.lines.len();
        self.state.current_token = 0;
    }
}

/// Build the set of notes a chord still needs, adding both cases in noob mode.
///
/// Case mappings that expand to several characters (`ß` to `SS`) are not
/// added; the note keeps only its own character.
fn materialize_chord(notes: &BTreeSet<char>, noob_mode: bool) -> BTreeSet<char> {
    if !noob_mode {
        return notes.clone();
    }
    let mut set = BTreeSet::new();
    for &c in notes {
        set.insert(c);
        set.extend(single_mapping(c.to_lowercase()));
        set.extend(single_mapping(c.to_uppercase()));
    }
    set
}

fn single_mapping(mut mapping: impl Iterator<Item = char>) -> Option<char> {
    match (mapping.next(), mapping.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

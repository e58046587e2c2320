// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Follow-mode playback.
//!
//! This module provides:
//! - Line classification (transpose directive or playable notes)
//! - The serializable playback state
//! - The [`Matcher`] that advances a cursor through a sheet on key presses
//! - A read-only [`SheetView`] projection for rendering

pub mod matcher;
pub mod view;

pub use matcher::{KeyOutcome, Matcher, MatcherOptions};
pub use view::{Highlight, LineView, SheetView};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::sheet::{detect_transpose, tokenize, Token};

/// How a transpose directive combines with the running value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransposeMode {
    /// Each directive adds to the running value
    #[default]
    Cumulative,
    /// Each directive replaces the running value
    Absolute,
}

impl TransposeMode {
    /// Apply a directive value to the running transpose
    pub fn apply(self, current: i32, value: i32) -> i32 {
        match self {
            TransposeMode::Cumulative => current.saturating_add(value),
            TransposeMode::Absolute => value,
        }
    }
}

/// A sheet line, classified once when the sheet is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetLine {
    /// Transpose directive, consumed without key presses
    Directive { text: String, value: i32 },
    /// Playable line
    Notes { text: String, tokens: Vec<Token> },
}

impl SheetLine {
    /// Classify a raw line. Directives are never tokenized.
    pub fn classify(raw: &str) -> Self {
        match detect_transpose(raw) {
            Some(value) => SheetLine::Directive {
                text: raw.to_string(),
                value,
            },
            None => SheetLine::Notes {
                text: raw.to_string(),
                tokens: tokenize(raw),
            },
        }
    }

    /// Raw text of the line
    pub fn text(&self) -> &str {
        match self {
            SheetLine::Directive { text, .. } | SheetLine::Notes { text, .. } => text,
        }
    }

    /// Directive value, if this is a directive
    pub fn directive(&self) -> Option<i32> {
        match self {
            SheetLine::Directive { value, .. } => Some(*value),
            SheetLine::Notes { .. } => None,
        }
    }

    /// Tokens of a playable line (empty for directives)
    pub fn tokens(&self) -> &[Token] {
        match self {
            SheetLine::Directive { .. } => &[],
            SheetLine::Notes { tokens, .. } => tokens,
        }
    }
}

/// Cursor position and accumulated transpose
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Line awaiting input (equal to the line count at the end)
    pub current_line: usize,
    /// Token within the current line
    pub current_token: usize,
    /// Running transpose from directives passed so far
    pub transpose: i32,
    /// Notes still to press, keyed by the chord's token index
    pub active_chord: BTreeMap<usize, BTreeSet<char>>,
}

/// Observable playback status.
///
/// Directive lines and exhausted lines are resolved inside each transition,
/// so they never show up as a status of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// No sheet loaded
    Idle,
    /// Waiting for the key(s) of the current token
    AwaitingToken,
    /// Past the last line
    End,
}

/// A copy of the playback state handed to presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub status: PlayerStatus,
    pub state: PlaybackState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose_mode_apply() {
        assert_eq!(TransposeMode::Cumulative.apply(2, 3), 5);
        assert_eq!(TransposeMode::Cumulative.apply(2, -5), -3);
        assert_eq!(TransposeMode::Absolute.apply(2, 3), 3);
        assert_eq!(TransposeMode::Cumulative.apply(i32::MAX, 1), i32::MAX);
    }

    #[test]
    fn test_classify() {
        let line = SheetLine::classify("+2");
        assert_eq!(line.directive(), Some(2));
        assert!(line.tokens().is_empty());

        let line = SheetLine::classify("ab[cd]");
        assert_eq!(line.directive(), None);
        assert_eq!(line.tokens().len(), 3);
        assert_eq!(line.text(), "ab[cd]");
    }

    #[test]
    fn test_transpose_mode_serde() {
        let mode: TransposeMode = serde_yaml::from_str("absolute").unwrap();
        assert_eq!(mode, TransposeMode::Absolute);
    }
}

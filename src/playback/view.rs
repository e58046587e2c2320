// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Read-only projection of playback for presentation.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{Matcher, PlayerStatus};
use crate::sheet::Token;

/// Character range of the token under the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Token index within the line
    pub token: usize,
    /// Character offset of the token in the line text
    pub start: usize,
    /// Width of the token in characters
    pub len: usize,
}

/// One line as presentation sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineView {
    pub index: usize,
    pub text: String,
    /// Tokens of a playable line, empty for directives
    pub tokens: Vec<Token>,
    /// Directive value, rendered faded
    pub directive: Option<i32>,
    /// Present on the cursor line only
    pub highlight: Option<Highlight>,
}

impl LineView {
    /// Whether this line is a transpose directive
    pub fn is_directive(&self) -> bool {
        self.directive.is_some()
    }

    /// Character offset where token `index` starts
    pub fn token_offset(&self, index: usize) -> usize {
        self.tokens.iter().take(index).map(Token::width).sum()
    }

    /// Token rendered at character column `col`.
    ///
    /// Columns past the end of the line map to the last token.
    pub fn token_at_column(&self, col: usize) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let mut start = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            let end = start + token.width();
            if col < end {
                return Some(i);
            }
            start = end;
        }
        Some(self.tokens.len() - 1)
    }
}

/// Whole-sheet projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetView {
    pub status: PlayerStatus,
    pub lines: Vec<LineView>,
    /// Cursor line, absent at the end or when idle
    pub cursor_line: Option<usize>,
    pub transpose: i32,
    /// Unpressed notes of a half-played chord
    pub pending_chord: Option<BTreeSet<char>>,
}

impl SheetView {
    pub(super) fn build(matcher: &Matcher) -> Self {
        let status = matcher.status();
        let state = matcher.state();
        let cursor_line = match status {
            PlayerStatus::AwaitingToken => Some(state.current_line),
            _ => None,
        };

        let lines = matcher
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let mut view = LineView {
                    index,
                    text: line.text().to_string(),
                    tokens: line.tokens().to_vec(),
                    directive: line.directive(),
                    highlight: None,
                };
                if cursor_line == Some(index) {
                    let token = state.current_token;
                    view.highlight = view.tokens.get(token).map(|t| Highlight {
                        token,
                        start: view.token_offset(token),
                        len: t.width(),
                    });
                }
                view
            })
            .collect();

        Self {
            status,
            lines,
            cursor_line,
            transpose: state.transpose,
            pending_chord: matcher.remaining_chord_notes().cloned(),
        }
    }
}

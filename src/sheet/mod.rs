// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord sheet model.
//!
//! A sheet file is plain text: optional `title=`, `artist=` and `creator=`
//! header lines followed by note lines. This module provides:
//! - Best-effort parsing of sheet text into a [`Sheet`]
//! - The line tokenizer and transpose directive detector
//! - [`SheetDraft`] for creating and editing sheets

pub mod token;
pub mod transpose;

pub use token::{is_filler, render, tokenize, Token, FILLER_CHARS, INVISIBLE_JOINER};
pub use transpose::{detect_transpose, is_directive};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a sheet for saving
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("sheet title is empty")]
    MissingTitle,

    #[error("sheet has no note lines")]
    MissingNotes,
}

/// Header keys recognised at the top of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKey {
    Title,
    Artist,
    Creator,
}

impl HeaderKey {
    const ALL: [HeaderKey; 3] = [HeaderKey::Title, HeaderKey::Artist, HeaderKey::Creator];

    fn prefix(self) -> &'static str {
        match self {
            HeaderKey::Title => "title=",
            HeaderKey::Artist => "artist=",
            HeaderKey::Creator => "creator=",
        }
    }

    /// Match a trimmed line against `key=value`, returning the key and trimmed value
    fn parse(line: &str) -> Option<(HeaderKey, &str)> {
        Self::ALL.iter().find_map(|&key| {
            let prefix = key.prefix();
            let head = line.get(..prefix.len())?;
            if head.eq_ignore_ascii_case(prefix) {
                Some((key, line[prefix.len()..].trim()))
            } else {
                None
            }
        })
    }
}

/// A parsed song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// File the sheet was loaded from (identity within the library)
    pub path: Option<PathBuf>,
    /// Song title
    pub title: String,
    /// Song artist
    pub artist: String,
    /// Who transcribed the sheet
    pub creator: String,
    /// Note lines, trimmed, blank lines removed
    pub notes: Vec<String>,
}

impl Sheet {
    /// Parse sheet text, using `fallback_title` when no usable title header exists
    pub fn parse(text: &str, fallback_title: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self::from_lines(&lines, fallback_title)
    }

    /// Parse already-split lines
    pub fn from_lines<S: AsRef<str>>(lines: &[S], fallback_title: &str) -> Self {
        let mut title: Option<String> = None;
        let mut artist = String::new();
        let mut creator = String::new();
        let mut content_start = lines.len();

        for (i, raw) in lines.iter().enumerate() {
            match HeaderKey::parse(raw.as_ref().trim()) {
                Some((HeaderKey::Title, value)) => title = Some(value.to_string()),
                Some((HeaderKey::Artist, value)) => artist = value.to_string(),
                Some((HeaderKey::Creator, value)) => creator = value.to_string(),
                None => {
                    content_start = i;
                    break;
                }
            }
        }

        let notes = lines[content_start..]
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        let title = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => fallback_title.to_string(),
        };

        Self {
            path: None,
            title,
            artist,
            creator,
            notes,
        }
    }

    /// Parse sheet text read from `path`, falling back to the file stem as title
    pub fn from_file_text<P: AsRef<Path>>(path: P, text: &str) -> Self {
        let path = path.as_ref();
        let mut sheet = Self::parse(text, &title_from_path(path));
        sheet.path = Some(path.to_path_buf());
        sheet
    }

    /// Count the notes a player has to press.
    ///
    /// Every visible character counts except chord brackets, braces and
    /// hyphens, which gives a rough size for the sheet editor.
    pub fn note_count(&self) -> usize {
        self.notes.iter().map(|l| count_notes(l)).sum()
    }

    /// Serialize back to sheet file text
    pub fn to_text(&self) -> String {
        let mut lines = vec![format!("title={}", self.title)];
        if !self.artist.trim().is_empty() {
            lines.push(format!("artist={}", self.artist));
        }
        if !self.creator.trim().is_empty() {
            lines.push(format!("creator={}", self.creator));
        }
        lines.extend(self.notes.iter().cloned());

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// File stem of a path, used as the default title
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Count playable characters in free-form note text
pub fn count_notes(text: &str) -> usize {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '[' | ']' | '{' | '}' | '-'))
        .count()
}

/// A sheet being created or edited, before it is written to disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetDraft {
    /// Song title (required)
    pub title: String,
    /// Song artist
    pub artist: String,
    /// Transcriber
    pub creator: String,
    /// Raw note text as typed, one line per row
    pub body: String,
}

impl SheetDraft {
    /// Start a draft from an existing sheet
    pub fn from_sheet(sheet: &Sheet) -> Self {
        Self {
            title: sheet.title.clone(),
            artist: sheet.artist.clone(),
            creator: sheet.creator.clone(),
            body: sheet.notes.join("\n"),
        }
    }

    /// Number of notes currently typed
    pub fn note_count(&self) -> usize {
        count_notes(&self.body)
    }

    /// Validate the draft and build the sheet it describes
    pub fn build(&self) -> Result<Sheet, SheetError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SheetError::MissingTitle);
        }

        let notes: Vec<String> = self
            .body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if notes.is_empty() {
            return Err(SheetError::MissingNotes);
        }

        Ok(Sheet {
            path: None,
            title: title.to_string(),
            artist: self.artist.trim().to_string(),
            creator: self.creator.trim().to_string(),
            notes,
        })
    }
}

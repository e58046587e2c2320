// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key press normalization.
//!
//! Hosts report physical keys (the key itself plus whether shift was held).
//! The normalizer turns a press into the characters it may stand for, so
//! playback can compare them against sheet tokens.

use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};

/// A physical key on a US keyboard layout
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Letter key, stored upper case like the platform key name
    Letter(char),
    /// Top-row digit key (0-9)
    Digit(u8),
    Minus,
    Equals,
    Slash,
    Period,
    Comma,
    Semicolon,
    Quote,
    Backslash,
    OpenBracket,
    CloseBracket,
    /// Any other key, identified by its platform name
    Other(String),
}

const DIGIT_SHIFTED: [char; 10] = [')', '!', '@', '#', '$', '%', '^', '&', '*', '('];

impl Key {
    /// Glyphs printed by this key without and with shift
    pub fn glyphs(&self) -> (String, String) {
        let pair = |a: char, b: char| (a.to_string(), b.to_string());
        match self {
            Key::Letter(c) => {
                let name = c.to_ascii_uppercase().to_string();
                (name.clone(), name)
            }
            Key::Digit(d) => {
                let d = (*d % 10) as usize;
                let digit = char::from_digit(d as u32, 10).unwrap_or('0');
                pair(digit, DIGIT_SHIFTED[d])
            }
            Key::Minus => pair('-', '_'),
            Key::Equals => pair('=', '+'),
            Key::Slash => pair('/', '?'),
            Key::Period => pair('.', '>'),
            Key::Comma => pair(',', '<'),
            Key::Semicolon => pair(';', ':'),
            Key::Quote => pair('\'', '"'),
            Key::Backslash => pair('\\', '|'),
            Key::OpenBracket => pair('[', '{'),
            Key::CloseBracket => pair(']', '}'),
            Key::Other(name) => (name.clone(), name.clone()),
        }
    }

    /// Find the physical key that prints `c`, and whether shift is needed
    pub fn from_char(c: char) -> (Key, bool) {
        if c.is_ascii_alphabetic() {
            return (Key::Letter(c.to_ascii_uppercase()), c.is_ascii_uppercase());
        }
        if let Some(d) = c.to_digit(10) {
            return (Key::Digit(d as u8), false);
        }
        if let Some(d) = DIGIT_SHIFTED.iter().position(|&s| s == c) {
            return (Key::Digit(d as u8), true);
        }

        let punctuation = [
            Key::Minus,
            Key::Equals,
            Key::Slash,
            Key::Period,
            Key::Comma,
            Key::Semicolon,
            Key::Quote,
            Key::Backslash,
            Key::OpenBracket,
            Key::CloseBracket,
        ];
        for key in punctuation {
            let (plain, shifted) = key.glyphs();
            if plain.starts_with(c) {
                return (key, false);
            }
            if shifted.starts_with(c) {
                return (key, true);
            }
        }

        match c {
            ' ' => (Key::Other("Space".to_string()), false),
            _ => (Key::Other(c.to_string()), false),
        }
    }
}

/// A key press as delivered by an input source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    /// Physical key
    pub key: Key,
    /// Whether shift was held
    pub shift: bool,
}

impl KeyPress {
    /// Create a new key press
    pub fn new(key: Key, shift: bool) -> Self {
        Self { key, shift }
    }

    /// The press needed to type `c`
    pub fn from_char(c: char) -> Self {
        let (key, shift) = Key::from_char(c);
        Self { key, shift }
    }

    /// Convert a terminal key event.
    ///
    /// Terminals report the typed character rather than the physical key,
    /// so shifted glyphs are mapped back to the key that produces them.
    pub fn from_key_event(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let held_shift = modifiers.contains(KeyModifiers::SHIFT);
        match code {
            KeyCode::Char(c) => {
                let (key, shift) = Key::from_char(c);
                Self::new(key, shift || held_shift)
            }
            KeyCode::F(n) => Self::new(Key::Other(format!("F{}", n)), held_shift),
            other => Self::new(Key::Other(format!("{:?}", other)), held_shift),
        }
    }

    /// Candidate characters for this press
    pub fn candidates(&self, noob_mode: bool) -> Vec<String> {
        normalize_key(&self.key, self.shift, noob_mode)
    }
}

/// Turn a physical key press into the characters it may match.
///
/// Letters follow shift (upper case with shift, lower without); in noob
/// mode both cases are offered. Other keys give their shifted or plain glyph;
/// in noob mode both are offered. Duplicates are removed, order kept.
pub fn normalize_key(key: &Key, shift: bool, noob_mode: bool) -> Vec<String> {
    let (plain, shifted) = key.glyphs();

    let letter = {
        let mut chars = plain.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => Some(c),
            _ => None,
        }
    };

    let candidates = match (letter, noob_mode) {
        (Some(c), false) => {
            let cased: String = if shift {
                c.to_uppercase().collect()
            } else {
                c.to_lowercase().collect()
            };
            vec![cased]
        }
        (Some(c), true) => vec![c.to_lowercase().collect(), c.to_uppercase().collect()],
        (None, false) => vec![if shift { shifted } else { plain }],
        (None, true) => vec![plain, shifted],
    };

    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

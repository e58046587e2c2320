// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hotkey handling.
//!
//! Hotkeys are resolved before a key press reaches playback, so they use
//! modifiers or non-character keys that never appear in sheets.

pub mod keyboard;

pub use keyboard::{format_shortcut, parse_shortcut, KeyBinding, KeyboardController, Shortcut};

use std::str::FromStr;

/// Action that can be triggered by a hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    // Playback
    /// Start or pause follow mode
    TogglePlay,
    /// Go back to the start of the sheet
    Restart,
    /// Toggle case/shift leniency
    ToggleNoobMode,
    /// Jump to the previous line
    SeekPreviousLine,
    /// Jump to the next line
    SeekNextLine,

    // Library
    /// Highlight the previous sheet in the library
    SelectPrevious,
    /// Highlight the next sheet in the library
    SelectNext,
    /// Open the highlighted sheet
    OpenSelected,

    // UI
    /// Toggle help display
    ToggleHelp,
    /// Quit application
    Quit,
}

impl ControlAction {
    /// Every action, in help display order
    pub const ALL: [ControlAction; 10] = [
        ControlAction::TogglePlay,
        ControlAction::Restart,
        ControlAction::ToggleNoobMode,
        ControlAction::SeekPreviousLine,
        ControlAction::SeekNextLine,
        ControlAction::SelectPrevious,
        ControlAction::SelectNext,
        ControlAction::OpenSelected,
        ControlAction::ToggleHelp,
        ControlAction::Quit,
    ];

    /// Config name of the action
    pub fn name(&self) -> &'static str {
        match self {
            ControlAction::TogglePlay => "toggle_play",
            ControlAction::Restart => "restart",
            ControlAction::ToggleNoobMode => "toggle_noob_mode",
            ControlAction::SeekPreviousLine => "seek_previous_line",
            ControlAction::SeekNextLine => "seek_next_line",
            ControlAction::SelectPrevious => "select_previous",
            ControlAction::SelectNext => "select_next",
            ControlAction::OpenSelected => "open_selected",
            ControlAction::ToggleHelp => "toggle_help",
            ControlAction::Quit => "quit",
        }
    }

    /// Check if this is a playback action
    pub fn is_playback(&self) -> bool {
        matches!(
            self,
            ControlAction::TogglePlay
                | ControlAction::Restart
                | ControlAction::ToggleNoobMode
                | ControlAction::SeekPreviousLine
                | ControlAction::SeekNextLine
        )
    }

    /// Check if this is a library action
    pub fn is_library(&self) -> bool {
        matches!(
            self,
            ControlAction::SelectPrevious | ControlAction::SelectNext | ControlAction::OpenSelected
        )
    }
}

impl FromStr for ControlAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ControlAction::ALL
            .iter()
            .copied()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| format!("Unknown action: {}", s))
    }
}

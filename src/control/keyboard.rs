// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard shortcut handling.
//!
//! Provides configurable bindings for playback, library and UI actions.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};
use tracing::warn;

use super::ControlAction;

/// A keyboard shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Key code
    pub code: KeyCode,
    /// Required modifiers
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    /// Create a new shortcut
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Create a shortcut with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a shortcut with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    /// Check if this shortcut matches a key event
    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self == &Self::normalized(code, modifiers)
    }

    /// Build a lookup key from a terminal event.
    ///
    /// Terminals report Ctrl+R as `Char('r')` or `Char('R')` depending on
    /// platform, so letters are folded to lower case.
    fn normalized(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let code = match code {
            KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => {
                KeyCode::Char(c.to_ascii_lowercase())
            }
            other => other,
        };
        Self::new(code, modifiers)
    }
}

/// A keyboard binding (shortcut to action)
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// The shortcut
    pub shortcut: Shortcut,
    /// The action to perform
    pub action: ControlAction,
    /// Description for help display
    pub description: String,
    /// Category for grouping in help
    pub category: String,
}

impl KeyBinding {
    /// Create a new key binding
    pub fn new(shortcut: Shortcut, action: ControlAction, description: impl Into<String>) -> Self {
        Self {
            shortcut,
            action,
            description: description.into(),
            category: "General".to_string(),
        }
    }

    /// Set the category
    pub fn category(mut self, cat: impl Into<String>) -> Self {
        self.category = cat.into();
        self
    }
}

/// Keyboard controller with configurable bindings
#[derive(Debug, Clone)]
pub struct KeyboardController {
    bindings: HashMap<Shortcut, KeyBinding>,
}

impl KeyboardController {
    /// Create an empty keyboard controller
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a keyboard controller with default bindings
    pub fn with_defaults() -> Self {
        let mut controller = Self::new();
        controller.add_default_bindings();
        controller
    }

    /// Add default keyboard bindings
    fn add_default_bindings(&mut self) {
        // Playback
        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('p')),
            ControlAction::TogglePlay,
            "Play/Pause",
        ).category("Playback"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::F(5)),
            ControlAction::TogglePlay,
            "Play/Pause",
        ).category("Playback"));

        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('r')),
            ControlAction::Restart,
            "Restart Sheet",
        ).category("Playback"));

        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('n')),
            ControlAction::ToggleNoobMode,
            "Toggle Noob Mode",
        ).category("Playback"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::PageUp),
            ControlAction::SeekPreviousLine,
            "Previous Line",
        ).category("Playback"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::PageDown),
            ControlAction::SeekNextLine,
            "Next Line",
        ).category("Playback"));

        // Library
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Up),
            ControlAction::SelectPrevious,
            "Previous Sheet",
        ).category("Library"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Down),
            ControlAction::SelectNext,
            "Next Sheet",
        ).category("Library"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Enter),
            ControlAction::OpenSelected,
            "Open Sheet",
        ).category("Library"));

        // UI
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::F(1)),
            ControlAction::ToggleHelp,
            "Toggle Help",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('q')),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('c')),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));
    }

    /// Add a key binding
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.insert(binding.shortcut.clone(), binding);
    }

    /// Remove a key binding
    pub fn remove(&mut self, shortcut: &Shortcut) -> Option<KeyBinding> {
        self.bindings.remove(shortcut)
    }

    /// Rebind an action, dropping its previous shortcuts
    pub fn rebind(&mut self, action: ControlAction, shortcut: Shortcut) {
        let previous = self
            .bindings
            .values()
            .find(|b| b.action == action)
            .map(|b| (b.description.clone(), b.category.clone()));
        self.bindings.retain(|_, b| b.action != action);

        let (description, category) =
            previous.unwrap_or_else(|| (action.name().to_string(), "General".to_string()));
        self.add(KeyBinding::new(shortcut, action, description).category(category));
    }

    /// Apply `action = "shortcut"` overrides from configuration.
    ///
    /// Entries with an unknown action or shortcut are logged and skipped.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) {
        for (name, shortcut) in overrides {
            let action = match name.parse::<ControlAction>() {
                Ok(action) => action,
                Err(e) => {
                    warn!("Ignoring keyboard override: {}", e);
                    continue;
                }
            };
            match parse_shortcut(shortcut) {
                Some(shortcut) => self.rebind(action, shortcut),
                None => warn!("Ignoring keyboard override for {}: bad shortcut {:?}", name, shortcut),
            }
        }
    }

    /// Get action for a key event
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<ControlAction> {
        let shortcut = Shortcut::normalized(code, modifiers);
        self.bindings.get(&shortcut).map(|b| b.action)
    }

    /// Get all bindings for help display
    pub fn bindings(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.values()
    }

    /// Get bindings grouped by category
    pub fn bindings_by_category(&self) -> HashMap<String, Vec<&KeyBinding>> {
        let mut grouped: HashMap<String, Vec<&KeyBinding>> = HashMap::new();

        for binding in self.bindings.values() {
            grouped
                .entry(binding.category.clone())
                .or_default()
                .push(binding);
        }

        grouped
    }

    /// Shortcuts bound to an action, formatted for display
    pub fn shortcuts_for(&self, action: ControlAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .values()
            .filter(|b| b.action == action)
            .map(|b| format_shortcut(&b.shortcut))
            .collect();
        keys.sort();
        keys
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Format a shortcut for display
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts = Vec::new();

    if shortcut.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl".to_string());
    }
    if shortcut.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt".to_string());
    }
    if shortcut.modifiers.contains(KeyModifiers::SHIFT) {
        parts.push("Shift".to_string());
    }

    let key = match shortcut.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        _ => "?".to_string(),
    };

    parts.push(key);
    parts.join("+")
}

/// Parse a shortcut written like `Ctrl+Shift+R` or `F5`
pub fn parse_shortcut(text: &str) -> Option<Shortcut> {
    let mut modifiers = KeyModifiers::NONE;
    let mut code = None;

    for part in text.split('+').map(str::trim) {
        if code.is_some() {
            // Key must come last
            return None;
        }
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "space" => code = Some(KeyCode::Char(' ')),
            "up" => code = Some(KeyCode::Up),
            "down" => code = Some(KeyCode::Down),
            "left" => code = Some(KeyCode::Left),
            "right" => code = Some(KeyCode::Right),
            "enter" | "return" => code = Some(KeyCode::Enter),
            "esc" | "escape" => code = Some(KeyCode::Esc),
            "tab" => code = Some(KeyCode::Tab),
            "backspace" => code = Some(KeyCode::Backspace),
            "delete" => code = Some(KeyCode::Delete),
            "home" => code = Some(KeyCode::Home),
            "end" => code = Some(KeyCode::End),
            "pageup" => code = Some(KeyCode::PageUp),
            "pagedown" => code = Some(KeyCode::PageDown),
            other => {
                let mut chars = other.chars();
                code = match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyCode::Char(c)),
                    (Some('f'), Some(_)) => other[1..].parse::<u8>().ok().map(KeyCode::F),
                    _ => None,
                };
                code?;
            }
        }
    }

    code.map(|code| Shortcut::normalized(code, modifiers))
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application configuration.
//!
//! Settings live in a TOML file. Every field has a default, so a missing or
//! partial file is valid.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::control::KeyboardController;
use crate::library::DEFAULT_EXTENSION;
use crate::playback::{MatcherOptions, TransposeMode};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "keysheet.toml";

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Sheet library settings
    #[serde(default)]
    pub library: LibraryConfig,
    /// Follow-mode settings
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Hotkey overrides, action name to shortcut (e.g. `restart = "Ctrl+R"`)
    #[serde(default)]
    pub keyboard: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            debug!(path = ?path.as_ref(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize configuration to TOML")
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_toml()?;
        fs::write(path.as_ref(), text)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Matcher options from the playback section
    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            noob_mode: self.playback.noob_mode,
            transpose_mode: self.playback.transpose_mode,
        }
    }

    /// Default hotkeys with the keyboard overrides applied
    pub fn keyboard_controller(&self) -> KeyboardController {
        let mut controller = KeyboardController::with_defaults();
        controller.apply_overrides(&self.keyboard);
        controller
    }
}

/// Sheet library settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryConfig {
    /// Library root directory
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Sheet file extension, without dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Reload when files change on disk
    #[serde(default = "default_watch")]
    pub watch: bool,
    /// Debounce for modification bursts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from("Sheets")
}
fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
fn default_watch() -> bool {
    true
}
fn default_debounce_ms() -> u64 {
    250
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: default_extension(),
            watch: default_watch(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Follow-mode settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Start with noob mode on
    #[serde(default)]
    pub noob_mode: bool,
    /// `cumulative` or `absolute`
    #[serde(default)]
    pub transpose_mode: TransposeMode,
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord sheet viewer with keyboard follow mode.
//!
//! A sheet is a plain text file of note letters and bracketed chords. In
//! follow mode a cursor walks the sheet as the player presses the matching
//! keys, skipping spacing and applying transpose directive lines on the way.

pub mod config;
pub mod control;
pub mod input;
pub mod library;
pub mod playback;
pub mod session;
pub mod sheet;
pub mod ui;

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sheet library.
//!
//! A library is a root directory of sheet files, grouped by the folder they
//! live in. This module provides:
//! - Recursive scanning into [`SheetFolder`]s
//! - Saving and deleting sheets
//! - Tolerant file reads with retry
//! - A file system watcher for live reload

pub mod watcher;

pub use watcher::{LibraryEvent, LibraryWatcher};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::sheet::{title_from_path, Sheet, SheetDraft};

/// Default sheet file extension
pub const DEFAULT_EXTENSION: &str = "txt";

const READ_RETRIES: usize = 3;
const READ_RETRY_DELAY: Duration = Duration::from_millis(50);

/// A directory in the library and the sheets directly inside it
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFolder {
    /// Directory path
    pub path: PathBuf,
    /// Sheets sorted by title
    pub sheets: Vec<Sheet>,
}

impl SheetFolder {
    /// Create an empty folder entry
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheets: Vec::new(),
        }
    }

    /// Display name (last path component)
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(Unknown)".to_string())
    }

    fn sort(&mut self) {
        self.sheets.sort_by(|a, b| a.title.cmp(&b.title));
    }
}

/// Sheet files under a root directory
#[derive(Debug, Clone)]
pub struct SheetLibrary {
    root: PathBuf,
    extension: String,
    folders: Vec<SheetFolder>,
}

impl SheetLibrary {
    /// Open a library and scan it, creating the root if needed
    pub fn open<P: AsRef<Path>>(root: P, extension: &str) -> Result<Self> {
        let mut library = Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
            folders: Vec::new(),
        };
        library.scan()?;
        Ok(library)
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sheet file extension (without dot)
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Folders, root first
    pub fn folders(&self) -> &[SheetFolder] {
        &self.folders
    }

    /// All sheets in folder order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.folders.iter().flat_map(|f| f.sheets.iter())
    }

    /// Check if no folder holds a sheet
    pub fn is_empty(&self) -> bool {
        self.sheets().next().is_none()
    }

    /// Find a sheet by file path
    pub fn find(&self, path: &Path) -> Option<&Sheet> {
        self.sheets().find(|s| s.path.as_deref() == Some(path))
    }

    /// Check whether a path has the sheet extension
    pub fn is_sheet_path(&self, path: &Path) -> bool {
        has_extension(path, &self.extension)
    }

    /// Rebuild the folder list from disk
    pub fn scan(&mut self) -> Result<()> {
        self.folders = scan(&self.root, &self.extension)?;
        Ok(())
    }

    /// Write a draft to disk and rescan.
    ///
    /// When `existing` is given that file is overwritten, otherwise a file
    /// named after the title is created in the root folder.
    pub fn save(&mut self, draft: &SheetDraft, existing: Option<&Path>) -> Result<PathBuf> {
        let sheet = draft.build()?;

        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create library folder: {:?}", self.root))?;

        let path = match existing {
            Some(path) => path.to_path_buf(),
            None => self
                .root
                .join(format!("{}.{}", safe_file_name(&sheet.title), self.extension)),
        };

        fs::write(&path, sheet.to_text())
            .with_context(|| format!("Failed to write sheet: {:?}", path))?;
        info!(path = %path.display(), title = %sheet.title, "sheet saved");

        self.scan()?;
        Ok(path)
    }

    /// Delete a sheet file and rescan
    pub fn delete(&mut self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("Failed to delete sheet: {:?}", path))?;
        info!(path = %path.display(), "sheet deleted");
        self.scan()
    }
}

/// Scan `root` recursively into folders.
///
/// The root always comes first, even when empty, followed by every
/// subdirectory sorted by path. Files that cannot be read are skipped.
pub fn scan(root: &Path, extension: &str) -> Result<Vec<SheetFolder>> {
    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create library folder: {:?}", root))?;

    let mut folders = vec![SheetFolder::new(root)];

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable library entry: {}", e);
                continue;
            }
        };
        let path = entry.path();

        if entry.file_type().is_dir() {
            folders.push(SheetFolder::new(path));
            continue;
        }
        if !has_extension(path, extension) {
            continue;
        }

        let lines = match try_read_lines(path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(path = %path.display(), "Failed to load sheet: {}", e);
                continue;
            }
        };

        let mut sheet = Sheet::from_lines(&lines, &title_from_path(path));
        sheet.path = Some(path.to_path_buf());

        let parent = path.parent().unwrap_or(root);
        match folders.iter_mut().find(|f| f.path == parent) {
            Some(folder) => folder.sheets.push(sheet),
            None => {
                let mut folder = SheetFolder::new(parent);
                folder.sheets.push(sheet);
                folders.push(folder);
            }
        }
    }

    folders[1..].sort_by(|a, b| a.path.cmp(&b.path));
    for folder in &mut folders {
        folder.sort();
    }

    debug!(
        root = %root.display(),
        folders = folders.len(),
        sheets = folders.iter().map(|f| f.sheets.len()).sum::<usize>(),
        "library scanned"
    );
    Ok(folders)
}

/// Read a sheet file's lines, retrying briefly on failure.
///
/// Another program may still be writing the file when a change is noticed.
/// After the retries run out the failure is logged and no lines are
/// returned, which loads as an empty sheet.
pub fn read_sheet_lines(path: &Path) -> Vec<String> {
    let mut last_error = None;
    for attempt in 0..READ_RETRIES {
        match try_read_lines(path) {
            Ok(lines) => return lines,
            Err(e) => {
                debug!(attempt, path = %path.display(), "sheet read failed: {}", e);
                last_error = Some(e);
                thread::sleep(READ_RETRY_DELAY);
            }
        }
    }
    if let Some(e) = last_error {
        warn!(path = %path.display(), "Giving up reading sheet: {}", e);
    }
    Vec::new()
}

/// Load a sheet file, treating unreadable files as empty
pub fn load_sheet(path: &Path) -> Sheet {
    let lines = read_sheet_lines(path);
    let mut sheet = Sheet::from_lines(&lines, &title_from_path(path));
    sheet.path = Some(path.to_path_buf());
    sheet
}

fn try_read_lines(path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Replace characters that are not allowed in file names
pub fn safe_file_name(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

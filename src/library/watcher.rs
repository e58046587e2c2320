// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File watcher for live library reload.
//!
//! Watches the library root recursively and reports sheet files and folders
//! that appear, disappear or change. Modifications are debounced because
//! editors usually write a file in several steps.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

/// Events emitted by the library watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    /// A sheet file was modified (after debounce)
    Changed(PathBuf),
    /// A sheet file or folder was created
    Created(PathBuf),
    /// A sheet file or folder was removed
    Removed(PathBuf),
    /// The underlying watcher reported an error
    Error(String),
}

impl LibraryEvent {
    /// Path the event refers to
    pub fn path(&self) -> Option<&Path> {
        match self {
            LibraryEvent::Changed(p) | LibraryEvent::Created(p) | LibraryEvent::Removed(p) => {
                Some(p)
            }
            LibraryEvent::Error(_) => None,
        }
    }
}

/// Library watcher with debouncing
pub struct LibraryWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<LibraryEvent>,
    watched_path: PathBuf,
}

impl LibraryWatcher {
    /// Watch `root` for sheet files with `extension`
    ///
    /// # Arguments
    /// * `root` - Library directory (watched recursively)
    /// * `extension` - Sheet file extension, without dot
    /// * `debounce_ms` - Debounce duration in milliseconds (default: 250)
    pub fn new<P: AsRef<Path>>(root: P, extension: &str, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = root.as_ref().to_path_buf();
        let debounce_duration = Duration::from_millis(debounce_ms.unwrap_or(250));
        let extension = extension.trim_start_matches('.').to_string();

        let (event_tx, event_rx): (Sender<LibraryEvent>, Receiver<LibraryEvent>) = mpsc::channel();
        let (notify_tx, notify_rx) = mpsc::channel::<notify::Result<Event>>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = notify_tx.send(res);
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&watched_path, RecursiveMode::Recursive)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        let is_relevant = move |path: &Path| {
            path.is_dir()
                || path
                    .extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&extension))
                    .unwrap_or(false)
        };

        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let mut pending_paths: Vec<PathBuf> = Vec::new();

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(50)) {
                    Ok(Ok(event)) => match event.kind {
                        EventKind::Create(_) => {
                            for path in event.paths.into_iter().filter(|p| is_relevant(p)) {
                                let _ = event_tx.send(LibraryEvent::Created(path));
                            }
                        }
                        EventKind::Remove(_) => {
                            // Removed paths no longer exist, so only the extension can be checked
                            for path in event.paths {
                                if path.extension().is_none() || is_relevant(&path) {
                                    let _ = event_tx.send(LibraryEvent::Removed(path));
                                }
                            }
                        }
                        EventKind::Modify(_) => {
                            for path in event.paths.into_iter().filter(|p| is_relevant(p)) {
                                if !pending_paths.contains(&path) {
                                    pending_paths.push(path);
                                }
                            }
                            last_event_time = Some(Instant::now());
                        }
                        _ => {}
                    },
                    Ok(Err(e)) => {
                        let _ = event_tx.send(LibraryEvent::Error(e.to_string()));
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }

                if let Some(last_time) = last_event_time {
                    if last_time.elapsed() >= debounce_duration {
                        for path in pending_paths.drain(..) {
                            debug!(path = %path.display(), "library file changed");
                            if event_tx.send(LibraryEvent::Changed(path)).is_err() {
                                return;
                            }
                        }
                        last_event_time = None;
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&self) -> Option<LibraryEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// `Disconnected` means the watcher thread has stopped and no more
    /// events will arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<LibraryEvent, RecvTimeoutError> {
        self.event_receiver.recv_timeout(timeout)
    }

    /// Receive all pending events
    pub fn recv_all(&self) -> Vec<LibraryEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Get the path being watched
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::diff::Side;
use crate::events::AppEvent;

/// Watches the two input files and re-reads them when they change on disk.
///
/// Reload events arrive on a channel so the run loop can poll them between
/// frames, the same way it polls the keyboard.
pub struct InputWatcher {
    _watcher: RecommendedWatcher,
    event_rx: Receiver<AppEvent>,
}

impl InputWatcher {
    pub fn new(left: &Path, right: &Path, debounce_ms: u64) -> Result<Self> {
        let left = left
            .canonicalize()
            .context("Failed to resolve left input path")?;
        let right = right
            .canonicalize()
            .context("Failed to resolve right input path")?;

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let (event_tx, event_rx) = mpsc::channel::<AppEvent>();

        let mut watcher =
            notify::recommended_watcher(tx).context("Failed to create file system watcher")?;

        // Editors and the extractor replace files by rename, so watch the
        // parent directories rather than the files themselves.
        let mut dirs: Vec<PathBuf> = Vec::new();
        for path in [&left, &right] {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        for dir in &dirs {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
        }

        let debounce = Duration::from_millis(debounce_ms);

        // Background thread turning raw notify events into reloads.
        thread::spawn(move || {
            let mut previous_contents: HashMap<Side, String> = HashMap::new();
            let mut last_event_time: HashMap<Side, Instant> = HashMap::new();

            while let Ok(result) = rx.recv() {
                match result {
                    Ok(event) => {
                        if !matches!(
                            event.kind,
                            notify::EventKind::Create(_) | notify::EventKind::Modify(_)
                        ) {
                            continue;
                        }

                        let now = Instant::now();
                        for path in event.paths {
                            let side = match path.canonicalize() {
                                Ok(resolved) if resolved == left => Side::Left,
                                Ok(resolved) if resolved == right => Side::Right,
                                _ => continue,
                            };

                            // Debounce rapid events on the same input
                            if let Some(last) = last_event_time.get(&side) {
                                if now.duration_since(*last) < debounce {
                                    continue;
                                }
                            }
                            last_event_time.insert(side, now);

                            match std::fs::read_to_string(&path) {
                                Ok(text) => {
                                    // Skip if content hasn't actually changed
                                    if previous_contents.get(&side) == Some(&text) {
                                        continue;
                                    }
                                    previous_contents.insert(side, text.clone());
                                    tracing::debug!("Reloaded {} input: {}", side, path.display());
                                    if event_tx.send(AppEvent::InputReloaded { side, text }).is_err()
                                    {
                                        return; // Receiver dropped, exit thread
                                    }
                                }
                                Err(err) => {
                                    tracing::warn!(
                                        "Failed to re-read {}: {}",
                                        path.display(),
                                        err
                                    );
                                }
                            }
                        }
                    }
                    Err(err) => {
                        tracing::error!("File watcher error: {}", err);
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_rx,
        })
    }

    pub fn try_recv(&self) -> Result<AppEvent, mpsc::TryRecvError> {
        self.event_rx.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

//! Debounced preference persistence
//!
//! Handlers publish the latest [`PersistedPrefs`] snapshot on a watch
//! channel. A single writer task saves it to `prefs.json` once changes have
//! been quiet for the debounce period, so a burst of updates costs one write.
//! On shutdown the writer flushes whatever is still unsaved.

use shelf_common::PersistedPrefs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// File name of the saved preferences inside the data folder
pub const PREFS_FILE: &str = "prefs.json";

pub fn prefs_path(data_folder: &Path) -> PathBuf {
    data_folder.join(PREFS_FILE)
}

/// Read saved preferences
///
/// A missing file yields defaults silently; an unreadable or corrupt one
/// yields defaults with a warning.
pub fn load_prefs(path: &Path) -> PersistedPrefs {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No saved preferences at {}", path.display());
            return PersistedPrefs::default();
        }
        Err(e) => {
            warn!("Cannot read preferences {}: {}", path.display(), e);
            return PersistedPrefs::default();
        }
    };

    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Ignoring corrupt preferences {}: {}", path.display(), e);
        PersistedPrefs::default()
    })
}

/// Write preferences atomically (temp file, then rename)
pub async fn save_prefs(path: &Path, prefs: &PersistedPrefs) -> shelf_common::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(prefs)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Publishing side of the persister, cheap to clone into handlers
#[derive(Clone)]
pub struct PrefsHandle {
    tx: Arc<watch::Sender<PersistedPrefs>>,
}

impl PrefsHandle {
    /// Schedule `prefs` for saving; identical snapshots are ignored
    pub fn publish(&self, prefs: PersistedPrefs) {
        self.tx.send_if_modified(|current| {
            if *current == prefs {
                false
            } else {
                *current = prefs;
                true
            }
        });
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> PersistedPrefs {
        *self.tx.borrow()
    }
}

/// Owner of the background writer task
pub struct PrefsPersister {
    handle: PrefsHandle,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
    writes: Arc<AtomicUsize>,
}

impl PrefsPersister {
    /// Start the writer; `initial` is what is already on disk
    pub fn spawn(path: PathBuf, initial: PersistedPrefs, debounce: Duration) -> Self {
        let (tx, rx) = watch::channel(initial);
        let (stop, stop_rx) = oneshot::channel();
        let writes = Arc::new(AtomicUsize::new(0));

        let task = tokio::spawn(run_writer(path, initial, rx, debounce, stop_rx, Arc::clone(&writes)));

        Self {
            handle: PrefsHandle { tx: Arc::new(tx) },
            stop,
            task,
            writes,
        }
    }

    pub fn handle(&self) -> PrefsHandle {
        self.handle.clone()
    }

    /// Completed disk writes so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Flush unsaved preferences and stop the writer
    pub async fn shutdown(self) {
        // The writer may already be gone if the channel closed
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            warn!("Preference writer ended abnormally: {}", e);
        }
    }
}

async fn run_writer(
    path: PathBuf,
    mut saved: PersistedPrefs,
    mut rx: watch::Receiver<PersistedPrefs>,
    debounce: Duration,
    mut stop: oneshot::Receiver<()>,
    writes: Arc<AtomicUsize>,
) {
    let mut stopping = false;

    while !stopping {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut stop => break,
        }

        // Quiet period; each further change restarts it
        loop {
            tokio::select! {
                _ = tokio::time::sleep(debounce) => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        stopping = true;
                        break;
                    }
                }
                _ = &mut stop => {
                    stopping = true;
                    break;
                }
            }
        }

        let latest = *rx.borrow_and_update();
        saved = write_if_changed(&path, latest, saved, &writes).await;
    }

    let latest = *rx.borrow();
    write_if_changed(&path, latest, saved, &writes).await;
    debug!("Preference writer stopped");
}

/// Save `latest` unless it matches what is on disk; returns the on-disk value
async fn write_if_changed(
    path: &Path,
    latest: PersistedPrefs,
    saved: PersistedPrefs,
    writes: &AtomicUsize,
) -> PersistedPrefs {
    if latest == saved {
        return saved;
    }

    match save_prefs(path, &latest).await {
        Ok(()) => {
            writes.fetch_add(1, Ordering::SeqCst);
            info!("Saved preferences to {}", path.display());
            latest
        }
        Err(e) => {
            warn!("Failed to save preferences to {}: {}", path.display(), e);
            saved
        }
    }
}

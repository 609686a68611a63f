//! Polling document watcher
//!
//! Watches a control document for replacement writes and delivers the parsed
//! value into a channel. Polling stats the path on every tick, so the watch
//! keeps working across delete + recreate of the document.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Revision identity of a document: modification time and size.
type Fingerprint = (SystemTime, u64);

fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let meta = std::fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

/// Cancellable handle to a running document watch.
///
/// Dropping the handle stops the watch.
pub struct DocumentWatch {
    task: JoinHandle<()>,
}

impl DocumentWatch {
    /// Stop watching. Idempotent.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for DocumentWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Watch a JSON document and send `map(value)` for every replacement write
/// that parses as `T`.
///
/// The revision present when the watch starts is treated as already seen, so
/// a stale document left behind by an earlier process does not fire. Writes
/// that fail to parse are skipped; several writes landing between two polls
/// collapse into one delivery of the final value.
pub fn watch_json<T, M, F>(
    path: PathBuf,
    interval: Duration,
    tx: mpsc::Sender<M>,
    map: F,
) -> DocumentWatch
where
    T: DeserializeOwned + Send + 'static,
    M: Send + 'static,
    F: Fn(T) -> M + Send + 'static,
{
    // Taken before the task is spawned, so a write landing right after this
    // call is never mistaken for pre-existing state.
    let initial = fingerprint(&path);

    let task = tokio::spawn(async move {
        let mut seen = initial;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let current = fingerprint(&path);
            if current == seen {
                continue;
            }
            seen = current;
            if current.is_none() {
                // Document deleted; keep polling the path for a recreate.
                continue;
            }

            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!("failed to read {:?}: {}", path, e);
                    continue;
                }
            };

            match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    if tx.send(map(value)).await.is_err() {
                        // Receiver gone, nothing left to notify.
                        break;
                    }
                }
                Err(e) => debug!("ignoring unparsable document {:?}: {}", path, e),
            }
        }
    });

    DocumentWatch { task }
}

//! File-backed control plane shared by the controller and the driver
//!
//! Three independent JSON documents (selection, command, status) at
//! well-known paths in a per-user runtime directory. Each write fully
//! replaces its document via a temp-file rename, so a concurrent reader
//! sees either the old or the new revision, never a torn one. The
//! last-written document is the whole truth; a freshly started peer reads
//! it once to resynchronize.

mod watch;

pub use watch::{watch_json, DocumentWatch};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::Result;
use crate::types::{CameraSelection, DriverCommand, DriverStatus};

/// Camera selection written by the controller
pub const SELECTION_DOCUMENT: &str = "virtual_camera_config";
/// Command written by the controller
pub const COMMAND_DOCUMENT: &str = "virtual_camera_control";
/// Status written by the driver
pub const STATUS_DOCUMENT: &str = "virtual_camera_status";

/// Get the control document directory
///
/// Uses XDG_RUNTIME_DIR if available, otherwise /tmp
pub fn control_dir() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(runtime_dir).join("confcam")
    } else {
        // Fallback to /tmp with user-specific name
        // SAFETY: libc::getuid() is a simple syscall that returns the real
        // user ID. It has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        PathBuf::from(format!("/tmp/confcam-{}", uid))
    }
}

/// Handle on the three shared control documents
///
/// Cheap to construct on either side of the process boundary; holds no open
/// files between calls.
#[derive(Debug, Clone)]
pub struct ControlChannel {
    dir: PathBuf,
}

impl ControlChannel {
    /// Channel over the default per-user control directory
    pub fn new() -> Self {
        Self::in_dir(control_dir())
    }

    /// Channel over an explicit directory (tests, config override)
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the documents
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the selection document
    pub fn selection_path(&self) -> PathBuf {
        self.dir.join(SELECTION_DOCUMENT)
    }

    /// Path of the command document
    pub fn command_path(&self) -> PathBuf {
        self.dir.join(COMMAND_DOCUMENT)
    }

    /// Path of the status document
    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_DOCUMENT)
    }

    /// Replace the selection document (controller side)
    pub fn write_selection(&self, selection: &CameraSelection) -> Result<()> {
        self.write_document(&self.selection_path(), selection)
    }

    /// Replace the command document (controller side)
    pub fn write_command(&self, command: DriverCommand) -> Result<()> {
        self.write_document(&self.command_path(), &command)
    }

    /// Replace the status document (driver side)
    pub fn write_status(&self, status: &DriverStatus) -> Result<()> {
        self.write_document(&self.status_path(), status)
    }

    /// Last written selection, or `None` when absent or unreadable
    pub fn read_selection(&self) -> Option<CameraSelection> {
        self.read_document(&self.selection_path())
    }

    /// Last written command, or `None` when absent or unreadable
    pub fn read_command(&self) -> Option<DriverCommand> {
        self.read_document(&self.command_path())
    }

    /// Last published driver status, or `None` when absent or unreadable
    ///
    /// `None` is the "status unknown" answer the controller shows as
    /// "driver not running".
    pub fn read_status(&self) -> Option<DriverStatus> {
        self.read_document(&self.status_path())
    }

    /// Whether the driver last reported itself running
    ///
    /// Unknown status counts as not running.
    pub fn is_running(&self) -> bool {
        self.read_status().map(|s| s.is_running).unwrap_or(false)
    }

    /// Watch the selection document (driver side)
    pub fn watch_selection<M, F>(
        &self,
        interval: Duration,
        tx: mpsc::Sender<M>,
        map: F,
    ) -> DocumentWatch
    where
        M: Send + 'static,
        F: Fn(CameraSelection) -> M + Send + 'static,
    {
        watch_json(self.selection_path(), interval, tx, map)
    }

    /// Watch the command document (driver side)
    pub fn watch_command<M, F>(
        &self,
        interval: Duration,
        tx: mpsc::Sender<M>,
        map: F,
    ) -> DocumentWatch
    where
        M: Send + 'static,
        F: Fn(DriverCommand) -> M + Send + 'static,
    {
        watch_json(self.command_path(), interval, tx, map)
    }

    /// Atomic replace: serialize next to the target, then rename over it.
    fn write_document<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }

        let json = serde_json::to_vec(value)?;
        let staging = path.with_extension("tmp");
        std::fs::write(&staging, &json)?;
        std::fs::rename(&staging, path)?;
        Ok(())
    }

    /// Tolerant read: any failure (missing, unreadable, mid-write garbage)
    /// is "no data available".
    fn read_document<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let bytes = std::fs::read(path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("unparsable document {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for ControlChannel {
    fn default() -> Self {
        Self::new()
    }
}

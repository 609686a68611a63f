//! Best-effort exclusive hold on the built-in camera
//!
//! While the driver is running it opens a streaming capture session on the
//! machine's built-in camera so other applications cannot claim it and users
//! end up on the virtual camera instead. Streaming is what makes a V4L2
//! device busy for other processes, so the session is held on a dedicated
//! thread for the whole time the driver runs.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use tracing::{debug, info};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;

use crate::error::{ConfcamError, Result};

/// Exclusive acquisition of the built-in default camera
pub trait BuiltinCamera: Send {
    /// Open the built-in camera exclusively. Idempotent while held.
    fn acquire(&mut self) -> Result<()>;

    /// Release the hold. Safe to call when not held.
    fn release(&mut self);

    /// Whether the camera is currently held.
    fn held(&self) -> bool;
}

/// V4L2-backed hold on the first capture node whose card name matches
pub struct V4lBuiltinCamera {
    match_name: String,
    hold: Option<CaptureHold>,
}

struct CaptureHold {
    release_tx: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl V4lBuiltinCamera {
    /// `match_name` is compared case-insensitively against the V4L2 card
    /// string (e.g. "integrated" for typical laptop webcams).
    pub fn new(match_name: impl Into<String>) -> Self {
        Self {
            match_name: match_name.into(),
            hold: None,
        }
    }
}

fn find_builtin_node(match_name: &str) -> Option<PathBuf> {
    let needle = match_name.to_lowercase();
    for node in v4l::context::enum_devices() {
        let Ok(dev) = Device::with_path(node.path()) else {
            continue;
        };
        let Ok(caps) = dev.query_caps() else {
            continue;
        };
        if caps.card.to_lowercase().contains(&needle) {
            return Some(node.path().to_path_buf());
        }
    }
    None
}

impl BuiltinCamera for V4lBuiltinCamera {
    fn acquire(&mut self) -> Result<()> {
        if self.hold.is_some() {
            return Ok(());
        }

        let Some(path) = find_builtin_node(&self.match_name) else {
            return Err(ConfcamError::capture(format!(
                "no capture device matching '{}' found",
                self.match_name
            )));
        };

        let (release_tx, release_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(), String>>();

        let thread = thread::spawn(move || {
            let mut dev = match Device::with_path(&path) {
                Ok(dev) => dev,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("open {:?}: {}", path, e)));
                    return;
                }
            };
            let mut stream = match MmapStream::with_buffers(&mut dev, Type::VideoCapture, 2) {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("capture session on {:?}: {}", path, e)));
                    return;
                }
            };
            // The first dequeue starts streaming and marks the device busy.
            if let Err(e) = stream.next() {
                let _ = ready_tx.send(Err(format!("start streaming on {:?}: {}", path, e)));
                return;
            }
            let _ = ready_tx.send(Ok(()));
            // Park here; the stream stays open for the whole hold.
            let _ = release_rx.recv();
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("built-in camera held exclusively");
                self.hold = Some(CaptureHold {
                    release_tx,
                    thread: Some(thread),
                });
                Ok(())
            }
            Ok(Err(msg)) => {
                let _ = thread.join();
                Err(ConfcamError::capture(msg))
            }
            Err(_) => {
                let _ = thread.join();
                Err(ConfcamError::capture("capture thread exited unexpectedly"))
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut hold) = self.hold.take() {
            let _ = hold.release_tx.send(());
            if let Some(thread) = hold.thread.take() {
                let _ = thread.join();
            }
            debug!("built-in camera released");
        }
    }

    fn held(&self) -> bool {
        self.hold.is_some()
    }
}

impl Drop for V4lBuiltinCamera {
    fn drop(&mut self) {
        self.release();
    }
}

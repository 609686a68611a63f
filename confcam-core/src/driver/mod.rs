//! Driver-side state machine
//!
//! The driver owns the virtual camera: it watches the selection and command
//! documents, holds the built-in camera while running, resolves which
//! physical device feeds the virtual camera, and publishes its state back
//! through the status document.
//!
//! Everything that mutates driver state arrives as a [`DriverEvent`] on one
//! channel consumed by one task, so handlers never race each other.

mod builtin;
mod source;

pub use builtin::{BuiltinCamera, V4lBuiltinCamera};
pub use source::{FrameSource, VirtualCameraSource};

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::channel::ControlChannel;
use crate::devices::DeviceRegistry;
use crate::error::{ConfcamError, Result};
use crate::types::{CameraSelection, DriverCommand, DriverStatus};

/// Delay between the stop and start halves of a restart
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(1);

/// How often the control documents are polled for changes
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(200);

/// Tunables for the driver loop
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub restart_delay: Duration,
    pub watch_interval: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            restart_delay: DEFAULT_RESTART_DELAY,
            watch_interval: DEFAULT_WATCH_INTERVAL,
        }
    }
}

/// Events consumed by the driver loop
#[derive(Debug, Clone)]
pub enum DriverEvent {
    /// A command document write
    Command(DriverCommand),
    /// A selection document write
    Selection(CameraSelection),
    /// The deferred half of a restart came due
    RestartElapsed,
    /// Stop and exit the loop
    Shutdown,
}

/// Cloneable handle for injecting events into a running driver
#[derive(Clone)]
pub struct DriverHandle {
    tx: mpsc::Sender<DriverEvent>,
}

impl DriverHandle {
    /// Ask the driver to stop and exit its loop
    pub async fn shutdown(&self) {
        let _ = self.tx.send(DriverEvent::Shutdown).await;
    }
}

/// The driver state machine: Stopped (initial) or Running
pub struct Driver {
    channel: ControlChannel,
    registry: Box<dyn DeviceRegistry>,
    builtin: Box<dyn BuiltinCamera>,
    source: Box<dyn FrameSource>,
    options: DriverOptions,
    running: bool,
    current: Option<CameraSelection>,
    last_error: Option<String>,
    last_timestamp: DateTime<Utc>,
    events_tx: mpsc::Sender<DriverEvent>,
    events_rx: Option<mpsc::Receiver<DriverEvent>>,
    pending_restart: Option<JoinHandle<()>>,
}

impl Driver {
    pub fn new(
        channel: ControlChannel,
        registry: Box<dyn DeviceRegistry>,
        builtin: Box<dyn BuiltinCamera>,
        source: Box<dyn FrameSource>,
        options: DriverOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(32);
        Self {
            channel,
            registry,
            builtin,
            source,
            options,
            running: false,
            current: None,
            last_error: None,
            last_timestamp: Utc::now(),
            events_tx,
            events_rx: Some(events_rx),
            pending_restart: None,
        }
    }

    /// Handle for sending events from outside the loop
    pub fn handle(&self) -> DriverHandle {
        DriverHandle {
            tx: self.events_tx.clone(),
        }
    }

    /// Whether the driver is in the Running state
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The last accepted selection
    pub fn current_camera(&self) -> Option<&CameraSelection> {
        self.current.as_ref()
    }

    /// Whether a restart's deferred start is still pending
    pub fn has_pending_restart(&self) -> bool {
        self.pending_restart.is_some()
    }

    /// Status timestamps never go backwards, even if the wall clock does.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let ts = Utc::now().max(self.last_timestamp);
        self.last_timestamp = ts;
        ts
    }

    fn publish_status(&mut self) {
        let status = DriverStatus {
            is_running: self.running,
            current_camera: self.current.clone(),
            error_message: self.last_error.clone(),
            timestamp: self.next_timestamp(),
        };
        if let Err(e) = self.channel.write_status(&status) {
            warn!("failed to publish driver status: {}", e);
        }
    }

    fn start(&mut self) {
        self.running = true;
        match self.builtin.acquire() {
            Ok(()) => self.last_error = None,
            Err(e) => {
                // Not fatal: the virtual camera works without the hold,
                // other apps just keep access to the built-in device.
                warn!("could not hold built-in camera: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
        self.resolve_source();
        self.publish_status();
        info!("driver started");
    }

    fn stop(&mut self) {
        self.running = false;
        self.builtin.release();
        self.publish_status();
        info!("driver stopped");
    }

    fn restart(&mut self) {
        self.stop();
        if let Some(pending) = self.pending_restart.take() {
            // A restart landing mid-delay supersedes the scheduled start.
            pending.abort();
        }
        let tx = self.events_tx.clone();
        let delay = self.options.restart_delay;
        self.pending_restart = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DriverEvent::RestartElapsed).await;
        }));
    }

    fn handle_selection(&mut self, selection: CameraSelection) {
        if selection.is_deselect() {
            info!("camera deselected, falling back to default source");
            self.current = None;
        } else {
            info!(
                "switching to camera {} ({:04x}:{:04x})",
                selection.name, selection.vid, selection.pid
            );
            // The selection is declared intent; it is accepted whether or
            // not the device is attached right now.
            self.current = Some(selection);
        }
        self.resolve_source();
        self.publish_status();
    }

    /// Bind the selected device if it is attached, else the fallback.
    fn resolve_source(&mut self) {
        let device = self.current.as_ref().and_then(|selection| {
            self.registry
                .enumerate()
                .into_iter()
                .find(|device| selection.matches(device))
        });
        self.source.bind(device.as_ref());
    }

    fn devices_changed(&mut self) {
        debug!("USB device set changed");
        if self.running {
            // The selected device may have just appeared or vanished.
            self.resolve_source();
        }
    }

    /// Apply one event. Returns false when the loop should exit.
    ///
    /// Must be called from within a tokio runtime (restart schedules a
    /// deferred task).
    pub fn handle_event(&mut self, event: DriverEvent) -> bool {
        match event {
            DriverEvent::Command(DriverCommand::Start) => self.start(),
            DriverEvent::Command(DriverCommand::Stop) => self.stop(),
            DriverEvent::Command(DriverCommand::Restart) => self.restart(),
            DriverEvent::Command(DriverCommand::Status) => {
                // Reserved; accepted without effect.
            }
            DriverEvent::Selection(selection) => self.handle_selection(selection),
            DriverEvent::RestartElapsed => {
                self.pending_restart = None;
                self.start();
            }
            DriverEvent::Shutdown => {
                self.stop();
                return false;
            }
        }
        true
    }

    /// Run the driver until shutdown.
    ///
    /// Wires the selection watch, the command watch and the hot-plug
    /// subscription into the event loop, publishes an initial Stopped
    /// status, and then processes events one at a time.
    pub async fn run(mut self) -> Result<()> {
        let Some(mut events_rx) = self.events_rx.take() else {
            return Err(ConfcamError::channel("driver event loop already consumed"));
        };

        // Resynchronize declared intent from the last written selection.
        if let Some(selection) = self.channel.read_selection() {
            if !selection.is_deselect() {
                self.current = Some(selection);
            }
        }
        self.publish_status();

        let interval = self.options.watch_interval;
        let _selection_watch =
            self.channel
                .watch_selection(interval, self.events_tx.clone(), DriverEvent::Selection);
        let _command_watch =
            self.channel
                .watch_command(interval, self.events_tx.clone(), DriverEvent::Command);

        let (devices_tx, mut devices_rx) = mpsc::channel(8);
        let _subscription = match self.registry.subscribe(devices_tx) {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                warn!("hot-plug monitoring unavailable: {}", e);
                None
            }
        };
        let mut devices_open = _subscription.is_some();

        info!("driver listening on {:?}", self.channel.dir());

        loop {
            tokio::select! {
                event = events_rx.recv() => match event {
                    Some(event) => {
                        if !self.handle_event(event) {
                            break;
                        }
                    }
                    None => break,
                },
                notice = devices_rx.recv(), if devices_open => match notice {
                    Some(()) => self.devices_changed(),
                    None => devices_open = false,
                },
            }
        }

        Ok(())
    }
}

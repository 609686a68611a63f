//! Mock infrastructure for testing
//!
//! Fakes for the driver's three capability seams: the device registry
//! (synthetic attach/detach batches), the built-in camera hold, and the
//! frame source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use confcam_core::devices::{DeviceRegistry, Subscription};
use confcam_core::driver::{BuiltinCamera, FrameSource};
use confcam_core::error::Result;
use confcam_core::types::CameraDevice;
use confcam_core::ConfcamError;

/// Shorthand for building test devices
pub fn test_device(name: &str, vid: u16, pid: u16) -> CameraDevice {
    CameraDevice {
        name: name.to_string(),
        vid,
        pid,
    }
}

/// Device registry with an injectable device set
///
/// Cloning shares the underlying state, so tests can keep a handle after
/// moving a clone into the driver.
#[derive(Clone)]
pub struct FakeDeviceRegistry {
    inner: Arc<Mutex<FakeInner>>,
}

struct FakeInner {
    devices: Vec<CameraDevice>,
    notify: Option<mpsc::Sender<()>>,
}

impl FakeDeviceRegistry {
    pub fn new(initial: Vec<CameraDevice>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeInner {
                devices: initial,
                notify: None,
            })),
        }
    }

    /// Attach a batch of devices; a subscriber gets exactly one notice.
    pub fn attach_batch(&self, devices: Vec<CameraDevice>) {
        let mut inner = self.inner.lock().unwrap();
        inner.devices.extend(devices);
        Self::notify(&inner);
    }

    /// Detach every device with one of the given (vid, pid) keys; a
    /// subscriber gets exactly one notice.
    pub fn detach_batch(&self, keys: &[(u16, u16)]) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .devices
            .retain(|device| !keys.contains(&(device.vid, device.pid)));
        Self::notify(&inner);
    }

    fn notify(inner: &FakeInner) {
        if let Some(tx) = &inner.notify {
            let _ = tx.try_send(());
        }
    }
}

impl DeviceRegistry for FakeDeviceRegistry {
    fn enumerate(&self) -> Vec<CameraDevice> {
        self.inner.lock().unwrap().devices.clone()
    }

    fn subscribe(&self, notify: mpsc::Sender<()>) -> Result<Subscription> {
        // Devices already present count as the spurious initial batch:
        // recorded, never announced.
        self.inner.lock().unwrap().notify = Some(notify);
        Ok(Subscription::new(tokio::spawn(async {})))
    }
}

/// Observable state of a [`FakeBuiltinCamera`]
#[derive(Default)]
pub struct BuiltinState {
    pub held: AtomicBool,
    pub acquires: AtomicUsize,
    pub releases: AtomicUsize,
    pub fail_acquire: AtomicBool,
}

/// Built-in camera hold that only flips counters
pub struct FakeBuiltinCamera {
    state: Arc<BuiltinState>,
}

impl FakeBuiltinCamera {
    pub fn new() -> (Self, Arc<BuiltinState>) {
        let state = Arc::new(BuiltinState::default());
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl BuiltinCamera for FakeBuiltinCamera {
    fn acquire(&mut self) -> Result<()> {
        self.state.acquires.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_acquire.load(Ordering::SeqCst) {
            return Err(ConfcamError::capture("built-in camera busy"));
        }
        self.state.held.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) {
        if self.state.held.swap(false, Ordering::SeqCst) {
            self.state.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn held(&self) -> bool {
        self.state.held.load(Ordering::SeqCst)
    }
}

/// Frame source that records every bind call
pub struct RecordingFrameSource {
    log: Arc<Mutex<Vec<Option<CameraDevice>>>>,
    bound: Option<CameraDevice>,
}

impl RecordingFrameSource {
    pub fn new() -> (Self, Arc<Mutex<Vec<Option<CameraDevice>>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: log.clone(),
                bound: None,
            },
            log,
        )
    }
}

impl FrameSource for RecordingFrameSource {
    fn bind(&mut self, device: Option<&CameraDevice>) {
        self.log.lock().unwrap().push(device.cloned());
        self.bound = device.cloned();
    }

    fn bound(&self) -> Option<&CameraDevice> {
        self.bound.as_ref()
    }
}

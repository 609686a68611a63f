//! USB video-class device discovery and hot-plug monitoring
//!
//! The registry answers two questions: which video-capable USB devices are
//! attached right now, and when did that set change. Change notices are
//! content-free; interested parties re-enumerate.

mod usb;

pub use usb::UsbDeviceRegistry;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::types::CameraDevice;

/// USB interface class code advertised by video-capture functions
pub const USB_VIDEO_CLASS: u8 = 0x0e;

/// Capability interface over the platform's USB device tree
///
/// The production implementation is [`UsbDeviceRegistry`]; tests drive the
/// driver with a fake that injects synthetic attach/detach batches.
pub trait DeviceRegistry: Send + Sync {
    /// Snapshot of currently attached video-class devices.
    ///
    /// Absence of cameras is a normal state: any failure to query the device
    /// tree yields an empty list, never an error.
    fn enumerate(&self) -> Vec<CameraDevice>;

    /// Register for hot-plug change notices.
    ///
    /// A burst of attach/detach events is collapsed into a single `()` sent
    /// on `notify`; the devices already attached at subscription time do not
    /// produce a notice. Dropping the returned [`Subscription`] unsubscribes.
    fn subscribe(&self, notify: mpsc::Sender<()>) -> Result<Subscription>;
}

/// Cancellable handle to a hot-plug subscription
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Wrap the task that forwards notices for a registry implementation
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Stop delivering notices. Idempotent.
    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! USB device registry backed by nusb

use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::{DeviceRegistry, Subscription, USB_VIDEO_CLASS};
use crate::error::{ConfcamError, Result};
use crate::types::CameraDevice;

/// Device registry over the host's USB bus
#[derive(Debug, Default)]
pub struct UsbDeviceRegistry;

impl UsbDeviceRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceRegistry for UsbDeviceRegistry {
    fn enumerate(&self) -> Vec<CameraDevice> {
        let devices = match nusb::list_devices() {
            Ok(devices) => devices,
            Err(e) => {
                debug!("USB enumeration failed: {}", e);
                return Vec::new();
            }
        };

        // A device qualifies if any interface is video-class; `any`
        // short-circuits, so a device with several video interfaces is
        // still reported once. Missing product strings become empty names
        // rather than dropped entries.
        let mut cameras: Vec<CameraDevice> = devices
            .filter(|info| {
                info.interfaces()
                    .any(|interface| interface.class() == USB_VIDEO_CLASS)
            })
            .map(|info| CameraDevice {
                name: info.product_string().unwrap_or_default().to_string(),
                vid: info.vendor_id(),
                pid: info.product_id(),
            })
            .collect();

        // Stable order across calls with an unchanged device set.
        cameras.sort_by(|a, b| (a.vid, a.pid, &a.name).cmp(&(b.vid, b.pid, &b.name)));
        cameras
    }

    fn subscribe(&self, notify: mpsc::Sender<()>) -> Result<Subscription> {
        let watch = nusb::watch_devices()
            .map_err(|e| ConfcamError::device(format!("hot-plug watch failed: {}", e)))?;

        let task = tokio::spawn(async move {
            let mut watch = std::pin::pin!(watch);
            while let Some(_event) = watch.next().await {
                // Drain the rest of the burst so one physical event (a hub
                // arriving with several devices, say) collapses into a
                // single notice.
                while let Some(Some(_)) = watch.next().now_or_never() {}
                if notify.send(()).await.is_err() {
                    break;
                }
            }
        });

        Ok(Subscription::new(task))
    }
}

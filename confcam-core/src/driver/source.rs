//! Frame source binding for the virtual camera

use tracing::info;

use crate::types::CameraDevice;

/// Where the virtual camera gets its frames from
///
/// `bind(Some(device))` points the output at that capture device;
/// `bind(None)` falls back to the default source. Binding never fails: an
/// absent device is expressed through the fallback path.
pub trait FrameSource: Send {
    fn bind(&mut self, device: Option<&CameraDevice>);

    /// Device currently bound, if any.
    fn bound(&self) -> Option<&CameraDevice>;
}

/// Source selection without the pixel path
///
/// Resolving which device should feed the virtual camera is implemented;
/// moving frames into the output node is not.
// TODO: write frames into a v4l2loopback output node once the capture path lands
#[derive(Debug, Default)]
pub struct VirtualCameraSource {
    bound: Option<CameraDevice>,
}

impl VirtualCameraSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSource for VirtualCameraSource {
    fn bind(&mut self, device: Option<&CameraDevice>) {
        match device {
            Some(device) => {
                info!("using {} as virtual camera source", device);
                self.bound = Some(device.clone());
            }
            None => {
                info!("no selected camera attached, using fallback source");
                self.bound = None;
            }
        }
    }

    fn bound(&self) -> Option<&CameraDevice> {
        self.bound.as_ref()
    }
}

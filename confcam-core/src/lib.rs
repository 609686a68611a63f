//! Confcam Core Library
//!
//! Switch a USB conference camera into a virtual camera device.
//!
//! This library provides:
//! - USB video-class device discovery and hot-plug monitoring
//! - A file-backed JSON control plane between the controller and the driver
//! - The driver state machine that owns the virtual camera
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ Controller CLI  │───▶│ Control Channel  │───▶│ Driver          │
//! │ (select/cmd)    │◀───│ (3 JSON files)   │◀───│ (virtual camera)│
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//!                                                        │
//!                                               ┌────────┴────────┐
//!                                               │ Device Registry │
//!                                               │ (USB hot-plug)  │
//!                                               └─────────────────┘
//! ```

pub mod channel;
pub mod config;
pub mod devices;
pub mod driver;
pub mod error;
pub mod types;

pub use channel::ControlChannel;
pub use config::ConfigFile;
pub use driver::{Driver, DriverHandle, DriverOptions};
pub use error::{ConfcamError, Result};
pub use types::{CameraDevice, CameraSelection, DriverCommand, DriverStatus};

//! Select and deselect commands - write the selection document

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;

use confcam_core::config::ConfigFile;
use confcam_core::devices::{DeviceRegistry, UsbDeviceRegistry};
use confcam_core::types::CameraSelection;

/// Arguments for the select command
#[derive(Args)]
pub struct SelectArgs {
    /// Device id as VID:PID in hex (e.g. 046d:085e)
    device: String,

    /// Display name recorded with the selection (defaults to the
    /// enumerated product name)
    #[arg(short, long)]
    name: Option<String>,
}

/// Point the driver at a camera
pub async fn select(args: SelectArgs) -> Result<()> {
    let (vid, pid) = parse_device_id(&args.device)?;

    let registry = UsbDeviceRegistry::new();
    let attached = registry
        .enumerate()
        .into_iter()
        .find(|device| device.vid == vid && device.pid == pid);

    let name = args
        .name
        .or_else(|| attached.as_ref().map(|device| device.name.clone()))
        .unwrap_or_default();

    let selection = CameraSelection {
        vid,
        pid,
        name: name.clone(),
        timestamp: Utc::now(),
    };

    let config = ConfigFile::load_or_default();
    let channel = config.control_channel();
    channel
        .write_selection(&selection)
        .context("Failed to write selection document")?;

    let shown = if name.is_empty() { "(unnamed)" } else { &name };
    println!("Selected {} [{:04x}:{:04x}].", shown, vid, pid);
    if attached.is_none() {
        println!("Note: the device is not attached right now; the driver falls back to the default source until it appears.");
    }

    Ok(())
}

/// Clear the camera selection
pub async fn deselect() -> Result<()> {
    let config = ConfigFile::load_or_default();
    let channel = config.control_channel();
    channel
        .write_selection(&CameraSelection::deselect())
        .context("Failed to write selection document")?;

    println!("Camera deselected; the driver falls back to the default source.");
    Ok(())
}

fn parse_device_id(s: &str) -> Result<(u16, u16)> {
    let Some((vid, pid)) = s.split_once(':') else {
        bail!("Expected VID:PID in hex, e.g. 046d:085e");
    };
    let vid = u16::from_str_radix(vid, 16).with_context(|| format!("Invalid VID '{}'", vid))?;
    let pid = u16::from_str_radix(pid, 16).with_context(|| format!("Invalid PID '{}'", pid))?;
    if vid == 0 && pid == 0 {
        bail!("0000:0000 is reserved; use `confcam deselect` to clear the selection");
    }
    Ok((vid, pid))
}

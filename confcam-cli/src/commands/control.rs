//! Start/stop/restart commands - write the command document

use anyhow::{Context, Result};

use confcam_core::config::ConfigFile;
use confcam_core::types::DriverCommand;

/// Send a command to the driver
pub async fn control(command: DriverCommand) -> Result<()> {
    let config = ConfigFile::load_or_default();
    let channel = config.control_channel();

    channel
        .write_command(command)
        .context("Failed to write command document")?;

    println!("Sent '{}' to the driver.", command);

    // The driver picks the command up on its next poll; the last written
    // status is still the previous state.
    match channel.read_status() {
        Some(status) => {
            println!(
                "Last reported state: {}.",
                if status.is_running { "running" } else { "stopped" }
            );
            println!("Check again with: confcam status");
        }
        None => {
            println!("No driver status found yet - is `confcam run` active?");
        }
    }

    Ok(())
}

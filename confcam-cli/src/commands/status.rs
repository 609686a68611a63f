//! Status command - read the driver's published status

use anyhow::Result;

use confcam_core::config::ConfigFile;

/// Show the driver's last published status
pub async fn status() -> Result<()> {
    let config = ConfigFile::load_or_default();
    let channel = config.control_channel();

    println!("Confcam - Driver Status\n");

    let Some(status) = channel.read_status() else {
        // Missing or garbled status reads as unknown, which almost always
        // means the driver process is not up.
        println!("Status unknown - no status document in {:?}.", channel.dir());
        println!();
        println!("Start the driver with: confcam run");
        return Ok(());
    };

    println!(
        "  Running:  {}",
        if status.is_running { "yes" } else { "no" }
    );
    match &status.current_camera {
        Some(camera) => {
            let name = if camera.name.is_empty() {
                "(unnamed)"
            } else {
                &camera.name
            };
            println!("  Camera:   {} [{:04x}:{:04x}]", name, camera.vid, camera.pid);
        }
        None => println!("  Camera:   none (default source)"),
    }
    if let Some(error) = &status.error_message {
        println!("  Warning:  {}", error);
    }
    println!("  Updated:  {}", status.timestamp.to_rfc3339());

    Ok(())
}

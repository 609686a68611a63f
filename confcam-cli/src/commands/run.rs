//! Run command - host the driver in the foreground

use anyhow::{Context, Result};
use tokio::signal;

use confcam_core::config::ConfigFile;
use confcam_core::devices::UsbDeviceRegistry;
use confcam_core::driver::{Driver, V4lBuiltinCamera, VirtualCameraSource};

/// Run the virtual camera driver until interrupted
pub async fn run() -> Result<()> {
    let config = ConfigFile::load_or_default();
    let channel = config.control_channel();
    let options = config.driver_options();

    println!("Confcam - Virtual Camera Driver\n");
    println!("  Documents:     {:?}", channel.dir());
    println!("  Poll interval: {} ms", config.driver.poll_interval_ms);
    println!("  Restart delay: {} ms", config.driver.restart_delay_ms);
    println!();
    println!("Press Ctrl+C to stop...\n");

    let driver = Driver::new(
        channel,
        Box::new(UsbDeviceRegistry::new()),
        Box::new(V4lBuiltinCamera::new(config.builtin.match_name.clone())),
        Box::new(VirtualCameraSource::new()),
        options,
    );
    let handle = driver.handle();
    let task = tokio::spawn(driver.run());

    signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    println!("\nShutting down driver...");
    handle.shutdown().await;
    task.await.context("Driver task panicked")??;

    println!("Driver stopped.");
    Ok(())
}

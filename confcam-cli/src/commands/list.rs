//! List cameras command

use anyhow::Result;
use clap::Args;
use tokio::signal;
use tokio::sync::mpsc;

use confcam_core::devices::{DeviceRegistry, UsbDeviceRegistry};

/// Arguments for the list command
#[derive(Args)]
pub struct ListArgs {
    /// Keep watching and reprint the list on hot-plug changes
    #[arg(short, long)]
    watch: bool,
}

/// List attached USB video-class cameras
pub async fn list(args: ListArgs) -> Result<()> {
    let registry = UsbDeviceRegistry::new();

    println!("Confcam - Attached USB Cameras\n");
    print_devices(&registry);

    if args.watch {
        let (tx, mut rx) = mpsc::channel(8);
        let _subscription = registry.subscribe(tx)?;

        println!("\nWatching for device changes. Press Ctrl+C to stop.");
        loop {
            tokio::select! {
                _ = signal::ctrl_c() => break,
                notice = rx.recv() => match notice {
                    Some(()) => {
                        println!();
                        print_devices(&registry);
                    }
                    None => break,
                },
            }
        }
    } else {
        println!("\nSelect one with: confcam select <VID:PID>");
    }

    Ok(())
}

fn print_devices(registry: &UsbDeviceRegistry) {
    let devices = registry.enumerate();

    if devices.is_empty() {
        println!("No USB cameras found.");
        return;
    }

    println!("{:<6} {:<6} {}", "VID", "PID", "Name");
    println!("{}", "-".repeat(50));

    for device in devices {
        let name = if device.name.is_empty() {
            "(unnamed)"
        } else {
            &device.name
        };
        println!(
            "{:<6} {:<6} {}",
            format!("{:04x}", device.vid),
            format!("{:04x}", device.pid),
            name
        );
    }
}

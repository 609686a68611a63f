//! Confcam CLI
//!
//! Switch a USB conference camera into a virtual camera device.
//!
//! # Usage
//!
//! ```bash
//! # List attached USB cameras
//! confcam list
//!
//! # Pick the camera backing the virtual camera
//! confcam select 046d:085e
//!
//! # Run the driver in the foreground
//! confcam run
//!
//! # Drive it from another terminal
//! confcam start
//! confcam status
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use confcam_core::types::DriverCommand;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Confcam - switch a USB conference camera into a virtual camera
#[derive(Parser)]
#[command(name = "confcam")]
#[command(version)]
#[command(about = "Switch a USB conference camera into a virtual camera", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached USB cameras
    #[command(alias = "ls")]
    List(commands::ListArgs),

    /// Select the camera backing the virtual camera
    Select(commands::SelectArgs),

    /// Clear the camera selection
    Deselect,

    /// Start the virtual camera driver
    Start,

    /// Stop the virtual camera driver
    Stop,

    /// Restart the virtual camera driver
    Restart,

    /// Show driver status
    Status,

    /// Run the driver in the foreground
    Run,

    /// Manage configuration files
    Config(commands::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("confcam={}", level).parse().unwrap()),
        )
        .with_target(false)
        .init();

    // Run the appropriate command
    match cli.command {
        Commands::List(args) => commands::list(args).await?,
        Commands::Select(args) => commands::select(args).await?,
        Commands::Deselect => commands::deselect().await?,
        Commands::Start => commands::control(DriverCommand::Start).await?,
        Commands::Stop => commands::control(DriverCommand::Stop).await?,
        Commands::Restart => commands::control(DriverCommand::Restart).await?,
        Commands::Status => commands::status().await?,
        Commands::Run => commands::run().await?,
        Commands::Config(args) => commands::config(args).await?,
    }

    Ok(())
}

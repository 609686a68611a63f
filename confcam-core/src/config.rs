//! Configuration file loading
//!
//! Loads user configuration from `~/.config/confcam/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::channel::ControlChannel;
use crate::driver::DriverOptions;
use crate::error::{ConfcamError, Result};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Driver loop settings
    #[serde(default)]
    pub driver: DriverSettings,

    /// Built-in camera settings
    #[serde(default)]
    pub builtin: BuiltinSettings,

    /// Control document settings
    #[serde(default)]
    pub channel: ChannelSettings,
}

/// Driver loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSettings {
    /// Delay between the stop and start halves of a restart, in milliseconds
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Control document poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Built-in camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinSettings {
    /// Case-insensitive substring matched against the built-in camera's
    /// card name when acquiring the exclusive hold
    #[serde(default = "default_builtin_match")]
    pub match_name: String,
}

/// Control document settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Override for the control document directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_restart_delay_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_builtin_match() -> String {
    "integrated".to_string()
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            restart_delay_ms: default_restart_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for BuiltinSettings {
    fn default() -> Self {
        Self {
            match_name: default_builtin_match(),
        }
    }
}

impl ConfigFile {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("confcam").join("config.toml")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("confcam")
                .join("config.toml")
        } else {
            PathBuf::from("/etc/confcam/config.toml")
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfcamError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| ConfcamError::Config(format!("Failed to parse config file: {}", e)))?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration, logging warnings but returning defaults on error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::default_path())
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConfcamError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfcamError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&path, content)
            .map_err(|e| ConfcamError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Create a default config file if it doesn't exist
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_path();
        if path.exists() {
            return Ok(false);
        }

        let config = Self::default();
        config.save_to(path)?;
        Ok(true)
    }

    /// Driver options derived from this configuration
    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            restart_delay: Duration::from_millis(self.driver.restart_delay_ms),
            watch_interval: Duration::from_millis(self.driver.poll_interval_ms),
        }
    }

    /// Control channel over the configured (or default) document directory
    pub fn control_channel(&self) -> ControlChannel {
        match &self.channel.dir {
            Some(dir) => ControlChannel::in_dir(dir.clone()),
            None => ControlChannel::new(),
        }
    }
}

/// Generate a sample configuration file
pub fn sample_config() -> String {
    r#"# Confcam Configuration

[driver]
# Delay between the stop and start halves of a restart, in milliseconds
restart_delay_ms = 1000

# How often the driver polls the control documents for changes, in milliseconds
poll_interval_ms = 200

[builtin]
# Substring matched (case-insensitively) against the built-in camera's card
# name when the driver takes its exclusive hold
match_name = "integrated"

[channel]
# Override the control document directory. Defaults to
# $XDG_RUNTIME_DIR/confcam, or /tmp/confcam-<uid> when unset.
# dir = "/tmp/confcam-shared"
"#
    .to_string()
}

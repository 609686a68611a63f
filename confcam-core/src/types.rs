//! Control-plane document types
//!
//! These are the three JSON documents shared between the controller and the
//! driver, plus the transient device descriptor produced by enumeration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physically attached USB video-class capture device.
///
/// Rebuilt from scratch on every enumeration; `vid`/`pid` together identify
/// the device for as long as it stays attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Product display string (may be empty when the device reports none)
    pub name: String,
    /// USB vendor id
    pub vid: u16,
    /// USB product id
    pub pid: u16,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.name.is_empty() {
            "(unnamed)"
        } else {
            &self.name
        };
        write!(f, "{} [{:04x}:{:04x}]", name, self.vid, self.pid)
    }
}

/// The controller's declared choice of camera for the driver.
///
/// A single document, fully replaced on every write. `vid == 0 && pid == 0`
/// is the reserved "no device selected" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSelection {
    pub vid: u16,
    pub pid: u16,
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

impl CameraSelection {
    /// Selection pointing at a concrete device, stamped now
    pub fn for_device(device: &CameraDevice) -> Self {
        Self {
            vid: device.vid,
            pid: device.pid,
            name: device.name.clone(),
            timestamp: Utc::now(),
        }
    }

    /// The deselect sentinel, stamped now
    pub fn deselect() -> Self {
        Self {
            vid: 0,
            pid: 0,
            name: "None".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Whether this is the deselect sentinel
    pub fn is_deselect(&self) -> bool {
        self.vid == 0 && self.pid == 0
    }

    /// Whether this selection refers to the given device
    pub fn matches(&self, device: &CameraDevice) -> bool {
        self.vid == device.vid && self.pid == device.pid
    }
}

/// Command sent by the controller; a single document, last write wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverCommand {
    Start,
    Stop,
    Restart,
    /// Reserved; accepted by the driver as a no-op
    Status,
}

impl std::fmt::Display for DriverCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::Restart => write!(f, "restart"),
            Self::Status => write!(f, "status"),
        }
    }
}

impl std::str::FromStr for DriverCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "restart" => Ok(Self::Restart),
            "status" => Ok(Self::Status),
            _ => Err(format!("Unknown command: {}", s)),
        }
    }
}

/// The driver's published state; overwritten on every state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStatus {
    pub is_running: bool,
    /// Mirrors the last accepted selection, `None` after a deselect
    pub current_camera: Option<CameraSelection>,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> CameraDevice {
        CameraDevice {
            name: "Logitech BRIO".to_string(),
            vid: 0x046d,
            pid: 0x085e,
        }
    }

    #[test]
    fn test_selection_round_trip() {
        let selection = CameraSelection::for_device(&device());
        let json = serde_json::to_string(&selection).unwrap();
        let parsed: CameraSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, selection);
    }

    #[test]
    fn test_selection_wire_fields() {
        let selection = CameraSelection::for_device(&device());
        let json = serde_json::to_string(&selection).unwrap();
        assert!(json.contains("\"vid\":1133"));
        assert!(json.contains("\"pid\":2142"));
        assert!(json.contains("\"name\":\"Logitech BRIO\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_deselect_sentinel() {
        let sentinel = CameraSelection::deselect();
        assert!(sentinel.is_deselect());
        assert_eq!(sentinel.name, "None");
        assert!(!CameraSelection::for_device(&device()).is_deselect());
    }

    #[test]
    fn test_selection_matches_device() {
        let selection = CameraSelection::for_device(&device());
        assert!(selection.matches(&device()));
        let other = CameraDevice {
            name: "other".to_string(),
            vid: 1,
            pid: 2,
        };
        assert!(!selection.matches(&other));
    }

    #[test]
    fn test_command_serializes_as_bare_string() {
        let json = serde_json::to_string(&DriverCommand::Start).unwrap();
        assert_eq!(json, "\"start\"");
        let parsed: DriverCommand = serde_json::from_str("\"restart\"").unwrap();
        assert_eq!(parsed, DriverCommand::Restart);
    }

    #[test]
    fn test_command_round_trip() {
        for command in [
            DriverCommand::Start,
            DriverCommand::Stop,
            DriverCommand::Restart,
            DriverCommand::Status,
        ] {
            let json = serde_json::to_string(&command).unwrap();
            let parsed: DriverCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, command);
        }
    }

    #[test]
    fn test_status_round_trip() {
        let status = DriverStatus {
            is_running: true,
            current_camera: Some(CameraSelection::for_device(&device())),
            error_message: Some("built-in camera busy".to_string()),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&status).unwrap();
        let parsed: DriverStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn test_status_wire_fields_are_camel_case() {
        let status = DriverStatus {
            is_running: false,
            current_camera: None,
            error_message: None,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"isRunning\":false"));
        assert!(json.contains("\"currentCamera\":null"));
        assert!(json.contains("\"errorMessage\":null"));
    }
}

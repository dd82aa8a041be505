//! Device discovery through the Android debug bridge
//!
//! Enumerates connected devices by running `adb devices`.

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// State reported by the bridge for a connected, authorized device
const READY_STATE: &str = "device";

/// Device bridge client
#[derive(Clone, Debug)]
pub struct Adb {
    program: String,
}

impl Adb {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Identifiers of all devices ready to run tests
    pub async fn devices(&self) -> Result<Vec<String>> {
        debug!("Running {} devices", self.program);

        let output = Command::new(&self.program)
            .arg("devices")
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} devices failed: {}", self.program, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let devices = parse_devices(&stdout);
        info!("Found {} connected device(s)", devices.len());
        Ok(devices)
    }
}

impl Default for Adb {
    fn default() -> Self {
        Self::new("adb")
    }
}

/// Parse `adb devices` output into ready device identifiers.
///
/// Devices in any other state (offline, unauthorized) are skipped.
pub fn parse_devices(output: &str) -> Vec<String> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(serial), Some(state)) = (fields.next(), fields.next()) else {
            continue;
        };

        if state == READY_STATE {
            devices.push(serial.to_string());
        } else {
            warn!("Skipping device {} in state '{}'", serial, state);
        }
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices() {
        let output = "List of devices attached\n\
                      emulator-5554\tdevice\n\
                      192.168.1.5:5555\tdevice\n\
                      R58M12ABCDE\tunauthorized\n\
                      0123456789\toffline\n\n";

        assert_eq!(
            parse_devices(output),
            vec!["emulator-5554".to_string(), "192.168.1.5:5555".to_string()]
        );
    }

    #[test]
    fn test_parse_daemon_banner() {
        let output = "* daemon not running; starting now at tcp:5037\n\
                      * daemon started successfully\n\
                      List of devices attached\n";
        assert!(parse_devices(output).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_devices_from_stub_bridge() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("adb");
        std::fs::write(
            &stub,
            "#!/bin/sh\nprintf 'List of devices attached\\nA\\tdevice\\nB\\tdevice\\n'\n",
        )
        .unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let adb = Adb::new(stub.to_string_lossy());
        assert_eq!(adb.devices().await.unwrap(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_missing_bridge_is_error() {
        let adb = Adb::new("/nonexistent/adb-binary");
        assert!(adb.devices().await.is_err());
    }
}

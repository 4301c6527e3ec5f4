// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unvalidated device record as produced by an SDK.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One humidifier as reported by the vendor SDK after an update.
///
/// Fields are kept in the loose shape the cloud uses (status strings, a
/// free-form details map). [`DeviceSnapshot::from_raw`] turns a record into
/// a validated snapshot.
///
/// [`DeviceSnapshot::from_raw`]: crate::snapshot::DeviceSnapshot::from_raw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHumidifier {
    /// Cloud identifier of the device.
    pub cid: String,
    /// Name given to the device in the VeSync app.
    pub device_name: String,
    /// Device type/model code.
    #[serde(default)]
    pub device_type: String,
    /// Operating status, `"on"` or `"off"`.
    pub device_status: String,
    /// Connectivity, `"online"` or `"offline"`.
    pub connection_status: String,
    /// Current relative humidity, if the device reported one.
    #[serde(default)]
    pub humidity: Option<u8>,
    /// Configured target humidity.
    #[serde(default)]
    pub target_humidity: Option<u8>,
    /// Whether automatic humidity regulation is enabled.
    #[serde(default)]
    pub auto_humidity_enabled: bool,
    /// Model-specific details; holds the `mode` key.
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl RawHumidifier {
    /// Creates an online, switched-off record with no readings.
    #[must_use]
    pub fn new(cid: impl Into<String>, device_name: impl Into<String>) -> Self {
        Self {
            cid: cid.into(),
            device_name: device_name.into(),
            device_type: String::new(),
            device_status: "off".to_string(),
            connection_status: "online".to_string(),
            humidity: None,
            target_humidity: None,
            auto_humidity_enabled: false,
            details: Map::new(),
        }
    }

    /// Sets the device type.
    #[must_use]
    pub fn with_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    /// Sets the operating status string.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.device_status = status.into();
        self
    }

    /// Sets the connectivity string.
    #[must_use]
    pub fn with_connection(mut self, status: impl Into<String>) -> Self {
        self.connection_status = status.into();
        self
    }

    /// Sets the humidity reading.
    #[must_use]
    pub fn with_humidity(mut self, humidity: u8) -> Self {
        self.humidity = Some(humidity);
        self
    }

    /// Sets the target humidity.
    #[must_use]
    pub fn with_target_humidity(mut self, target: u8) -> Self {
        self.target_humidity = Some(target);
        self
    }

    /// Sets the automatic-humidity flag.
    #[must_use]
    pub fn with_auto_humidity(mut self, enabled: bool) -> Self {
        self.auto_humidity_enabled = enabled;
        self
    }

    /// Sets the `mode` entry of the details map.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.details
            .insert("mode".to_string(), Value::String(mode.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let raw: RawHumidifier = serde_json::from_str(
            r#"{
                "cid": "vsaq-1",
                "device_name": "Nursery",
                "device_status": "on",
                "connection_status": "online"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.cid, "vsaq-1");
        assert!(raw.humidity.is_none());
        assert!(!raw.auto_humidity_enabled);
        assert!(raw.details.is_empty());
    }

    #[test]
    fn builder_sets_mode_in_details() {
        let raw = RawHumidifier::new("a", "A").with_mode("sleep");
        assert_eq!(raw.details.get("mode"), Some(&Value::from("sleep")));
    }
}

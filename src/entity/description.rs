// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity identity records.

use serde::{Deserialize, Serialize};

use crate::DOMAIN;
use crate::snapshot::{DeviceId, DeviceSnapshot};

/// Icon shown for every humidifier entity.
pub const HUMIDIFIER_ICON: &str = "mdi:air-humidifier";

/// Device registry record for one humidifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// `(domain, cid)` pair identifying the physical device.
    pub identifiers: (String, String),
    /// Display name.
    pub name: String,
    /// Device type reported by the cloud.
    pub model: String,
}

impl DeviceInfo {
    /// Derives the record from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        Self {
            identifiers: (DOMAIN.to_string(), snapshot.device_id().to_string()),
            name: snapshot.name().to_string(),
            model: snapshot.model().to_string(),
        }
    }

    /// Placeholder used while the device has not been seen yet.
    #[must_use]
    pub fn placeholder(device_id: &DeviceId) -> Self {
        Self {
            identifiers: (DOMAIN.to_string(), device_id.to_string()),
            name: device_id.to_string(),
            model: String::new(),
        }
    }
}

/// Static description of a humidifier entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescription {
    /// Entity key, `vesync_humidifier_{cid}`.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Material design icon.
    pub icon: String,
}

impl EntityDescription {
    /// Builds the description for a device.
    #[must_use]
    pub fn new(device_id: &DeviceId, name: impl Into<String>) -> Self {
        Self {
            key: format!("vesync_humidifier_{device_id}"),
            name: name.into(),
            icon: HUMIDIFIER_ICON.to_string(),
        }
    }
}

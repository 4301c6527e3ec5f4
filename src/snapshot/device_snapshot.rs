// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device snapshot.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::sdk::RawHumidifier;
use crate::types::{ConnectionStatus, HumidifierMode, Humidity, PowerStatus};

use super::{DeviceId, StateChange};

/// State of one humidifier captured by a single poll.
///
/// Snapshots are immutable; the next poll produces a fresh one.
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::snapshot::{DeviceId, DeviceSnapshot};
/// use vesync_humidifiers::types::PowerStatus;
///
/// let snapshot = DeviceSnapshot::builder(DeviceId::new("cid-1").unwrap())
///     .name("Bedroom")
///     .status(PowerStatus::On)
///     .humidity(45)
///     .build();
///
/// assert!(snapshot.is_on());
/// assert_eq!(snapshot.humidity().map(|h| h.value()), Some(45));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    device_id: DeviceId,
    name: String,
    model: String,
    status: PowerStatus,
    auto_humidity: bool,
    humidity: Option<Humidity>,
    target_humidity: Option<Humidity>,
    connection: ConnectionStatus,
    mode: HumidifierMode,
}

impl DeviceSnapshot {
    /// Starts building a snapshot for the given device.
    #[must_use]
    pub fn builder(device_id: DeviceId) -> DeviceSnapshotBuilder {
        DeviceSnapshotBuilder::new(device_id)
    }

    /// Builds a snapshot from a raw SDK record.
    ///
    /// Only the identifier is mandatory. An unrecognised power status reads
    /// as [`PowerStatus::Off`], an unrecognised connection as
    /// [`ConnectionStatus::Offline`], and a reading above 100 as absent.
    /// Each substitution is logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyDeviceId` if the cid is blank.
    pub fn from_raw(raw: &RawHumidifier) -> Result<Self, ValueError> {
        let device_id = DeviceId::new(raw.cid.clone())?;

        let status = raw.device_status.parse().unwrap_or_else(|e: ValueError| {
            tracing::warn!(%device_id, error = %e, "Treating unknown power status as off");
            PowerStatus::Off
        });
        let connection = raw
            .connection_status
            .parse()
            .unwrap_or_else(|e: ValueError| {
                tracing::warn!(%device_id, error = %e, "Treating unknown connection as offline");
                ConnectionStatus::Offline
            });

        Ok(Self {
            name: raw.device_name.clone(),
            model: raw.device_type.clone(),
            status,
            auto_humidity: raw.auto_humidity_enabled,
            humidity: reading(&device_id, "humidity", raw.humidity),
            target_humidity: reading(&device_id, "target_humidity", raw.target_humidity),
            connection,
            mode: HumidifierMode::from_details(&raw.details),
            device_id,
        })
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device type/model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the operating status.
    #[must_use]
    pub fn status(&self) -> PowerStatus {
        self.status
    }

    /// Returns `true` if the device is running.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.status.is_on()
    }

    /// Returns `true` if automatic humidity regulation is enabled.
    #[must_use]
    pub fn auto_humidity(&self) -> bool {
        self.auto_humidity
    }

    /// Returns the current humidity reading.
    #[must_use]
    pub fn humidity(&self) -> Option<Humidity> {
        self.humidity
    }

    /// Returns the configured target humidity.
    #[must_use]
    pub fn target_humidity(&self) -> Option<Humidity> {
        self.target_humidity
    }

    /// Returns the cloud connectivity.
    #[must_use]
    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// Returns `true` if the device is online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.connection.is_online()
    }

    /// Returns the operating mode.
    #[must_use]
    pub fn mode(&self) -> &HumidifierMode {
        &self.mode
    }

    /// Lists the tracked fields that differ from a previous snapshot.
    ///
    /// Only status, automatic-humidity flag, humidity reading and
    /// connectivity are compared. Name, model, target humidity and mode
    /// never produce a change.
    #[must_use]
    pub fn changes_since(&self, previous: &DeviceSnapshot) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if self.status != previous.status {
            changes.push(StateChange::Power(self.status));
        }
        if self.auto_humidity != previous.auto_humidity {
            changes.push(StateChange::AutoHumidity(self.auto_humidity));
        }
        if self.humidity != previous.humidity {
            changes.push(StateChange::Humidity(self.humidity));
        }
        if self.connection != previous.connection {
            changes.push(StateChange::Connection(self.connection));
        }

        changes
    }
}

/// Builder for [`DeviceSnapshot`].
///
/// Defaults describe an online device that is switched off with no
/// readings.
#[derive(Debug, Clone)]
pub struct DeviceSnapshotBuilder {
    snapshot: DeviceSnapshot,
}

impl DeviceSnapshotBuilder {
    fn new(device_id: DeviceId) -> Self {
        let name = device_id.to_string();
        Self {
            snapshot: DeviceSnapshot {
                device_id,
                name,
                model: String::new(),
                status: PowerStatus::Off,
                auto_humidity: false,
                humidity: None,
                target_humidity: None,
                connection: ConnectionStatus::Online,
                mode: HumidifierMode::Unknown,
            },
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.snapshot.name = name.into();
        self
    }

    /// Sets the device type/model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.snapshot.model = model.into();
        self
    }

    /// Sets the operating status.
    #[must_use]
    pub fn status(mut self, status: PowerStatus) -> Self {
        self.snapshot.status = status;
        self
    }

    /// Sets the automatic-humidity flag.
    #[must_use]
    pub fn auto_humidity(mut self, enabled: bool) -> Self {
        self.snapshot.auto_humidity = enabled;
        self
    }

    /// Sets the humidity reading, clamped to 100.
    #[must_use]
    pub fn humidity(mut self, value: u8) -> Self {
        self.snapshot.humidity = Some(Humidity::clamped(value));
        self
    }

    /// Sets the target humidity, clamped to 100.
    #[must_use]
    pub fn target_humidity(mut self, value: u8) -> Self {
        self.snapshot.target_humidity = Some(Humidity::clamped(value));
        self
    }

    /// Sets the cloud connectivity.
    #[must_use]
    pub fn connection(mut self, connection: ConnectionStatus) -> Self {
        self.snapshot.connection = connection;
        self
    }

    /// Sets the operating mode.
    #[must_use]
    pub fn mode(mut self, mode: HumidifierMode) -> Self {
        self.snapshot.mode = mode;
        self
    }

    /// Finishes the snapshot.
    #[must_use]
    pub fn build(self) -> DeviceSnapshot {
        self.snapshot
    }
}

/// Validates a humidity reading, dropping impossible values.
fn reading(device_id: &DeviceId, field: &'static str, value: Option<u8>) -> Option<Humidity> {
    let value = value?;
    Humidity::new(value)
        .inspect_err(|e| tracing::warn!(%device_id, field, error = %e, "Ignoring humidity reading"))
        .ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn id(cid: &str) -> DeviceId {
        DeviceId::new(cid).unwrap()
    }

    fn raw() -> RawHumidifier {
        RawHumidifier {
            cid: "cid-1".to_string(),
            device_name: "Living Room".to_string(),
            device_type: "LUH-A602S-WUS".to_string(),
            device_status: "on".to_string(),
            connection_status: "online".to_string(),
            humidity: Some(41),
            target_humidity: Some(55),
            auto_humidity_enabled: true,
            details: json!({ "mode": "auto" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        }
    }

    #[test]
    fn from_raw_validates_fields() {
        let snapshot = DeviceSnapshot::from_raw(&raw()).unwrap();

        assert_eq!(snapshot.device_id(), &id("cid-1"));
        assert_eq!(snapshot.name(), "Living Room");
        assert_eq!(snapshot.model(), "LUH-A602S-WUS");
        assert!(snapshot.is_on());
        assert!(snapshot.auto_humidity());
        assert_eq!(snapshot.humidity(), Some(Humidity::clamped(41)));
        assert_eq!(snapshot.target_humidity(), Some(Humidity::clamped(55)));
        assert!(snapshot.is_online());
        assert_eq!(snapshot.mode(), &HumidifierMode::Auto);
    }

    #[test]
    fn from_raw_rejects_blank_cid() {
        let mut bad = raw();
        bad.cid = "  ".to_string();
        assert!(matches!(
            DeviceSnapshot::from_raw(&bad),
            Err(ValueError::EmptyDeviceId)
        ));
    }

    #[test]
    fn unknown_statuses_degrade_to_off_and_offline() {
        let mut record = raw();
        record.device_status = "standby".to_string();
        record.connection_status = "sleeping".to_string();

        let snapshot = DeviceSnapshot::from_raw(&record).unwrap();

        assert_eq!(snapshot.status(), PowerStatus::Off);
        assert_eq!(snapshot.connection(), ConnectionStatus::Offline);
        assert_eq!(snapshot.name(), "Living Room");
        assert_eq!(snapshot.humidity(), Some(Humidity::clamped(41)));
    }

    #[test]
    fn impossible_readings_are_dropped() {
        let mut record = raw();
        record.humidity = Some(101);
        record.target_humidity = Some(140);

        let snapshot = DeviceSnapshot::from_raw(&record).unwrap();

        assert_eq!(snapshot.humidity(), None);
        assert_eq!(snapshot.target_humidity(), None);
        assert!(snapshot.is_on());
    }

    #[test]
    fn from_raw_without_mode_is_unknown() {
        let mut record = raw();
        record.details.clear();
        let snapshot = DeviceSnapshot::from_raw(&record).unwrap();
        assert!(snapshot.mode().is_unknown());
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let a = DeviceSnapshot::builder(id("a")).status(PowerStatus::On).humidity(45).build();
        assert!(a.changes_since(&a.clone()).is_empty());
    }

    #[test]
    fn each_tracked_field_is_detected() {
        let before = DeviceSnapshot::builder(id("a"))
            .status(PowerStatus::On)
            .humidity(45)
            .build();

        let off = DeviceSnapshot::builder(id("a")).humidity(45).build();
        assert_eq!(
            off.changes_since(&before),
            vec![StateChange::Power(PowerStatus::Off)]
        );

        let auto = DeviceSnapshot::builder(id("a"))
            .status(PowerStatus::On)
            .humidity(45)
            .auto_humidity(true)
            .build();
        assert_eq!(
            auto.changes_since(&before),
            vec![StateChange::AutoHumidity(true)]
        );

        let wetter = DeviceSnapshot::builder(id("a"))
            .status(PowerStatus::On)
            .humidity(50)
            .build();
        assert_eq!(
            wetter.changes_since(&before),
            vec![StateChange::Humidity(Some(Humidity::clamped(50)))]
        );

        let offline = DeviceSnapshot::builder(id("a"))
            .status(PowerStatus::On)
            .humidity(45)
            .connection(ConnectionStatus::Offline)
            .build();
        assert_eq!(
            offline.changes_since(&before),
            vec![StateChange::Connection(ConnectionStatus::Offline)]
        );
    }

    #[test]
    fn untracked_fields_are_ignored() {
        let before = DeviceSnapshot::builder(id("a"))
            .name("Old")
            .target_humidity(40)
            .mode(HumidifierMode::Auto)
            .build();
        let after = DeviceSnapshot::builder(id("a"))
            .name("New")
            .model("OASISMIST")
            .target_humidity(60)
            .mode(HumidifierMode::Sleep)
            .build();

        assert!(after.changes_since(&before).is_empty());
    }
}

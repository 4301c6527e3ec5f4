// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fleet-wide snapshot collection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DeviceChange, DeviceId, DeviceSnapshot};

/// The full polled fleet state at one point in time.
///
/// A collection is produced by one poll and never mutated afterwards; the
/// coordinator swaps whole collections.
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::snapshot::{DeviceId, DeviceSnapshot, SnapshotCollection};
/// use vesync_humidifiers::types::PowerStatus;
///
/// let id = DeviceId::new("A").unwrap();
/// let before = SnapshotCollection::from_snapshots([
///     DeviceSnapshot::builder(id.clone()).status(PowerStatus::On).humidity(45).build(),
/// ]);
/// let after = SnapshotCollection::from_snapshots([
///     DeviceSnapshot::builder(id.clone()).status(PowerStatus::Off).humidity(45).build(),
/// ]);
///
/// let changes = after.changes_since(&before);
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].device_id, id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCollection {
    devices: BTreeMap<DeviceId, DeviceSnapshot>,
    captured_at: DateTime<Utc>,
}

impl SnapshotCollection {
    /// Creates an empty collection stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
            captured_at: Utc::now(),
        }
    }

    /// Builds a collection from snapshots, stamped with the current time.
    ///
    /// If two snapshots share an identifier, the later one wins.
    #[must_use]
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = DeviceSnapshot>) -> Self {
        Self::captured_at(snapshots, Utc::now())
    }

    /// Builds a collection with an explicit capture time.
    #[must_use]
    pub fn captured_at(
        snapshots: impl IntoIterator<Item = DeviceSnapshot>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let devices = snapshots
            .into_iter()
            .map(|s| (s.device_id().clone(), s))
            .collect();
        Self {
            devices,
            captured_at,
        }
    }

    /// Returns when the poll producing this collection completed.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Returns the snapshot of a device.
    #[must_use]
    pub fn get(&self, device_id: &DeviceId) -> Option<&DeviceSnapshot> {
        self.devices.get(device_id)
    }

    /// Returns `true` if the device is part of this collection.
    #[must_use]
    pub fn contains(&self, device_id: &DeviceId) -> bool {
        self.devices.contains_key(device_id)
    }

    /// Iterates device identifiers in order.
    pub fn device_ids(&self) -> impl Iterator<Item = &DeviceId> {
        self.devices.keys()
    }

    /// Iterates snapshots in identifier order.
    pub fn snapshots(&self) -> impl Iterator<Item = &DeviceSnapshot> {
        self.devices.values()
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no devices were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns `true` if both collections hold the same device states,
    /// ignoring capture time.
    #[must_use]
    pub fn same_devices(&self, other: &SnapshotCollection) -> bool {
        self.devices == other.devices
    }

    /// Diffs this collection against a previous one.
    ///
    /// Only devices present in both collections are compared; a device that
    /// appeared or disappeared between polls produces no change. The result
    /// is ordered by device identifier.
    #[must_use]
    pub fn changes_since(&self, previous: &SnapshotCollection) -> Vec<DeviceChange> {
        self.devices
            .iter()
            .filter_map(|(device_id, current)| {
                let before = previous.devices.get(device_id)?;
                let changes = current.changes_since(before);
                (!changes.is_empty()).then(|| DeviceChange {
                    device_id: device_id.clone(),
                    changes,
                })
            })
            .collect()
    }
}

impl Default for SnapshotCollection {
    fn default() -> Self {
        Self::new()
    }
}

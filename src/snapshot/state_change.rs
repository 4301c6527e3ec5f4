// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A [`StateChange`] names one tracked field that differs between two
//! snapshots of the same device, carrying the new value. Only the fields
//! that drive change notifications are represented: the operating status,
//! the automatic-humidity flag, the humidity reading and connectivity.
//! Target humidity and mode are not tracked.

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionStatus, Humidity, PowerStatus};

use super::DeviceId;

/// A tracked field that changed between two polls.
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::snapshot::StateChange;
/// use vesync_humidifiers::types::PowerStatus;
///
/// let change = StateChange::Power(PowerStatus::Off);
/// assert!(change.is_power());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChange {
    /// Operating status changed.
    Power(PowerStatus),

    /// Automatic humidity regulation was switched.
    AutoHumidity(bool),

    /// Humidity reading changed (or appeared/disappeared).
    Humidity(Option<Humidity>),

    /// Cloud connectivity changed.
    Connection(ConnectionStatus),
}

impl StateChange {
    /// Returns `true` if this is an operating status change.
    #[must_use]
    pub fn is_power(&self) -> bool {
        matches!(self, Self::Power(_))
    }

    /// Returns `true` if this is a connectivity change.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// All tracked changes of a single device between two polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceChange {
    /// The device that changed.
    pub device_id: DeviceId,
    /// The fields that differ, in a fixed order.
    pub changes: Vec<StateChange>,
}

impl DeviceChange {
    /// Returns the number of changed fields.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifiers() {
        assert!(StateChange::Power(PowerStatus::On).is_power());
        assert!(!StateChange::AutoHumidity(true).is_power());
        assert!(StateChange::Connection(ConnectionStatus::Offline).is_connection());
        assert!(!StateChange::Humidity(None).is_connection());
    }

    #[test]
    fn change_count() {
        let change = DeviceChange {
            device_id: DeviceId::new("a").unwrap(),
            changes: vec![
                StateChange::Power(PowerStatus::Off),
                StateChange::Humidity(Some(Humidity::clamped(40))),
            ],
        };
        assert_eq!(change.change_count(), 2);
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator event types.

use chrono::{DateTime, Utc};

use crate::snapshot::{DeviceChange, DeviceId};

/// Events broadcast by the update coordinator.
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::coordinator::CoordinatorEvent;
///
/// let event = CoordinatorEvent::update_failed("timeout");
/// assert!(event.is_failure());
/// assert!(event.device_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A poll completed and the snapshot collection was replaced.
    Refreshed {
        /// Number of devices in the new collection.
        device_count: usize,
        /// Capture time of the new collection.
        timestamp: DateTime<Utc>,
    },

    /// A device's tracked state changed between two polls.
    DeviceChanged(DeviceChange),

    /// A poll failed; previous data is retained.
    UpdateFailed {
        /// Description of the failure.
        error: String,
    },

    /// Credentials were refused; polling is paused until reauthentication.
    ReauthRequired {
        /// Description of the failure.
        error: String,
    },
}

impl CoordinatorEvent {
    /// Creates an update failed event.
    #[must_use]
    pub fn update_failed(error: impl Into<String>) -> Self {
        Self::UpdateFailed {
            error: error.into(),
        }
    }

    /// Creates a reauthentication required event.
    #[must_use]
    pub fn reauth_required(error: impl Into<String>) -> Self {
        Self::ReauthRequired {
            error: error.into(),
        }
    }

    /// Returns the device concerned, for per-device events.
    #[must_use]
    pub fn device_id(&self) -> Option<&DeviceId> {
        match self {
            Self::DeviceChanged(change) => Some(&change.device_id),
            _ => None,
        }
    }

    /// Returns `true` for failed polls of either kind.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::UpdateFailed { .. } | Self::ReauthRequired { .. }
        )
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator lifecycle state.

use chrono::{DateTime, Utc};

use crate::error::UpdateError;

/// Lifecycle state of the update coordinator.
///
/// ```text
/// Uninitialized -> Polling -> Idle -> Polling -> Idle ...
///                     \-> ReauthRequired (until credentials are refreshed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatorState {
    /// No poll has completed yet.
    #[default]
    Uninitialized,
    /// A poll is in progress.
    Polling,
    /// Waiting for the next tick.
    Idle,
    /// Credentials were refused; scheduled polling is paused.
    ReauthRequired,
    /// Polling was shut down.
    Stopped,
}

impl CoordinatorState {
    /// Returns `true` while polling is paused for reauthentication.
    #[must_use]
    pub fn is_reauth_required(&self) -> bool {
        matches!(self, Self::ReauthRequired)
    }

    /// Returns `true` once shut down.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Outcome bookkeeping of the last poll.
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateStatus {
    pub last_update_success: bool,
    pub last_success_time: Option<DateTime<Utc>>,
    pub last_error: Option<UpdateError>,
}

impl UpdateStatus {
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.last_update_success = true;
        self.last_success_time = Some(at);
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: UpdateError) {
        self.last_update_success = false;
        self.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_uninitialized() {
        assert_eq!(CoordinatorState::default(), CoordinatorState::Uninitialized);
    }

    #[test]
    fn state_checks() {
        assert!(CoordinatorState::ReauthRequired.is_reauth_required());
        assert!(!CoordinatorState::Idle.is_reauth_required());
        assert!(CoordinatorState::Stopped.is_stopped());
    }

    #[test]
    fn status_bookkeeping() {
        let mut status = UpdateStatus::default();
        assert!(!status.last_update_success);

        status.record_failure(UpdateError::UpdateFailed("x".to_string()));
        assert!(!status.last_update_success);
        assert!(status.last_error.is_some());

        let now = Utc::now();
        status.record_success(now);
        assert!(status.last_update_success);
        assert_eq!(status.last_success_time, Some(now));
        assert!(status.last_error.is_none());
    }
}

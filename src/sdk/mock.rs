// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory SDK implementation for testing. Requires the `mock` feature.
//!
//! [`MockSdk`] keeps a fleet of [`RawHumidifier`] records behind a shared
//! handle. Every clone sees the same state, so a test can keep one handle,
//! give another to the client, and change device state "from the outside"
//! between polls.
//!
//! # Example
//!
//! ```
//! use vesync_humidifiers::sdk::{MockSdk, Operation, RawHumidifier, VeSyncSdk};
//!
//! let sdk = MockSdk::new().with_device(RawHumidifier::new("cid-1", "Bedroom").with_status("on"));
//!
//! assert!(sdk.login().unwrap());
//! let devices = sdk.update().unwrap();
//! assert_eq!(devices.len(), 1);
//!
//! sdk.assert_operations(&[Operation::Login, Operation::Update]);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{RawHumidifier, VeSyncSdk};
use crate::config::Credentials;
use crate::error::SdkError;
use crate::snapshot::DeviceId;
use crate::types::TargetHumidity;

/// Recorded SDK operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// A session was opened for this username.
    Connect {
        /// The account username.
        username: String,
    },
    /// `login` was called.
    Login,
    /// `update` was called.
    Update,
    /// `turn_on` was called.
    TurnOn(String),
    /// `turn_off` was called.
    TurnOff(String),
    /// `set_humidity` was called.
    SetHumidity(String, u8),
}

#[derive(Debug, Default)]
struct MockState {
    devices: BTreeMap<String, RawHumidifier>,
    operations: Vec<Operation>,
    reject_login: bool,
    login_errors: VecDeque<SdkError>,
    update_errors: VecDeque<SdkError>,
    command_errors: VecDeque<SdkError>,
    command_result: Option<bool>,
    update_delay: Option<Duration>,
}

/// Recording in-memory VeSync account.
#[derive(Debug, Clone, Default)]
pub struct MockSdk {
    state: Arc<Mutex<MockState>>,
    active_updates: Arc<AtomicUsize>,
    max_parallel_updates: Arc<AtomicUsize>,
}

impl MockSdk {
    /// Creates an account with no devices that accepts any login.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device to the fleet.
    #[must_use]
    pub fn with_device(self, device: RawHumidifier) -> Self {
        self.insert_device(device);
        self
    }

    /// Returns a connector that hands out sessions sharing this state.
    pub fn connector(&self) -> impl Fn(&Credentials) -> MockSdk + Send + Sync + 'static {
        let sdk = self.clone();
        move |credentials: &Credentials| {
            sdk.record(Operation::Connect {
                username: credentials.username().to_string(),
            });
            sdk.clone()
        }
    }

    // ========== Fleet manipulation ==========

    /// Adds or replaces a device.
    pub fn insert_device(&self, device: RawHumidifier) {
        self.state.lock().devices.insert(device.cid.clone(), device);
    }

    /// Removes a device from the fleet.
    pub fn remove_device(&self, cid: &str) -> Option<RawHumidifier> {
        self.state.lock().devices.remove(cid)
    }

    /// Applies an edit to a device, as if changed from the VeSync app.
    ///
    /// Returns `false` if the device does not exist.
    pub fn modify_device(&self, cid: &str, edit: impl FnOnce(&mut RawHumidifier)) -> bool {
        match self.state.lock().devices.get_mut(cid) {
            Some(device) => {
                edit(device);
                true
            }
            None => false,
        }
    }

    /// Returns a copy of a device record.
    #[must_use]
    pub fn device(&self, cid: &str) -> Option<RawHumidifier> {
        self.state.lock().devices.get(cid).cloned()
    }

    // ========== Failure injection ==========

    /// Makes `login` return `Ok(false)`.
    pub fn reject_login(&self, reject: bool) {
        self.state.lock().reject_login = reject;
    }

    /// Queues an error for the next `login` call.
    pub fn fail_next_login(&self, error: SdkError) {
        self.state.lock().login_errors.push_back(error);
    }

    /// Queues an error for the next `update` call.
    pub fn fail_next_update(&self, error: SdkError) {
        self.state.lock().update_errors.push_back(error);
    }

    /// Queues an error for the next command.
    pub fn fail_next_command(&self, error: SdkError) {
        self.state.lock().command_errors.push_back(error);
    }

    /// Forces every command to report this result without touching state.
    ///
    /// `None` restores normal behaviour.
    pub fn set_command_result(&self, result: Option<bool>) {
        self.state.lock().command_result = result;
    }

    /// Makes each `update` block the worker thread for `delay`.
    pub fn set_update_delay(&self, delay: Option<Duration>) {
        self.state.lock().update_delay = delay;
    }

    // ========== Assertions ==========

    /// Returns all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.state.lock().operations.clone()
    }

    /// Counts recorded operations matching a predicate.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&Operation) -> bool) -> usize {
        self.state
            .lock()
            .operations
            .iter()
            .filter(|op| predicate(op))
            .count()
    }

    /// Clears the operation log.
    pub fn clear_operations(&self) {
        self.state.lock().operations.clear();
    }

    /// Returns the highest number of `update` calls seen running at once.
    #[must_use]
    pub fn max_parallel_updates(&self) -> usize {
        self.max_parallel_updates.load(Ordering::SeqCst)
    }

    /// Asserts the exact operation log.
    ///
    /// # Panics
    ///
    /// Panics if the recorded operations differ.
    pub fn assert_operations(&self, expected: &[Operation]) {
        let actual = self.operations();
        assert_eq!(actual, expected, "recorded SDK operations differ");
    }

    fn record(&self, operation: Operation) {
        trace!(?operation, "Mock SDK operation");
        self.state.lock().operations.push(operation);
    }

    fn run_command(
        &self,
        operation: Operation,
        cid: &str,
        apply: impl FnOnce(&mut RawHumidifier),
    ) -> Result<bool, SdkError> {
        self.record(operation);

        let mut state = self.state.lock();
        if let Some(error) = state.command_errors.pop_front() {
            return Err(error);
        }
        if let Some(result) = state.command_result {
            return Ok(result);
        }

        match state.devices.get_mut(cid) {
            Some(device) if device.connection_status == "online" => {
                apply(device);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl VeSyncSdk for MockSdk {
    fn login(&self) -> Result<bool, SdkError> {
        self.record(Operation::Login);

        let mut state = self.state.lock();
        if let Some(error) = state.login_errors.pop_front() {
            return Err(error);
        }
        Ok(!state.reject_login)
    }

    fn update(&self) -> Result<Vec<RawHumidifier>, SdkError> {
        self.record(Operation::Update);

        let running = self.active_updates.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_parallel_updates
            .fetch_max(running, Ordering::SeqCst);

        let delay = self.state.lock().update_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let result = {
            let mut state = self.state.lock();
            match state.update_errors.pop_front() {
                Some(error) => Err(error),
                None => Ok(state.devices.values().cloned().collect()),
            }
        };

        self.active_updates.fetch_sub(1, Ordering::SeqCst);
        debug!(ok = result.is_ok(), "Mock SDK update");
        result
    }

    fn turn_on(&self, device_id: &DeviceId) -> Result<bool, SdkError> {
        self.run_command(
            Operation::TurnOn(device_id.to_string()),
            device_id.as_str(),
            |device| device.device_status = "on".to_string(),
        )
    }

    fn turn_off(&self, device_id: &DeviceId) -> Result<bool, SdkError> {
        self.run_command(
            Operation::TurnOff(device_id.to_string()),
            device_id.as_str(),
            |device| device.device_status = "off".to_string(),
        )
    }

    fn set_humidity(
        &self,
        device_id: &DeviceId,
        target: TargetHumidity,
    ) -> Result<bool, SdkError> {
        self.run_command(
            Operation::SetHumidity(device_id.to_string(), target.value()),
            device_id.as_str(),
            |device| device.target_humidity = Some(target.value()),
        )
    }
}

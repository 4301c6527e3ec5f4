// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor SDK seam.
//!
//! The VeSync cloud protocol is implemented elsewhere; this crate only
//! drives an SDK session through the [`VeSyncSdk`] trait. All methods are
//! blocking, so the [`ApiClient`](crate::client::ApiClient) always calls them
//! from a blocking worker.
//!
//! A [`Connector`] opens sessions from [`Credentials`]. Any
//! `Fn(&Credentials) -> S` closure is a connector.
//!
//! With the `mock` feature, `MockSdk` is an in-memory implementation that
//! records every operation.

#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod raw;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockSdk, Operation};
pub use raw::RawHumidifier;

use crate::config::Credentials;
use crate::error::SdkError;
use crate::snapshot::DeviceId;
use crate::types::TargetHumidity;

/// A logged-in (or about to log in) VeSync account session.
///
/// Methods take `&self` so a single session can serve commands for
/// different devices in parallel workers.
pub trait VeSyncSdk: Send + Sync + 'static {
    /// Logs in to the cloud.
    ///
    /// Returns `Ok(false)` when the cloud refused the credentials.
    ///
    /// # Errors
    ///
    /// Returns `SdkError` if the request could not be completed.
    fn login(&self) -> Result<bool, SdkError>;

    /// Refreshes every humidifier and returns their records.
    ///
    /// # Errors
    ///
    /// Returns `SdkError` if the request could not be completed.
    fn update(&self) -> Result<Vec<RawHumidifier>, SdkError>;

    /// Switches a humidifier on. Returns whether the cloud accepted it.
    ///
    /// # Errors
    ///
    /// Returns `SdkError` if the request could not be completed.
    fn turn_on(&self, device_id: &DeviceId) -> Result<bool, SdkError>;

    /// Switches a humidifier off. Returns whether the cloud accepted it.
    ///
    /// # Errors
    ///
    /// Returns `SdkError` if the request could not be completed.
    fn turn_off(&self, device_id: &DeviceId) -> Result<bool, SdkError>;

    /// Sets the target humidity. Returns whether the cloud accepted it.
    ///
    /// # Errors
    ///
    /// Returns `SdkError` if the request could not be completed.
    fn set_humidity(&self, device_id: &DeviceId, target: TargetHumidity)
    -> Result<bool, SdkError>;
}

/// Opens SDK sessions.
pub trait Connector: Send + Sync + 'static {
    /// The session type produced.
    type Session: VeSyncSdk;

    /// Creates a session for the given account. No network I/O happens
    /// until [`VeSyncSdk::login`] is called.
    fn connect(&self, credentials: &Credentials) -> Self::Session;
}

impl<F, S> Connector for F
where
    F: Fn(&Credentials) -> S + Send + Sync + 'static,
    S: VeSyncSdk,
{
    type Session = S;

    fn connect(&self, credentials: &Credentials) -> S {
        self(credentials)
    }
}

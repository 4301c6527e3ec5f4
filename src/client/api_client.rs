// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VeSync API client.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use super::run_blocking;
use crate::config::Credentials;
use crate::error::{ClientError, SdkError};
use crate::sdk::{Connector, VeSyncSdk};
use crate::snapshot::{DeviceId, DeviceSnapshot, SnapshotCollection};
use crate::types::TargetHumidity;

/// Client wrapping one VeSync SDK session.
///
/// The session is created lazily on the first call and reused afterwards.
/// Creation is guarded by an async mutex, so concurrent first calls log in
/// only once. A refused login leaves no session behind; the next call tries
/// again.
///
/// Every SDK call runs on a blocking worker via
/// [`run_blocking_call`](Self::run_blocking_call).
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::client::ApiClient;
/// use vesync_humidifiers::config::Credentials;
/// use vesync_humidifiers::sdk::{MockSdk, RawHumidifier};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), vesync_humidifiers::error::ClientError> {
/// let sdk = MockSdk::new().with_device(RawHumidifier::new("cid-1", "Bedroom").with_status("on"));
/// let client = ApiClient::new(sdk.connector(), Credentials::new("user", "pass"));
///
/// let devices = client.fetch_devices().await?;
/// assert_eq!(devices.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ApiClient<C: Connector> {
    connector: C,
    credentials: RwLock<Credentials>,
    session: Mutex<Option<Arc<C::Session>>>,
}

impl<C: Connector> ApiClient<C> {
    /// Creates a client. No session is opened until the first call.
    #[must_use]
    pub fn new(connector: C, credentials: Credentials) -> Self {
        Self {
            connector,
            credentials: RwLock::new(credentials),
            session: Mutex::new(None),
        }
    }

    /// Returns a copy of the current credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.credentials.read().clone()
    }

    /// Returns `true` once a session has been established.
    pub async fn has_session(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Replaces the credentials and drops the current session.
    ///
    /// The next call logs in with the new credentials.
    pub async fn update_credentials(&self, credentials: Credentials) {
        tracing::info!(username = %credentials.username(), "Updating VeSync credentials");
        *self.credentials.write() = credentials;
        self.session.lock().await.take();
    }

    /// Fetches the state of every humidifier on the account.
    ///
    /// Logs in first if no session exists. Records without a cid are
    /// skipped with a warning; unexpected field values degrade as described
    /// in [`DeviceSnapshot::from_raw`].
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Authentication` if the credentials are refused,
    /// `ClientError::Communication` if a request fails, or
    /// `ClientError::Other` for any other failure.
    pub async fn fetch_devices(&self) -> Result<SnapshotCollection, ClientError> {
        let records = self.run_blocking_call(|sdk| sdk.update()).await?;

        let snapshots = records.iter().filter_map(|raw| {
            DeviceSnapshot::from_raw(raw)
                .inspect_err(|e| {
                    tracing::warn!(cid = %raw.cid, error = %e, "Skipping invalid device record");
                })
                .ok()
        });
        let collection = SnapshotCollection::from_snapshots(snapshots);

        tracing::debug!(
            devices = collection.len(),
            records = records.len(),
            "Fetched humidifiers"
        );
        Ok(collection)
    }

    /// Switches a humidifier on. Returns whether the cloud accepted it.
    ///
    /// # Errors
    ///
    /// See [`fetch_devices`](Self::fetch_devices).
    pub async fn turn_on(&self, device_id: &DeviceId) -> Result<bool, ClientError> {
        let device_id = device_id.clone();
        self.run_blocking_call(move |sdk| sdk.turn_on(&device_id))
            .await
    }

    /// Switches a humidifier off. Returns whether the cloud accepted it.
    ///
    /// # Errors
    ///
    /// See [`fetch_devices`](Self::fetch_devices).
    pub async fn turn_off(&self, device_id: &DeviceId) -> Result<bool, ClientError> {
        let device_id = device_id.clone();
        self.run_blocking_call(move |sdk| sdk.turn_off(&device_id))
            .await
    }

    /// Sets the target humidity. Returns whether the cloud accepted it.
    ///
    /// # Errors
    ///
    /// See [`fetch_devices`](Self::fetch_devices).
    pub async fn set_humidity(
        &self,
        device_id: &DeviceId,
        target: TargetHumidity,
    ) -> Result<bool, ClientError> {
        let device_id = device_id.clone();
        self.run_blocking_call(move |sdk| sdk.set_humidity(&device_id, target))
            .await
    }

    /// Runs an SDK call against the session on a blocking worker.
    ///
    /// Establishes the session first if needed. When the call fails with an
    /// authentication error the session is dropped so the next call logs in
    /// again.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the login or of the call itself.
    pub async fn run_blocking_call<F, T>(&self, call: F) -> Result<T, ClientError>
    where
        F: FnOnce(&C::Session) -> Result<T, SdkError> + Send + 'static,
        T: Send + 'static,
    {
        let session = self.session().await?;
        let worker_session = Arc::clone(&session);
        let result = run_blocking(move || call(&worker_session)).await;

        if let Err(ClientError::Authentication(_)) = &result {
            let mut slot = self.session.lock().await;
            if slot.as_ref().is_some_and(|s| Arc::ptr_eq(s, &session)) {
                tracing::warn!("Session rejected by VeSync, dropping it");
                slot.take();
            }
        }

        result
    }

    /// Returns the session, logging in on first use.
    async fn session(&self) -> Result<Arc<C::Session>, ClientError> {
        let mut slot = self.session.lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }

        let credentials = self.credentials();
        tracing::info!(
            username = %credentials.username(),
            timezone = %credentials.timezone(),
            "Logging in to VeSync"
        );

        let session = Arc::new(self.connector.connect(&credentials));
        let login_session = Arc::clone(&session);
        let accepted = run_blocking(move || login_session.login()).await?;

        if !accepted {
            tracing::warn!(username = %credentials.username(), "VeSync login refused");
            return Err(ClientError::Authentication("Invalid credentials".to_string()));
        }

        *slot = Some(Arc::clone(&session));
        Ok(session)
    }
}

impl<C: Connector> fmt::Debug for ApiClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("credentials", &*self.credentials.read())
            .finish_non_exhaustive()
    }
}

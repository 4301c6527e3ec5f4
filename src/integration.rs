// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration setup and teardown.
//!
//! [`Integration::setup`] wires a client, a coordinator and one
//! [`HumidifierEntity`] per discovered device, then starts polling.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::{CoordinatorConfig, Credentials, EntryConfig};
use crate::coordinator::UpdateCoordinator;
use crate::entity::HumidifierEntity;
use crate::error::{Error, Result};
use crate::sdk::Connector;
use crate::snapshot::DeviceId;

/// Runtime data of a configured integration entry.
pub struct Integration<C: Connector> {
    client: Arc<ApiClient<C>>,
    coordinator: Arc<UpdateCoordinator<C>>,
    entities: BTreeMap<DeviceId, Arc<HumidifierEntity<C>>>,
}

impl<C: Connector> Integration<C> {
    /// Sets up the integration from stored entry data.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the entry is invalid, otherwise the errors
    /// of [`setup_with`](Self::setup_with).
    pub async fn setup(connector: C, entry: &EntryConfig) -> Result<Self> {
        entry.validate()?;
        Self::setup_with(connector, entry.credentials(), entry.coordinator_config()).await
    }

    /// Sets up the integration: performs the first refresh, creates one
    /// entity per device and starts the polling loop.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::ReauthRequired` if the credentials are refused
    /// and `UpdateError::UpdateFailed` if the account could not be reached.
    /// Nothing is left running in either case.
    pub async fn setup_with(
        connector: C,
        credentials: Credentials,
        config: CoordinatorConfig,
    ) -> Result<Self> {
        let client = Arc::new(ApiClient::new(connector, credentials));
        let coordinator = Arc::new(UpdateCoordinator::new(Arc::clone(&client), config));

        coordinator.refresh().await.inspect_err(|e| {
            tracing::error!(error = %e, "First refresh failed, integration not ready");
        })?;

        let entities: BTreeMap<_, _> = coordinator
            .data()
            .map(|data| {
                data.device_ids()
                    .map(|device_id| {
                        let entity =
                            HumidifierEntity::new(Arc::clone(&coordinator), device_id.clone());
                        entity.added_to_platform();
                        (device_id.clone(), entity)
                    })
                    .collect()
            })
            .unwrap_or_default();

        coordinator.spawn();
        tracing::info!(devices = entities.len(), "VeSync humidifiers set up");

        Ok(Self {
            client,
            coordinator,
            entities,
        })
    }

    /// Returns the API client.
    #[must_use]
    pub fn client(&self) -> &Arc<ApiClient<C>> {
        &self.client
    }

    /// Returns the update coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<UpdateCoordinator<C>> {
        &self.coordinator
    }

    /// Returns every entity, ordered by device id.
    pub fn entities(&self) -> impl Iterator<Item = &Arc<HumidifierEntity<C>>> {
        self.entities.values()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the entity for a device id.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no entity exists for `cid`.
    pub fn entity(&self, cid: &str) -> Result<&Arc<HumidifierEntity<C>>> {
        self.entities
            .get(cid)
            .ok_or_else(|| Error::DeviceNotFound(cid.to_string()))
    }

    /// Replaces the credentials after a reauthentication request.
    ///
    /// # Errors
    ///
    /// Returns the error of the refresh made with the new credentials.
    pub async fn reauthenticate(&self, credentials: Credentials) -> Result<()> {
        self.coordinator.reauthenticate(credentials).await?;
        Ok(())
    }

    /// Stops polling and detaches every entity.
    pub fn unload(self) {
        self.coordinator.shutdown();
        for entity in self.entities.values() {
            entity.removed_from_platform();
        }
        tracing::info!("VeSync humidifiers unloaded");
    }
}

impl<C: Connector> std::fmt::Debug for Integration<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("coordinator", &self.coordinator)
            .field("entities", &self.entities.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

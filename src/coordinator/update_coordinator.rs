// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic polling of the VeSync account.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::listeners::{ListenerRegistry, SubscriptionId};
use super::state::UpdateStatus;
use super::{CoordinatorEvent, CoordinatorState, EventBus};
use crate::client::ApiClient;
use crate::config::{CoordinatorConfig, Credentials};
use crate::error::UpdateError;
use crate::sdk::Connector;
use crate::snapshot::{DeviceChange, DeviceId, DeviceSnapshot, SnapshotCollection};

/// Polls the account on a fixed interval and fans out state changes.
///
/// Every poll fetches a fresh [`SnapshotCollection`], compares it with the
/// one held from the previous poll and notifies the listeners of each
/// device whose tracked state changed. The held collection is replaced on
/// every successful poll, whether or not anything changed. Polls never
/// overlap.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vesync_humidifiers::client::ApiClient;
/// use vesync_humidifiers::config::{CoordinatorConfig, Credentials};
/// use vesync_humidifiers::coordinator::UpdateCoordinator;
/// use vesync_humidifiers::sdk::{MockSdk, RawHumidifier};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sdk = MockSdk::new().with_device(RawHumidifier::new("cid-1", "Bedroom"));
/// let client = Arc::new(ApiClient::new(sdk.connector(), Credentials::new("u", "p")));
/// let coordinator = UpdateCoordinator::new(client, CoordinatorConfig::default());
///
/// coordinator.refresh().await?;
/// assert!(coordinator.last_update_success());
/// assert_eq!(coordinator.data().map(|d| d.len()), Some(1));
/// # Ok(())
/// # }
/// ```
pub struct UpdateCoordinator<C: Connector> {
    client: Arc<ApiClient<C>>,
    config: CoordinatorConfig,
    data: RwLock<Option<Arc<SnapshotCollection>>>,
    status: RwLock<UpdateStatus>,
    poll_lock: Mutex<()>,
    state_tx: watch::Sender<CoordinatorState>,
    listeners: ListenerRegistry,
    event_bus: EventBus,
    polling: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl<C: Connector> UpdateCoordinator<C> {
    /// Creates a coordinator. Nothing is fetched until [`refresh`](Self::refresh)
    /// or [`spawn`](Self::spawn) is called.
    #[must_use]
    pub fn new(client: Arc<ApiClient<C>>, config: CoordinatorConfig) -> Self {
        let (state_tx, _) = watch::channel(CoordinatorState::Uninitialized);
        Self {
            client,
            config,
            data: RwLock::new(None),
            status: RwLock::new(UpdateStatus::default()),
            poll_lock: Mutex::new(()),
            state_tx,
            listeners: ListenerRegistry::new(),
            event_bus: EventBus::with_capacity(config.event_capacity()),
            polling: parking_lot::Mutex::new(None),
        }
    }

    /// Returns the API client used for polling and commands.
    #[must_use]
    pub fn client(&self) -> &Arc<ApiClient<C>> {
        &self.client
    }

    /// Returns the coordinator configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        self.config.update_interval()
    }

    // ========== Data ==========

    /// Returns the collection from the last successful poll.
    #[must_use]
    pub fn data(&self) -> Option<Arc<SnapshotCollection>> {
        self.data.read().clone()
    }

    /// Returns one device's snapshot from the last successful poll.
    #[must_use]
    pub fn device(&self, device_id: &DeviceId) -> Option<DeviceSnapshot> {
        self.data
            .read()
            .as_ref()
            .and_then(|data| data.get(device_id).cloned())
    }

    /// Returns `true` if the last poll succeeded.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.status.read().last_update_success
    }

    /// Returns the time of the last successful poll.
    #[must_use]
    pub fn last_update_success_time(&self) -> Option<DateTime<Utc>> {
        self.status.read().last_success_time
    }

    /// Returns the error of the last poll, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<UpdateError> {
        self.status.read().last_error.clone()
    }

    // ========== State ==========

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        *self.state_tx.borrow()
    }

    /// Returns a receiver that observes lifecycle state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<CoordinatorState> {
        self.state_tx.subscribe()
    }

    fn transition(&self, next: CoordinatorState) {
        self.state_tx.send_if_modified(|state| {
            if state.is_stopped() || *state == next {
                return false;
            }
            tracing::trace!(from = ?*state, to = ?next, "Coordinator state transition");
            *state = next;
            true
        });
    }

    // ========== Polling ==========

    /// Fetches the account state once and notifies listeners of changes.
    ///
    /// Waits for any poll already in progress to finish first.
    ///
    /// # Errors
    ///
    /// Returns `UpdateError::ReauthRequired` if the credentials were
    /// refused, or `UpdateError::UpdateFailed` for any other failure. The
    /// data from the previous successful poll is retained in both cases.
    pub async fn refresh(&self) -> Result<(), UpdateError> {
        let _guard = self.poll_lock.lock().await;
        self.transition(CoordinatorState::Polling);

        match self.client.fetch_devices().await {
            Ok(collection) => {
                self.apply(collection);
                self.transition(CoordinatorState::Idle);
                Ok(())
            }
            Err(err) => {
                let err = UpdateError::from(err);
                self.status.write().record_failure(err.clone());

                if err.is_reauth_required() {
                    tracing::warn!(error = %err, "Credentials refused, polling paused");
                    self.transition(CoordinatorState::ReauthRequired);
                    self.event_bus
                        .publish(CoordinatorEvent::reauth_required(err.to_string()));
                } else {
                    tracing::warn!(error = %err, "Error fetching humidifier data");
                    self.transition(CoordinatorState::Idle);
                    self.event_bus
                        .publish(CoordinatorEvent::update_failed(err.to_string()));
                }
                Err(err)
            }
        }
    }

    /// Runs [`refresh`](Self::refresh), logging instead of returning errors.
    pub async fn request_refresh(&self) {
        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "Requested refresh failed");
        }
    }

    fn apply(&self, collection: SnapshotCollection) {
        let current = Arc::new(collection);
        let previous = self.data.write().replace(Arc::clone(&current));
        self.status.write().record_success(current.timestamp());

        let changes: Vec<DeviceChange> = previous
            .map(|previous| current.changes_since(&previous))
            .unwrap_or_default();

        tracing::debug!(
            devices = current.len(),
            changed = changes.len(),
            "Humidifier data updated"
        );

        for change in changes {
            tracing::debug!(
                device_id = %change.device_id,
                changes = change.change_count(),
                "Device state changed"
            );
            self.listeners.dispatch_device_change(&change);
            self.event_bus.publish(CoordinatorEvent::DeviceChanged(change));
        }

        self.listeners.dispatch_refresh();
        self.event_bus.publish(CoordinatorEvent::Refreshed {
            device_count: current.len(),
            timestamp: current.timestamp(),
        });
    }

    /// Starts the background polling loop.
    ///
    /// The first scheduled poll happens one interval after this call.
    /// Returns `false` if a loop is already running.
    pub fn spawn(self: &Arc<Self>) -> bool {
        let mut slot = self.polling.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        if self.state().is_stopped() {
            self.state_tx.send_replace(CoordinatorState::Idle);
        }

        let period = self.config.update_interval();
        tracing::info!(interval = ?period, "Starting humidifier polling");
        *slot = Some(tokio::spawn(poll_loop(
            Arc::downgrade(self),
            period,
            self.state_tx.subscribe(),
        )));
        true
    }

    /// Returns `true` while the background loop is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.polling
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the background loop and enters [`CoordinatorState::Stopped`].
    ///
    /// Listeners stay registered; manual refreshes remain possible.
    pub fn shutdown(&self) {
        self.transition(CoordinatorState::Stopped);
        if let Some(handle) = self.polling.lock().take() {
            handle.abort();
            tracing::info!("Humidifier polling stopped");
        }
    }

    /// Replaces the credentials and polls again.
    ///
    /// Resumes a loop paused in [`CoordinatorState::ReauthRequired`].
    ///
    /// # Errors
    ///
    /// Returns the error of the poll made with the new credentials.
    pub async fn reauthenticate(&self, credentials: Credentials) -> Result<(), UpdateError> {
        self.client.update_credentials(credentials).await;
        self.transition(CoordinatorState::Uninitialized);
        self.refresh().await
    }

    // ========== Listeners ==========

    /// Registers a callback run after every successful poll.
    pub fn add_listener<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add_refresh(callback)
    }

    /// Registers a callback run when one device's tracked state changes.
    pub fn on_device_changed<F>(&self, device_id: DeviceId, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceChange) + Send + Sync + 'static,
    {
        self.listeners.add_device(device_id, callback)
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Returns the number of refresh listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.refresh_count()
    }

    /// Returns the number of change listeners for one device.
    #[must_use]
    pub fn device_listener_count(&self, device_id: &DeviceId) -> usize {
        self.listeners.device_count(device_id)
    }

    /// Subscribes to the coordinator event stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.event_bus.subscribe()
    }
}

async fn poll_loop<C: Connector>(
    coordinator: Weak<UpdateCoordinator<C>>,
    period: Duration,
    mut state_rx: watch::Receiver<CoordinatorState>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let paused = state_rx.borrow_and_update().is_reauth_required();
        if paused {
            tracing::info!("Polling paused until reauthentication");
            let resumed = state_rx
                .wait_for(|state| !state.is_reauth_required())
                .await
                .is_ok();
            if !resumed {
                break;
            }
            ticker.reset();
        }

        if state_rx.borrow().is_stopped() {
            break;
        }

        let Some(coordinator) = coordinator.upgrade() else {
            break;
        };
        // refresh() logs its own failures
        let _ = coordinator.refresh().await;
    }

    tracing::debug!("Polling loop exited");
}

impl<C: Connector> std::fmt::Debug for UpdateCoordinator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateCoordinator")
            .field("state", &self.state())
            .field("update_interval", &self.config.update_interval())
            .field("devices", &self.data.read().as_ref().map(|d| d.len()))
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

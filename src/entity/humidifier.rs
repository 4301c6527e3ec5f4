// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Humidifier entity bound to one device of the coordinator.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::watch;

use super::{DeviceInfo, EntityDescription};
use crate::coordinator::{SubscriptionId, UpdateCoordinator};
use crate::error::{ClientError, Error, Result};
use crate::sdk::Connector;
use crate::snapshot::{DeviceId, DeviceSnapshot};
use crate::types::{Humidity, TargetHumidity};

/// Platform-visible state of a humidifier entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HumidifierState {
    /// Stable identifier, the device cid.
    pub unique_id: String,
    /// Display name.
    pub name: String,
    /// Power state.
    pub is_on: bool,
    /// Target humidity in percent.
    pub target_humidity: Option<u8>,
    /// Current humidity in percent.
    pub current_humidity: Option<u8>,
    /// Whether the device is reachable.
    pub available: bool,
    /// Operating mode.
    pub mode: Option<String>,
}

#[derive(Debug, Clone)]
struct Attributes {
    device_info: DeviceInfo,
    description: EntityDescription,
    current_humidity: Option<Humidity>,
}

impl Attributes {
    fn derive(device_id: &DeviceId, snapshot: Option<&DeviceSnapshot>) -> Self {
        match snapshot {
            Some(snapshot) => Self {
                device_info: DeviceInfo::from_snapshot(snapshot),
                description: EntityDescription::new(device_id, snapshot.name()),
                current_humidity: snapshot.humidity(),
            },
            None => Self {
                device_info: DeviceInfo::placeholder(device_id),
                description: EntityDescription::new(device_id, device_id.as_str()),
                current_humidity: None,
            },
        }
    }
}

#[derive(Debug, Default)]
struct Subscriptions {
    refresh: Option<SubscriptionId>,
    device: Option<SubscriptionId>,
}

/// Humidifier entity translating coordinator snapshots into properties
/// and commands.
///
/// Properties read the coordinator's latest snapshot on every call. Identity
/// attributes are re-derived after every refresh; if the device disappears
/// from the account the last known identity is kept and the entity reports
/// itself unavailable.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vesync_humidifiers::client::ApiClient;
/// use vesync_humidifiers::config::{CoordinatorConfig, Credentials};
/// use vesync_humidifiers::coordinator::UpdateCoordinator;
/// use vesync_humidifiers::entity::HumidifierEntity;
/// use vesync_humidifiers::sdk::{MockSdk, RawHumidifier};
/// use vesync_humidifiers::snapshot::DeviceId;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sdk = MockSdk::new().with_device(RawHumidifier::new("cid-1", "Bedroom"));
/// let client = Arc::new(ApiClient::new(sdk.connector(), Credentials::new("u", "p")));
/// let coordinator = Arc::new(UpdateCoordinator::new(client, CoordinatorConfig::default()));
/// coordinator.refresh().await?;
///
/// let entity = HumidifierEntity::new(Arc::clone(&coordinator), DeviceId::new("cid-1")?);
/// assert!(!entity.is_on());
///
/// entity.turn_on().await?;
/// assert!(entity.is_on());
/// # Ok(())
/// # }
/// ```
pub struct HumidifierEntity<C: Connector> {
    coordinator: Arc<UpdateCoordinator<C>>,
    device_id: DeviceId,
    attributes: RwLock<Attributes>,
    state_tx: watch::Sender<HumidifierState>,
    subscriptions: Mutex<Subscriptions>,
}

impl<C: Connector> HumidifierEntity<C> {
    /// Creates the entity and registers it for coordinator refreshes.
    #[must_use]
    pub fn new(coordinator: Arc<UpdateCoordinator<C>>, device_id: DeviceId) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let listener = weak.clone();
            let refresh = coordinator.add_listener(move || {
                if let Some(entity) = listener.upgrade() {
                    entity.on_refresh();
                }
            });

            let attributes =
                Attributes::derive(&device_id, coordinator.device(&device_id).as_ref());
            let (state_tx, _) = watch::channel(HumidifierState::default());

            Self {
                coordinator,
                device_id,
                attributes: RwLock::new(attributes),
                state_tx,
                subscriptions: Mutex::new(Subscriptions {
                    refresh: Some(refresh),
                    device: None,
                }),
            }
        })
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Returns the stable unique id, the device cid.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        self.device_id.as_str()
    }

    /// Returns the device registry record.
    #[must_use]
    pub fn device_info(&self) -> DeviceInfo {
        self.attributes.read().device_info.clone()
    }

    /// Returns the entity description.
    #[must_use]
    pub fn description(&self) -> EntityDescription {
        self.attributes.read().description.clone()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.attributes.read().description.name.clone()
    }

    fn snapshot(&self) -> Option<DeviceSnapshot> {
        self.coordinator.device(&self.device_id)
    }

    // ========== Properties ==========

    /// Returns `true` if the humidifier is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.snapshot().is_some_and(|s| s.is_on())
    }

    /// Returns the target humidity.
    #[must_use]
    pub fn target_humidity(&self) -> Option<Humidity> {
        self.snapshot().and_then(|s| s.target_humidity())
    }

    /// Returns the current humidity.
    ///
    /// Falls back to the reading captured at the last refresh when the
    /// device is absent from the latest snapshot.
    #[must_use]
    pub fn current_humidity(&self) -> Option<Humidity> {
        match self.snapshot() {
            Some(snapshot) => snapshot.humidity(),
            None => self.attributes.read().current_humidity,
        }
    }

    /// Returns `true` if the device is online.
    #[must_use]
    pub fn available(&self) -> bool {
        self.snapshot().is_some_and(|s| s.is_online())
    }

    /// Returns the operating mode, if the device reports one.
    #[must_use]
    pub fn mode(&self) -> Option<String> {
        self.snapshot()
            .and_then(|s| s.mode().as_str().map(str::to_string))
    }

    /// Returns the current platform-visible state.
    #[must_use]
    pub fn state(&self) -> HumidifierState {
        let snapshot = self.snapshot();
        let current_humidity = match &snapshot {
            Some(snapshot) => snapshot.humidity(),
            None => self.attributes.read().current_humidity,
        };

        HumidifierState {
            unique_id: self.unique_id().to_string(),
            name: self.name(),
            is_on: snapshot.as_ref().is_some_and(DeviceSnapshot::is_on),
            target_humidity: snapshot
                .as_ref()
                .and_then(DeviceSnapshot::target_humidity)
                .map(|h| h.value()),
            current_humidity: current_humidity.map(|h| h.value()),
            available: snapshot.as_ref().is_some_and(DeviceSnapshot::is_online),
            mode: snapshot
                .as_ref()
                .and_then(|s| s.mode().as_str().map(str::to_string)),
        }
    }

    /// Returns a receiver of written states.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<HumidifierState> {
        self.state_tx.subscribe()
    }

    // ========== Commands ==========

    /// Turns the humidifier on, then refreshes the coordinator.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Communication` if the device did not accept
    /// the command, or the client error raised while sending it.
    pub async fn turn_on(&self) -> Result<()> {
        let outcome = self.coordinator.client().turn_on(&self.device_id).await;
        self.finish_command(outcome, "Unable to turn on the humidifier")
            .await
    }

    /// Turns the humidifier off, then refreshes the coordinator.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Communication` if the device did not accept
    /// the command, or the client error raised while sending it.
    pub async fn turn_off(&self) -> Result<()> {
        let outcome = self.coordinator.client().turn_off(&self.device_id).await;
        self.finish_command(outcome, "Unable to turn off the humidifier")
            .await
    }

    /// Sets the target humidity, then refreshes the coordinator.
    ///
    /// A value outside the accepted set point range is rejected before
    /// anything is sent, and no refresh is requested.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for an invalid set point,
    /// `ClientError::Communication` if the device did not accept the
    /// command, or the client error raised while sending it.
    pub async fn set_humidity(&self, humidity: u8) -> Result<()> {
        let target = TargetHumidity::new(humidity)?;
        let outcome = self
            .coordinator
            .client()
            .set_humidity(&self.device_id, target)
            .await;
        self.finish_command(outcome, "Unable to set the target humidity")
            .await
    }

    async fn finish_command(
        &self,
        outcome: std::result::Result<bool, ClientError>,
        failure: &str,
    ) -> Result<()> {
        let result = match outcome {
            Ok(true) => Ok(()),
            Ok(false) => Err(ClientError::Communication(failure.to_string())),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            tracing::warn!(device_id = %self.device_id, error = %e, "Humidifier command failed");
        }

        self.coordinator.request_refresh().await;
        result.map_err(Error::from)
    }

    // ========== Platform lifecycle ==========

    /// Subscribes to this device's change notifications.
    ///
    /// From now on every refresh writes the entity state, and a detected
    /// change writes it immediately. Calling this twice has no effect.
    pub fn added_to_platform(self: &Arc<Self>) {
        let mut subscriptions = self.subscriptions.lock();
        if subscriptions.device.is_some() {
            return;
        }

        let weak = Arc::downgrade(self);
        let id = self
            .coordinator
            .on_device_changed(self.device_id.clone(), move |_| {
                if let Some(entity) = weak.upgrade() {
                    entity.write_state();
                }
            });
        subscriptions.device = Some(id);
        drop(subscriptions);

        tracing::debug!(device_id = %self.device_id, "Humidifier entity added");
        self.write_state();
    }

    /// Drops every coordinator subscription of this entity.
    pub fn removed_from_platform(&self) {
        let mut subscriptions = self.subscriptions.lock();
        for id in [subscriptions.device.take(), subscriptions.refresh.take()]
            .into_iter()
            .flatten()
        {
            self.coordinator.unsubscribe(id);
        }
        tracing::debug!(device_id = %self.device_id, "Humidifier entity removed");
    }

    /// Returns `true` between `added_to_platform` and `removed_from_platform`.
    #[must_use]
    pub fn is_added(&self) -> bool {
        self.subscriptions.lock().device.is_some()
    }

    fn on_refresh(&self) {
        let snapshot = self.snapshot();
        if let Some(snapshot) = &snapshot {
            *self.attributes.write() = Attributes::derive(&self.device_id, Some(snapshot));
        }
        if self.is_added() {
            self.write_state();
        }
    }

    fn write_state(&self) {
        let state = self.state();
        tracing::trace!(device_id = %self.device_id, ?state, "Writing humidifier state");
        self.state_tx.send_replace(state);
    }
}

impl<C: Connector> Drop for HumidifierEntity<C> {
    fn drop(&mut self) {
        let subscriptions = self.subscriptions.get_mut();
        for id in [subscriptions.device.take(), subscriptions.refresh.take()]
            .into_iter()
            .flatten()
        {
            self.coordinator.unsubscribe(id);
        }
    }
}

impl<C: Connector> std::fmt::Debug for HumidifierEntity<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HumidifierEntity")
            .field("device_id", &self.device_id)
            .field("attributes", &*self.attributes.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::ApiClient;
    use crate::config::{CoordinatorConfig, Credentials};
    use crate::error::{SdkError, ValueError};
    use crate::sdk::{MockSdk, Operation, RawHumidifier};

    type TestConnector = Box<dyn Fn(&Credentials) -> MockSdk + Send + Sync>;
    type Coordinator = UpdateCoordinator<TestConnector>;

    fn coordinator(sdk: &MockSdk) -> Arc<Coordinator> {
        let connector: TestConnector = Box::new(sdk.connector());
        let client = Arc::new(ApiClient::new(connector, Credentials::new("u", "p")));
        Arc::new(UpdateCoordinator::new(client, CoordinatorConfig::default()))
    }

    fn sdk() -> MockSdk {
        MockSdk::new().with_device(
            RawHumidifier::new("a", "Bedroom")
                .with_type("Classic300S")
                .with_status("on")
                .with_humidity(45)
                .with_target_humidity(50)
                .with_mode("auto"),
        )
    }

    async fn entity(sdk: &MockSdk) -> (Arc<Coordinator>, Arc<HumidifierEntity<TestConnector>>) {
        let coordinator = coordinator(sdk);
        coordinator.refresh().await.unwrap();
        let entity = HumidifierEntity::new(Arc::clone(&coordinator), DeviceId::new("a").unwrap());
        (coordinator, entity)
    }

    fn updates(sdk: &MockSdk) -> usize {
        sdk.count(|op| *op == Operation::Update)
    }

    #[tokio::test]
    async fn properties_follow_snapshot() {
        let sdk = sdk();
        let (_coordinator, entity) = entity(&sdk).await;

        assert_eq!(entity.unique_id(), "a");
        assert_eq!(entity.name(), "Bedroom");
        assert!(entity.is_on());
        assert!(entity.available());
        assert_eq!(entity.current_humidity().map(|h| h.value()), Some(45));
        assert_eq!(entity.target_humidity().map(|h| h.value()), Some(50));
        assert_eq!(entity.mode().as_deref(), Some("auto"));

        let info = entity.device_info();
        assert_eq!(info.model, "Classic300S");
        assert_eq!(entity.description().key, "vesync_humidifier_a");
    }

    #[tokio::test]
    async fn identity_is_rederived_on_refresh() {
        let sdk = sdk();
        let (coordinator, entity) = entity(&sdk).await;

        sdk.modify_device("a", |raw| raw.device_name = "Guest room".to_string());
        coordinator.refresh().await.unwrap();

        assert_eq!(entity.name(), "Guest room");
        assert_eq!(entity.device_info().name, "Guest room");
    }

    #[tokio::test]
    async fn absent_device_is_unavailable() {
        let sdk = sdk();
        let (coordinator, entity) = entity(&sdk).await;

        sdk.remove_device("a");
        coordinator.refresh().await.unwrap();

        assert!(!entity.available());
        assert!(!entity.is_on());
        assert_eq!(entity.name(), "Bedroom");
        assert_eq!(entity.current_humidity().map(|h| h.value()), Some(45));
    }

    #[tokio::test]
    async fn offline_device_is_unavailable() {
        let sdk = sdk();
        sdk.modify_device("a", |raw| raw.connection_status = "offline".to_string());
        let (_coordinator, entity) = entity(&sdk).await;

        assert!(!entity.available());
    }

    #[tokio::test]
    async fn successful_command_refreshes() {
        let sdk = sdk();
        let (_coordinator, entity) = entity(&sdk).await;
        let before = updates(&sdk);

        entity.turn_off().await.unwrap();

        assert_eq!(updates(&sdk), before + 1);
        assert!(!entity.is_on());
    }

    #[tokio::test]
    async fn rejected_command_still_refreshes() {
        let sdk = sdk();
        let (_coordinator, entity) = entity(&sdk).await;
        sdk.set_command_result(Some(false));
        let before = updates(&sdk);

        let err = entity.turn_on().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Client(ClientError::Communication(ref m)) if m == "Unable to turn on the humidifier"
        ));
        assert_eq!(updates(&sdk), before + 1);
    }

    #[tokio::test]
    async fn failing_command_still_refreshes() {
        let sdk = sdk();
        let (_coordinator, entity) = entity(&sdk).await;
        sdk.fail_next_command(SdkError::Transport("reset".to_string()));
        let before = updates(&sdk);

        assert!(entity.set_humidity(55).await.is_err());
        assert_eq!(updates(&sdk), before + 1);
    }

    #[tokio::test]
    async fn set_humidity_forwards_target() {
        let sdk = sdk();
        let (_coordinator, entity) = entity(&sdk).await;

        entity.set_humidity(60).await.unwrap();

        assert!(
            sdk.operations()
                .contains(&Operation::SetHumidity("a".to_string(), 60))
        );
        assert_eq!(entity.target_humidity().map(|h| h.value()), Some(60));
    }

    #[tokio::test]
    async fn invalid_set_point_is_rejected_locally() {
        let sdk = sdk();
        let (_coordinator, entity) = entity(&sdk).await;
        let before = sdk.operations().len();

        let err = entity.set_humidity(95).await.unwrap_err();

        assert!(matches!(err, Error::Value(ValueError::OutOfRange { .. })));
        assert_eq!(sdk.operations().len(), before);
    }

    #[tokio::test]
    async fn device_change_writes_state_once_added() {
        let sdk = sdk();
        let (coordinator, entity) = entity(&sdk).await;
        let mut rx = entity.watch_state();

        entity.added_to_platform();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_on);

        sdk.modify_device("a", |raw| raw.device_status = "off".to_string());
        coordinator.refresh().await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(!rx.borrow().is_on);
        assert_eq!(coordinator.device_listener_count(entity.device_id()), 1);
    }

    #[tokio::test]
    async fn device_change_alone_drives_state_writes() {
        let sdk = sdk();
        let (coordinator, entity) = entity(&sdk).await;
        entity.added_to_platform();
        let refresh = entity.subscriptions.lock().refresh.take().unwrap();
        assert!(coordinator.unsubscribe(refresh));
        let mut rx = entity.watch_state();
        rx.borrow_and_update();

        coordinator.refresh().await.unwrap();
        assert!(!rx.has_changed().unwrap());

        sdk.modify_device("a", |raw| raw.device_status = "off".to_string());
        coordinator.refresh().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_on);
    }

    #[tokio::test]
    async fn mode_is_reported_as_sent() {
        let sdk = sdk();
        sdk.modify_device("a", |raw| {
            raw.details.insert("mode".to_string(), "AUTO".into());
        });
        let (_coordinator, entity) = entity(&sdk).await;

        assert_eq!(entity.mode().as_deref(), Some("AUTO"));
    }

    #[tokio::test]
    async fn removal_drops_subscriptions() {
        let sdk = sdk();
        let (coordinator, entity) = entity(&sdk).await;
        entity.added_to_platform();
        entity.added_to_platform();
        assert_eq!(coordinator.device_listener_count(entity.device_id()), 1);
        assert_eq!(coordinator.listener_count(), 1);

        entity.removed_from_platform();

        assert!(!entity.is_added());
        assert_eq!(coordinator.device_listener_count(entity.device_id()), 0);
        assert_eq!(coordinator.listener_count(), 0);
    }

    #[tokio::test]
    async fn dropping_entity_unregisters_listener() {
        let sdk = sdk();
        let (coordinator, entity) = entity(&sdk).await;
        assert_eq!(coordinator.listener_count(), 1);

        drop(entity);

        assert_eq!(coordinator.listener_count(), 0);
    }
}

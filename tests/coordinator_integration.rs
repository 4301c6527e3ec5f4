// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for polling, change detection and entity commands
//! using the in-memory SDK.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use vesync_humidifiers::sdk::{MockSdk, Operation, RawHumidifier};
use vesync_humidifiers::{
    ApiClient, ClientError, CoordinatorConfig, CoordinatorEvent, CoordinatorState, Credentials,
    DeviceId, EntryConfig, Error, Integration, PowerStatus, SdkError, StateChange,
    UpdateCoordinator, UpdateError,
};

fn credentials() -> Credentials {
    Credentials::new("user@example.com", "secret").with_timezone("Europe/Paris")
}

fn fleet() -> MockSdk {
    MockSdk::new()
        .with_device(
            RawHumidifier::new("A", "Bedroom")
                .with_type("Classic300S")
                .with_status("on")
                .with_humidity(45)
                .with_target_humidity(50)
                .with_mode("auto"),
        )
        .with_device(
            RawHumidifier::new("B", "Office")
                .with_type("LV600S")
                .with_status("off")
                .with_humidity(38),
        )
}

fn id(cid: &str) -> DeviceId {
    DeviceId::new(cid).unwrap()
}

// ============================================================================
// Change detection
// ============================================================================

mod change_detection {
    use super::*;

    fn coordinator(
        sdk: &MockSdk,
    ) -> Arc<UpdateCoordinator<impl vesync_humidifiers::Connector<Session = MockSdk>>> {
        let client = Arc::new(ApiClient::new(sdk.connector(), credentials()));
        Arc::new(UpdateCoordinator::new(client, CoordinatorConfig::default()))
    }

    #[tokio::test]
    async fn power_off_yields_exactly_one_notification() {
        let sdk = fleet();
        let coordinator = coordinator(&sdk);
        coordinator.refresh().await.unwrap();
        let mut events = coordinator.subscribe();

        sdk.modify_device("A", |raw| raw.device_status = "off".to_string());
        coordinator.refresh().await.unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(first.device_id(), Some(&id("A")));
        let CoordinatorEvent::DeviceChanged(change) = first else {
            panic!("expected DeviceChanged, got {first:?}");
        };
        assert_eq!(change.changes, vec![StateChange::Power(PowerStatus::Off)]);

        assert!(matches!(
            events.recv().await.unwrap(),
            CoordinatorEvent::Refreshed { device_count: 2, .. }
        ));
    }

    #[tokio::test]
    async fn each_tracked_field_triggers_a_notification() {
        let sdk = fleet();
        let coordinator = coordinator(&sdk);
        coordinator.refresh().await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        coordinator.on_device_changed(id("B"), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let edits: [fn(&mut RawHumidifier); 4] = [
            |raw| raw.device_status = "on".to_string(),
            |raw| raw.auto_humidity_enabled = true,
            |raw| raw.humidity = Some(39),
            |raw| raw.connection_status = "offline".to_string(),
        ];
        for (n, edit) in edits.into_iter().enumerate() {
            sdk.modify_device("B", edit);
            coordinator.refresh().await.unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), n + 1);
        }
    }

    #[tokio::test]
    async fn untracked_fields_do_not_notify() {
        let sdk = fleet();
        let coordinator = coordinator(&sdk);
        coordinator.refresh().await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        coordinator.on_device_changed(id("A"), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sdk.modify_device("A", |raw| {
            raw.target_humidity = Some(65);
            raw.device_name = "Main bedroom".to_string();
        });
        coordinator.refresh().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let snapshot = coordinator.device(&id("A")).unwrap();
        assert_eq!(snapshot.target_humidity().map(|h| h.value()), Some(65));
        assert_eq!(snapshot.name(), "Main bedroom");
    }

    #[tokio::test]
    async fn added_and_removed_devices_do_not_notify() {
        let sdk = fleet();
        let coordinator = coordinator(&sdk);
        coordinator.refresh().await.unwrap();
        let mut events = coordinator.subscribe();

        sdk.remove_device("B");
        sdk.insert_device(RawHumidifier::new("C", "Attic").with_status("on"));
        coordinator.refresh().await.unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            CoordinatorEvent::Refreshed { device_count: 2, .. }
        ));
        let data = coordinator.data().unwrap();
        assert!(data.contains(&id("C")));
        assert!(!data.contains(&id("B")));
    }
}

// ============================================================================
// Failure handling
// ============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn http_403_during_poll_requires_reauth() {
        let sdk = fleet();
        let client = Arc::new(ApiClient::new(sdk.connector(), credentials()));
        let coordinator = UpdateCoordinator::new(client, CoordinatorConfig::default());
        coordinator.refresh().await.unwrap();

        sdk.fail_next_update(SdkError::Http {
            status: 403,
            message: "token expired".to_string(),
        });
        let err = coordinator.refresh().await.unwrap_err();

        assert!(matches!(err, UpdateError::ReauthRequired(_)));
        assert_eq!(coordinator.state(), CoordinatorState::ReauthRequired);
        assert_eq!(coordinator.data().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn session_is_reopened_after_auth_failure() {
        let sdk = fleet();
        let client = Arc::new(ApiClient::new(sdk.connector(), credentials()));
        let coordinator = UpdateCoordinator::new(Arc::clone(&client), CoordinatorConfig::default());
        coordinator.refresh().await.unwrap();

        sdk.fail_next_update(SdkError::Http {
            status: 401,
            message: "unauthorized".to_string(),
        });
        assert!(coordinator.refresh().await.is_err());
        assert!(!client.has_session().await);

        coordinator.reauthenticate(credentials()).await.unwrap();
        assert_eq!(sdk.count(|op| *op == Operation::Login), 2);
    }

    #[tokio::test]
    async fn rejected_request_is_an_update_failure() {
        let sdk = fleet();
        let client = Arc::new(ApiClient::new(sdk.connector(), credentials()));
        let coordinator = UpdateCoordinator::new(client, CoordinatorConfig::default());

        sdk.fail_next_update(SdkError::Rejected("quota".to_string()));
        let err = coordinator.refresh().await.unwrap_err();

        assert!(matches!(err, UpdateError::UpdateFailed(_)));
        assert!(coordinator.data().is_none());
        assert!(coordinator.last_update_success_time().is_none());
    }
}

// ============================================================================
// Entities through the integration
// ============================================================================

mod entities {
    use super::*;

    fn entry() -> EntryConfig {
        EntryConfig::from_json(
            r#"{"username": "user@example.com", "password": "secret", "scan_interval": 3600}"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn entities_expose_device_properties() {
        let sdk = fleet();
        let integration = Integration::setup(sdk.connector(), &entry()).await.unwrap();

        let bedroom = integration.entity("A").unwrap();
        assert_eq!(bedroom.unique_id(), "A");
        assert_eq!(bedroom.description().key, "vesync_humidifier_A");
        assert_eq!(
            bedroom.device_info().identifiers,
            ("vesync_humidifiers".to_string(), "A".to_string())
        );
        assert!(bedroom.is_on());
        assert_eq!(bedroom.mode().as_deref(), Some("auto"));

        let office = integration.entity("B").unwrap();
        assert!(!office.is_on());
        assert_eq!(office.mode(), None);
        assert_eq!(office.current_humidity().map(|h| h.value()), Some(38));

        integration.unload();
    }

    #[tokio::test]
    async fn external_change_is_written_immediately() {
        let sdk = fleet();
        let integration = Integration::setup(sdk.connector(), &entry()).await.unwrap();
        let office = integration.entity("B").unwrap();
        let mut rx = office.watch_state();
        rx.borrow_and_update();

        sdk.modify_device("B", |raw| raw.device_status = "on".to_string());
        integration.coordinator().refresh().await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(rx.borrow().is_on);

        integration.unload();
    }

    #[tokio::test]
    async fn unexpected_vendor_values_keep_the_device() {
        let sdk = fleet();
        let integration = Integration::setup(sdk.connector(), &entry()).await.unwrap();
        let bedroom = integration.entity("A").unwrap();
        assert!(bedroom.is_on());

        sdk.modify_device("A", |raw| {
            raw.device_status = "standby".to_string();
            raw.humidity = Some(101);
        });
        integration.coordinator().refresh().await.unwrap();

        assert!(integration.coordinator().device(&id("A")).is_some());
        assert!(bedroom.available());
        assert!(!bedroom.is_on());
        assert_eq!(bedroom.current_humidity(), None);
        assert_eq!(bedroom.target_humidity().map(|h| h.value()), Some(50));

        integration.unload();
    }

    #[tokio::test]
    async fn commands_are_followed_by_a_refresh() {
        let sdk = fleet();
        let integration = Integration::setup(sdk.connector(), &entry()).await.unwrap();
        let office = integration.entity("B").unwrap();
        sdk.clear_operations();

        office.turn_on().await.unwrap();
        office.set_humidity(45).await.unwrap();
        office.turn_off().await.unwrap();

        sdk.assert_operations(&[
            Operation::TurnOn("B".to_string()),
            Operation::Update,
            Operation::SetHumidity("B".to_string(), 45),
            Operation::Update,
            Operation::TurnOff("B".to_string()),
            Operation::Update,
        ]);
        assert!(!office.is_on());
        assert_eq!(office.target_humidity().map(|h| h.value()), Some(45));

        integration.unload();
    }

    #[tokio::test]
    async fn command_to_offline_device_fails_and_refreshes() {
        let sdk = fleet();
        let integration = Integration::setup(sdk.connector(), &entry()).await.unwrap();
        let bedroom = integration.entity("A").unwrap();
        sdk.modify_device("A", |raw| raw.connection_status = "offline".to_string());
        sdk.clear_operations();

        let err = bedroom.turn_off().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Client(ClientError::Communication(ref m)) if m == "Unable to turn off the humidifier"
        ));
        sdk.assert_operations(&[Operation::TurnOff("A".to_string()), Operation::Update]);
        assert!(!bedroom.available());

        integration.unload();
    }

    #[tokio::test]
    async fn commands_to_different_devices_run_concurrently() {
        let sdk = fleet();
        let integration = Integration::setup(sdk.connector(), &entry()).await.unwrap();
        let bedroom = integration.entity("A").unwrap();
        let office = integration.entity("B").unwrap();

        let (a, b) = tokio::join!(bedroom.turn_off(), office.turn_on());
        a.unwrap();
        b.unwrap();

        assert!(!bedroom.is_on());
        assert!(office.is_on());
        assert_eq!(sdk.max_parallel_updates(), 1);

        integration.unload();
    }
}

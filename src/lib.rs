// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VeSync Humidifiers - polled humidifier entities for the VeSync cloud.
//!
//! The crate is organised in three layers:
//!
//! - **API client** ([`client::ApiClient`]): owns one lazily created
//!   session of a [`sdk::VeSyncSdk`] implementation and runs its blocking
//!   calls on tokio's blocking pool
//! - **Update coordinator** ([`coordinator::UpdateCoordinator`]): polls the
//!   account on a fixed interval, diffs successive snapshots and notifies
//!   per-device listeners
//! - **Entities** ([`entity::HumidifierEntity`]): translate snapshots into
//!   humidifier properties and commands
//!
//! [`Integration`] wires the three together for one account.
//!
//! The vendor protocol is not implemented here. Callers provide a
//! [`sdk::Connector`] that opens SDK sessions. The `mock` feature adds
//! `sdk::MockSdk`, an in-memory implementation for tests and examples.
//!
//! # Quick Start
//!
//! Uses the `mock` feature.
//!
//! ```
//! use vesync_humidifiers::config::EntryConfig;
//! use vesync_humidifiers::sdk::{MockSdk, RawHumidifier};
//! use vesync_humidifiers::Integration;
//!
//! #[tokio::main]
//! async fn main() -> vesync_humidifiers::Result<()> {
//!     let sdk = MockSdk::new()
//!         .with_device(RawHumidifier::new("cid-1", "Bedroom").with_humidity(41));
//!     let entry = EntryConfig::from_json(r#"{"username": "me@example.com", "password": "pw"}"#)?;
//!
//!     let integration = Integration::setup(sdk.connector(), &entry).await?;
//!
//!     let bedroom = integration.entity("cid-1")?;
//!     bedroom.turn_on().await?;
//!     bedroom.set_humidity(55).await?;
//!     assert!(bedroom.is_on());
//!
//!     integration.unload();
//!     Ok(())
//! }
//! ```
//!
//! # Watching state
//!
//! ```ignore
//! let mut rx = bedroom.watch_state();
//! while rx.changed().await.is_ok() {
//!     let state = rx.borrow_and_update().clone();
//!     println!("{} is {}", state.name, if state.is_on { "on" } else { "off" });
//! }
//! ```

pub mod client;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
mod integration;
pub mod sdk;
pub mod snapshot;
pub mod types;

/// Integration domain, used in device identifiers.
pub const DOMAIN: &str = "vesync_humidifiers";

pub use client::ApiClient;
pub use config::{CoordinatorConfig, Credentials, EntryConfig};
pub use coordinator::{CoordinatorEvent, CoordinatorState, SubscriptionId, UpdateCoordinator};
pub use entity::{DeviceInfo, EntityDescription, HumidifierEntity, HumidifierState};
pub use error::{ClientError, ConfigError, Error, Result, SdkError, UpdateError, ValueError};
pub use integration::Integration;
pub use sdk::{Connector, VeSyncSdk};
pub use snapshot::{DeviceChange, DeviceId, DeviceSnapshot, SnapshotCollection, StateChange};
pub use types::{ConnectionStatus, HumidifierMode, Humidity, PowerStatus, TargetHumidity};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling update coordinator.
//!
//! [`UpdateCoordinator`] owns the snapshot collection shared by all
//! entities. It polls the account through the API client, diffs each new
//! collection against the previous one and notifies per-device listeners.
//!
//! Two notification paths are offered:
//!
//! - Callbacks registered with [`UpdateCoordinator::add_listener`] and
//!   [`UpdateCoordinator::on_device_changed`], invoked synchronously after
//!   the new data is in place
//! - A broadcast stream of [`CoordinatorEvent`]s from
//!   [`UpdateCoordinator::subscribe`]

mod event;
mod event_bus;
mod listeners;
mod state;
mod update_coordinator;

pub use event::CoordinatorEvent;
pub use event_bus::EventBus;
pub use listeners::{ListenerRegistry, SubscriptionId};
pub use state::CoordinatorState;
pub use update_coordinator::UpdateCoordinator;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for coordinator listeners.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`ListenerRegistry`] - Stores and dispatches refresh and per-device
//!   change callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::snapshot::{DeviceChange, DeviceId};

/// Unique identifier for a listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback run after every successful refresh.
type RefreshCallback = Arc<dyn Fn() + Send + Sync>;

/// Callback run when one device's tracked state changed.
type DeviceCallback = Arc<dyn Fn(&DeviceChange) + Send + Sync>;

/// Registry of coordinator listeners.
///
/// Callbacks are cloned out of the registry before being invoked, so a
/// callback may register or remove listeners without deadlocking.
pub struct ListenerRegistry {
    next_id: AtomicU64,
    refresh_callbacks: RwLock<HashMap<SubscriptionId, RefreshCallback>>,
    device_callbacks: RwLock<HashMap<SubscriptionId, (DeviceId, DeviceCallback)>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            refresh_callbacks: RwLock::new(HashMap::new()),
            device_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback run after every successful refresh.
    pub fn add_refresh<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.refresh_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback run when the given device changes.
    pub fn add_device<F>(&self, device_id: DeviceId, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.device_callbacks
            .write()
            .insert(id, (device_id, Arc::new(callback)));
        id
    }

    /// Removes a registration of either kind.
    ///
    /// Returns `true` if a callback was removed.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        self.refresh_callbacks.write().remove(&id).is_some()
            || self.device_callbacks.write().remove(&id).is_some()
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.refresh_callbacks.write().clear();
        self.device_callbacks.write().clear();
    }

    /// Returns the number of refresh callbacks.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.refresh_callbacks.read().len()
    }

    /// Returns the number of device callbacks for one device.
    #[must_use]
    pub fn device_count(&self, device_id: &DeviceId) -> usize {
        self.device_callbacks
            .read()
            .values()
            .filter(|(id, _)| id == device_id)
            .count()
    }

    /// Invokes all refresh callbacks.
    pub fn dispatch_refresh(&self) {
        let callbacks: Vec<RefreshCallback> =
            self.refresh_callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Invokes the callbacks registered for the changed device.
    pub fn dispatch_device_change(&self, change: &DeviceChange) {
        let callbacks: Vec<DeviceCallback> = self
            .device_callbacks
            .read()
            .values()
            .filter(|(id, _)| *id == change.device_id)
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(change);
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("refresh_callbacks", &self.refresh_callbacks.read().len())
            .field("device_callbacks", &self.device_callbacks.read().len())
            .finish()
    }
}

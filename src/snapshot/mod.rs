// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polled device state.
//!
//! Every poll produces a [`SnapshotCollection`]: one immutable
//! [`DeviceSnapshot`] per humidifier, keyed by [`DeviceId`]. Comparing two
//! collections yields a [`DeviceChange`] for each device whose tracked
//! fields differ.
//!
//! # Examples
//!
//! ```
//! use vesync_humidifiers::snapshot::{DeviceId, DeviceSnapshot, SnapshotCollection, StateChange};
//! use vesync_humidifiers::types::PowerStatus;
//!
//! let id = DeviceId::new("A").unwrap();
//! let on = DeviceSnapshot::builder(id.clone()).status(PowerStatus::On).build();
//! let off = DeviceSnapshot::builder(id).status(PowerStatus::Off).build();
//!
//! assert_eq!(off.changes_since(&on), vec![StateChange::Power(PowerStatus::Off)]);
//!
//! let previous = SnapshotCollection::from_snapshots([on]);
//! let current = SnapshotCollection::from_snapshots([off]);
//! assert_eq!(current.changes_since(&previous).len(), 1);
//! ```

mod collection;
mod device_id;
mod device_snapshot;
mod state_change;

pub use collection::SnapshotCollection;
pub use device_id::DeviceId;
pub use device_snapshot::{DeviceSnapshot, DeviceSnapshotBuilder};
pub use state_change::{DeviceChange, StateChange};

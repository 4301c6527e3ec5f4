// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! API client for the VeSync cloud.
//!
//! [`ApiClient`] owns one lazily created SDK session and exposes async
//! wrappers around the blocking SDK calls. [`run_blocking`] is the
//! primitive every wrapper uses to move work off the async scheduler.

mod api_client;
mod blocking;

pub use api_client::ApiClient;
pub use blocking::run_blocking;

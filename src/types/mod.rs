// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for humidifier state.
//!
//! Each type validates its value at construction time, so a snapshot built
//! from SDK data never carries an out-of-range reading or an unparsed status
//! string.
//!
//! # Types
//!
//! - [`PowerStatus`] - On/Off operating status
//! - [`ConnectionStatus`] - Online/Offline cloud connectivity
//! - [`Humidity`] - Relative humidity reading (0-100%)
//! - [`TargetHumidity`] - Humidity set point (30-80%)
//! - [`HumidifierMode`] - Operating mode with an explicit unknown value

mod humidity;
mod mode;
mod status;

pub use humidity::{Humidity, TargetHumidity};
pub use mode::HumidifierMode;
pub use status::{ConnectionStatus, PowerStatus};

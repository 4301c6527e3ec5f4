// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Humidifier operating mode.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the mode inside the device details map.
const MODE_KEY: &str = "mode";

/// Operating mode of a humidifier.
///
/// The cloud reports the mode as a free-form string inside the device
/// details. The exact lowercase spellings of the well-known modes get their
/// own variant. Anything else, including other casings, is kept verbatim in
/// [`HumidifierMode::Other`], so [`as_str`](Self::as_str) always returns the
/// string the device sent. A missing or empty value becomes
/// [`HumidifierMode::Unknown`].
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::types::HumidifierMode;
///
/// assert_eq!(HumidifierMode::parse("auto"), HumidifierMode::Auto);
/// assert_eq!(HumidifierMode::parse("baby"), HumidifierMode::Other("baby".to_string()));
/// assert_eq!(HumidifierMode::parse("AUTO").as_str(), Some("AUTO"));
/// assert_eq!(HumidifierMode::Sleep.as_str(), Some("sleep"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumidifierMode {
    /// Device regulates towards its target humidity.
    Auto,
    /// Fixed mist level chosen by the user.
    Manual,
    /// Quiet operation with the display dimmed.
    Sleep,
    /// Humidity-driven mode used by some models.
    Humidity,
    /// Mode string the library does not know about.
    Other(String),
    /// No mode was reported.
    #[default]
    Unknown,
}

impl HumidifierMode {
    /// Parses a mode string as reported by the cloud, without normalising
    /// it.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "auto" => Self::Auto,
            "manual" => Self::Manual,
            "sleep" => Self::Sleep,
            "humidity" => Self::Humidity,
            "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Reads the mode from a device details map.
    ///
    /// A missing key or a non-string value yields [`HumidifierMode::Unknown`].
    #[must_use]
    pub fn from_details(details: &Map<String, Value>) -> Self {
        match details.get(MODE_KEY) {
            Some(Value::String(mode)) => Self::parse(mode),
            _ => Self::Unknown,
        }
    }

    /// Returns the mode string, or `None` when unknown.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Auto => Some("auto"),
            Self::Manual => Some("manual"),
            Self::Sleep => Some("sleep"),
            Self::Humidity => Some("humidity"),
            Self::Other(mode) => Some(mode),
            Self::Unknown => None,
        }
    }

    /// Returns `true` if no mode was reported.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for HumidifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("unknown"))
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating and connectivity status of a humidifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Operating status reported by the cloud for a device.
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::types::PowerStatus;
///
/// let status: PowerStatus = "on".parse().unwrap();
/// assert!(status.is_on());
/// assert_eq!(PowerStatus::Off.as_str(), "off");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerStatus {
    /// Device is switched off.
    Off,
    /// Device is running.
    On,
}

impl PowerStatus {
    /// Returns the string used by the VeSync cloud.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` if the device is running.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on" | "1" | "true" => Ok(Self::On),
            "off" | "0" | "false" => Ok(Self::Off),
            _ => Err(ValueError::InvalidPowerStatus(s.to_string())),
        }
    }
}

impl From<bool> for PowerStatus {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Cloud connectivity of a device.
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::types::ConnectionStatus;
///
/// let status: ConnectionStatus = "online".parse().unwrap();
/// assert!(status.is_online());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Device is reachable through the cloud.
    Online,
    /// Device has not reported to the cloud.
    Offline,
}

impl ConnectionStatus {
    /// Returns the string used by the VeSync cloud.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }

    /// Returns `true` if the device is reachable.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(ValueError::InvalidConnectionStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_status_from_str() {
        assert_eq!("on".parse::<PowerStatus>().unwrap(), PowerStatus::On);
        assert_eq!("ON".parse::<PowerStatus>().unwrap(), PowerStatus::On);
        assert_eq!("off".parse::<PowerStatus>().unwrap(), PowerStatus::Off);
        assert_eq!("0".parse::<PowerStatus>().unwrap(), PowerStatus::Off);
        assert!("dim".parse::<PowerStatus>().is_err());
    }

    #[test]
    fn power_status_display() {
        assert_eq!(PowerStatus::On.to_string(), "on");
        assert_eq!(PowerStatus::Off.to_string(), "off");
    }

    #[test]
    fn power_status_from_bool() {
        assert_eq!(PowerStatus::from(true), PowerStatus::On);
        assert_eq!(PowerStatus::from(false), PowerStatus::Off);
    }

    #[test]
    fn connection_status_from_str() {
        assert!(
            "Online"
                .parse::<ConnectionStatus>()
                .unwrap()
                .is_online()
        );
        assert!(
            !"offline"
                .parse::<ConnectionStatus>()
                .unwrap()
                .is_online()
        );
        assert_eq!(
            "unknown".parse::<ConnectionStatus>(),
            Err(ValueError::InvalidConnectionStatus("unknown".to_string()))
        );
    }
}

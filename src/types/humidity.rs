// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relative humidity values.
//!
//! [`Humidity`] is any reading between 0 and 100 percent. [`TargetHumidity`]
//! is narrower: VeSync humidifiers only accept set points from 30 to 80
//! percent, so out-of-range requests are rejected before they reach the
//! cloud.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Relative humidity reading as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::types::Humidity;
///
/// let reading = Humidity::new(45).unwrap();
/// assert_eq!(reading.value(), 45);
/// assert!(Humidity::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Humidity(u8);

impl Humidity {
    /// Lowest possible reading (0%).
    pub const MIN: Self = Self(0);

    /// Highest possible reading (100%).
    pub const MAX: Self = Self(100);

    /// Creates a humidity reading.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a reading, clamping values above 100.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Humidity {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Humidity> for u8 {
    fn from(value: Humidity) -> Self {
        value.0
    }
}

impl fmt::Display for Humidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Humidity set point accepted by VeSync humidifiers (30-80%).
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::types::TargetHumidity;
///
/// let target = TargetHumidity::new(55).unwrap();
/// assert_eq!(target.value(), 55);
///
/// assert!(TargetHumidity::new(20).is_err());
/// assert!(TargetHumidity::new(90).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TargetHumidity(u8);

impl TargetHumidity {
    /// Lowest accepted set point.
    pub const MIN: Self = Self(30);

    /// Highest accepted set point.
    pub const MAX: Self = Self(80);

    /// Creates a set point.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside 30-80.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(Self::MIN.0..=Self::MAX.0).contains(&value) {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN.0),
                max: u16::from(Self::MAX.0),
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the set point as a plain humidity value.
    #[must_use]
    pub const fn as_humidity(&self) -> Humidity {
        Humidity(self.0)
    }
}

impl TryFrom<u8> for TargetHumidity {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetHumidity> for u8 {
    fn from(value: TargetHumidity) -> Self {
        value.0
    }
}

impl fmt::Display for TargetHumidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

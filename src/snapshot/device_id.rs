// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Stable identifier of a VeSync device (the cloud's `cid`).
///
/// # Examples
///
/// ```
/// use vesync_humidifiers::snapshot::DeviceId;
///
/// let id = DeviceId::new("vsaq1a2b3c").unwrap();
/// assert_eq!(id.as_str(), "vsaq1a2b3c");
/// assert!(DeviceId::new("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyDeviceId` if the identifier is blank.
    pub fn new(cid: impl Into<String>) -> Result<Self, ValueError> {
        let cid = cid.into();
        if cid.trim().is_empty() {
            return Err(ValueError::EmptyDeviceId);
        }
        Ok(Self(cid))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DeviceId {
    type Error = ValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

impl Borrow<str> for DeviceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_identifier() {
        assert_eq!(DeviceId::new(""), Err(ValueError::EmptyDeviceId));
        assert_eq!(DeviceId::new(" \t"), Err(ValueError::EmptyDeviceId));
    }

    #[test]
    fn equality() {
        let a = DeviceId::new("abc").unwrap();
        let b = DeviceId::try_from("abc").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn debug_and_display() {
        let id = DeviceId::new("cid-1").unwrap();
        assert_eq!(format!("{id:?}"), "DeviceId(cid-1)");
        assert_eq!(id.to_string(), "cid-1");
    }

    #[test]
    fn lookup_by_str() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(DeviceId::new("cid-1").unwrap(), 1);
        assert_eq!(map.get("cid-1"), Some(&1));
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types.
//!
//! [`Credentials`] hold the VeSync account login, [`CoordinatorConfig`]
//! tunes polling, and [`EntryConfig`] is the serialized form stored by a
//! host platform for one configured account.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use vesync_humidifiers::config::{CoordinatorConfig, Credentials, EntryConfig};
//!
//! let credentials = Credentials::new("user@example.com", "secret")
//!     .with_timezone("Europe/Paris");
//! assert_eq!(credentials.timezone(), "Europe/Paris");
//!
//! let config = CoordinatorConfig::new().with_update_interval(Duration::from_secs(30));
//! assert_eq!(config.update_interval(), Duration::from_secs(30));
//!
//! let entry = EntryConfig::from_json(r#"{"username": "u", "password": "p"}"#).unwrap();
//! assert_eq!(entry.credentials().username(), "u");
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable the timezone is read from.
pub const TIMEZONE_ENV: &str = "TZ";

/// Timezone used when the environment does not provide one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// VeSync account credentials.
///
/// The `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    timezone: String,
}

impl Credentials {
    /// Creates credentials, taking the timezone from the process environment.
    ///
    /// See [`timezone_from_env`].
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            timezone: timezone_from_env(),
        }
    }

    /// Overrides the timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Returns the account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the account password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the IANA timezone name passed to the SDK.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timezone", &self.timezone)
            .finish()
    }
}

/// Reads the timezone from `TZ`, falling back to [`DEFAULT_TIMEZONE`].
///
/// A leading `:` (the POSIX "implementation-defined" marker) is stripped.
#[must_use]
pub fn timezone_from_env() -> String {
    std::env::var(TIMEZONE_ENV)
        .ok()
        .map(|tz| tz.trim().trim_start_matches(':').to_string())
        .filter(|tz| !tz.is_empty())
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string())
}

/// Polling configuration for the update coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    update_interval: Duration,
    event_capacity: usize,
}

impl CoordinatorConfig {
    /// Default poll period.
    pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);
    /// Default broadcast capacity for coordinator events.
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;
    /// Shortest accepted poll period.
    pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1);

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            update_interval: Self::DEFAULT_UPDATE_INTERVAL,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Sets the poll period, raised to [`Self::MIN_UPDATE_INTERVAL`] if
    /// shorter.
    #[must_use]
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval.max(Self::MIN_UPDATE_INTERVAL);
        self
    }

    /// Sets the event broadcast capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Returns the poll period.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Returns the event broadcast capacity.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Stored configuration of one VeSync account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Account username (e-mail).
    pub username: String,
    /// Account password.
    pub password: String,
    /// Explicit timezone; the environment is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Poll period in seconds; the default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval: Option<u64>,
}

impl EntryConfig {
    /// Parses and validates an entry from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` for malformed input,
    /// `ConfigError::MissingField` for an empty username or password and
    /// `ConfigError::InvalidValue` for a zero scan interval.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entry: Self = serde_json::from_str(json)?;
        entry.validate()?;
        Ok(entry)
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// See [`EntryConfig::from_json`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingField("username".to_string()));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingField("password".to_string()));
        }
        if self.scan_interval == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "scan_interval".to_string(),
                message: "must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    /// Builds credentials from this entry.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(&self.username, &self.password);
        match &self.timezone {
            Some(tz) => credentials.with_timezone(tz),
            None => credentials,
        }
    }

    /// Builds the coordinator configuration from this entry.
    #[must_use]
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        let config = CoordinatorConfig::new();
        match self.scan_interval {
            Some(secs) => config.with_update_interval(Duration::from_secs(secs)),
            None => config,
        }
    }
}

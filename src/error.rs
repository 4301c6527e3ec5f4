// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the VeSync humidifiers library.
//!
//! The hierarchy mirrors the layers of the crate: SDK implementations report
//! [`SdkError`], the API client turns those into [`ClientError`], and the
//! update coordinator reduces client failures to the two outcomes a host
//! platform cares about in [`UpdateError`].

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error reported by the API client.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Error reported by a coordinator poll cycle.
    #[error("update error: {0}")]
    Update(#[from] UpdateError),

    /// Error while loading configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Device was not found in the current snapshot.
    #[error("device not found: {0}")]
    DeviceNotFound(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid device status string was provided.
    #[error("invalid power status: {0}")]
    InvalidPowerStatus(String),

    /// An invalid connection status string was provided.
    #[error("invalid connection status: {0}")]
    InvalidConnectionStatus(String),

    /// A required identifier was empty.
    #[error("empty device identifier")]
    EmptyDeviceId,
}

/// Errors returned by vendor SDK implementations.
///
/// SDK implementations report transport failures through this type; the
/// [`ApiClient`](crate::client::ApiClient) classifies them into
/// [`ClientError`] kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The cloud answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// Message returned by the service.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The cloud answered but refused the operation.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl SdkError {
    /// Returns `true` if the status code means the credentials were refused.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Http { status: 401 | 403, .. })
    }
}

/// Errors surfaced by the API client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Credentials were rejected by the cloud.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A request to the cloud failed.
    #[error("communication error: {0}")]
    Communication(String),

    /// Any other client failure.
    #[error("client error: {0}")]
    Other(String),
}

impl ClientError {
    /// Returns `true` for [`ClientError::Authentication`].
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

impl From<SdkError> for ClientError {
    fn from(err: SdkError) -> Self {
        if err.is_auth_failure() {
            return Self::Authentication("Invalid credentials".to_string());
        }
        match err {
            SdkError::Http { .. } | SdkError::Transport(_) => Self::Communication(err.to_string()),
            SdkError::Rejected(message) => Self::Other(message),
        }
    }
}

/// Outcome of a failed coordinator poll cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// Credentials must be refreshed before polling can continue.
    #[error("reauthentication required: {0}")]
    ReauthRequired(String),

    /// The poll failed; previous data is retained.
    #[error("update failed: {0}")]
    UpdateFailed(String),
}

impl UpdateError {
    /// Returns `true` for [`UpdateError::ReauthRequired`].
    #[must_use]
    pub fn is_reauth_required(&self) -> bool {
        matches!(self, Self::ReauthRequired(_))
    }
}

impl From<ClientError> for UpdateError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Authentication(_) => Self::ReauthRequired(err.to_string()),
            ClientError::Communication(_) | ClientError::Other(_) => {
                Self::UpdateFailed(err.to_string())
            }
        }
    }
}

/// Errors related to configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is missing or empty.
    #[error("missing field in config: {0}")]
    MissingField(String),

    /// A field has an unusable value.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        /// The offending field.
        field: String,
        /// Description of the problem.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blocking-call offload.

use crate::error::{ClientError, SdkError};

/// Runs a blocking SDK call on the blocking worker pool and awaits it.
///
/// The caller's task is never blocked. A panicking or cancelled worker is
/// reported as [`ClientError::Other`]; SDK errors are classified through
/// `From<SdkError>`.
///
/// # Errors
///
/// Returns the classified SDK error or a worker failure.
pub async fn run_blocking<F, T>(call: F) -> Result<T, ClientError>
where
    F: FnOnce() -> Result<T, SdkError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result.map_err(ClientError::from),
        Err(join_error) => Err(ClientError::Other(format!(
            "blocking worker failed: {join_error}"
        ))),
    }
}

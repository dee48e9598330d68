// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data source failures.
//!
//! The engine itself never fails: a [`FetchError`] returned by a
//! [`DataSource`](crate::source::DataSource) is rendered into the status
//! overlay and the previous snapshot stays on the wall. The `Display` text is
//! therefore user-facing.

use alloc::string::String;

use thiserror::Error;

/// Fallback text for a failed response that carried no error message.
pub const UNEXPECTED_SERVER_ERROR: &str = "Unexpected server error";

/// Why a fetch produced no batch.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FetchError {
    /// The request never completed.
    #[error("{0}")]
    Network(String),

    /// The server answered with a failure status.
    #[error("{message}")]
    Status {
        /// Status code of the response.
        code: u16,
        /// Error text from the response body, or
        /// [`UNEXPECTED_SERVER_ERROR`].
        message: String,
    },

    /// The response body was not a list of submissions.
    #[error("Could not read submissions: {0}")]
    Decode(String),

    /// The fetch was cancelled by shutdown. Never surfaced to the wall.
    #[error("Request aborted")]
    Aborted,
}

impl FetchError {
    /// A status failure, falling back to [`UNEXPECTED_SERVER_ERROR`] when the
    /// body had no message.
    #[must_use]
    pub fn status(code: u16, message: Option<String>) -> Self {
        Self::Status {
            code,
            message: message.unwrap_or_else(|| UNEXPECTED_SERVER_ERROR.into()),
        }
    }

    /// Whether this error is the result of an abort.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

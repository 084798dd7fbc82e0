//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Error types for the client.
//!
//! The errors split into three layers, matching who produces and who
//! consumes them:
//!
//! - [`ClientError`]: surfaced by the client facade (`start`, `stop`,
//!   `send_request`).
//! - [`ConnectError`]: produced while establishing a single connection
//!   attempt. Absorbed by the reconnection driver, which logs and backs
//!   off; only a reactor stop turns connection trouble into a
//!   user-visible [`ClientError`].
//! - [`SendError`]: produced by `send_message` on a protocol connection.
//!   The connection-closed kind triggers a transparent retry; everything
//!   else is propagated to the caller unchanged.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Boxed error type used for user-supplied failure values.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the client facade.
///
/// # Examples
///
/// ```rust
/// use fanrpc::ClientError;
///
/// let error = ClientError::NoConnectionsAvailable;
/// assert!(error.is_connection_error());
///
/// let error = ClientError::ReactorStopped;
/// assert_eq!(error.to_string(), "IO reactor stopped while connecting");
/// ```
#[derive(Debug, Error)]
pub enum ClientError {
    /// `start` was called on a client that is not in its initial state.
    ///
    /// A client runs through its lifecycle exactly once; after `stop` a
    /// new client must be created.
    #[error("client was already started")]
    AlreadyStarted,

    /// A request was submitted while the client is not started.
    #[error("client is not started")]
    NotStarted,

    /// No live connection was available to carry a request.
    ///
    /// Either every connection is currently down, or the routing strategy
    /// declined to pick one.
    #[error("no live connections available")]
    NoConnectionsAvailable,

    /// The I/O reactor stopped before every endpoint produced its first
    /// connection, or while a reconnect attempt was outstanding.
    #[error("IO reactor stopped while connecting")]
    ReactorStopped,

    /// The client was constructed with an invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error.
        reason: String,
    },

    /// A request failed with an error other than connection-closed.
    ///
    /// Connection-closed failures are retried internally and never reach
    /// the caller; every other failure is carried here unchanged.
    #[error("request failed: {source}")]
    Request {
        /// The failure reported by the underlying connection.
        #[source]
        source: BoxError,
    },
}

impl ClientError {
    /// Returns `true` if this error reports connection availability
    /// rather than a request-level failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fanrpc::ClientError;
    ///
    /// assert!(ClientError::NotStarted.is_connection_error());
    /// assert!(ClientError::NoConnectionsAvailable.is_connection_error());
    /// assert!(ClientError::ReactorStopped.is_connection_error());
    /// ```
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::NotStarted | Self::NoConnectionsAvailable | Self::ReactorStopped
        )
    }
}

/// Errors produced while establishing a single connection attempt.
///
/// These cover the reactor's `connect` call and the user-supplied
/// handshake. The reconnection driver absorbs them: each failure is
/// logged at `warn` and followed by a backoff delay, indefinitely, until
/// the attempt succeeds or the reactor stops.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The transport-level connect failed.
    #[error("failed to connect to {host}:{port}: {source}")]
    Io {
        /// Host that was being connected to.
        host: String,
        /// Port that was being connected to.
        port: u16,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The connect did not complete within the configured timeout.
    #[error("connect timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The post-connect handshake failed.
    ///
    /// Treated exactly like a transport-level connect failure: the driver
    /// backs off and tries again.
    #[error("handshake failed: {reason}")]
    HandshakeFailed {
        /// Description of the handshake failure.
        reason: String,
    },

    /// The reactor is not running.
    #[error("IO reactor is not running")]
    ReactorStopped,
}

/// Errors produced by `send_message` on a protocol connection.
#[derive(Debug, Error)]
pub enum SendError {
    /// The connection closed underneath the request.
    ///
    /// The client retries the request transparently against the current
    /// live set; the caller never observes this kind directly.
    #[error("connection closed")]
    ConnectionClosed {
        /// Reason reported by the transport, if any.
        reason: Option<String>,
    },

    /// Any other request failure.
    ///
    /// Propagated to the caller unchanged as [`ClientError::Request`].
    #[error("{source}")]
    Other {
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

impl SendError {
    /// Returns `true` if this is the connection-closed kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fanrpc::SendError;
    ///
    /// let error = SendError::ConnectionClosed { reason: None };
    /// assert!(error.is_connection_closed());
    ///
    /// let error = SendError::other("boom");
    /// assert!(!error.is_connection_closed());
    /// ```
    #[must_use]
    pub const fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed { .. })
    }

    /// Creates an [`SendError::Other`] from a display-able value.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            source: message.into().into(),
        }
    }
}

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

//! The I/O reactor interface.
//!
//! The client does not own sockets or timers; it drives all I/O through a
//! [`Reactor`] supplied at construction. The reactor owns connection
//! establishment and delay scheduling, and the client owns everything
//! above that: lifecycle, reconnection, routing, retry.
//!
//! [`TokioReactor`] is the production implementation, backed by
//! `tokio::net` and `tokio::time`. Tests substitute a scripted reactor to
//! observe exactly which connects and delays the client requests.

mod tokio_reactor;

pub use tokio_reactor::TokioReactor;

use crate::error::ConnectError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// Byte-level I/O surface of a raw connection.
///
/// Blanket-implemented for anything that is async-readable and
/// async-writable, so reactors can hand back TCP streams, TLS sessions,
/// or in-memory pipes interchangeably.
pub trait RawStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> RawStream for T {}

/// A freshly established, unframed connection produced by the reactor.
///
/// The client never reads or writes this directly; it hands the raw
/// connection to the user-supplied
/// [`ConnectionFactory`](crate::ConnectionFactory), whose codec layer
/// consumes the byte stream.
pub struct RawConnection {
    host: String,
    port: u16,
    stream: Box<dyn RawStream>,
}

impl RawConnection {
    /// Wraps a byte stream together with the endpoint it is connected to.
    pub fn new(host: impl Into<String>, port: u16, stream: impl RawStream + 'static) -> Self {
        Self {
            host: host.into(),
            port,
            stream: Box::new(stream),
        }
    }

    /// Returns the remote host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the remote port.
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Consumes the connection, yielding the underlying byte stream.
    pub fn into_stream(self) -> Box<dyn RawStream> {
        self.stream
    }
}

impl fmt::Debug for RawConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawConnection")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// The event-driven I/O reactor the client cooperates with.
///
/// All async operations are plain futures; the reactor decides how they
/// are scheduled. The contract the client relies on:
///
/// - `start` and `stop` are idempotent and resolve once the reactor is
///   running / not running.
/// - `connect` applies the given timeout and fails once it elapses.
/// - `sleep` resolves after the given delay, or early when the reactor
///   stops, so no reconnect timer can outlive a shutdown.
#[async_trait]
pub trait Reactor: Send + Sync {
    /// Returns `true` while the reactor is running.
    fn is_running(&self) -> bool;

    /// Starts the reactor. Idempotent.
    async fn start(&self);

    /// Stops the reactor. Idempotent. Outstanding `sleep` calls resolve.
    async fn stop(&self);

    /// Establishes a connection to `host:port` within `timeout`.
    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<RawConnection, ConnectError>;

    /// Resolves after `duration`, or early when the reactor stops.
    async fn sleep(&self, duration: Duration);
}

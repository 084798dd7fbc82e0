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

//! Protocol connections and the factory that produces them.
//!
//! The client is codec-agnostic: it treats a connection as an opaque
//! object that can carry one request to one response and report when it
//! closes. The user supplies a [`ConnectionFactory`] that wraps each raw
//! byte stream in whatever framing and protocol the application speaks,
//! plus an optional handshake that runs before the connection is
//! considered live.

mod registry;

pub use registry::ConnectionState;
pub(crate) use registry::ConnectionRegistry;

use crate::error::{ConnectError, SendError};
use crate::reactor::RawConnection;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Shared handle to a protocol connection.
pub type SharedConnection<Req, Resp> = Arc<dyn ProtocolConnection<Req, Resp>>;

/// A message-framed connection to one endpoint.
///
/// Produced by [`ConnectionFactory::create_connection`]; the client holds
/// it in the live set and routes requests to it. Implementations own the
/// wire codec and any in-flight pipelining; the client dispatches
/// `send_message` calls in caller order per connection and never reorders
/// them.
#[async_trait]
pub trait ProtocolConnection<Req: 'static, Resp: 'static>: Send + Sync {
    /// Returns the remote host.
    fn host(&self) -> &str;

    /// Returns the remote port.
    fn port(&self) -> u16;

    /// Sends one request and resolves with its response.
    ///
    /// A failure of the [`SendError::ConnectionClosed`] kind makes the
    /// client retry the request on another live connection; any other
    /// failure is propagated to the caller unchanged.
    async fn send_message(&self, request: Req) -> Result<Resp, SendError>;

    /// Registers the close listener.
    ///
    /// The listener must be fired at most once: with a cause when the
    /// connection dies unexpectedly, or with no cause on a clean,
    /// intentional close. A clean close retires the endpoint; an
    /// unexpected close triggers reconnection.
    fn on_closed(&self, listener: CloseListener);
}

/// Wraps raw connections into protocol connections.
///
/// This is the client's only extension seam for connection behavior:
/// the factory owns the codec ([`create_connection`]) and the optional
/// post-connect handshake ([`initialize_connection`]).
///
/// [`create_connection`]: ConnectionFactory::create_connection
/// [`initialize_connection`]: ConnectionFactory::initialize_connection
#[async_trait]
pub trait ConnectionFactory<Req: 'static, Resp: 'static>: Send + Sync {
    /// Wraps a raw byte-stream connection into a protocol connection.
    fn create_connection(&self, raw: RawConnection) -> SharedConnection<Req, Resp>;

    /// Runs the post-connect handshake.
    ///
    /// Called after the close listener is registered and before the
    /// connection enters the live set. A failure here is treated exactly
    /// like a connect failure: the attempt is abandoned and the
    /// reconnection driver backs off.
    async fn initialize_connection(
        &self,
        connection: &SharedConnection<Req, Resp>,
    ) -> Result<(), ConnectError> {
        let _ = connection;
        Ok(())
    }
}

/// Single-fire notification slot for connection close events.
///
/// A connection calls [`notify`](Self::notify) exactly once, with a cause
/// for an unexpected close or `None` for a clean close. Later calls are
/// ignored. The listener carries no reference back into the client; it
/// only delivers the event to the driver that owns the endpoint.
pub struct CloseListener {
    slot: Mutex<Option<oneshot::Sender<Option<String>>>>,
}

impl CloseListener {
    /// Creates a listener and the receiving half the driver waits on.
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Option<String>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Fires the listener.
    ///
    /// `Some(cause)` reports an unexpected close; `None` a clean close.
    /// Only the first call has any effect.
    pub fn notify(&self, cause: Option<String>) {
        let sender = self.slot.lock().expect("close listener lock poisoned").take();
        if let Some(sender) = sender {
            let _ = sender.send(cause);
        }
    }
}

impl std::fmt::Debug for CloseListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fired = self
            .slot
            .lock()
            .map(|slot| slot.is_none())
            .unwrap_or(true);
        f.debug_struct("CloseListener").field("fired", &fired).finish()
    }
}

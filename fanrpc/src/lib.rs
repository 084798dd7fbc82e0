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

#![doc = include_str!("../../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # FANRPC - Fan-Out RPC Client
//!
//! FANRPC maintains persistent, message-framed connections to a fixed
//! set of remote endpoints and fans outbound requests across them:
//!
//! - **Per-endpoint reconnection**: every endpoint is owned by a driver
//!   that re-establishes its connection with exponential backoff
//! - **Pluggable routing**: uniform random by default, any
//!   [`RoutingStrategy`] you like otherwise
//! - **Transparent retry**: a request whose connection closes mid-flight
//!   is re-dispatched against the current live set; callers see only the
//!   final outcome
//! - **Pluggable I/O**: the client drives all sockets and timers through
//!   a [`Reactor`] interface; [`TokioReactor`] is the production
//!   implementation and tests substitute scripted ones
//! - **Codec-agnostic**: a user-supplied [`ConnectionFactory`] wraps each
//!   raw byte stream in the application's framing and protocol, plus an
//!   optional per-connection handshake
//!
//! ## Architecture
//!
//! The crate is organized into thin layers:
//!
//! - **[`reactor`]**: the I/O interface the client cooperates with
//! - **[`connection`]**: protocol connections, the factory seam, and the
//!   per-endpoint registry
//! - **[`reconnection`]**: the per-endpoint driver and backoff schedule
//! - **[`routing`]**: live-set snapshotting and request routing
//! - **[`client`]**: the facade tying lifecycle, registry, and dispatch
//!   together
//!
//! ## Lifecycle
//!
//! A client moves forward through `Unstarted → Starting → Started →
//! Stopping → Stopped` exactly once. `start` resolves when **every**
//! endpoint has produced its first connection; from then on requests
//! flow across whatever subset is live, while drivers quietly restore
//! the rest. `stop` tears everything down; a stopped client is not
//! restartable.
//!
//! ## Failure model
//!
//! Connect failures (including handshake failures) are absorbed by the
//! reconnection drivers and retried forever with backoff; they reach the
//! caller only when the reactor itself stops. Request failures split in
//! two: a closed connection triggers a transparent re-dispatch, anything
//! else is handed to the caller unchanged.
//!
//! See [`RpcClient`] for a complete usage example.
//!
//! ## Safety
//!
//! FANRPC is written in 100% safe Rust with `#![deny(unsafe_code)]`.
//! All concurrency is handled through Tokio's async runtime.

pub mod client;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod reactor;
pub mod reconnection;
pub mod routing;

pub use client::{ClientBuilder, ClientLifecycle, RpcClient};
pub use config::ClientConfig;
pub use connection::{
    CloseListener, ConnectionFactory, ConnectionState, ProtocolConnection, SharedConnection,
};
pub use endpoint::{Endpoint, ParseEndpointError};
pub use error::{BoxError, ClientError, ConnectError, SendError};
pub use reactor::{RawConnection, RawStream, Reactor, TokioReactor};
pub use reconnection::Backoff;
pub use routing::{RandomStrategy, RoutingStrategy};

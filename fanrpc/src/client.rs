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

//! The client facade.
//!
//! [`RpcClient`] owns the connection registry and one reconnection
//! driver per configured endpoint. `start` brings every endpoint up in
//! parallel and resolves once each has produced its first connection;
//! `send_request` routes a request across whatever subset of endpoints
//! is currently live, retrying transparently when a connection closes
//! underneath a request.

use crate::config::ClientConfig;
use crate::connection::{ConnectionFactory, ConnectionRegistry, ConnectionState};
use crate::endpoint::Endpoint;
use crate::error::{ClientError, SendError};
use crate::reactor::Reactor;
use crate::reconnection::ReconnectDriver;
use crate::routing::{RandomStrategy, RoutingStrategy};
use futures_util::future;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Lifecycle of a client.
///
/// Moves forward only. A stopped client is not restartable; create a new
/// client instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientLifecycle {
    /// Created, `start` not yet called.
    Unstarted,
    /// `start` is bringing endpoints up.
    Starting,
    /// Every endpoint produced its first connection; requests flow.
    Started,
    /// `stop` is tearing the client down.
    Stopping,
    /// Fully stopped. Terminal.
    Stopped,
}

impl fmt::Display for ClientLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstarted => write!(f, "Unstarted"),
            Self::Starting => write!(f, "Starting"),
            Self::Started => write!(f, "Started"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// An RPC client fanned out over a fixed set of endpoints.
///
/// The client maintains one persistent connection per configured
/// endpoint, re-establishing each with exponential backoff whenever it
/// fails, and dispatches requests across the currently-live connections
/// through a pluggable [`RoutingStrategy`].
///
/// Cloning is cheap; clones share the same connections and lifecycle.
///
/// # Examples
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use fanrpc::{
///     CloseListener, ConnectionFactory, ProtocolConnection, RawConnection, RpcClient,
///     SendError, SharedConnection, TokioReactor,
/// };
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct LineConnection {
///     host: String,
///     port: u16,
/// }
///
/// #[async_trait]
/// impl ProtocolConnection<String, String> for LineConnection {
///     fn host(&self) -> &str {
///         &self.host
///     }
///
///     fn port(&self) -> u16 {
///         self.port
///     }
///
///     async fn send_message(&self, request: String) -> Result<String, SendError> {
///         // A real implementation frames the request onto the wire and
///         // awaits the matching response.
///         Ok(request)
///     }
///
///     fn on_closed(&self, _listener: CloseListener) {}
/// }
///
/// struct LineFactory;
///
/// impl ConnectionFactory<String, String> for LineFactory {
///     fn create_connection(&self, raw: RawConnection) -> SharedConnection<String, String> {
///         Arc::new(LineConnection {
///             host: raw.host().to_string(),
///             port: raw.port(),
///         })
///     }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RpcClient::<String, String>::builder(Arc::new(TokioReactor::new()), Arc::new(LineFactory))
///     .endpoint("cache-1.internal:7000".parse()?)
///     .endpoint("cache-2.internal:7000".parse()?)
///     .connection_timeout(Duration::from_secs(5))
///     .build()?;
///
/// client.start().await?;
/// let response = client.send_request("PING".to_string()).await?;
/// println!("got {}", response);
/// client.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct RpcClient<Req, Resp> {
    inner: Arc<ClientInner<Req, Resp>>,
}

impl<Req, Resp> Clone for RpcClient<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ClientInner<Req, Resp> {
    config: ClientConfig,
    reactor: Arc<dyn Reactor>,
    factory: Arc<dyn ConnectionFactory<Req, Resp>>,
    strategy: Arc<dyn RoutingStrategy<Req, Resp>>,
    registry: Arc<ConnectionRegistry<Req, Resp>>,
    lifecycle: RwLock<ClientLifecycle>,
    shutdown: watch::Sender<bool>,
    drivers: Mutex<Vec<JoinHandle<()>>>,
}

impl<Req, Resp> RpcClient<Req, Resp>
where
    Req: Clone + Send + 'static,
    Resp: Send + 'static,
{
    /// Creates a builder.
    ///
    /// The reactor and the connection factory are the two mandatory
    /// collaborators; everything else has a default.
    pub fn builder(
        reactor: Arc<dyn Reactor>,
        factory: Arc<dyn ConnectionFactory<Req, Resp>>,
    ) -> ClientBuilder<Req, Resp> {
        ClientBuilder::new(reactor, factory)
    }

    /// Starts the client.
    ///
    /// Starts the reactor if it is not already running, then brings up
    /// one connection per configured endpoint in parallel. Resolves once
    /// **every** endpoint has produced its first successful connection,
    /// including its handshake.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AlreadyStarted`] if the client is past its
    ///   initial state.
    /// - [`ClientError::ReactorStopped`] if the reactor stops before
    ///   every endpoint connects.
    pub async fn start(&self) -> Result<(), ClientError> {
        {
            let mut lifecycle = self.inner.lifecycle.write().await;
            if *lifecycle != ClientLifecycle::Unstarted {
                return Err(ClientError::AlreadyStarted);
            }
            *lifecycle = ClientLifecycle::Starting;
        }

        debug!(
            "starting client with {} endpoints",
            self.inner.config.endpoints.len()
        );
        self.inner.reactor.start().await;

        let mut first_opens = Vec::with_capacity(self.inner.config.endpoints.len());
        {
            let mut drivers = self.inner.drivers.lock().await;
            for (index, endpoint) in self.inner.config.endpoints.iter().enumerate() {
                let (tx, rx) = oneshot::channel();
                let driver = ReconnectDriver::new(
                    index,
                    endpoint.clone(),
                    Arc::clone(&self.inner.reactor),
                    Arc::clone(&self.inner.factory),
                    Arc::clone(&self.inner.registry),
                    self.inner.config.connection_timeout,
                    self.inner.shutdown.subscribe(),
                    tx,
                );
                drivers.push(tokio::spawn(driver.run()));
                first_opens.push(rx);
            }
        }

        for result in future::join_all(first_opens).await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(error)) => return self.fail_start(error).await,
                // Driver went away without reporting: only a shutdown
                // does that.
                Err(_) => return self.fail_start(ClientError::ReactorStopped).await,
            }
        }

        let mut lifecycle = self.inner.lifecycle.write().await;
        if *lifecycle == ClientLifecycle::Starting {
            *lifecycle = ClientLifecycle::Started;
            debug!("client started");
            Ok(())
        } else {
            Err(ClientError::ReactorStopped)
        }
    }

    async fn fail_start(&self, error: ClientError) -> Result<(), ClientError> {
        let mut lifecycle = self.inner.lifecycle.write().await;
        if *lifecycle == ClientLifecycle::Starting {
            *lifecycle = ClientLifecycle::Stopped;
        }
        Err(error)
    }

    /// Stops the client.
    ///
    /// Signals every reconnection driver, requests the reactor to stop,
    /// and resolves once the reactor reports stopped. Outstanding
    /// reconnect delays resolve early; endpoints that never connected
    /// fail any pending `start` with [`ClientError::ReactorStopped`].
    /// Idempotent after the first call.
    pub async fn stop(&self) -> Result<(), ClientError> {
        {
            let mut lifecycle = self.inner.lifecycle.write().await;
            match *lifecycle {
                ClientLifecycle::Stopping | ClientLifecycle::Stopped => return Ok(()),
                _ => *lifecycle = ClientLifecycle::Stopping,
            }
        }

        debug!("stopping client");
        let _ = self.inner.shutdown.send(true);
        self.inner.reactor.stop().await;

        {
            let mut drivers = self.inner.drivers.lock().await;
            for driver in drivers.drain(..) {
                driver.abort();
            }
        }
        self.inner.registry.terminate_all().await;

        *self.inner.lifecycle.write().await = ClientLifecycle::Stopped;
        debug!("client stopped");
        Ok(())
    }

    /// Sends one request and resolves with its response.
    ///
    /// The routing strategy picks a live connection for the request. If
    /// the connection closes underneath the request, dispatch restarts
    /// against the then-current live set, indefinitely; the caller
    /// observes only the final outcome. Callers impose their own
    /// deadline by timing out or dropping the returned future.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotStarted`] if the client is not started.
    /// - [`ClientError::NoConnectionsAvailable`] if the live set is
    ///   empty or the strategy declines to pick.
    /// - [`ClientError::Request`] for any failure other than a closed
    ///   connection, carried through unchanged.
    pub async fn send_request(&self, payload: Req) -> Result<Resp, ClientError> {
        loop {
            if *self.inner.lifecycle.read().await != ClientLifecycle::Started {
                return Err(ClientError::NotStarted);
            }

            let live = self.inner.registry.live().await;
            if live.is_empty() {
                return Err(ClientError::NoConnectionsAvailable);
            }
            let Some(connection) = self.inner.strategy.choose(&live, &payload) else {
                return Err(ClientError::NoConnectionsAvailable);
            };

            match connection.send_message(payload.clone()).await {
                Ok(response) => return Ok(response),
                Err(SendError::ConnectionClosed { .. }) => {
                    warn!("request failed because the connection closed, retrying");
                }
                Err(SendError::Other { source }) => {
                    warn!("request failed: {}", source);
                    return Err(ClientError::Request { source });
                }
            }
        }
    }

    /// Returns `true` while the client is started and at least one
    /// connection is live.
    pub async fn is_connected(&self) -> bool {
        *self.inner.lifecycle.read().await == ClientLifecycle::Started
            && self.inner.registry.live_count().await > 0
    }

    /// Returns the current lifecycle state.
    pub async fn lifecycle(&self) -> ClientLifecycle {
        *self.inner.lifecycle.read().await
    }

    /// Number of currently-live connections.
    pub async fn live_count(&self) -> usize {
        self.inner.registry.live_count().await
    }

    /// Snapshots every endpoint's connection state, in configured order.
    pub async fn connection_states(&self) -> Vec<(Endpoint, ConnectionState)> {
        self.inner.registry.states().await
    }
}

/// Builder for [`RpcClient`].
pub struct ClientBuilder<Req, Resp> {
    config: ClientConfig,
    reactor: Arc<dyn Reactor>,
    factory: Arc<dyn ConnectionFactory<Req, Resp>>,
    strategy: Arc<dyn RoutingStrategy<Req, Resp>>,
}

impl<Req, Resp> ClientBuilder<Req, Resp>
where
    Req: Clone + Send + 'static,
    Resp: Send + 'static,
{
    fn new(
        reactor: Arc<dyn Reactor>,
        factory: Arc<dyn ConnectionFactory<Req, Resp>>,
    ) -> Self {
        Self {
            config: ClientConfig::new(),
            reactor,
            factory,
            strategy: Arc::new(RandomStrategy::new()),
        }
    }

    /// Adds an endpoint.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config = self.config.with_endpoint(endpoint);
        self
    }

    /// Adds several endpoints.
    pub fn endpoints(mut self, endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        self.config = self.config.with_endpoints(endpoints);
        self
    }

    /// Sets the connect timeout (default 5 seconds, minimum 1 second).
    ///
    /// Also anchors the reconnect backoff schedule.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_connection_timeout(timeout);
        self
    }

    /// Replaces the default uniform-random routing strategy.
    pub fn routing_strategy(mut self, strategy: Arc<dyn RoutingStrategy<Req, Resp>>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfiguration`] if no endpoint is
    /// configured or the timeout is shorter than one second.
    pub fn build(self) -> Result<RpcClient<Req, Resp>, ClientError> {
        self.config
            .validate()
            .map_err(|reason| ClientError::InvalidConfiguration { reason })?;

        let registry = Arc::new(ConnectionRegistry::new(&self.config.endpoints));
        let (shutdown, _) = watch::channel(false);

        Ok(RpcClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                reactor: self.reactor,
                factory: self.factory,
                strategy: self.strategy,
                registry,
                lifecycle: RwLock::new(ClientLifecycle::Unstarted),
                shutdown,
                drivers: Mutex::new(Vec::new()),
            }),
        })
    }
}

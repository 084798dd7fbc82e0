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

//! The per-endpoint reconnection driver.

use crate::connection::{CloseListener, ConnectionFactory, ConnectionRegistry, SharedConnection};
use crate::endpoint::Endpoint;
use crate::error::{ClientError, ConnectError};
use crate::reactor::Reactor;
use crate::reconnection::Backoff;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

/// Drives one endpoint's connection lifecycle.
///
/// Runs as a task owned by the client. The driver is the only writer of
/// its registry entry: close listeners and shutdown requests reach it as
/// channel events, so every state transition for the endpoint serializes
/// through this task.
///
/// The loop:
///
/// 1. Attempt to connect, wrap, and initialize the connection.
/// 2. On success, enter the live set and wait for the close listener.
///    An unexpected close (with a cause) restarts from step 1 with the
///    backoff schedule reset; a clean close retires the endpoint.
/// 3. On failure, wait out the backoff delay and retry, indefinitely.
///
/// A client stop, or the reactor stopping, terminates the driver from
/// any state. If the endpoint never produced its first connection, the
/// pending first-open completion fails with
/// [`ClientError::ReactorStopped`].
pub(crate) struct ReconnectDriver<Req, Resp> {
    index: usize,
    endpoint: Endpoint,
    reactor: Arc<dyn Reactor>,
    factory: Arc<dyn ConnectionFactory<Req, Resp>>,
    registry: Arc<ConnectionRegistry<Req, Resp>>,
    backoff: Backoff,
    connect_timeout: Duration,
    shutdown: watch::Receiver<bool>,
    first_open: Option<oneshot::Sender<Result<(), ClientError>>>,
}

impl<Req, Resp> ReconnectDriver<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        index: usize,
        endpoint: Endpoint,
        reactor: Arc<dyn Reactor>,
        factory: Arc<dyn ConnectionFactory<Req, Resp>>,
        registry: Arc<ConnectionRegistry<Req, Resp>>,
        connect_timeout: Duration,
        shutdown: watch::Receiver<bool>,
        first_open: oneshot::Sender<Result<(), ClientError>>,
    ) -> Self {
        Self {
            index,
            endpoint,
            reactor,
            factory,
            registry,
            backoff: Backoff::new(connect_timeout),
            connect_timeout,
            shutdown,
            first_open: Some(first_open),
        }
    }

    pub(crate) async fn run(mut self) {
        let mut failures: u32 = 0;

        loop {
            if self.should_stop() {
                return self.terminate().await;
            }

            self.registry.mark_connecting(self.index, failures + 1).await;
            debug!("connecting to {}", self.endpoint);

            match self.establish().await {
                Ok((connection, closed)) => {
                    failures = 0;
                    self.registry.mark_open(self.index, connection).await;
                    info!("connected to {}", self.endpoint);
                    if let Some(first_open) = self.first_open.take() {
                        let _ = first_open.send(Ok(()));
                    }

                    let mut shutdown = self.shutdown.clone();
                    // None: shutdown while open. Some(cause): listener fired.
                    let fired: Option<Option<String>> = tokio::select! {
                        cause = closed => Some(cause.unwrap_or_else(|_| {
                            // Wrapper dropped without firing its listener.
                            Some("connection dropped".to_string())
                        })),
                        _ = shutdown.wait_for(|stop| *stop) => None,
                    };

                    match fired {
                        None => {
                            return self.terminate().await;
                        }
                        Some(Some(cause)) => {
                            self.registry.mark_closed(self.index).await;
                            warn!(
                                "connection to {} closed unexpectedly: {}",
                                self.endpoint, cause
                            );
                        }
                        Some(None) => {
                            self.registry.mark_closed(self.index).await;
                            info!("connection to {} closed", self.endpoint);
                            self.registry.mark_terminated(self.index).await;
                            return;
                        }
                    }
                }
                Err(error) => {
                    failures += 1;
                    if self.should_stop() {
                        return self.terminate().await;
                    }

                    let delay = self.backoff.delay_after(failures);
                    warn!(
                        "failed connecting to {}, will try again in {}s: {}",
                        self.endpoint,
                        delay.as_secs(),
                        error
                    );
                    self.registry.mark_waiting(self.index, failures).await;

                    let reactor = Arc::clone(&self.reactor);
                    let mut shutdown = self.shutdown.clone();
                    let stopped = tokio::select! {
                        _ = reactor.sleep(delay) => false,
                        _ = shutdown.wait_for(|stop| *stop) => true,
                    };
                    if stopped {
                        return self.terminate().await;
                    }
                }
            }
        }
    }

    /// One full connection attempt: connect, wrap, register the close
    /// listener, run the handshake.
    async fn establish(
        &self,
    ) -> Result<
        (
            SharedConnection<Req, Resp>,
            oneshot::Receiver<Option<String>>,
        ),
        ConnectError,
    > {
        let raw = self
            .reactor
            .connect(self.endpoint.host(), self.endpoint.port(), self.connect_timeout)
            .await?;
        let connection = self.factory.create_connection(raw);
        let (listener, closed) = CloseListener::channel();
        connection.on_closed(listener);
        self.factory.initialize_connection(&connection).await?;
        Ok((connection, closed))
    }

    fn should_stop(&self) -> bool {
        *self.shutdown.borrow() || !self.reactor.is_running()
    }

    async fn terminate(mut self) {
        if let Some(first_open) = self.first_open.take() {
            let _ = first_open.send(Err(ClientError::ReactorStopped));
        }
        self.registry.mark_terminated(self.index).await;
    }
}

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

//! Tokio-backed reactor implementation.

use crate::error::ConnectError;
use crate::reactor::{RawConnection, Reactor};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::debug;

/// [`Reactor`] implementation backed by Tokio's net and time drivers.
///
/// `connect` opens a plain TCP stream with the given timeout. `sleep`
/// races the delay against the running flag, so every outstanding delay
/// resolves promptly when the reactor stops.
///
/// # Examples
///
/// ```rust
/// use fanrpc::{Reactor, TokioReactor};
///
/// # async fn example() {
/// let reactor = TokioReactor::new();
/// assert!(!reactor.is_running());
/// reactor.start().await;
/// assert!(reactor.is_running());
/// reactor.stop().await;
/// assert!(!reactor.is_running());
/// # }
/// ```
pub struct TokioReactor {
    running: watch::Sender<bool>,
}

impl TokioReactor {
    /// Creates a reactor in the stopped state.
    pub fn new() -> Self {
        let (running, _) = watch::channel(false);
        Self { running }
    }
}

impl Default for TokioReactor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reactor for TokioReactor {
    fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    async fn start(&self) {
        self.running.send_replace(true);
    }

    async fn stop(&self) {
        self.running.send_replace(false);
    }

    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<RawConnection, ConnectError> {
        if !self.is_running() {
            return Err(ConnectError::ReactorStopped);
        }

        debug!("opening TCP stream to {}:{}", host, port);
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ConnectError::Timeout { timeout })?
            .map_err(|source| ConnectError::Io {
                host: host.to_string(),
                port,
                source,
            })?;

        Ok(RawConnection::new(host, port, stream))
    }

    async fn sleep(&self, duration: Duration) {
        let mut running = self.running.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = running.wait_for(|running| !*running) => {}
        }
    }
}

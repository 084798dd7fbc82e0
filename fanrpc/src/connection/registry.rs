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

//! The connection registry.
//!
//! One entry per configured endpoint, fixed membership for the life of
//! the client. Entries are keyed by their index in the configured list,
//! so duplicate endpoints each keep their own connection. The *live set*
//! is the subset of entries currently open; it is what the routing
//! strategy sees on each dispatch.

use crate::connection::SharedConnection;
use crate::endpoint::Endpoint;
use std::fmt;
use tokio::sync::RwLock;

/// State of one endpoint's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connect attempt has been made yet.
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// The connection is established and in the live set.
    Open,
    /// A backoff delay is running before the next attempt.
    Waiting,
    /// The connection closed; a reconnect decision is pending.
    Closed,
    /// The endpoint is retired. Terminal: no further transitions.
    Terminated,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Waiting => write!(f, "Waiting"),
            Self::Closed => write!(f, "Closed"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

struct ConnectionEntry<Req, Resp> {
    endpoint: Endpoint,
    state: ConnectionState,
    attempts: u32,
    connection: Option<SharedConnection<Req, Resp>>,
}

/// Registry of per-endpoint connection entries.
pub(crate) struct ConnectionRegistry<Req, Resp> {
    entries: RwLock<Vec<ConnectionEntry<Req, Resp>>>,
}

impl<Req, Resp> ConnectionRegistry<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub(crate) fn new(endpoints: &[Endpoint]) -> Self {
        let entries = endpoints
            .iter()
            .map(|endpoint| ConnectionEntry {
                endpoint: endpoint.clone(),
                state: ConnectionState::Idle,
                attempts: 0,
                connection: None,
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Applies a transition to the entry at `index`.
    ///
    /// Terminated is terminal: transitions out of it are dropped.
    async fn transition(
        &self,
        index: usize,
        state: ConnectionState,
        attempts: u32,
        connection: Option<SharedConnection<Req, Resp>>,
    ) {
        let mut entries = self.entries.write().await;
        let entry = &mut entries[index];
        if entry.state == ConnectionState::Terminated {
            return;
        }
        entry.state = state;
        entry.attempts = attempts;
        entry.connection = connection;
    }

    pub(crate) async fn mark_connecting(&self, index: usize, attempt: u32) {
        self.transition(index, ConnectionState::Connecting, attempt, None)
            .await;
    }

    pub(crate) async fn mark_waiting(&self, index: usize, attempt: u32) {
        self.transition(index, ConnectionState::Waiting, attempt, None)
            .await;
    }

    pub(crate) async fn mark_open(&self, index: usize, connection: SharedConnection<Req, Resp>) {
        self.transition(index, ConnectionState::Open, 0, Some(connection))
            .await;
    }

    pub(crate) async fn mark_closed(&self, index: usize) {
        self.transition(index, ConnectionState::Closed, 0, None).await;
    }

    pub(crate) async fn mark_terminated(&self, index: usize) {
        self.transition(index, ConnectionState::Terminated, 0, None)
            .await;
    }

    /// Retires every entry. Used during client shutdown.
    pub(crate) async fn terminate_all(&self) {
        let mut entries = self.entries.write().await;
        for entry in entries.iter_mut() {
            entry.state = ConnectionState::Terminated;
            entry.attempts = 0;
            entry.connection = None;
        }
    }

    /// Snapshots the live set: every open connection, in endpoint order.
    pub(crate) async fn live(&self) -> Vec<SharedConnection<Req, Resp>> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.state == ConnectionState::Open)
            .filter_map(|entry| entry.connection.clone())
            .collect()
    }

    /// Number of open connections.
    pub(crate) async fn live_count(&self) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.state == ConnectionState::Open)
            .count()
    }

    /// Snapshots every entry's endpoint and state, in configured order.
    pub(crate) async fn states(&self) -> Vec<(Endpoint, ConnectionState)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| (entry.endpoint.clone(), entry.state))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{CloseListener, ProtocolConnection};
    use crate::error::SendError;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedConnection {
        endpoint: Endpoint,
    }

    #[async_trait]
    impl ProtocolConnection<String, String> for FixedConnection {
        fn host(&self) -> &str {
            self.endpoint.host()
        }

        fn port(&self) -> u16 {
            self.endpoint.port()
        }

        async fn send_message(&self, request: String) -> Result<String, SendError> {
            Ok(request)
        }

        fn on_closed(&self, _listener: CloseListener) {}
    }

    fn connection(host: &str, port: u16) -> SharedConnection<String, String> {
        Arc::new(FixedConnection {
            endpoint: Endpoint::new(host, port),
        })
    }

    fn endpoints() -> Vec<Endpoint> {
        vec![
            Endpoint::new("a", 1),
            Endpoint::new("b", 2),
            Endpoint::new("c", 3),
        ]
    }

    #[tokio::test]
    async fn test_starts_idle_and_empty() {
        let registry = ConnectionRegistry::<String, String>::new(&endpoints());
        assert_eq!(registry.live_count().await, 0);
        for (_, state) in registry.states().await {
            assert_eq!(state, ConnectionState::Idle);
        }
    }

    #[tokio::test]
    async fn test_live_set_tracks_open_entries() {
        let registry = ConnectionRegistry::new(&endpoints());

        registry.mark_open(0, connection("a", 1)).await;
        registry.mark_open(2, connection("c", 3)).await;
        assert_eq!(registry.live_count().await, 2);

        let live = registry.live().await;
        assert_eq!(live.len(), 2);
        assert_eq!(live[0].host(), "a");
        assert_eq!(live[1].host(), "c");

        registry.mark_closed(0).await;
        assert_eq!(registry.live_count().await, 1);
    }

    #[tokio::test]
    async fn test_open_resets_attempts() {
        let registry = ConnectionRegistry::new(&endpoints());
        registry.mark_connecting(1, 4).await;
        registry.mark_open(1, connection("b", 2)).await;

        let entries = registry.entries.read().await;
        assert_eq!(entries[1].attempts, 0);
        assert_eq!(entries[1].state, ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_terminated_is_terminal() {
        let registry = ConnectionRegistry::new(&endpoints());
        registry.mark_terminated(1).await;
        registry.mark_connecting(1, 1).await;
        registry.mark_open(1, connection("b", 2)).await;

        let states = registry.states().await;
        assert_eq!(states[1].1, ConnectionState::Terminated);
        assert_eq!(registry.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_terminate_all_empties_live_set() {
        let registry = ConnectionRegistry::new(&endpoints());
        registry.mark_open(0, connection("a", 1)).await;
        registry.mark_open(1, connection("b", 2)).await;

        registry.terminate_all().await;

        assert_eq!(registry.live_count().await, 0);
        for (_, state) in registry.states().await {
            assert_eq!(state, ConnectionState::Terminated);
        }
    }

    #[tokio::test]
    async fn test_duplicate_endpoints_get_distinct_entries() {
        let endpoints = vec![Endpoint::new("a", 1), Endpoint::new("a", 1)];
        let registry = ConnectionRegistry::new(&endpoints);
        registry.mark_open(0, connection("a", 1)).await;
        assert_eq!(registry.live_count().await, 1);
        registry.mark_open(1, connection("a", 1)).await;
        assert_eq!(registry.live_count().await, 2);
    }
}

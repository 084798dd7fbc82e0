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

//! Scripted test doubles shared by the integration tests.
//!
//! [`ScriptedReactor`] records every `connect` and `sleep` the client
//! requests and fails connects on demand. [`ScriptedFactory`] produces
//! [`ScriptedConnection`]s whose send results and close events the tests
//! control. [`capture_logs`] installs a thread-local `tracing`
//! subscriber that collects emitted messages for assertion.

#![allow(dead_code)]

use async_trait::async_trait;
use fanrpc::{
    CloseListener, ConnectError, ConnectionFactory, ProtocolConnection, RawConnection, Reactor,
    SendError, SharedConnection,
};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One observed `connect` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectCall {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

enum ConnectScript {
    FailTimes(u32),
    FailForever,
}

/// A reactor whose connect outcomes are scripted per endpoint.
///
/// Connects succeed by default, handing back an in-memory byte stream.
/// Sleeps are recorded and shortened to a millisecond so backoff-heavy
/// scenarios finish quickly; a reactor stop resolves them early, like
/// the production implementation.
pub struct ScriptedReactor {
    running: watch::Sender<bool>,
    start_calls: Mutex<u32>,
    connects: Mutex<Vec<ConnectCall>>,
    sleeps: Mutex<Vec<Duration>>,
    scripts: Mutex<HashMap<String, ConnectScript>>,
}

impl ScriptedReactor {
    pub fn new() -> Arc<Self> {
        let (running, _) = watch::channel(false);
        Arc::new(Self {
            running,
            start_calls: Mutex::new(0),
            connects: Mutex::new(Vec::new()),
            sleeps: Mutex::new(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
        })
    }

    /// Makes the next `times` connects to `addr` fail with a refusal.
    pub fn fail_times(&self, addr: &str, times: u32) {
        self.scripts
            .lock()
            .unwrap()
            .insert(addr.to_string(), ConnectScript::FailTimes(times));
    }

    /// Makes every connect to `addr` fail until further notice.
    pub fn fail_forever(&self, addr: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(addr.to_string(), ConnectScript::FailForever);
    }

    pub fn start_calls(&self) -> u32 {
        *self.start_calls.lock().unwrap()
    }

    pub fn connect_calls(&self) -> Vec<ConnectCall> {
        self.connects.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.lock().unwrap().len()
    }

    pub fn connect_count_for(&self, host: &str, port: u16) -> usize {
        self.connects
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.host == host && call.port == port)
            .count()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reactor for ScriptedReactor {
    fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    async fn start(&self) {
        *self.start_calls.lock().unwrap() += 1;
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
        self.connects.lock().unwrap().push(ConnectCall {
            host: host.to_string(),
            port,
            timeout,
        });

        if !self.is_running() {
            return Err(ConnectError::ReactorStopped);
        }

        let addr = format!("{}:{}", host, port);
        let fail = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(&addr) {
                Some(ConnectScript::FailForever) => true,
                Some(ConnectScript::FailTimes(remaining)) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if fail {
            return Err(ConnectError::Io {
                host: host.to_string(),
                port,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            });
        }

        let (stream, _peer) = tokio::io::duplex(64);
        Ok(RawConnection::new(host, port, stream))
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let mut running = self.running.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(1)) => {}
            _ = running.wait_for(|running| !*running) => {}
        }
    }
}

/// A protocol connection whose send results are scripted.
///
/// Unscripted sends succeed, echoing the request. The close listener
/// registered by the client can be fired from the test through
/// [`trigger_close`](Self::trigger_close).
pub struct ScriptedConnection {
    host: String,
    port: u16,
    listener: Mutex<Option<CloseListener>>,
    send_results: Mutex<VecDeque<Result<String, SendError>>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedConnection {
    fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            listener: Mutex::new(None),
            send_results: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queues the result for the next unscripted send.
    pub fn push_send_result(&self, result: Result<String, SendError>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    /// Fires the close listener: `Some(cause)` for an unexpected close,
    /// `None` for a clean one.
    pub fn trigger_close(&self, cause: Option<&str>) {
        let listener = self.listener.lock().unwrap().take();
        if let Some(listener) = listener {
            listener.notify(cause.map(str::to_string));
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ProtocolConnection<String, String> for ScriptedConnection {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    async fn send_message(&self, request: String) -> Result<String, SendError> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(result) = self.send_results.lock().unwrap().pop_front() {
            return result;
        }
        Ok(format!("ok:{}", request))
    }

    fn on_closed(&self, listener: CloseListener) {
        *self.listener.lock().unwrap() = Some(listener);
    }
}

/// Factory producing [`ScriptedConnection`]s and exposing them to tests.
pub struct ScriptedFactory {
    created: Mutex<Vec<Arc<ScriptedConnection>>>,
    initialize_failures: Mutex<HashMap<String, u32>>,
}

impl ScriptedFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created: Mutex::new(Vec::new()),
            initialize_failures: Mutex::new(HashMap::new()),
        })
    }

    /// Makes the next `times` handshakes against `addr` fail.
    pub fn fail_initialize(&self, addr: &str, times: u32) {
        self.initialize_failures
            .lock()
            .unwrap()
            .insert(addr.to_string(), times);
    }

    /// Latest connection created for `addr` ("host:port").
    ///
    /// Panics if no connection to that address has been created.
    pub fn connection(&self, addr: &str) -> Arc<ScriptedConnection> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|connection| format!("{}:{}", connection.host, connection.port) == addr)
            .cloned()
            .unwrap_or_else(|| panic!("no connection created for {}", addr))
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Total requests sent across every connection to `addr`.
    pub fn sent_count_for(&self, addr: &str) -> usize {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|connection| format!("{}:{}", connection.host, connection.port) == addr)
            .map(|connection| connection.sent_count())
            .sum()
    }
}

#[async_trait]
impl ConnectionFactory<String, String> for ScriptedFactory {
    fn create_connection(&self, raw: RawConnection) -> SharedConnection<String, String> {
        let connection = Arc::new(ScriptedConnection::new(raw.host(), raw.port()));
        self.created.lock().unwrap().push(Arc::clone(&connection));
        connection
    }

    async fn initialize_connection(
        &self,
        connection: &SharedConnection<String, String>,
    ) -> Result<(), ConnectError> {
        let addr = format!("{}:{}", connection.host(), connection.port());
        let mut failures = self.initialize_failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&addr) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ConnectError::HandshakeFailed {
                    reason: "scripted handshake failure".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Captured log records, assertable by level and message substring.
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    /// Number of records at `level` containing `needle`
    /// (case-insensitive).
    pub fn count(&self, level: Level, needle: &str) -> usize {
        let needle = needle.to_lowercase();
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(recorded, message)| {
                *recorded == level && message.to_lowercase().contains(&needle)
            })
            .count()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.count(level, needle) > 0
    }
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

struct CaptureLayer {
    capture: LogCapture,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);
        self.capture
            .records
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.message));
    }
}

/// Installs a log-capturing subscriber for the current thread.
///
/// Keep the returned guard alive for the duration of the test.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        capture: capture.clone(),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}

/// Polls `condition` until it holds or a second passes.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 1s");
}

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

//! Client configuration.

use crate::endpoint::Endpoint;
use std::time::Duration;

/// Configuration for an [`RpcClient`](crate::RpcClient).
///
/// The endpoint list and timeout are fixed once the client is built.
///
/// # Examples
///
/// ```rust
/// use fanrpc::{ClientConfig, Endpoint};
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_endpoint(Endpoint::new("a", 1))
///     .with_endpoint(Endpoint::new("b", 2))
///     .with_connection_timeout(Duration::from_secs(7));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoints the client maintains connections to.
    ///
    /// Must contain at least one entry. Duplicates are permitted; each
    /// entry gets its own connection and reconnection driver.
    pub endpoints: Vec<Endpoint>,

    /// Timeout for a single connect attempt.
    ///
    /// Also the base of the reconnect backoff schedule: after `k`
    /// consecutive failures the next attempt waits
    /// `min(timeout * 2^(k-1), 10 * timeout)`.
    ///
    /// Default: 5 seconds.
    pub connection_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an endpoint.
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Appends several endpoints.
    pub fn with_endpoints(mut self, endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        self.endpoints.extend(endpoints);
        self
    }

    /// Sets the connect timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No endpoints are configured
    /// - The connection timeout is shorter than one second
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoints.is_empty() {
            return Err("at least one endpoint is required".to_string());
        }
        if self.connection_timeout < Duration::from_secs(1) {
            return Err("connection_timeout must be at least 1 second".to_string());
        }
        Ok(())
    }
}

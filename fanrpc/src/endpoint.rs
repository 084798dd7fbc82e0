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

//! Endpoint addressing.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A remote endpoint the client targets: a `(host, port)` pair.
///
/// Endpoints are immutable and supplied at construction. The configured
/// list is a multiset: duplicates are permitted (each duplicate gets its
/// own connection) but carry no extra meaning.
///
/// # Examples
///
/// ```rust
/// use fanrpc::Endpoint;
///
/// let endpoint = Endpoint::new("cache-1.internal", 7000);
/// assert_eq!(endpoint.to_string(), "cache-1.internal:7000");
///
/// let parsed: Endpoint = "cache-1.internal:7000".parse().unwrap();
/// assert_eq!(parsed, endpoint);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from a host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Error returned when parsing a `"host:port"` string fails.
#[derive(Debug, Error)]
#[error("invalid endpoint '{input}': {reason}")]
pub struct ParseEndpointError {
    /// The string that failed to parse.
    pub input: String,
    /// Why it failed.
    pub reason: String,
}

impl FromStr for Endpoint {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s.rsplit_once(':').ok_or_else(|| ParseEndpointError {
            input: s.to_string(),
            reason: "expected 'host:port'".to_string(),
        })?;
        if host.is_empty() {
            return Err(ParseEndpointError {
                input: s.to_string(),
                reason: "host is empty".to_string(),
            });
        }
        let port = port.parse::<u16>().map_err(|e| ParseEndpointError {
            input: s.to_string(),
            reason: format!("bad port: {}", e),
        })?;
        Ok(Self::new(host, port))
    }
}

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

//! Request routing.
//!
//! On every dispatch the client snapshots the live set and asks the
//! routing strategy to pick one connection for the request. The default
//! [`RandomStrategy`] picks uniformly at random; applications with
//! affinity requirements (sticky sessions, shard keys, locality) supply
//! their own [`RoutingStrategy`].

mod random;

pub use random::RandomStrategy;

use crate::connection::SharedConnection;

/// Picks one live connection for an outbound request.
///
/// A pure selector: it receives the current live set and the request
/// payload and returns one member of the set, or `None` to report that
/// no connection is suitable (the request then fails with a connection
/// error). Strategies are consulted again on every retry, against the
/// then-current live set; a retried request does not stick to the
/// connection that failed it.
///
/// Stateless by default; a stateful strategy must handle its own
/// synchronization.
pub trait RoutingStrategy<Req: 'static, Resp: 'static>: Send + Sync {
    /// Chooses a connection from `live` for `request`.
    fn choose(
        &self,
        live: &[SharedConnection<Req, Resp>],
        request: &Req,
    ) -> Option<SharedConnection<Req, Resp>>;

    /// Human-readable name, used for logging and debugging.
    fn name(&self) -> &str {
        "custom"
    }
}

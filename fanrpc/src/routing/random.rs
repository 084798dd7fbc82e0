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

//! Uniform random routing.

use crate::connection::SharedConnection;
use crate::routing::RoutingStrategy;
use rand::seq::SliceRandom;

/// The default routing strategy: uniform random over the live set.
///
/// Ignores the request payload entirely. With `N` live connections,
/// each carries an expected `1/N` share of the traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl RandomStrategy {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self
    }
}

impl<Req: 'static, Resp: 'static> RoutingStrategy<Req, Resp> for RandomStrategy {
    fn choose(
        &self,
        live: &[SharedConnection<Req, Resp>],
        _request: &Req,
    ) -> Option<SharedConnection<Req, Resp>> {
        live.choose(&mut rand::thread_rng()).cloned()
    }

    fn name(&self) -> &str {
        "random"
    }
}

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

//! Per-endpoint reconnection.
//!
//! Each configured endpoint is owned by one driver task that repeatedly
//! attempts to establish a connection, backing off
//! exponentially between failures, until it succeeds or the client shuts
//! down. An unexpected close restarts the driver from the top of the
//! schedule; a clean close retires the endpoint permanently.

mod backoff;
mod driver;

pub use backoff::Backoff;
pub(crate) use driver::ReconnectDriver;

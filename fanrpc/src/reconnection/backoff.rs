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

//! Reconnect backoff schedule.

use std::time::Duration;

/// Exponential backoff anchored to the connect timeout.
///
/// After `k` consecutive failed attempts, the next attempt waits
/// `min(base * 2^(k-1), 10 * base)`. The cap is sticky: once reached,
/// every later delay stays at `10 * base` until a connection succeeds,
/// which restarts the schedule from the beginning.
///
/// # Examples
///
/// ```rust
/// use fanrpc::Backoff;
/// use std::time::Duration;
///
/// let backoff = Backoff::new(Duration::from_secs(7));
/// let delays: Vec<u64> = (1..=6)
///     .map(|failures| backoff.delay_after(failures).as_secs())
///     .collect();
/// assert_eq!(delays, [7, 14, 28, 56, 70, 70]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
}

impl Backoff {
    /// Factor between the base delay and the sticky cap.
    const CAP_FACTOR: u32 = 10;

    /// Creates a schedule with the given base delay and a cap of ten
    /// times the base.
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            cap: base.saturating_mul(Self::CAP_FACTOR),
        }
    }

    /// Returns the delay to wait after `failures` consecutive failed
    /// attempts (`failures >= 1`).
    pub fn delay_after(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.cap)
    }
}

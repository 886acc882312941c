// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! How long a request waits for the worker before answering.
//!
//! The caller checks `is_processed` after each interval and stops at the
//! first hit. Giving up is not an error: the mutation stays queued and the
//! change becomes visible when the worker gets to it.

use std::time::Duration;

/// Back-off between status checks, in milliseconds.
pub const POLL_INTERVALS_MS: [u64; 4] = [200, 400, 800, 1600];

/// Total wait before reporting "not yet processed".
pub const DEFAULT_WAIT_CAP_MS: u64 = 3000;

/// A bounded back-off schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    cap_ms: u64,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_CAP_MS)
    }
}

impl PollSchedule {
    /// Creates a schedule that waits at most `cap_ms` in total.
    #[must_use]
    pub const fn new(cap_ms: u64) -> Self {
        Self { cap_ms }
    }

    /// The total wait.
    #[must_use]
    pub const fn cap_ms(&self) -> u64 {
        self.cap_ms
    }

    /// The waits between checks.
    ///
    /// The back-off doubles up to its last step and then repeats it. The
    /// final wait is shortened so the sum never exceeds the cap.
    #[must_use]
    pub fn intervals(&self) -> Vec<Duration> {
        let mut waits: Vec<Duration> = Vec::new();
        let mut totaal: u64 = 0;
        let laatste: u64 = POLL_INTERVALS_MS[POLL_INTERVALS_MS.len() - 1];
        let mut stappen = POLL_INTERVALS_MS
            .iter()
            .copied()
            .chain(std::iter::repeat(laatste));

        while totaal < self.cap_ms {
            let stap: u64 = stappen.next().unwrap_or(laatste);
            let wacht: u64 = stap.min(self.cap_ms - totaal);
            waits.push(Duration::from_millis(wacht));
            totaal += wacht;
        }

        waits
    }
}

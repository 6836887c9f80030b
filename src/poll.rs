//! Bounded visibility polling.
//!
//! On some backends (network or overlay mounts) a directory or symlink
//! mutation is not immediately visible to a subsequent metadata lookup.
//! Mutating steps confirm their work with a bounded existence poll rather
//! than a single check.

use std::thread;
use std::time::Duration;

/// Retry budget for one visibility poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of observations before giving up.
    pub attempts: u32,
    /// Pause between observations.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(100),
        }
    }
}

impl PollPolicy {
    /// Run `probe` up to `attempts` times, pausing `interval` via `sleep`
    /// after each negative observation. Returns true on the first positive
    /// observation, false once the budget is exhausted.
    pub fn wait_with<P, S>(&self, mut probe: P, mut sleep: S) -> bool
    where
        P: FnMut() -> bool,
        S: FnMut(Duration),
    {
        for _ in 0..self.attempts {
            if probe() {
                return true;
            }
            sleep(self.interval);
        }
        false
    }

    /// `wait_with` against the real clock.
    pub fn wait<P: FnMut() -> bool>(&self, probe: P) -> bool {
        self.wait_with(probe, thread::sleep)
    }
}

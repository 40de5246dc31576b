//! Fixed-interval cycle loop.
//!
//! Cycles never overlap: the loop runs on the calling thread, and a cycle
//! that overruns its interval delays the next one instead of stacking
//! triggers. The first cycle runs immediately.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use chrono::Utc;
use portreap_common::error::Result;

use crate::monitor::Monitor;
use crate::reconciler::CycleReport;

/// Repeats monitor cycles until shutdown.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
    max_cycles: Option<u64>,
}

impl Scheduler {
    /// Creates a scheduler firing every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_cycles: None,
        }
    }

    /// Stops after `cycles` cycles instead of running until shutdown.
    #[must_use]
    pub const fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Runs cycles until a message arrives on `shutdown`, the sender is
    /// dropped, or the cycle limit is reached. Returns the number of cycles
    /// run.
    ///
    /// A failed cycle is logged and handed to `on_cycle`; it never stops the
    /// loop.
    pub fn run<F>(&self, monitor: &Monitor, shutdown: &Receiver<()>, mut on_cycle: F) -> u64
    where
        F: FnMut(&Result<CycleReport>),
    {
        let mut cycles = 0_u64;
        let mut next = Instant::now();

        loop {
            let result = monitor.run_cycle(Utc::now());
            if let Err(e) = &result {
                tracing::error!(error = %e, "monitoring cycle aborted");
            }
            on_cycle(&result);
            cycles += 1;

            if self.max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            next += self.interval;
            let now = Instant::now();
            if next < now {
                tracing::warn!(overrun = ?now.duration_since(next), "cycle overran check interval");
                next = now;
            }

            match shutdown.recv_timeout(next - now) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!(cycles, "shutdown requested");
                    break;
                }
            }
        }
        cycles
    }
}

//! Time budgets for the two phases of a run.
//!
//! Listing a directory is fast; writing up to twenty 1 GiB files is not, so
//! measuring and mutating get separate budgets. Each phase starts its own
//! [`Deadline`]; long-running loops call [`Deadline::check`] between file
//! operations and abandon the phase once it has elapsed. Nothing is rolled
//! back: the next run re-derives state from disk.

use std::time::{Duration, Instant};

use crate::error::{PadError, Result};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_MUTATION_TIMEOUT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub probe_timeout: Duration,
    pub mutation_timeout: Duration,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            mutation_timeout: DEFAULT_MUTATION_TIMEOUT,
        }
    }
}

impl Budget {
    pub fn probe_deadline(&self) -> Deadline {
        Deadline::start("measure", self.probe_timeout)
    }

    pub fn mutation_deadline(&self) -> Deadline {
        Deadline::start("mutate", self.mutation_timeout)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    phase: &'static str,
    budget: Duration,
    started: Instant,
}

impl Deadline {
    pub fn start(phase: &'static str, budget: Duration) -> Self {
        Self {
            phase,
            budget,
            started: Instant::now(),
        }
    }

    /// A deadline that never expires.
    pub fn unbounded(phase: &'static str) -> Self {
        Self::start(phase, Duration::MAX)
    }

    /// Fails once the elapsed time reaches the budget, so a zero budget is
    /// always spent.
    pub fn check(&self) -> Result<()> {
        if self.started.elapsed() >= self.budget {
            return Err(PadError::Timeout {
                phase: self.phase,
                budget: self.budget,
            });
        }
        Ok(())
    }
}

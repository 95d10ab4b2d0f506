use std::hint::black_box;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{Error, Result};

/// Seed used for synthetic datasets when none is given.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Quick,
            seed: DEFAULT_SEED,
        }
    }
}

impl BenchConfig {
    /// Untimed passes run before the measured loop.
    pub fn warmup_iters(&self, iterations: u64) -> u64 {
        match self.profile {
            Profile::Quick => 0,
            Profile::Full => iterations.min(32),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Measured {
    pub iters: u64,
    pub warmup_iters: u64,
    pub total_ns: u128,
    pub ns_per_iter: f64,
}

impl Measured {
    /// Iterations per second over the timed region; 0.0 when nothing was timed.
    pub fn throughput(&self) -> f64 {
        throughput(self.iters as f64, self.total_ns)
    }
}

pub fn measure_fn<T>(iters: u64, warmup_iters: u64, mut f: impl FnMut() -> T) -> Measured {
    for _ in 0..warmup_iters {
        black_box(f());
    }

    let start = Instant::now();
    for _ in 0..iters {
        black_box(f());
    }
    let elapsed = start.elapsed();

    let total_ns = elapsed.as_nanos();
    let denom = iters.max(1) as f64;
    let ns_per_iter = (total_ns as f64) / denom;

    Measured {
        iters,
        warmup_iters,
        total_ns,
        ns_per_iter,
    }
}

pub fn throughput(count: f64, total_ns: u128) -> f64 {
    let total_s = (total_ns as f64) / 1e9;
    if total_s <= 0.0 {
        0.0
    } else {
        count / total_s
    }
}

/// Caller-supplied point in time after which no new phase of work may start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn none() -> Self {
        Self { at: None }
    }

    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(timeout),
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Fails with [`Error::DeadlineExceeded`] if the deadline has passed.
    pub fn check(&self, phase: &str) -> Result<()> {
        if self.is_exceeded() {
            warn!(phase, "deadline exceeded");
            return Err(Error::DeadlineExceeded {
                phase: phase.to_string(),
            });
        }
        Ok(())
    }
}

//! Compute-cost measurement used by the kernel to fill per-task CPU history.

use std::time::Instant;

/// Source of a monotonically increasing "compute consumed" figure.
///
/// The kernel reads it before and after each task body and records the delta.
pub trait CpuClock {
    /// Compute consumed so far, in arbitrary units (milliseconds for [`WallClock`]).
    fn used(&self) -> f64;
}

/// Wall-clock meter: elapsed milliseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    /// Start a new meter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuClock for WallClock {
    fn used(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Ceiling of a non-negative estimate as whole ticks. Negative or NaN inputs yield 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ceil_ticks(estimate: f64) -> u32 {
    if estimate.is_nan() || estimate <= 0.0 {
        return 0;
    }
    estimate.ceil().min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_is_monotonic() {
        let clock = WallClock::new();
        let a = clock.used();
        let b = clock.used();
        assert!(b >= a);
    }

    #[test]
    fn ceil_ticks_rounds_up() {
        assert_eq!(ceil_ticks(0.0), 0);
        assert_eq!(ceil_ticks(-3.0), 0);
        assert_eq!(ceil_ticks(f64::NAN), 0);
        assert_eq!(ceil_ticks(4.0), 4);
        assert_eq!(ceil_ticks(4.01), 5);
    }
}

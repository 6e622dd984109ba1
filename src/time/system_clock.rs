//! Platform-backed monotonic clock.

use std::{
  sync::atomic::{AtomicU64, Ordering},
  time::Instant,
};

use super::{ClockKind, MonotonicClock, TimerInstant};

/// Monotonic clock reading the platform timer against a fixed origin.
///
/// Readings funnel through a high-water mark, so a platform reading that
/// appears to move backwards is observed as zero elapsed time rather than
/// a regressing instant.
pub struct SystemClock {
  origin:     Instant,
  high_water: AtomicU64,
}

impl SystemClock {
  /// Creates a clock anchored at the current platform instant.
  #[must_use]
  pub fn new() -> Self {
    Self { origin: Instant::now(), high_water: AtomicU64::new(0) }
  }
}

impl Default for SystemClock {
  fn default() -> Self {
    Self::new()
  }
}

impl MonotonicClock for SystemClock {
  fn now(&self) -> TimerInstant {
    let elapsed = self.origin.elapsed().as_nanos();
    let reading = if elapsed > u128::from(u64::MAX) { u64::MAX } else { elapsed as u64 };
    let previous = self.high_water.fetch_max(reading, Ordering::AcqRel);
    TimerInstant::from_nanos(previous.max(reading))
  }

  fn kind(&self) -> ClockKind {
    ClockKind::Monotonic
  }
}

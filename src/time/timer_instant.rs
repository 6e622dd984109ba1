//! Nanosecond-precision monotonic instants.

use core::{
  ops::{Add, Sub},
  time::Duration,
};

/// Monotonic point in time, in nanoseconds since a process-local epoch.
///
/// Instants are totally ordered. They are only ever produced by a clock or
/// by arithmetic on another instant, so comparisons are meaningful across
/// the whole process regardless of which driver mode is active.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerInstant(u64);

impl TimerInstant {
  /// The process epoch itself.
  pub const ZERO: Self = Self(0);

  /// Creates an instant from raw nanoseconds since the process epoch.
  #[must_use]
  pub const fn from_nanos(nanos: u64) -> Self {
    Self(nanos)
  }

  /// Returns raw nanoseconds since the process epoch.
  #[must_use]
  pub const fn as_nanos(self) -> u64 {
    self.0
  }

  /// Adds a duration, saturating at the far end of the time scale.
  #[must_use]
  pub const fn saturating_add(self, duration: Duration) -> Self {
    Self(self.0.saturating_add(clamp_nanos(duration)))
  }

  /// Returns the time elapsed since `earlier`, or zero if `earlier` is not
  /// actually earlier.
  #[must_use]
  pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
    Duration::from_nanos(self.0.saturating_sub(earlier.0))
  }
}

impl Add<Duration> for TimerInstant {
  type Output = Self;

  fn add(self, rhs: Duration) -> Self {
    self.saturating_add(rhs)
  }
}

impl Sub<TimerInstant> for TimerInstant {
  type Output = Duration;

  fn sub(self, rhs: TimerInstant) -> Duration {
    self.saturating_duration_since(rhs)
  }
}

const fn clamp_nanos(duration: Duration) -> u64 {
  let nanos = duration.as_nanos();
  if nanos > u64::MAX as u128 {
    u64::MAX
  } else {
    nanos as u64
  }
}

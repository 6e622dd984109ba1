//! Clock flavor markers.

/// Identifies which kind of clock produced a reading.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClockKind {
  /// Platform monotonic clock; advances on its own.
  Monotonic,
  /// Virtual clock; advances only through explicit driver calls.
  Virtual,
}

//! Deterministically advanceable clock over the scheduler registry.

use core::time::Duration;

use crate::{
  registry::TimingRegistry,
  time::{ClockKind, MonotonicClock, TimerInstant},
};

/// Simulated-mode driver: the virtual instant, pause state and the live
/// scheduler registry.
pub(crate) struct VirtualDriver {
  now:       TimerInstant,
  paused:    bool,
  paused_at: Option<TimerInstant>,
  registry:  TimingRegistry,
}

impl VirtualDriver {
  pub(crate) const fn new(now: TimerInstant) -> Self {
    Self { now, paused: false, paused_at: None, registry: TimingRegistry::new() }
  }

  pub(crate) fn registry_mut(&mut self) -> &mut TimingRegistry {
    &mut self.registry
  }

  /// Advances to the earliest pending fire and delivers that batch.
  ///
  /// With nothing armed the virtual instant is returned unchanged.
  pub(crate) fn next_tick(&mut self) -> TimerInstant {
    if let Some(deadline) = self.registry.earliest_deadline() {
      self.advance_to(deadline);
    }
    self.now
  }

  /// Advances virtual time by `delta`, firing every deadline on the way.
  ///
  /// The queue is recomputed after each batch: a re-armed periodic may
  /// re-enter before the target and fires once per elapsed period.
  pub(crate) fn advance_by(&mut self, delta: Duration) {
    let target = self.now.saturating_add(delta);
    while let Some(deadline) = self.registry.earliest_deadline() {
      if deadline > target {
        break;
      }
      self.advance_to(deadline);
    }
    self.now = target;
  }

  /// Suspends delivery. Virtual time keeps advancing; elapsed fires accrue.
  pub(crate) fn pause(&mut self) {
    if self.paused {
      return;
    }
    self.paused = true;
    self.paused_at = Some(self.now);
    tracing::debug!(at = self.now.as_nanos(), "timing paused");
  }

  /// Delivers at most one accrued fire per scheduler and resumes delivery.
  pub(crate) fn resume(&mut self) {
    if !self.paused {
      return;
    }
    self.paused = false;
    if let Some(paused_at) = self.paused_at.take() {
      tracing::debug!(paused_for = ?self.now.saturating_duration_since(paused_at), "timing resumed");
    }
    for cell in self.registry.live() {
      cell.resume_due(self.now);
    }
  }

  fn advance_to(&mut self, deadline: TimerInstant) {
    // A deadline below `now` belongs to a scheduler armed at a past
    // instant; the clock itself never moves backwards.
    self.now = self.now.max(deadline);
    for cell in self.registry.live() {
      cell.fire_due(self.now, self.paused);
    }
  }
}

impl MonotonicClock for VirtualDriver {
  fn now(&self) -> TimerInstant {
    self.now
  }

  fn kind(&self) -> ClockKind {
    ClockKind::Virtual
  }
}

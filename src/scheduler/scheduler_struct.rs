//! Public scheduler handle.

use core::time::Duration;
use std::sync::Arc;

use super::{SchedulerCell, SubscriptionId};
use crate::{driver, tick::TickListener, time::TimerInstant};

/// One-shot / periodic timing handle.
///
/// A scheduler is created idle, armed through [`after`](Self::after),
/// [`at`](Self::at) or [`every`](Self::every), and consumed through the
/// listener returned by [`tick`](Self::tick). Arming replaces any prior
/// arming. All methods may be called from any thread; cloning produces
/// another handle to the same scheduler.
#[derive(Clone)]
pub struct Scheduler {
  cell: Arc<SchedulerCell>,
}

impl Scheduler {
  /// Creates an idle scheduler.
  #[must_use]
  pub fn new() -> Self {
    let cell = SchedulerCell::new();
    driver::register(&cell);
    Self { cell }
  }

  /// Returns the stable identity used for cross-scheduler tie-breaks.
  #[must_use]
  pub fn subscription_id(&self) -> SubscriptionId {
    self.cell.id()
  }

  /// Arms a one-shot fire `delay` from now.
  ///
  /// A zero delay fires at the next driver step.
  pub fn after(&self, delay: Duration) -> &Self {
    driver::arm_after(&self.cell, delay);
    self
  }

  /// Arms a one-shot fire at `instant`.
  ///
  /// An instant at or before the current time fires at the next driver
  /// step.
  pub fn at(&self, instant: TimerInstant) -> &Self {
    driver::arm_at(&self.cell, instant);
    self
  }

  /// Arms periodic fires every `period`, the first one `period` from now.
  ///
  /// # Panics
  ///
  /// Panics if `period` is zero.
  pub fn every(&self, period: Duration) -> &Self {
    assert!(!period.is_zero(), "every() requires a period greater than zero");
    driver::arm_every(&self.cell, period);
    self
  }

  /// Disarms the scheduler.
  ///
  /// A fire already pending in the slot is left for the consumer; no
  /// further fires are produced until the scheduler is re-armed.
  pub fn stop(&self) -> &Self {
    driver::disarm(&self.cell);
    self
  }

  /// Returns a consumer endpoint for this scheduler's fires.
  #[must_use]
  pub fn tick(&self) -> TickListener {
    TickListener::new(Arc::clone(self.cell.slot()))
  }

  #[cfg(test)]
  pub(crate) fn blocked_listeners_for_test(&self) -> usize {
    self.cell.slot().blocked_readers()
  }
}

impl Default for Scheduler {
  fn default() -> Self {
    Self::new()
  }
}

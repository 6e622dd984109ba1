//! Consumer endpoint of a scheduler's fire channel.

use std::sync::Arc;

use super::tick_slot::TickSlot;
use crate::time::TimerInstant;

/// Consumer endpoint yielding the instant of each fire.
///
/// All listeners of one scheduler share its single slot. Dropping a
/// listener simply stops reading; fires keep landing in the slot and
/// coalesce there.
#[derive(Clone)]
pub struct TickListener {
  slot: Arc<TickSlot>,
}

impl TickListener {
  pub(crate) fn new(slot: Arc<TickSlot>) -> Self {
    Self { slot }
  }

  /// Blocks until the next fire and returns the instant it was decided.
  pub fn wait(&self) -> TimerInstant {
    self.slot.wait()
  }

  /// Returns the pending fire without blocking, if any.
  #[must_use]
  pub fn try_next(&self) -> Option<TimerInstant> {
    self.slot.try_take()
  }
}

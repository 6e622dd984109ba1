//! Shared core of a scheduler, referenced by handles and drivers.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{ScheduleState, SubscriptionId};
use crate::{tick::TickSlot, time::TimerInstant};

/// State shared between scheduler handles, listeners and the active driver.
///
/// The registry and the platform timer queue hold this through `Weak`, so a
/// scheduler whose handles are all dropped disappears from the driver on
/// the next sweep.
pub(crate) struct SchedulerCell {
  id:    SubscriptionId,
  state: Mutex<ScheduleState>,
  slot:  Arc<TickSlot>,
}

impl SchedulerCell {
  pub(crate) fn new() -> Arc<Self> {
    Arc::new(Self {
      id:    SubscriptionId::allocate(),
      state: Mutex::new(ScheduleState::idle()),
      slot:  Arc::new(TickSlot::new()),
    })
  }

  pub(crate) fn id(&self) -> SubscriptionId {
    self.id
  }

  pub(crate) fn slot(&self) -> &Arc<TickSlot> {
    &self.slot
  }

  pub(crate) fn lock_state(&self) -> MutexGuard<'_, ScheduleState> {
    match self.state.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }

  /// Earliest pending fire instant, if armed.
  pub(crate) fn next_fire(&self) -> Option<TimerInstant> {
    self.lock_state().next_fire
  }

  /// Fires or defers the scheduler if its deadline has elapsed at `now`.
  ///
  /// Periodic schedulers re-arm one period past `now`; while the driver is
  /// paused the fire accrues into `deferred` instead of posting, so at most
  /// one delivery is owed no matter how far time advanced.
  pub(crate) fn fire_due(&self, now: TimerInstant, paused: bool) {
    let mut state = self.lock_state();
    let Some(deadline) = state.next_fire else {
      return;
    };
    if deadline > now {
      return;
    }
    match state.period {
      | Some(period) => state.next_fire = Some(now.saturating_add(period)),
      | None => state.next_fire = None,
    }
    if paused {
      state.deferred = true;
      return;
    }
    drop(state);
    tracing::trace!(id = self.id.raw(), at = now.as_nanos(), "fired");
    self.slot.post(now);
  }

  /// Posts the single accrued fire at resume time, if one is owed.
  pub(crate) fn resume_due(&self, now: TimerInstant) {
    let mut state = self.lock_state();
    let due = state.deferred || state.next_fire.is_some_and(|deadline| deadline <= now);
    if !due {
      return;
    }
    state.deferred = false;
    match state.period {
      | Some(period) => state.next_fire = Some(now.saturating_add(period)),
      | None => state.next_fire = None,
    }
    drop(state);
    tracing::trace!(id = self.id.raw(), at = now.as_nanos(), "fired at resume");
    self.slot.post(now);
  }
}

//! Single-slot fire conduit shared by a scheduler and its listeners.

use std::{
  collections::VecDeque,
  sync::{Condvar, Mutex, MutexGuard},
};

use crate::time::TimerInstant;

/// Coalescing single-slot channel carrying fire instants.
///
/// Posting never blocks. A fire posted while the slot is occupied and no
/// reader is blocked replaces the stored instant (latest-wins) but still
/// counts as one pending delivery. A fire posted while an unclaimed reader
/// is blocked is handed off directly instead, one per blocked reader, so
/// pre-subscribed consumers observe per-period fires individually.
pub(crate) struct TickSlot {
  state: Mutex<SlotState>,
  cond:  Condvar,
}

struct SlotState {
  pending: Option<TimerInstant>,
  handoff: VecDeque<TimerInstant>,
  waiting: usize,
}

impl TickSlot {
  pub(crate) fn new() -> Self {
    Self {
      state: Mutex::new(SlotState { pending: None, handoff: VecDeque::new(), waiting: 0 }),
      cond:  Condvar::new(),
    }
  }

  /// Posts a fire decided at `instant`. Never blocks the producer.
  pub(crate) fn post(&self, instant: TimerInstant) {
    let mut state = self.lock();
    if state.waiting > state.handoff.len() {
      state.handoff.push_back(instant);
    } else {
      state.pending = Some(instant);
    }
    drop(state);
    self.cond.notify_one();
  }

  /// Takes the next fire, blocking until one is posted.
  pub(crate) fn wait(&self) -> TimerInstant {
    let mut state = self.lock();
    loop {
      if let Some(instant) = state.handoff.pop_front() {
        return instant;
      }
      if let Some(instant) = state.pending.take() {
        return instant;
      }
      state.waiting += 1;
      state = match self.cond.wait(state) {
        | Ok(guard) => guard,
        | Err(poisoned) => poisoned.into_inner(),
      };
      state.waiting -= 1;
    }
  }

  /// Takes the next fire without blocking, if one is ready.
  pub(crate) fn try_take(&self) -> Option<TimerInstant> {
    let mut state = self.lock();
    state.handoff.pop_front().or_else(|| state.pending.take())
  }

  #[cfg(test)]
  pub(crate) fn blocked_readers(&self) -> usize {
    self.lock().waiting
  }

  fn lock(&self) -> MutexGuard<'_, SlotState> {
    match self.state.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }
}

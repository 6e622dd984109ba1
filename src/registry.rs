//! Registry of schedulers visible to the simulated driver.

use std::{
  collections::BTreeMap,
  sync::{Arc, Weak},
};

use crate::{
  scheduler::{SchedulerCell, SubscriptionId},
  time::TimerInstant,
};


/// Process-wide set of schedulers driven by the virtual clock.
///
/// Entries are keyed by subscription id, so sweeps visit schedulers in a
/// stable order and same-instant batches fire reproducibly. The registry
/// holds weak references: dropping the last handle to a scheduler removes
/// it on the next sweep, while stopping keeps the entry so the scheduler
/// can be re-armed.
pub(crate) struct TimingRegistry {
  entries: BTreeMap<SubscriptionId, Weak<SchedulerCell>>,
}

impl TimingRegistry {
  pub(crate) const fn new() -> Self {
    Self { entries: BTreeMap::new() }
  }

  /// Adds or refreshes a scheduler entry.
  pub(crate) fn upsert(&mut self, cell: &Arc<SchedulerCell>) {
    self.entries.insert(cell.id(), Arc::downgrade(cell));
  }

  /// Returns live schedulers in subscription order, pruning dropped ones.
  pub(crate) fn live(&mut self) -> Vec<Arc<SchedulerCell>> {
    let mut live = Vec::with_capacity(self.entries.len());
    self.entries.retain(|_, weak| match weak.upgrade() {
      | Some(cell) => {
        live.push(cell);
        true
      },
      | None => false,
    });
    live
  }

  /// Earliest armed fire instant across live schedulers, if any.
  pub(crate) fn earliest_deadline(&mut self) -> Option<TimerInstant> {
    self.live().iter().filter_map(|cell| cell.next_fire()).min()
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }
}

//! Real-mode adapter over the platform monotonic timer.

use core::cmp::Ordering;
use std::{
  cmp::Reverse,
  collections::BinaryHeap,
  sync::{Arc, Condvar, Mutex, MutexGuard, Weak},
  thread,
};

use super::platform_clock;
use crate::{
  scheduler::SchedulerCell,
  time::{MonotonicClock, TimerInstant},
};

/// Real-mode driver: one worker thread sleeping on the platform timer.
///
/// Armed schedulers become heap entries ordered by deadline with a FIFO
/// sequence tie-break. Entries are invalidated lazily: re-arming or
/// stopping bumps the scheduler generation and stale entries are skipped
/// when they surface.
pub(crate) struct PlatformDriver {
  shared: Arc<PlatformShared>,
  worker: Option<thread::JoinHandle<()>>,
}

struct PlatformShared {
  queue: Mutex<PlatformQueue>,
  cond:  Condvar,
}

struct PlatformQueue {
  heap:     BinaryHeap<Reverse<PlatformEntry>>,
  sequence: u64,
  shutdown: bool,
}

struct PlatformEntry {
  deadline:   TimerInstant,
  sequence:   u64,
  generation: u64,
  cell:       Weak<SchedulerCell>,
}

impl PlatformDriver {
  pub(crate) fn new() -> Self {
    Self {
      shared: Arc::new(PlatformShared {
        queue: Mutex::new(PlatformQueue { heap: BinaryHeap::new(), sequence: 0, shutdown: false }),
        cond:  Condvar::new(),
      }),
      worker: None,
    }
  }

  /// Queues a timer entry for the scheduler's current arming.
  pub(crate) fn schedule(&mut self, cell: &Arc<SchedulerCell>, deadline: TimerInstant, generation: u64) {
    {
      let mut queue = self.shared.lock_queue();
      let sequence = queue.sequence;
      queue.sequence = queue.sequence.wrapping_add(1);
      queue.heap.push(Reverse(PlatformEntry { deadline, sequence, generation, cell: Arc::downgrade(cell) }));
    }
    self.ensure_worker();
    self.shared.cond.notify_one();
  }

  fn ensure_worker(&mut self) {
    if self.worker.is_some() {
      return;
    }
    tracing::debug!("starting platform timer worker");
    let shared = Arc::clone(&self.shared);
    self.worker = Some(thread::spawn(move || run_worker(&shared)));
  }
}

impl Drop for PlatformDriver {
  fn drop(&mut self) {
    self.shared.lock_queue().shutdown = true;
    self.shared.cond.notify_all();
    if let Some(worker) = self.worker.take() {
      let _ = worker.join();
    }
  }
}

impl PlatformShared {
  fn lock_queue(&self) -> MutexGuard<'_, PlatformQueue> {
    match self.queue.lock() {
      | Ok(guard) => guard,
      | Err(poisoned) => poisoned.into_inner(),
    }
  }
}

fn run_worker(shared: &PlatformShared) {
  let mut queue = shared.lock_queue();
  loop {
    if queue.shutdown {
      return;
    }
    let now = platform_clock().now();

    let mut due = Vec::new();
    while let Some(Reverse(head)) = queue.heap.peek() {
      if head.deadline > now {
        break;
      }
      if let Some(Reverse(entry)) = queue.heap.pop() {
        due.push(entry);
      }
    }
    if !due.is_empty() {
      // Fire outside the queue lock so arming from a consumer thread never
      // contends with delivery.
      drop(queue);
      let refires = fire_entries(due, now);
      queue = shared.lock_queue();
      for mut entry in refires {
        entry.sequence = queue.sequence;
        queue.sequence = queue.sequence.wrapping_add(1);
        queue.heap.push(Reverse(entry));
      }
      continue;
    }

    let timeout = queue.heap.peek().map(|Reverse(head)| head.deadline.saturating_duration_since(now));
    queue = match timeout {
      | None => match shared.cond.wait(queue) {
        | Ok(guard) => guard,
        | Err(poisoned) => poisoned.into_inner(),
      },
      | Some(timeout) => match shared.cond.wait_timeout(queue, timeout) {
        | Ok((guard, _)) => guard,
        | Err(poisoned) => poisoned.into_inner().0,
      },
    };
  }
}

/// Delivers due entries, returning the periodic ones to re-queue.
fn fire_entries(entries: Vec<PlatformEntry>, now: TimerInstant) -> Vec<PlatformEntry> {
  let mut refires = Vec::new();
  for mut entry in entries {
    let Some(cell) = entry.cell.upgrade() else {
      continue;
    };
    let mut state = cell.lock_state();
    if state.generation != entry.generation {
      continue;
    }
    let period = state.period;
    match period {
      | Some(period) => state.next_fire = Some(now.saturating_add(period)),
      | None => state.next_fire = None,
    }
    drop(state);
    tracing::trace!(id = cell.id().raw(), at = now.as_nanos(), "fired");
    cell.slot().post(now);
    if let Some(period) = period {
      entry.deadline = now.saturating_add(period);
      refires.push(entry);
    }
  }
  refires
}

impl PartialEq for PlatformEntry {
  fn eq(&self, other: &Self) -> bool {
    self.deadline == other.deadline && self.sequence == other.sequence
  }
}

impl Eq for PlatformEntry {}

impl PartialOrd for PlatformEntry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for PlatformEntry {
  fn cmp(&self, other: &Self) -> Ordering {
    self.deadline.cmp(&other.deadline).then_with(|| self.sequence.cmp(&other.sequence))
  }
}

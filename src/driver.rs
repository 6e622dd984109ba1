//! Process-wide timing driver: platform timers or a virtual clock.

mod platform_driver;
mod virtual_driver;

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use platform_driver::PlatformDriver;
use virtual_driver::VirtualDriver;

use crate::{
  scheduler::SchedulerCell,
  time::{MonotonicClock, SystemClock, TimerInstant},
};


/// Driver mode for the process.
enum DriverState {
  /// Real time: armed schedulers ride the platform monotonic timer.
  Platform(PlatformDriver),
  /// Simulated time: armed schedulers live in the registry and fire only
  /// on explicit advancement.
  Virtual(VirtualDriver),
}

impl DriverState {
  fn now(&self) -> TimerInstant {
    match self {
      | DriverState::Platform(_) => platform_clock().now(),
      | DriverState::Virtual(sim) => sim.now(),
    }
  }
}

struct Driver {
  state: Mutex<DriverState>,
}

fn driver() -> &'static Driver {
  static DRIVER: OnceLock<Driver> = OnceLock::new();
  DRIVER.get_or_init(|| Driver { state: Mutex::new(DriverState::Platform(PlatformDriver::new())) })
}

/// Process-wide platform clock; also the epoch every virtual clock is
/// anchored against.
pub(crate) fn platform_clock() -> &'static SystemClock {
  static CLOCK: OnceLock<SystemClock> = OnceLock::new();
  CLOCK.get_or_init(SystemClock::new)
}

fn lock_state() -> MutexGuard<'static, DriverState> {
  match driver().state.lock() {
    | Ok(guard) => guard,
    | Err(poisoned) => poisoned.into_inner(),
  }
}

pub(crate) fn current_now() -> TimerInstant {
  lock_state().now()
}

/// Makes a freshly created scheduler visible to the simulated driver.
pub(crate) fn register(cell: &Arc<SchedulerCell>) {
  if let DriverState::Virtual(sim) = &mut *lock_state() {
    sim.registry_mut().upsert(cell);
  }
}

pub(crate) fn arm_after(cell: &Arc<SchedulerCell>, delay: Duration) {
  let mut state = lock_state();
  let deadline = state.now().saturating_add(delay);
  arm(&mut state, cell, deadline, None);
}

pub(crate) fn arm_at(cell: &Arc<SchedulerCell>, instant: TimerInstant) {
  let mut state = lock_state();
  // Instants in the past arm for the next driver step instead.
  let deadline = instant.max(state.now());
  arm(&mut state, cell, deadline, None);
}

pub(crate) fn arm_every(cell: &Arc<SchedulerCell>, period: Duration) {
  let mut state = lock_state();
  let deadline = state.now().saturating_add(period);
  arm(&mut state, cell, deadline, Some(period));
}

fn arm(state: &mut DriverState, cell: &Arc<SchedulerCell>, deadline: TimerInstant, period: Option<Duration>) {
  let generation = cell.lock_state().arm(deadline, period);
  tracing::trace!(id = cell.id().raw(), deadline = deadline.as_nanos(), periodic = period.is_some(), "armed");
  match state {
    | DriverState::Platform(platform) => platform.schedule(cell, deadline, generation),
    | DriverState::Virtual(sim) => sim.registry_mut().upsert(cell),
  }
}

pub(crate) fn disarm(cell: &Arc<SchedulerCell>) {
  // Holding the driver lock keeps a concurrent sweep from observing the
  // scheduler mid-disarm.
  let _state = lock_state();
  cell.lock_state().disarm();
  tracing::trace!(id = cell.id().raw(), "stopped");
}

pub(crate) fn enter_test_mode() {
  let mut state = lock_state();
  let now = platform_clock().now();
  tracing::debug!(now = now.as_nanos(), "entering simulated timing mode");
  // Replacing the state drops any previous registry or platform timer
  // queue; schedulers created before this point are orphaned and never
  // fire again unless re-armed.
  *state = DriverState::Virtual(VirtualDriver::new(now));
}

pub(crate) fn next_tick() -> TimerInstant {
  match &mut *lock_state() {
    | DriverState::Platform(_) => panic!("next_tick() requires simulated mode; call enter_test_mode() first"),
    | DriverState::Virtual(sim) => sim.next_tick(),
  }
}

pub(crate) fn advance_by(delta: Duration) {
  match &mut *lock_state() {
    | DriverState::Platform(_) => panic!("advance_by() requires simulated mode; call enter_test_mode() first"),
    | DriverState::Virtual(sim) => sim.advance_by(delta),
  }
}

pub(crate) fn pause() {
  match &mut *lock_state() {
    | DriverState::Platform(_) => panic!("pause() requires simulated mode; call enter_test_mode() first"),
    | DriverState::Virtual(sim) => sim.pause(),
  }
}

pub(crate) fn resume() {
  match &mut *lock_state() {
    | DriverState::Platform(_) => panic!("resume() requires simulated mode; call enter_test_mode() first"),
    | DriverState::Virtual(sim) => sim.resume(),
  }
}

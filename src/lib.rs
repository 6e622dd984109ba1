#![deny(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::missing_safety_doc)]
#![cfg_attr(not(test), deny(clippy::redundant_clone))]
#![deny(clippy::redundant_field_names)]
#![deny(clippy::redundant_pattern)]
#![deny(clippy::redundant_static_lifetimes)]
#![deny(clippy::unnecessary_to_owned)]
#![deny(clippy::needless_borrow)]
#![deny(clippy::manual_ok_or)]
#![deny(clippy::manual_map)]
#![deny(clippy::manual_let_else)]
#![deny(clippy::unused_self)]
#![deny(clippy::unnecessary_wraps)]
#![deny(clippy::unreachable)]
#![deny(clippy::empty_enums)]
#![deny(clippy::no_effect)]
#![deny(dropping_copy_types)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::print_stdout)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::missing_const_for_fn)]
#![deny(clippy::must_use_candidate)]
#![deny(clippy::clone_on_copy)]
#![deny(clippy::len_without_is_empty)]
#![deny(clippy::wrong_self_convention)]
#![deny(clippy::from_over_into)]
#![deny(clippy::eq_op)]
#![deny(clippy::bool_comparison)]
#![deny(clippy::needless_bool)]
#![deny(clippy::match_like_matches_macro)]
#![deny(clippy::manual_assert)]
#![deny(clippy::if_same_then_else)]
#![deny(unreachable_pub)]

//! Virtualizable timing and scheduling for periodic status workloads.
//!
//! The crate answers "wake me after D / at T / every P" through
//! [`Scheduler`], whose fires are consumed from a single-slot coalescing
//! channel ([`TickListener`]). In real mode armed schedulers ride the
//! platform monotonic timer. Calling [`enter_test_mode`] replaces wall
//! clock time with a virtual clock that advances only through
//! [`next_tick`] and [`advance_by`], making firing order, coalescing and
//! pause accrual fully deterministic for tests.
//!
//! ```
//! use core::time::Duration;
//!
//! use metronome_rs::{Scheduler, enter_test_mode, next_tick, now};
//!
//! enter_test_mode();
//! let scheduler = Scheduler::new();
//! let listener = scheduler.every(Duration::from_secs(1)).tick();
//!
//! let start = now();
//! assert_eq!(next_tick(), start + Duration::from_secs(1));
//! assert_eq!(listener.try_next(), Some(start + Duration::from_secs(1)));
//! ```

mod driver;
mod registry;
pub mod scheduler;
pub mod tick;
pub mod time;

#[cfg(test)]
pub(crate) mod test_support;

pub use scheduler::{Scheduler, SubscriptionId};
pub use tick::TickListener;
pub use time::{ClockKind, MonotonicClock, SystemClock, TimerInstant};

use core::time::Duration;

/// Returns the current instant.
///
/// In real mode this is the platform monotonic reading; in simulated mode
/// it is the virtual instant, which advances only through [`next_tick`]
/// and [`advance_by`].
#[must_use]
pub fn now() -> TimerInstant {
  driver::current_now()
}

/// Switches the process to simulated timing mode.
///
/// Entering (or re-entering) simulated mode freezes the clock at the
/// current platform instant and resets all driver state: schedulers
/// created earlier are orphaned and never fire again until re-armed.
pub fn enter_test_mode() {
  driver::enter_test_mode();
}

/// Advances the virtual clock to the earliest pending fire, delivers that
/// batch and returns the new now.
///
/// With nothing armed the current now is returned unchanged. While paused,
/// time still advances but fires accrue instead of being delivered.
///
/// # Panics
///
/// Panics in real timing mode.
pub fn next_tick() -> TimerInstant {
  driver::next_tick()
}

/// Advances the virtual clock by `delta`, delivering every fire on the way.
///
/// Equivalent to repeated [`next_tick`] bounded by the target instant:
/// re-armed periodic schedulers fire once per elapsed period, coalescing
/// in their slot if no consumer keeps up.
///
/// # Panics
///
/// Panics in real timing mode.
pub fn advance_by(delta: Duration) {
  driver::advance_by(delta);
}

/// Suspends fire delivery while letting virtual time advance.
///
/// Idempotent. Fires that elapse while paused accrue, one per scheduler at
/// most, and are delivered by [`resume`].
///
/// # Panics
///
/// Panics in real timing mode.
pub fn pause() {
  driver::pause();
}

/// Resumes fire delivery, posting at most one accrued fire per scheduler.
///
/// Idempotent. Periodic schedulers re-arm one full period past the resume
/// instant.
///
/// # Panics
///
/// Panics in real timing mode.
pub fn resume() {
  driver::resume();
}

//! Simulated-mode scenarios driven through the public API.

use core::time::Duration;
use std::sync::{Mutex, MutexGuard, OnceLock};

use metronome_rs::{Scheduler, TickListener, advance_by, enter_test_mode, next_tick, now, pause, resume};

/// Serializes tests in this binary; they all reconfigure the process-wide
/// driver.
fn exclusive() -> MutexGuard<'static, ()> {
  static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
  match LOCK.get_or_init(|| Mutex::new(())).lock() {
    | Ok(guard) => guard,
    | Err(poisoned) => poisoned.into_inner(),
  }
}

fn assert_fired(listener: &TickListener, context: &str) {
  assert!(listener.try_next().is_some(), "expected a fire: {context}");
}

fn assert_idle(listener: &TickListener, context: &str) {
  assert!(listener.try_next().is_none(), "expected no fire: {context}");
}

#[test]
fn earliest_scheduler_fires_first() {
  let _guard = exclusive();
  enter_test_mode();

  let sch1 = Scheduler::new();
  let sch2 = Scheduler::new();
  let sch3 = Scheduler::new();
  let (t1, t2, t3) = (sch1.tick(), sch2.tick(), sch3.tick());

  let start = now();
  assert_eq!(next_tick(), start, "next tick does not move time with nothing scheduled");
  assert_idle(&t1, "not yet scheduled");
  assert_idle(&t2, "not yet scheduled");
  assert_idle(&t3, "not yet scheduled");

  sch1.after(Duration::from_secs(3600));
  sch2.after(Duration::from_secs(1));
  sch3.after(Duration::from_secs(60));

  assert_eq!(next_tick(), start + Duration::from_secs(1), "earliest scheduler wins");
  assert_fired(&t2, "earliest scheduler");
  assert_idle(&t1, "only the earliest fires");
  assert_idle(&t3, "only the earliest fires");

  assert_eq!(next_tick(), start + Duration::from_secs(60), "next earliest scheduler");
  assert_idle(&t2, "already elapsed");
  assert_fired(&t3, "next earliest scheduler");
  assert_idle(&t1, "not yet elapsed");

  advance_by(Duration::from_secs(20 * 60));
  assert_idle(&t1, "did not advance far enough");

  advance_by(Duration::from_secs(2 * 3600));
  assert_fired(&t1, "advancing beyond the trigger duration");
  assert_idle(&t1, "one-shot fires once");
}

#[test]
fn overlapping_periodic_schedulers_share_a_tick() {
  let _guard = exclusive();
  enter_test_mode();

  let sch1 = Scheduler::new();
  let sch2 = Scheduler::new();
  let (t1, t2) = (sch1.tick(), sch2.tick());
  let start = now();

  sch1.every(Duration::from_secs(60));
  sch2.every(Duration::from_secs(600));
  for minute in 1..10 {
    assert_eq!(next_tick(), start + Duration::from_secs(60 * minute), "repeated scheduler");
    assert_fired(&t1, "repeated scheduler");
    assert_idle(&t2, "period not yet elapsed");
  }
  assert_eq!(next_tick(), start + Duration::from_secs(600), "overlap tick");
  assert_fired(&t1, "at overlap");
  assert_fired(&t2, "at overlap");

  let stopped_at = now();
  sch1.stop();
  sch2.stop();
  assert_eq!(next_tick(), stopped_at, "no ticks once stopped");
  assert_idle(&t1, "stopped");
  assert_idle(&t2, "stopped");
}

#[test]
fn all_arming_flavors_fire_together_at_one_instant() {
  let _guard = exclusive();
  enter_test_mode();

  let sch1 = Scheduler::new();
  let sch2 = Scheduler::new();
  let sch3 = Scheduler::new();
  let (t1, t2, t3) = (sch1.tick(), sch2.tick(), sch3.tick());
  let start = now();

  sch1.every(Duration::from_secs(60));
  sch2.after(Duration::from_secs(60));
  sch3.at(now() + Duration::from_secs(60));
  assert_eq!(next_tick(), start + Duration::from_secs(60), "all three trigger");
  assert_fired(&t1, "periodic");
  assert_fired(&t2, "one-shot delay");
  assert_fired(&t3, "absolute instant");

  advance_by(Duration::from_millis(59_999));
  assert_idle(&t1, "just before the next period");

  advance_by(Duration::from_millis(10));
  assert_fired(&t1, "after the period elapses");
}

#[test]
fn missed_periods_coalesce_into_one_fire() {
  let _guard = exclusive();
  enter_test_mode();

  let scheduler = Scheduler::new();
  let listener = scheduler.every(Duration::from_millis(15)).tick();

  advance_by(Duration::from_millis(45));
  assert_fired(&listener, "after multiple elapsed periods");
  assert_idle(&listener, "missed periods coalesce");
}

#[test]
fn paused_time_accrues_at_most_one_fire_per_scheduler() {
  let _guard = exclusive();
  enter_test_mode();

  let start = now();
  pause();
  let sch1 = Scheduler::new();
  sch1.every(Duration::from_secs(60));
  let sch2 = Scheduler::new();
  sch2.every(Duration::from_secs(60));
  let (t1, t2) = (sch1.tick(), sch2.tick());

  let mut expected = start;
  for _ in 0..3 {
    expected = expected + Duration::from_secs(60);
    assert_eq!(next_tick(), expected, "time advances while paused");
    assert_idle(&t1, "no delivery while paused");
    assert_idle(&t2, "no delivery while paused");
  }

  advance_by(Duration::from_secs(30));
  assert_idle(&t1, "still paused");

  resume();
  let resumed_at = now();
  assert_eq!(t1.try_next(), Some(resumed_at), "one accrued fire at resume");
  assert_eq!(t2.try_next(), Some(resumed_at), "one accrued fire at resume");
  assert_idle(&t1, "only once at resume");
  assert_idle(&t2, "only once at resume");

  assert_eq!(next_tick(), resumed_at + Duration::from_secs(60), "cadence restarts one period after resume");
  assert_fired(&t1, "first post-resume period");
  assert_fired(&t2, "first post-resume period");
}

#[test]
fn reentering_test_mode_orphans_old_schedulers() {
  let _guard = exclusive();
  enter_test_mode();

  let old = Scheduler::new();
  let old_listener = old.every(Duration::from_secs(1)).tick();
  let start = now();
  assert_eq!(next_tick(), start + Duration::from_secs(1));
  assert_fired(&old_listener, "fires every second");
  assert_eq!(next_tick(), start + Duration::from_secs(2));
  assert_fired(&old_listener, "fires every second");

  pause();
  assert_eq!(next_tick(), start + Duration::from_secs(3));
  assert_idle(&old_listener, "paused");

  enter_test_mode();
  let fresh = Scheduler::new();
  let fresh_listener = fresh.every(Duration::from_secs(60)).tick();

  let restart = now();
  assert_eq!(next_tick(), restart + Duration::from_secs(60), "pause state was reset too");
  assert_idle(&old_listener, "orphaned scheduler never fires");
  assert_fired(&fresh_listener, "new scheduler fires");

  assert_eq!(next_tick(), restart + Duration::from_secs(120));
  assert_idle(&old_listener, "orphaned scheduler never fires");
  assert_fired(&fresh_listener, "new scheduler keeps firing");
}

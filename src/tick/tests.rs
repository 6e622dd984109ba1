use std::{collections::BTreeSet, sync::Arc, thread, time::Duration};

use super::tick_slot::TickSlot;
use crate::time::TimerInstant;

fn at(millis: u64) -> TimerInstant {
  TimerInstant::from_nanos(millis * 1_000_000)
}

fn spin_until_blocked(slot: &TickSlot, readers: usize) {
  for _ in 0..1_000 {
    if slot.blocked_readers() == readers {
      return;
    }
    thread::sleep(Duration::from_millis(1));
  }
  panic!("readers did not block in time");
}

#[test]
fn empty_slot_has_nothing_to_take() {
  let slot = TickSlot::new();
  assert_eq!(slot.try_take(), None);
}

#[test]
fn posts_without_a_reader_coalesce_to_the_latest_instant() {
  let slot = TickSlot::new();
  slot.post(at(10));
  slot.post(at(20));
  slot.post(at(30));

  assert_eq!(slot.try_take(), Some(at(30)));
  assert_eq!(slot.try_take(), None);
}

#[test]
fn blocked_reader_receives_the_fire_directly() {
  let slot = Arc::new(TickSlot::new());
  let reader = thread::spawn({
    let slot = Arc::clone(&slot);
    move || slot.wait()
  });
  spin_until_blocked(&slot, 1);

  slot.post(at(7));
  assert_eq!(reader.join().ok(), Some(at(7)));
  assert_eq!(slot.try_take(), None, "direct hand-off leaves the slot empty");
}

#[test]
fn one_fire_per_blocked_reader_is_handed_off() {
  let slot = Arc::new(TickSlot::new());
  let readers: Vec<_> = (0..3)
    .map(|_| {
      let slot = Arc::clone(&slot);
      thread::spawn(move || slot.wait())
    })
    .collect();
  spin_until_blocked(&slot, 3);

  for millis in [1, 2, 3] {
    slot.post(at(millis));
  }

  let mut received: Vec<_> = readers.into_iter().map(|reader| reader.join().ok()).collect();
  received.sort();
  assert_eq!(received, vec![Some(at(1)), Some(at(2)), Some(at(3))]);
  assert_eq!(slot.try_take(), None, "every fire found a blocked reader");
}

#[test]
fn burst_beyond_the_blocked_readers_coalesces_the_rest() {
  let posted: BTreeSet<_> = [1, 2, 3, 4, 5].into_iter().map(at).collect();
  let slot = Arc::new(TickSlot::new());
  let readers: Vec<_> = (0..3)
    .map(|_| {
      let slot = Arc::clone(&slot);
      thread::spawn(move || slot.wait())
    })
    .collect();
  spin_until_blocked(&slot, 3);

  for instant in &posted {
    slot.post(*instant);
  }

  let received: BTreeSet<_> = readers.into_iter().map(|reader| reader.join().unwrap()).collect();
  let expected: BTreeSet<_> = [1, 2, 3].into_iter().map(at).collect();
  assert_eq!(received, expected, "one hand-off per blocked reader");

  // The two undelivered fires collapse into one latest-wins slot entry.
  assert_eq!(slot.try_take(), Some(at(5)));
  assert_eq!(slot.try_take(), None);
}

#[test]
fn late_reader_sees_the_coalesced_fire_once() {
  let slot = Arc::new(TickSlot::new());
  slot.post(at(100));
  slot.post(at(200));

  let reader = thread::spawn({
    let slot = Arc::clone(&slot);
    move || slot.wait()
  });
  assert_eq!(reader.join().ok(), Some(at(200)));
  assert_eq!(slot.try_take(), None);
}

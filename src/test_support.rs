//! Helpers shared by unit tests that reconfigure the process-wide driver.

use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serializes tests that touch the global timing driver.
///
/// Recovers from poisoning so a `should_panic` test does not wedge the
/// rest of the suite.
pub(crate) fn exclusive_driver() -> MutexGuard<'static, ()> {
  static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
  match LOCK.get_or_init(|| Mutex::new(())).lock() {
    | Ok(guard) => guard,
    | Err(poisoned) => poisoned.into_inner(),
  }
}

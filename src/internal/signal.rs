//! The select waiter token: a small counting semaphore.

use parking_lot::{Condvar, Mutex};

/// A counting semaphore shared between one parked `select` call and the
/// channels it registered with.
///
/// `notify` never blocks and never loses a count; `wait` parks the calling
/// thread until a count is available, then consumes it. Because wakeups
/// accumulate, a notification posted between two of select's probe rounds
/// is absorbed by the count instead of being lost.
pub(crate) struct Signal {
  pending: Mutex<usize>,
  available: Condvar,
}

impl Signal {
  pub(crate) fn new() -> Self {
    Self {
      pending: Mutex::new(0),
      available: Condvar::new(),
    }
  }

  /// Adds one wakeup and unparks a waiting thread, if any.
  pub(crate) fn notify(&self) {
    let mut pending = self.pending.lock();
    *pending += 1;
    self.available.notify_one();
  }

  /// Blocks until at least one wakeup is pending, then consumes it.
  pub(crate) fn wait(&self) {
    let mut pending = self.pending.lock();
    while *pending == 0 {
      self.available.wait(&mut pending);
    }
    *pending -= 1;
  }
}

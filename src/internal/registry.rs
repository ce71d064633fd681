//! Per-channel registries of select waiter tokens.

use crate::internal::signal::Signal;

use parking_lot::Mutex;
use std::sync::Arc;

/// An unordered set of waiter tokens keyed by `Arc` identity.
///
/// Each channel owns two registries, one per direction, each behind its own
/// lock that is strictly independent of the channel's primary lock. The
/// notify pass holds the registry lock for the whole iteration, so it can
/// never observe a list being mutated by a concurrent register/deregister.
pub(crate) struct WaiterRegistry {
  tokens: Mutex<Vec<Arc<Signal>>>,
}

impl WaiterRegistry {
  pub(crate) fn new() -> Self {
    Self {
      tokens: Mutex::new(Vec::new()),
    }
  }

  /// Registers a token. Inserting a token that is already present is a
  /// no-op, so a channel listed twice in one select registers once.
  pub(crate) fn register(&self, token: &Arc<Signal>) {
    let mut tokens = self.tokens.lock();
    if !tokens.iter().any(|t| Arc::ptr_eq(t, token)) {
      tokens.push(Arc::clone(token));
    }
  }

  /// Removes a token by identity. A no-op if the token is absent.
  pub(crate) fn deregister(&self, token: &Arc<Signal>) {
    let mut tokens = self.tokens.lock();
    if let Some(position) = tokens.iter().position(|t| Arc::ptr_eq(t, token)) {
      tokens.swap_remove(position);
    }
  }

  /// Posts a wakeup to every registered token.
  ///
  /// Select wakeups are a broadcast, not a single wake: any of several
  /// pending selects might now be able to proceed.
  pub(crate) fn notify_all(&self) {
    let tokens = self.tokens.lock();
    for token in tokens.iter() {
      token.notify();
    }
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.tokens.lock().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn register_deduplicates_by_identity() {
    let registry = WaiterRegistry::new();
    let token = Arc::new(Signal::new());
    registry.register(&token);
    registry.register(&token);
    assert_eq!(registry.len(), 1);

    let other = Arc::new(Signal::new());
    registry.register(&other);
    assert_eq!(registry.len(), 2);
  }

  #[test]
  fn deregister_absent_is_noop() {
    let registry = WaiterRegistry::new();
    let token = Arc::new(Signal::new());
    registry.deregister(&token);
    assert_eq!(registry.len(), 0);

    registry.register(&token);
    registry.deregister(&token);
    registry.deregister(&token);
    assert_eq!(registry.len(), 0);
  }

  #[test]
  fn notify_all_posts_to_every_token() {
    let registry = WaiterRegistry::new();
    let first = Arc::new(Signal::new());
    let second = Arc::new(Signal::new());
    registry.register(&first);
    registry.register(&second);

    registry.notify_all();

    // Both tokens must have a pending wakeup; wait() would block otherwise.
    first.wait();
    second.wait();
  }
}

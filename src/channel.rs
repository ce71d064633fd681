//! The channel core: one bounded FIFO behind a primary lock, two condition
//! variables, and two select-waiter registries.
//!
//! Every buffer mutation and the `closed` flag are guarded by the primary
//! `parking_lot::Mutex`. The two `Condvar`s ("space available" and "data
//! available") are tied to that lock and serve the channel's own blocked
//! senders and receivers. Blocked `select` calls are served differently:
//! they park on a private token registered in one of two [`WaiterRegistry`]
//! lists, each behind its own lock. A select waiter must be woken without
//! the primary lock held (it needs to probe other channels too), so the
//! registry notification always happens after the primary lock is released.
//! The three locks of one channel are never nested.
//!
//! Capacity 0 is a rendezvous channel. The literal occupancy check would
//! leave such a channel perpetually full, so the state carries a dedicated
//! hand-off slot instead. A blocking send deposits into the free slot and
//! completes once a receiver takes the value; a non-blocking send deposits
//! only for a receiver that has already committed (is blocked in `recv`);
//! a non-blocking receive takes only a value that is already deposited.
//! Two non-blocking sides can therefore never pair with each other;
//! completing a rendezvous requires at least one blocking party.

use crate::error::{
  CloseError, DestroyError, RecvError, SendError, TryRecvError, TrySendError,
};
use crate::internal::buffer::BoundedBuffer;
use crate::internal::registry::WaiterRegistry;
use crate::telemetry;

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;

// --- Shared state ---

/// State guarded by the channel's primary lock.
pub(crate) struct State<T> {
  buffer: BoundedBuffer<T>,
  closed: bool,
  /// Hand-off slot for capacity-0 channels; holds at most one in-flight
  /// value.
  handoff: Option<T>,
  /// Number of receivers currently committed to a capacity-0 hand-off.
  receivers_ready: usize,
  /// Bumped on every hand-off take; lets a parked sender detect that its
  /// deposit was consumed.
  handoff_taken: u64,
}

impl<T> State<T> {
  fn is_rendezvous(&self) -> bool {
    self.buffer.capacity() == 0
  }

  /// Whether a non-blocking deposit can go through right now.
  fn can_accept(&self) -> bool {
    if self.is_rendezvous() {
      self.handoff.is_none() && self.receivers_ready > 0
    } else {
      !self.buffer.is_full()
    }
  }

  fn deposit(&mut self, value: T) {
    if self.is_rendezvous() {
      debug_assert!(self.handoff.is_none());
      self.handoff = Some(value);
    } else {
      self.buffer.push(value);
    }
  }

  fn take(&mut self) -> Option<T> {
    if self.is_rendezvous() {
      let value = self.handoff.take();
      if value.is_some() {
        self.handoff_taken += 1;
      }
      value
    } else {
      self.buffer.pop()
    }
  }

  fn len(&self) -> usize {
    if self.is_rendezvous() {
      usize::from(self.handoff.is_some())
    } else {
      self.buffer.len()
    }
  }
}

/// The shared core of a channel. Handles are `Arc`s over this.
pub(crate) struct Core<T> {
  pub(crate) state: Mutex<State<T>>,
  /// Signaled when a slot frees up or a hand-off value is taken.
  pub(crate) space_available: Condvar,
  /// Signaled when a value is deposited.
  pub(crate) data_available: Condvar,
  /// Selects waiting to send into this channel.
  pub(crate) send_waiters: WaiterRegistry,
  /// Selects waiting to receive from this channel.
  pub(crate) recv_waiters: WaiterRegistry,
  capacity: usize,
}

// --- Public handle ---

/// A bounded, closable channel transferring values of type `T` between
/// threads in FIFO order.
///
/// Handles are cheap to clone and share one underlying channel. The channel
/// transitions Open -> Closed exactly once via [`close`](Channel::close);
/// after that every send, receive, and select on it reports closed
/// immediately, and buffered values are dropped with the channel rather
/// than drained.
pub struct Channel<T: Send> {
  pub(crate) core: Arc<Core<T>>,
}

impl<T: Send> Clone for Channel<T> {
  fn clone(&self) -> Self {
    Self {
      core: Arc::clone(&self.core),
    }
  }
}

impl<T: Send> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.core.state.lock();
    f.debug_struct("Channel")
      .field("capacity", &self.core.capacity)
      .field("len", &state.len())
      .field("closed", &state.closed)
      .finish()
  }
}

impl<T: Send> Channel<T> {
  /// Creates a new open channel.
  ///
  /// A capacity of `0` creates a rendezvous channel, where a send completes
  /// only once a receiver takes the value.
  pub fn new(capacity: usize) -> Self {
    Self {
      core: Arc::new(Core {
        state: Mutex::new(State {
          buffer: BoundedBuffer::new(capacity),
          closed: false,
          handoff: None,
          receivers_ready: 0,
          handoff_taken: 0,
        }),
        space_available: Condvar::new(),
        data_available: Condvar::new(),
        send_waiters: WaiterRegistry::new(),
        recv_waiters: WaiterRegistry::new(),
        capacity,
      }),
    }
  }

  // --- Send ---

  /// Sends a value, blocking the current thread while the channel is full
  /// (or, for a rendezvous channel, until a receiver takes the value).
  ///
  /// Returns [`SendError::Closed`] if the channel is closed, including when
  /// it is closed while this call is waiting.
  pub fn send(&self, value: T) -> Result<(), SendError> {
    if self.core.capacity == 0 {
      return self.send_rendezvous(value);
    }
    let mut state = self.core.state.lock();
    loop {
      if state.closed {
        return Err(SendError::Closed);
      }
      if !state.buffer.is_full() {
        state.buffer.push(value);
        // Wake at most one blocked receiver; selects are notified below,
        // outside the primary lock.
        self.core.data_available.notify_one();
        drop(state);
        self.core.recv_waiters.notify_all();
        return Ok(());
      }
      self.core.space_available.wait(&mut state);
    }
  }

  /// A rendezvous send deposits into the hand-off slot as soon as it is
  /// free, then waits for a receiver to take the value.
  fn send_rendezvous(&self, value: T) -> Result<(), SendError> {
    let mut state = self.core.state.lock();
    loop {
      if state.closed {
        return Err(SendError::Closed);
      }
      if state.handoff.is_none() {
        break;
      }
      self.core.space_available.wait(&mut state);
    }
    state.handoff = Some(value);
    let deposit_generation = state.handoff_taken;
    self.core.data_available.notify_one();
    drop(state);
    self.core.recv_waiters.notify_all();

    let mut state = self.core.state.lock();
    while state.handoff_taken == deposit_generation {
      if state.closed {
        // Close raced the hand-off; the untaken value is dropped.
        state.handoff = None;
        return Err(SendError::Closed);
      }
      self.core.space_available.wait(&mut state);
    }
    Ok(())
  }

  /// Attempts to send a value without blocking.
  ///
  /// Contention on the channel's primary lock counts as "not ready" and
  /// reports [`TrySendError::Full`]; this call never waits, not even on the
  /// lock itself. On a rendezvous channel this succeeds only when a
  /// receiver is already blocked in [`recv`](Channel::recv).
  pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
    let mut state = match self.core.state.try_lock() {
      Some(guard) => guard,
      None => return Err(TrySendError::Full(value)),
    };
    if state.closed {
      return Err(TrySendError::Closed(value));
    }
    if !state.can_accept() {
      return Err(TrySendError::Full(value));
    }
    state.deposit(value);
    self.core.data_available.notify_one();
    drop(state);
    self.core.recv_waiters.notify_all();
    Ok(())
  }

  // --- Receive ---

  /// Receives a value, blocking the current thread while the channel is
  /// empty.
  ///
  /// Returns [`RecvError::Closed`] if the channel is closed, including when
  /// it is closed while this call is waiting for data. Close wins over
  /// buffered data: a receiver that wakes to a closed channel does not
  /// drain remaining items.
  pub fn recv(&self) -> Result<T, RecvError> {
    if self.core.capacity == 0 {
      return self.recv_rendezvous();
    }
    let mut state = self.core.state.lock();
    loop {
      if state.closed {
        return Err(RecvError::Closed);
      }
      if let Some(value) = state.buffer.pop() {
        self.core.space_available.notify_one();
        drop(state);
        self.core.send_waiters.notify_all();
        return Ok(value);
      }
      self.core.data_available.wait(&mut state);
    }
  }

  fn recv_rendezvous(&self) -> Result<T, RecvError> {
    let mut state = self.core.state.lock();
    if state.closed {
      return Err(RecvError::Closed);
    }

    // Commit to the hand-off before waiting; non-blocking sends only
    // deposit for a committed receiver. Select senders learn about the
    // commitment outside the primary lock; the loop below re-checks state,
    // so nothing is lost in between.
    state.receivers_ready += 1;
    drop(state);
    self.core.send_waiters.notify_all();

    let mut state = self.core.state.lock();
    loop {
      if state.closed {
        state.receivers_ready -= 1;
        return Err(RecvError::Closed);
      }
      if let Some(value) = state.take() {
        state.receivers_ready -= 1;
        // Both slot-waiters and take-ack waiters park on space_available;
        // wake them all.
        self.core.space_available.notify_all();
        drop(state);
        self.core.send_waiters.notify_all();
        return Ok(value);
      }
      self.core.data_available.wait(&mut state);
    }
  }

  /// Attempts to receive a value without blocking.
  ///
  /// Contention on the channel's primary lock counts as "not ready" and
  /// reports [`TryRecvError::Empty`]. On a rendezvous channel this succeeds
  /// only when a hand-off value has already been deposited by a blocked
  /// sender.
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    let mut state = match self.core.state.try_lock() {
      Some(guard) => guard,
      None => return Err(TryRecvError::Empty),
    };
    if state.closed {
      return Err(TryRecvError::Closed);
    }
    match state.take() {
      Some(value) => {
        if state.is_rendezvous() {
          self.core.space_available.notify_all();
        } else {
          self.core.space_available.notify_one();
        }
        drop(state);
        self.core.send_waiters.notify_all();
        Ok(value)
      }
      None => Err(TryRecvError::Empty),
    }
  }

  // --- Lifecycle ---

  /// Closes the channel.
  ///
  /// Every blocked sender and receiver wakes and observes the close, and
  /// every pending select is notified. Close is a hard stop: buffered
  /// values are not drained and are dropped with the channel.
  ///
  /// Returns [`CloseError`] if the channel was already closed.
  pub fn close(&self) -> Result<(), CloseError> {
    let mut state = self.core.state.lock();
    if state.closed {
      return Err(CloseError);
    }
    state.closed = true;
    // Every blocked sender and receiver must wake and observe the flag.
    self.core.space_available.notify_all();
    self.core.data_available.notify_all();
    drop(state);
    self.core.send_waiters.notify_all();
    self.core.recv_waiters.notify_all();
    telemetry::log_event(None, "channel::close", "ChannelClosed", None);
    Ok(())
  }

  /// Consumes this handle, tearing the channel down.
  ///
  /// The channel must be closed first; destroying an open channel returns
  /// [`DestroyError::Open`] with the handle and tears nothing down. The
  /// backing allocation is released once the last clone of the handle is
  /// gone.
  pub fn destroy(self) -> Result<(), DestroyError<T>> {
    if !self.is_closed() {
      return Err(DestroyError::Open(self));
    }
    Ok(())
  }

  // --- Introspection ---

  /// Returns `true` if the channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.core.state.lock().closed
  }

  /// Returns the number of values currently held by the channel.
  pub fn len(&self) -> usize {
    self.core.state.lock().len()
  }

  /// Returns `true` if the channel holds no values.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns `true` if the channel cannot accept a non-blocking send right
  /// now.
  ///
  /// A rendezvous channel is full whenever no receiver has committed.
  pub fn is_full(&self) -> bool {
    !self.core.state.lock().can_accept()
  }

  /// Returns the capacity fixed at construction.
  pub fn capacity(&self) -> usize {
    self.core.capacity
  }
}

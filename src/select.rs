//! Waiting on the first ready operation among a set of channels.
//!
//! `select` composes the channels' non-blocking calls in a poll loop gated
//! by a private counting semaphore. The token is registered into every
//! involved channel's waiter registry *before* the first probe round;
//! otherwise a notification could fire between a failed probe and the
//! registration, stranding the waiter. Between rounds the calling thread
//! parks on the token, which any send, receive, or close on a registered
//! channel releases.

use crate::channel::Channel;
use crate::error::{SelectError, TryRecvError, TrySendError};
use crate::internal::registry::WaiterRegistry;
use crate::internal::signal::Signal;
use crate::telemetry;

use std::fmt;
use std::sync::Arc;

// --- Request set ---

/// One candidate operation in a [`select`] call.
pub struct SelectOp<'a, T: Send> {
  channel: &'a Channel<T>,
  kind: OpKind<T>,
}

enum OpKind<T> {
  Send(Option<T>),
  Recv,
}

impl<'a, T: Send> SelectOp<'a, T> {
  /// A candidate send of `value` into `channel`.
  pub fn send(channel: &'a Channel<T>, value: T) -> Self {
    Self {
      channel,
      kind: OpKind::Send(Some(value)),
    }
  }

  /// A candidate receive from `channel`.
  pub fn recv(channel: &'a Channel<T>) -> Self {
    Self {
      channel,
      kind: OpKind::Recv,
    }
  }

  /// Consumes the operation, returning a payload that was not sent.
  ///
  /// After a select completes, every send operation other than the winner
  /// still holds its value; this reclaims it.
  pub fn into_value(self) -> Option<T> {
    match self.kind {
      OpKind::Send(value) => value,
      OpKind::Recv => None,
    }
  }

  fn registry(&self) -> &WaiterRegistry {
    match self.kind {
      OpKind::Send(_) => &self.channel.core.send_waiters,
      OpKind::Recv => &self.channel.core.recv_waiters,
    }
  }
}

impl<T: Send> fmt::Debug for SelectOp<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      OpKind::Send(_) => write!(f, "SelectOp::Send(..)"),
      OpKind::Recv => write!(f, "SelectOp::Recv"),
    }
  }
}

/// The operation that completed a successful [`select`].
#[derive(PartialEq, Eq, Clone)]
pub enum Selected<T: Send> {
  /// The send at this index went through.
  Sent(usize),
  /// The receive at this index produced this value.
  Received(usize, T),
}

impl<T: Send> Selected<T> {
  /// The index of the winning operation in the request set.
  pub fn index(&self) -> usize {
    match self {
      Selected::Sent(index) => *index,
      Selected::Received(index, _) => *index,
    }
  }
}

impl<T: Send> fmt::Debug for Selected<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Selected::Sent(index) => write!(f, "Selected::Sent({})", index),
      Selected::Received(index, _) => write!(f, "Selected::Received({}, ..)", index),
    }
  }
}

// --- The select algorithm ---

/// Blocks until the first ready operation in `ops` completes, scanning in
/// request order.
///
/// Ties go to the earliest index; no fairness across repeated calls is
/// guaranteed; a caller wanting round-robin behavior rotates the request
/// set itself. A channel close terminates the call with
/// [`SelectError::Closed`] carrying the offending index, exactly as a
/// direct call would report it; the unsent payload stays in its
/// [`SelectOp`] and can be reclaimed with
/// [`into_value`](SelectOp::into_value).
///
/// There is no timeout parameter. A deadline is built by racing the target
/// operations against a receive on a dedicated timeout channel that some
/// other thread closes or sends to when the deadline passes.
pub fn select<T: Send>(ops: &mut [SelectOp<'_, T>]) -> Result<Selected<T>, SelectError> {
  if ops.is_empty() {
    return Err(SelectError::EmptySet);
  }
  telemetry::increment_counter("select", "calls");

  // The private waiter token for this call. Registration precedes the
  // first probe round; see the module docs for why the order is load
  // bearing.
  let token = Arc::new(Signal::new());
  for op in ops.iter() {
    op.registry().register(&token);
  }

  let result = loop {
    match poll_ops(ops) {
      Some(outcome) => break outcome,
      None => {
        telemetry::increment_counter("select", "parks");
        token.wait();
      }
    }
  };

  // Deregister everywhere before the token is dropped, so a concurrent
  // notify never operates on a token that is going away.
  for op in ops.iter() {
    op.registry().deregister(&token);
  }

  result
}

/// One probe round over the request set, in order. `None` means every
/// operation would block.
fn poll_ops<T: Send>(ops: &mut [SelectOp<'_, T>]) -> Option<Result<Selected<T>, SelectError>> {
  for (index, op) in ops.iter_mut().enumerate() {
    let channel = op.channel;
    match &mut op.kind {
      OpKind::Send(slot) => {
        let value = match slot.take() {
          Some(value) => value,
          None => continue,
        };
        match channel.try_send(value) {
          Ok(()) => return Some(Ok(Selected::Sent(index))),
          Err(TrySendError::Full(value)) => {
            *slot = Some(value);
          }
          Err(TrySendError::Closed(value)) => {
            *slot = Some(value);
            return Some(Err(SelectError::Closed(index)));
          }
        }
      }
      OpKind::Recv => match channel.try_recv() {
        Ok(value) => return Some(Ok(Selected::Received(index, value))),
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Closed) => return Some(Err(SelectError::Closed(index))),
      },
    }
  }
  None
}

// src/error.rs

//! Status types returned by channel and select operations.
//!
//! Every expected condition (full buffer, empty buffer, closed channel,
//! destroy of an open channel) is an ordinary return value, never a panic.
//! Non-blocking lock contention is deliberately folded into the would-block
//! variants so the `try_` calls keep their promise of never waiting.

use crate::channel::Channel;

use core::fmt;

/// Error returned by `try_send` when the operation could not be completed
/// immediately. The item being sent is returned.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The channel cannot accept the item at this time. This also covers
  /// contention on the channel's primary lock.
  /// The item being sent is returned.
  Full(T),
  /// The channel has been closed.
  /// The item being sent is returned.
  Closed(T),
}

impl<T> TrySendError<T> {
  /// Consumes the error, returning the inner value.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      TrySendError::Full(v) => v,
      TrySendError::Closed(v) => v,
    }
  }
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl<T> fmt::Display for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => f.write_str("channel full"),
      TrySendError::Closed(_) => f.write_str("channel closed"),
    }
  }
}

impl<T: fmt::Debug> std::error::Error for TrySendError<T> {}

/// Error returned by the blocking `send`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendError {
  /// The channel has been closed.
  Closed,
}

impl std::error::Error for SendError {}
impl fmt::Display for SendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed => write!(f, "channel closed"),
    }
  }
}

/// Error returned by `try_recv` when an item could not be received
/// immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// No item is available at this time. This also covers contention on the
  /// channel's primary lock.
  Empty,
  /// The channel has been closed.
  Closed,
}

impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "channel empty"),
      TryRecvError::Closed => write!(f, "channel closed"),
    }
  }
}

/// Error returned by the blocking `recv`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  /// The channel has been closed.
  Closed,
}

impl std::error::Error for RecvError {}
impl fmt::Display for RecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvError::Closed => write!(f, "channel closed"),
    }
  }
}

/// Error returned when attempting to close an already closed channel.
///
/// Double close is a reportable condition, not a silent no-op.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}

/// Error returned by [`Channel::destroy`] when the channel is still open.
///
/// The handle is returned so the caller can close the channel and retry.
pub enum DestroyError<T: Send> {
  /// The channel has not been closed yet. Nothing was torn down.
  Open(Channel<T>),
}

impl<T: Send> DestroyError<T> {
  /// Consumes the error, returning the channel handle.
  #[inline]
  pub fn into_inner(self) -> Channel<T> {
    match self {
      DestroyError::Open(channel) => channel,
    }
  }
}

impl<T: Send> fmt::Debug for DestroyError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DestroyError::Open(_) => write!(f, "DestroyError::Open(..)"),
    }
  }
}

impl<T: Send> fmt::Display for DestroyError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DestroyError::Open(_) => f.write_str("channel still open"),
    }
  }
}

impl<T: Send> std::error::Error for DestroyError<T> {}

/// Error returned by [`select`](crate::select).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SelectError {
  /// `select` was called with an empty operation set.
  EmptySet,
  /// The channel behind the operation at this index has been closed.
  Closed(usize),
}

impl std::error::Error for SelectError {}
impl fmt::Display for SelectError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SelectError::EmptySet => f.write_str("select on an empty operation set"),
      SelectError::Closed(index) => write!(f, "channel at index {} closed", index),
    }
  }
}

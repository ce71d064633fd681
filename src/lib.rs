#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! Bounded, closable synchronous channels with a multi-channel `select`.
//!
//! Weft provides a single channel flavor tuned for threaded code: a
//! fixed-capacity FIFO channel with blocking and non-blocking send/receive,
//! explicit close semantics, and a [`select`] operation that completes the
//! first ready send or receive among an ordered set of candidates without
//! busy-polling.
//!
//! A capacity of `0` creates a rendezvous channel: a blocking send
//! completes only once a receiver takes the value.

pub mod error;
pub mod telemetry;

mod channel;
mod select;

// Internal utilities - not part of public API but exposed for crate use
mod internal;

pub use channel::Channel;
pub use error::{
  CloseError, DestroyError, RecvError, SelectError, SendError, TryRecvError, TrySendError,
};
pub use select::{select, SelectOp, Selected};

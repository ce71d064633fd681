mod common;
use common::*;

use weft::error::SelectError;
use weft::{select, Channel, SelectOp, Selected};

use std::thread;

#[test]
fn empty_set_is_an_error() {
  let mut ops: Vec<SelectOp<'_, i32>> = Vec::new();
  assert_eq!(select(&mut ops), Err(SelectError::EmptySet));
}

#[test]
fn recv_ready_channel_wins_without_blocking() {
  let channels: Vec<Channel<i32>> = (0..3).map(|_| Channel::new(1)).collect();
  channels[1].send(77).unwrap();

  let mut ops: Vec<SelectOp<'_, i32>> = channels.iter().map(SelectOp::recv).collect();
  match select(&mut ops).unwrap() {
    Selected::Received(index, value) => {
      assert_eq!(index, 1);
      assert_eq!(value, 77);
    }
    Selected::Sent(_) => panic!("Expected a receive to win"),
  }
}

#[test]
fn send_ready_channel_wins_without_blocking() {
  let full = Channel::new(1);
  full.send(0).unwrap();
  let open = Channel::new(1);

  let mut ops = vec![SelectOp::send(&full, 1), SelectOp::send(&open, 2)];
  match select(&mut ops).unwrap() {
    Selected::Sent(index) => assert_eq!(index, 1),
    Selected::Received(..) => panic!("Expected a send to win"),
  }
  assert_eq!(open.recv().unwrap(), 2);

  // The losing send still holds its payload.
  let loser = ops.remove(0);
  assert_eq!(loser.into_value(), Some(1));
}

#[test]
fn first_ready_in_request_order_wins() {
  let first = Channel::new(1);
  let second = Channel::new(1);
  first.send(1).unwrap();
  second.send(2).unwrap();

  let mut ops = vec![SelectOp::recv(&first), SelectOp::recv(&second)];
  match select(&mut ops).unwrap() {
    Selected::Received(index, value) => {
      assert_eq!(index, 0);
      assert_eq!(value, 1);
    }
    Selected::Sent(_) => panic!("Expected a receive to win"),
  }
}

#[test]
fn parked_select_wakes_on_send() {
  let first = Channel::<i32>::new(1);
  let second = Channel::<i32>::new(1);

  let producer = second.clone();
  let handle = thread::spawn(move || {
    thread::sleep(SHORT_TIMEOUT);
    producer.send(7).unwrap();
  });

  let mut ops = vec![SelectOp::recv(&first), SelectOp::recv(&second)];
  match select(&mut ops).unwrap() {
    Selected::Received(index, value) => {
      assert_eq!(index, 1);
      assert_eq!(value, 7);
    }
    Selected::Sent(_) => panic!("Expected a receive to win"),
  }
  handle.join().unwrap();
}

#[test]
fn parked_select_wakes_on_recv() {
  let channel = Channel::new(1);
  channel.send(0).unwrap();

  let consumer = channel.clone();
  let handle = thread::spawn(move || {
    thread::sleep(SHORT_TIMEOUT);
    consumer.recv().unwrap()
  });

  let mut ops = vec![SelectOp::send(&channel, 1)];
  match select(&mut ops).unwrap() {
    Selected::Sent(index) => assert_eq!(index, 0),
    Selected::Received(..) => panic!("Expected the send to win"),
  }
  assert_eq!(handle.join().unwrap(), 0);
  assert_eq!(channel.recv().unwrap(), 1);
}

#[test]
fn closed_channel_propagates_with_its_index() {
  let open = Channel::<i32>::new(1);
  let closed = Channel::<i32>::new(1);
  closed.close().unwrap();

  let mut ops = vec![SelectOp::recv(&open), SelectOp::recv(&closed)];
  assert_eq!(select(&mut ops), Err(SelectError::Closed(1)));
}

#[test]
fn close_wakes_parked_select() {
  let channel = Channel::<i32>::new(1);

  let closer = channel.clone();
  let handle = thread::spawn(move || {
    thread::sleep(SHORT_TIMEOUT);
    closer.close().unwrap();
  });

  let mut ops = vec![SelectOp::recv(&channel)];
  assert_eq!(select(&mut ops), Err(SelectError::Closed(0)));
  handle.join().unwrap();
}

#[test]
fn send_to_closed_channel_returns_payload() {
  let channel = Channel::new(1);
  channel.close().unwrap();

  let mut ops = vec![SelectOp::send(&channel, 9)];
  assert_eq!(select(&mut ops), Err(SelectError::Closed(0)));

  let op = ops.pop().unwrap();
  assert_eq!(op.into_value(), Some(9));
}

#[test]
fn duplicate_channel_registers_once_and_still_completes() {
  let channel = Channel::new(1);
  channel.send(3).unwrap();

  // The same channel twice in one request set registers a single token
  // per list; the first occurrence wins.
  let mut ops = vec![SelectOp::recv(&channel), SelectOp::recv(&channel)];
  match select(&mut ops).unwrap() {
    Selected::Received(index, value) => {
      assert_eq!(index, 0);
      assert_eq!(value, 3);
    }
    Selected::Sent(_) => panic!("Expected a receive to win"),
  }
}

#[test]
fn rendezvous_send_through_select() {
  let channel = Channel::new(0);

  let receiver = channel.clone();
  let handle = thread::spawn(move || receiver.recv().unwrap());

  let mut ops = vec![SelectOp::send(&channel, 11)];
  match select(&mut ops).unwrap() {
    Selected::Sent(index) => assert_eq!(index, 0),
    Selected::Received(..) => panic!("Expected the send to win"),
  }
  assert_eq!(handle.join().unwrap(), 11);
}

#[test]
fn rendezvous_recv_through_select() {
  let channel = Channel::new(0);

  let sender = channel.clone();
  let handle = thread::spawn(move || {
    thread::sleep(SHORT_TIMEOUT);
    sender.send(13)
  });

  let mut ops = vec![SelectOp::recv(&channel)];
  match select(&mut ops).unwrap() {
    Selected::Received(index, value) => {
      assert_eq!(index, 0);
      assert_eq!(value, 13);
    }
    Selected::Sent(_) => panic!("Expected the receive to win"),
  }
  assert_eq!(handle.join().unwrap(), Ok(()));
}

#[test]
fn timeout_channel_pattern() {
  // No timeout parameter exists; a deadline is a channel someone closes.
  let data = Channel::<i32>::new(1);
  let deadline = Channel::<i32>::new(1);

  let timer = deadline.clone();
  let handle = thread::spawn(move || {
    thread::sleep(SHORT_TIMEOUT);
    timer.close().unwrap();
  });

  let mut ops = vec![SelectOp::recv(&data), SelectOp::recv(&deadline)];
  assert_eq!(select(&mut ops), Err(SelectError::Closed(1)));
  handle.join().unwrap();
}

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use arsdk_support::logging::discard;
use arsdk_support::Result;
use arsdk_transport::{
    decode_any, encode_v23, DataType, DecodedFrame, Frame, FrameTransport, ProtoVersion, Transport,
    TransportEvent, ID_C2D_NOACK, ID_PING, ID_PONG,
};

/// An in-memory backend over shared queues, standing in for a real socket.
/// The `Rc<RefCell<..>>` handles are kept by the test alongside the
/// `Transport` that owns a clone, so the test can push to `inbox` and
/// inspect `outbox` without reaching into `Transport`'s private fields.
#[derive(Clone)]
struct LoopbackTransport {
    outbox: Rc<RefCell<VecDeque<Vec<u8>>>>,
    inbox: Rc<RefCell<VecDeque<Vec<u8>>>>,
}

impl LoopbackTransport {
    fn new() -> LoopbackTransport {
        LoopbackTransport {
            outbox: Rc::new(RefCell::new(VecDeque::new())),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    fn push_inbound(&self, bytes: Vec<u8>) {
        self.inbox.borrow_mut().push_back(bytes);
    }

    fn drain_outbound(&self) -> Vec<Vec<u8>> {
        self.outbox.borrow_mut().drain(..).collect()
    }
}

impl FrameTransport for LoopbackTransport {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()> {
        self.outbox.borrow_mut().push_back(bytes.to_vec());
        Ok(())
    }

    fn poll_recv_frame(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.inbox.borrow_mut().pop_front())
    }
}

fn decode_one(bytes: &[u8]) -> Frame {
    match decode_any(bytes).unwrap().0 {
        DecodedFrame::V23(f, _) => f,
        DecodedFrame::V1(f) => f,
    }
}

#[test]
fn periodic_ping_is_sent_on_first_poll() {
    let backend = LoopbackTransport::new();
    let handle = backend.clone();
    let mut t = Transport::new(backend, ProtoVersion::V3, 1000, discard());

    let events = t.poll(0);
    assert!(events.is_empty());

    let sent = handle.drain_outbound();
    assert_eq!(sent.len(), 1);
    assert_eq!(decode_one(&sent[0]).id, ID_PING);
}

#[test]
fn data_frame_surfaces_as_event() {
    let data = Frame::new(DataType::NoAck, ID_C2D_NOACK, 3, vec![1, 2, 3]);
    let encoded = encode_v23(&data, ProtoVersion::V2);

    let backend = LoopbackTransport::new();
    backend.push_inbound(encoded);
    let mut t = Transport::new(backend, ProtoVersion::V2, 0, discard());

    let events = t.poll(0);
    assert_eq!(events.len(), 1);
    match &events[0] {
        TransportEvent::Frame(f) => assert_eq!(f, &data),
        other => panic!("expected a data frame event, got {:?}", other),
    }
}

#[test]
fn inbound_ping_is_answered_without_surfacing_an_event() {
    let ping = Frame::new(DataType::NoAck, ID_PING, 5, 123u64.to_le_bytes().to_vec());
    let encoded = encode_v23(&ping, ProtoVersion::V3);

    let backend = LoopbackTransport::new();
    let handle = backend.clone();
    backend.push_inbound(encoded);
    let mut t = Transport::new(backend, ProtoVersion::V3, 0, discard());

    let events = t.poll(10);
    assert!(events.is_empty());

    let sent = handle.drain_outbound();
    assert_eq!(sent.len(), 1);
    let pong = decode_one(&sent[0]);
    assert_eq!(pong.id, ID_PONG);
    assert_eq!(pong.payload, 123u64.to_le_bytes().to_vec());
}

#[test]
fn ping_then_pong_round_trip_sets_link_ok() {
    let a_backend = LoopbackTransport::new();
    let a_handle = a_backend.clone();
    let mut a = Transport::new(a_backend, ProtoVersion::V3, 1000, discard());

    assert!(a.poll(0).is_empty());
    let sent = a_handle.drain_outbound();
    assert_eq!(sent.len(), 1);
    let ping_frame = decode_one(&sent[0]);

    let b_backend = LoopbackTransport::new();
    let b_handle = b_backend.clone();
    b_backend.push_inbound(sent.into_iter().next().unwrap());
    let mut b = Transport::new(b_backend, ProtoVersion::V3, 0, discard());
    assert!(b.poll(5).is_empty());

    let pong_bytes = b_handle.drain_outbound();
    assert_eq!(pong_bytes.len(), 1);
    assert_eq!(decode_one(&pong_bytes[0]).payload, ping_frame.payload);

    a_handle.push_inbound(pong_bytes.into_iter().next().unwrap());
    let events = a.poll(10_000);

    assert_eq!(events.len(), 1);
    match &events[0] {
        TransportEvent::LinkStatus(status) => {
            assert_eq!(*status, arsdk_transport::LinkStatus::Ok)
        }
        other => panic!("expected a link status event, got {:?}", other),
    }
    assert_eq!(a.link_status(), Some(arsdk_transport::LinkStatus::Ok));
}

#[test]
fn stop_is_idempotent_and_blocks_further_io() {
    use arsdk_support::Error;

    let backend = LoopbackTransport::new();
    let handle = backend.clone();
    let mut t = Transport::new(backend, ProtoVersion::V3, 1000, discard());

    t.stop();
    t.stop(); // second call must be a harmless no-op

    let frame = Frame::new(DataType::NoAck, ID_C2D_NOACK, 0, vec![1]);
    assert_eq!(t.send(&frame), Err(Error::NotConnected));

    handle.push_inbound(encode_v23(&frame, ProtoVersion::V3));
    assert!(t.poll(0).is_empty());
    assert!(handle.drain_outbound().is_empty());
}

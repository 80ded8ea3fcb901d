//! Ties framing, the ping/pong keepalive and link status tracking to a
//! concrete [`FrameTransport`] backend. This is the piece both the datagram
//! and multiplexed transports wrap: they only need to implement
//! `FrameTransport`, everything above that (ping scheduling, pong handling,
//! link status bookkeeping, frame encode/decode dispatch) is shared.

use crate::frame::{decode_any, encode_v1, encode_v23, DecodedFrame, Frame, ProtoVersion};
use crate::ids::{ID_PING, ID_PONG};
use crate::link::{LinkStatus, LinkTracker};
use crate::ops::FrameTransport;
use crate::ping::{LogHint, PingState};
use arsdk_support::logging::{debug, info, Logger};
use arsdk_support::{Error, Result};

/// One meaningful event surfaced to the owning command interface from a
/// `poll()` call.
#[derive(Debug)]
pub enum TransportEvent {
    /// A non-keepalive frame arrived; ping/pong traffic is handled
    /// internally and never surfaces here.
    Frame(Frame),
    /// The link status changed (delivered once per transition, idle-style).
    LinkStatus(LinkStatus),
}

pub struct Transport<T: FrameTransport> {
    backend: T,
    version: ProtoVersion,
    ping: PingState,
    link: LinkTracker,
    last_ping_us: Option<u64>,
    stopped: bool,
    log: Logger,
}

impl<T: FrameTransport> Transport<T> {
    pub fn new(backend: T, version: ProtoVersion, ping_period_ms: u64, log: Logger) -> Transport<T> {
        Transport {
            backend,
            version,
            ping: PingState::new(ping_period_ms),
            link: LinkTracker::new(),
            last_ping_us: None,
            stopped: false,
            log,
        }
    }

    pub fn link_status(&self) -> Option<LinkStatus> {
        self.link.current()
    }

    /// Encodes and sends one application frame (i.e. not a ping/pong
    /// frame, which `poll` manages on its own). Fails with
    /// `Error::NotConnected` once the transport has been `stop()`ped.
    pub fn send(&mut self, frame: &Frame) -> Result<()> {
        if self.stopped {
            return Err(Error::NotConnected);
        }
        let bytes = self.encode(frame);
        self.backend.send_frame(&bytes)
    }

    fn encode(&self, frame: &Frame) -> Vec<u8> {
        match self.version {
            ProtoVersion::V1 => encode_v1(frame),
            ProtoVersion::V2 => encode_v23(frame, ProtoVersion::V2),
            ProtoVersion::V3 => encode_v23(frame, ProtoVersion::V3),
        }
    }

    /// Drives the periodic ping tick (if due) and drains all currently
    /// available inbound messages, handling ping/pong traffic internally.
    /// Returns the events the owning interface needs to react to, in
    /// arrival order, with link status transitions queued idle-callback
    /// style rather than interleaved inline.
    pub fn poll(&mut self, now_us: u64) -> Vec<TransportEvent> {
        let mut events = Vec::new();

        if self.stopped {
            return events;
        }

        let due = match self.last_ping_us {
            None => true,
            Some(last) => now_us.saturating_sub(last) >= self.ping.period_ms.saturating_mul(1000),
        };

        if due && self.ping.period_ms > 0 {
            self.last_ping_us = Some(now_us);
            let link_was_ok = self.link.current() == Some(LinkStatus::Ok) || self.link.current().is_none();
            let outcome = self.ping.tick(now_us, link_was_ok);

            if let Some(transition) = outcome.link_transition {
                self.link.set(transition);
            }

            let bytes = self.encode(&outcome.frame);
            if let Err(e) = self.backend.send_frame(&bytes) {
                debug!(self.log, "ping send failed"; "error" => ?e);
            }
        }

        loop {
            match self.backend.poll_recv_frame() {
                Ok(Some(bytes)) => {
                    if let Some(event) = self.handle_inbound(&bytes, now_us) {
                        events.push(event);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(self.log, "receive failed"; "error" => ?e);
                    break;
                }
            }
        }

        if self.backend.take_reset() {
            self.link.set(LinkStatus::Ko);
        }

        for transition in self.link.drain() {
            events.push(TransportEvent::LinkStatus(transition));
        }

        events
    }

    fn handle_inbound(&mut self, bytes: &[u8], now_us: u64) -> Option<TransportEvent> {
        let (decoded, _consumed) = match decode_any(bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(self.log, "malformed frame dropped"; "error" => ?e);
                return None;
            }
        };

        let frame = match decoded {
            DecodedFrame::V1(f) => f,
            DecodedFrame::V23(f, _) => f,
        };

        match frame.id {
            ID_PING => {
                let pong = PingState::build_pong(&frame);
                let bytes = self.encode(&pong);
                if let Err(e) = self.backend.send_frame(&bytes) {
                    debug!(self.log, "pong send failed"; "error" => ?e);
                }
                None
            }
            ID_PONG => {
                if let Some(result) = self.ping.handle_pong(&frame, now_us) {
                    self.link.set(LinkStatus::Ok);
                    match result.log_hint {
                        LogHint::Info => info!(self.log, "ping rtt"; "rtt_us" => result.rtt_us),
                        LogHint::Debug => debug!(self.log, "ping rtt"; "rtt_us" => result.rtt_us),
                    }
                }
                None
            }
            _ => Some(TransportEvent::Frame(frame)),
        }
    }

    /// Tears down the transport: further `send`/`poll` calls become no-ops
    /// (`send` fails with `Error::NotConnected`, `poll` returns no events).
    /// Idempotent and synchronous, per protocol §9 design notes -- the
    /// owning interface must call this before dropping itself so the
    /// transport never outlives its back-pointer into the interface.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

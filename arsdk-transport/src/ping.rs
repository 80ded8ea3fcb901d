//! Keepalive ping/pong state machine (protocol §4.2). Runs on transport id
//! 0 (ping) / 1 (pong); payload is an opaque 8-byte timestamp the peer
//! echoes back verbatim.

use crate::frame::{DataType, Frame};
use crate::ids::{ID_PING, ID_PONG};
use crate::link::LinkStatus;

/// Threshold above which a round trip is logged at `info` instead of
/// `debug` (mirrors `ARSDK_PING_DELAY_LOG_THRESHOLD`, 100ms in microseconds).
pub const RTT_LOG_THRESHOLD_US: u64 = 100_000;

const FAILURE_LIMIT: u32 = 3;

#[derive(Debug)]
pub struct PingState {
    pub period_ms: u64,
    next_seq: u16,
    running: bool,
    start_us: u64,
    failures: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogHint {
    Info,
    Debug,
}

/// Outcome of a periodic ping tick: the frame to send, and whether this
/// tick should also drive link status to KO (previous ping still in
/// flight, failures now at the limit, and link was previously OK).
pub struct TickOutcome {
    pub frame: Frame,
    pub link_transition: Option<LinkStatus>,
}

/// Outcome of processing an inbound PONG: the measured round trip and the
/// log level it warrants, or `None` if the pong didn't match an in-flight
/// ping (stale, or payload mismatch).
pub struct PongOutcome {
    pub rtt_us: u64,
    pub log_hint: LogHint,
}

impl PingState {
    pub fn new(period_ms: u64) -> PingState {
        PingState {
            period_ms,
            next_seq: 0,
            running: false,
            start_us: 0,
            failures: 0,
        }
    }

    /// Called every `period_ms`. Builds the NOACK ping frame to send on id
    /// 0, bumping the failure counter (and possibly requesting a link KO
    /// transition) if the previous ping never got a matching pong.
    pub fn tick(&mut self, now_us: u64, link_was_ok: bool) -> TickOutcome {
        let mut link_transition = None;

        if self.running {
            self.failures += 1;
            if self.failures >= FAILURE_LIMIT && link_was_ok {
                link_transition = Some(LinkStatus::Ko);
            }
        }
        self.running = false;

        self.start_us = now_us;
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);

        let frame = Frame::new(DataType::NoAck, ID_PING, seq as u32, now_us.to_le_bytes().to_vec());
        self.running = true;

        TickOutcome { frame, link_transition }
    }

    /// Builds the PONG reply for a received PING: same type and seq, payload
    /// echoed verbatim.
    pub fn build_pong(received: &Frame) -> Frame {
        Frame::new(received.data_type, ID_PONG, received.seq, received.payload.clone())
    }

    /// Processes a received PONG frame. Returns `None` if there was no ping
    /// in flight, the payload length doesn't match, or the payload doesn't
    /// match the stored start timestamp (stale/foreign pong).
    pub fn handle_pong(&mut self, frame: &Frame, now_us: u64) -> Option<PongOutcome> {
        if !self.running {
            return None;
        }

        if frame.payload.len() != 8 {
            return None;
        }

        let mut expected = [0u8; 8];
        expected.copy_from_slice(&self.start_us.to_le_bytes());
        if frame.payload.as_slice() != expected {
            return None;
        }

        self.running = false;
        self.failures = 0;

        let rtt_us = now_us.saturating_sub(self.start_us);
        let log_hint = if rtt_us >= RTT_LOG_THRESHOLD_US {
            LogHint::Info
        } else {
            LogHint::Debug
        };

        Some(PongOutcome { rtt_us, log_hint })
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

//! CmdItf v3 (packed + fragmented, protocol §4.7): same pack/ack machinery
//! as v2, plus the ability to split a single command across consecutive
//! packs on a WITH_ACK queue. Command lengths are varuint-prefixed instead
//! of `u16`, and the pack budget is tighter (1000 bytes).

use crate::queue_info::QueueInfo;
use crate::ring::Ring;
use crate::status::{Callbacks, PackSendStatus, SendStatus, SendStatusKind};
use crate::wire::{expects_ack, wire_data_type};
use arsdk_codec::Command;
use arsdk_support::{logging::Logger, varuint};
use arsdk_transport::Frame;

/// Maximum payload size of a v3 pack (protocol §4.7).
pub const PACK_LIMIT: usize = 1000;

/// `pack.sent_count` threshold at which the `too_many_retries` observability
/// event fires (protocol §4.7, §14).
const TOO_MANY_RETRIES_THRESHOLD: u32 = 100;

struct PackV3 {
    buf: Vec<u8>,
    /// Number of front-of-ring entries this pack currently represents.
    cmd_count: usize,
    /// Whether the last of `cmd_count` entries is only partially included
    /// (its remaining bytes ride in a continuation pack).
    trailing_partial: bool,
    seq: u16,
    waiting_ack: bool,
    sent_ts: Option<u64>,
    sent_count: u32,
}

impl PackV3 {
    fn empty() -> PackV3 {
        PackV3 { buf: Vec::new(), cmd_count: 0, trailing_partial: false, seq: 0, waiting_ack: false, sent_ts: None, sent_count: 0 }
    }

    fn reset(&mut self) {
        *self = PackV3::empty();
    }
}

struct LastPack {
    seq: u16,
    sent_count: u32,
    ack_count: u32,
}

pub struct QueueV3 {
    pub info: QueueInfo,
    entries: Ring<Command>,
    seq: u16,
    pack: PackV3,
    last_pack: Option<LastPack>,
    last_send_ts: Option<u64>,
    /// Bytes of `entries.front()`'s payload already sent in a prior pack;
    /// `None` means the front entry (if any) hasn't started being packed.
    /// Only ever set on a WITH_ACK queue (protocol §3 invariant).
    continuation_offset: Option<usize>,
    log: Logger,
}

impl QueueV3 {
    pub fn new(info: QueueInfo) -> QueueV3 {
        QueueV3::with_logger(info, arsdk_support::logging::discard())
    }

    pub fn with_logger(info: QueueInfo, log: Logger) -> QueueV3 {
        QueueV3 {
            info,
            entries: Ring::new(),
            seq: u16::MAX,
            pack: PackV3::empty(),
            last_pack: None,
            last_send_ts: None,
            continuation_offset: None,
            log,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enqueue(&mut self, cmd: Command, callbacks: &mut Callbacks) {
        if self.info.overwrite {
            let id = cmd.id();
            let skip = if self.pack.waiting_ack { self.pack.cmd_count } else { 0 };
            if let Some(old) = self.entries.remove_first_from(skip, |c| c.id() == id) {
                callbacks.notify_send_status(old.id(), SendStatus::new(SendStatusKind::Canceled, true));
            }
        }
        self.entries.push_back(cmd);
    }

    pub fn tick(&mut self, now_us: u64, callbacks: &mut Callbacks) -> Option<Frame> {
        let needs_ack = expects_ack(self.info.buffer_type);

        if self.pack.waiting_ack {
            let elapsed_us = now_us.saturating_sub(self.pack.sent_ts.unwrap_or(now_us));
            if elapsed_us < self.info.ack_timeout_ms.saturating_mul(1000) {
                return None;
            }
            self.pack.sent_count += 1;
            self.pack.sent_ts = Some(now_us);
            if self.pack.sent_count == TOO_MANY_RETRIES_THRESHOLD {
                arsdk_support::logging::warn!(self.log, "too_many_retries"; "queue_id" => self.info.transport_id, "sent_count" => self.pack.sent_count);
            }
            return Some(self.build_frame());
        }

        if let Some(last) = self.last_send_ts {
            if self.info.max_tx_rate_ms > 0 && now_us.saturating_sub(last) < self.info.max_tx_rate_ms.saturating_mul(1000) {
                return None;
            }
        }

        if self.entries.is_empty() && self.continuation_offset.is_none() {
            return None;
        }

        let mut buf = Vec::new();
        let mut cmd_count = 0usize;
        let mut trailing_partial = false;
        let mut fully_packed: Vec<u32> = Vec::new();
        let mut partial_id: Option<u32> = None;

        // First, resume a trailing command left incomplete by a previous
        // pack (only possible on a WITH_ACK queue).
        if let Some(offset) = self.continuation_offset {
            let entry = self.entries.get(0).expect("continuation implies a front entry");
            let payload = entry.payload();
            let remaining = payload.len() - offset;
            let room = PACK_LIMIT - buf.len();

            if remaining <= room {
                buf.extend_from_slice(&payload[offset..]);
                cmd_count += 1;
                fully_packed.push(entry.id());
                self.continuation_offset = None;
            } else {
                buf.extend_from_slice(&payload[offset..offset + room]);
                cmd_count += 1;
                trailing_partial = true;
                partial_id = Some(entry.id());
                self.continuation_offset = Some(offset + room);
            }
        }

        // Then pack whole fresh commands (and possibly split one more) as
        // long as there's room and we haven't already left a trailing
        // partial from the continuation above.
        if !trailing_partial {
            while let Some(entry) = self.entries.get(cmd_count) {
                let payload = entry.payload();
                let mut len_prefix = Vec::new();
                varuint::encode(payload.len() as u32, &mut len_prefix);
                let room = PACK_LIMIT - buf.len();

                if len_prefix.len() + payload.len() <= room {
                    buf.extend_from_slice(&len_prefix);
                    buf.extend_from_slice(payload);
                    fully_packed.push(entry.id());
                    cmd_count += 1;
                } else if needs_ack && room > len_prefix.len() {
                    buf.extend_from_slice(&len_prefix);
                    let body_room = room - len_prefix.len();
                    buf.extend_from_slice(&payload[..body_room]);
                    cmd_count += 1;
                    trailing_partial = true;
                    partial_id = Some(entry.id());
                    self.continuation_offset = Some(body_room);
                    break;
                } else {
                    // NOACK commands are never split (protocol §3); a
                    // WITH_ACK command with no room even for its length
                    // prefix waits for the next pack.
                    break;
                }
            }
        }

        if cmd_count == 0 {
            return None;
        }

        self.seq = self.seq.wrapping_add(1);
        self.pack.buf = buf;
        self.pack.seq = self.seq;
        self.pack.trailing_partial = trailing_partial;
        self.last_send_ts = Some(now_us);

        if needs_ack {
            self.pack.cmd_count = cmd_count;
            self.pack.waiting_ack = true;
            self.pack.sent_ts = Some(now_us);
            self.pack.sent_count = 1;

            for id in &fully_packed {
                callbacks.notify_send_status(*id, SendStatus::new(SendStatusKind::Packed, false));
            }
            if let Some(id) = partial_id {
                callbacks.notify_send_status(id, SendStatus::new(SendStatusKind::PartiallyPacked, false));
            }
            callbacks.notify_pack_send(self.info.transport_id, PackSendStatus::PackSent);
        } else {
            // NOACK queues can never leave a trailing partial (protocol §3).
            debug_assert!(!trailing_partial);
            let popped = self.entries.pop_front_n(cmd_count);
            for entry in popped {
                callbacks.notify_send_status(entry.id(), SendStatus::new(SendStatusKind::Sent, true));
            }
            self.pack.reset();
        }

        Some(self.build_frame())
    }

    /// Processes a received ack (payload: `u16_le` acked seq). Only the
    /// entries the pack fully covers are popped; a trailing partial entry
    /// stays in the ring with its `continuation_offset` intact for the
    /// next pack (protocol §4.7).
    pub fn recv_ack(&mut self, acked_seq: u16, callbacks: &mut Callbacks) -> bool {
        if self.pack.waiting_ack && self.pack.seq == acked_seq {
            let fully_covered = if self.pack.trailing_partial { self.pack.cmd_count - 1 } else { self.pack.cmd_count };
            let popped = self.entries.pop_front_n(fully_covered);
            for entry in popped {
                callbacks.notify_send_status(entry.id(), SendStatus::new(SendStatusKind::AckReceived, true));
            }
            callbacks.notify_pack_send(self.info.transport_id, PackSendStatus::AckReceived);
            self.last_pack = Some(LastPack { seq: self.pack.seq, sent_count: self.pack.sent_count, ack_count: 1 });
            self.pack.reset();
            return true;
        }

        if let Some(last) = &mut self.last_pack {
            if last.seq == acked_seq {
                last.ack_count += 1;
                return true;
            }
        }

        false
    }

    pub fn cancel_all(&mut self, callbacks: &mut Callbacks) {
        let had_inflight = self.pack.waiting_ack;
        while let Some(entry) = self.entries.pop_front() {
            callbacks.notify_send_status(entry.id(), SendStatus::new(SendStatusKind::Canceled, true));
        }
        if had_inflight {
            callbacks.notify_pack_send(self.info.transport_id, PackSendStatus::Canceled);
        }
        self.pack.reset();
        self.continuation_offset = None;
    }

    fn build_frame(&self) -> Frame {
        Frame::new(wire_data_type(self.info.buffer_type), self.info.transport_id, self.pack.seq as u32, self.pack.buf.clone())
    }
}

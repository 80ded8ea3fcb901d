//! CmdItf v2 (packed, protocol §4.6): multiple whole commands per frame,
//! 16-bit sequence, retry granularity is the whole pack rather than a
//! single entry.

use crate::queue_info::QueueInfo;
use crate::ring::Ring;
use crate::status::{Callbacks, SendStatus, SendStatusKind};
use crate::wire::{expects_ack, wire_data_type};
use arsdk_codec::Command;
use arsdk_transport::Frame;
use byteorder::{ByteOrder, LittleEndian};

/// Maximum payload size of a v2 pack (protocol §4.6).
pub const PACK_LIMIT: usize = 1400;

/// Per-command length prefix width in a v2 pack.
const LEN_PREFIX: usize = 2;

struct PackV2 {
    buf: Vec<u8>,
    /// Number of front-of-ring entries this pack currently represents.
    /// Stays in the ring (not popped) until the pack is acked, so a resend
    /// needs no repacking.
    cmd_count: usize,
    seq: u16,
    waiting_ack: bool,
    sent_ts: Option<u64>,
    sent_count: u32,
}

impl PackV2 {
    fn empty() -> PackV2 {
        PackV2 { buf: Vec::new(), cmd_count: 0, seq: 0, waiting_ack: false, sent_ts: None, sent_count: 0 }
    }

    fn reset(&mut self) {
        *self = PackV2::empty();
    }
}

/// Ack bookkeeping for the most recently fully-acknowledged pack, kept
/// around solely to recognize a duplicate ack arriving from a peer
/// retransmission after this queue has already moved on to the next pack
/// (protocol §4.6, §8 "Duplicate ACK").
struct LastPack {
    seq: u16,
    sent_count: u32,
    ack_count: u32,
}

pub struct QueueV2 {
    pub info: QueueInfo,
    entries: Ring<Command>,
    /// Pre-wrapped to `u16::MAX` so the first fresh pack uses seq `0`.
    seq: u16,
    pack: PackV2,
    last_pack: Option<LastPack>,
    last_send_ts: Option<u64>,
}

impl QueueV2 {
    pub fn new(info: QueueInfo) -> QueueV2 {
        QueueV2 {
            info,
            entries: Ring::new(),
            seq: u16::MAX,
            pack: PackV2::empty(),
            last_pack: None,
            last_send_ts: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enqueues `cmd`. Overwrite semantics only ever touch entries not
    /// already folded into the in-flight pack -- those must survive until
    /// acked so a resend needs no repacking.
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

    /// Drives one scheduler tick. Returns the frame to transmit, if any.
    pub fn tick(&mut self, now_us: u64, callbacks: &mut Callbacks) -> Option<Frame> {
        let needs_ack = expects_ack(self.info.buffer_type);

        if self.pack.waiting_ack {
            let elapsed_us = now_us.saturating_sub(self.pack.sent_ts.unwrap_or(now_us));
            if elapsed_us < self.info.ack_timeout_ms.saturating_mul(1000) {
                return None;
            }
            // v2 retries indefinitely; never pops/times out (protocol §7).
            self.pack.sent_count += 1;
            self.pack.sent_ts = Some(now_us);
            return Some(self.build_frame());
        }

        if let Some(rate_ms) = Some(self.info.max_tx_rate_ms).filter(|&ms| ms > 0) {
            if let Some(last) = self.last_send_ts {
                if now_us.saturating_sub(last) < rate_ms.saturating_mul(1000) {
                    return None;
                }
            }
        }

        if self.entries.is_empty() {
            return None;
        }

        // The 1400-byte budget is spent against each command's own encoded
        // length (protocol §4.6/§8): `stopping before an entry whose ...
        // len would exceed 1400`, not the pack's total wire size including
        // the 2-byte per-command length prefixes.
        let mut buf = Vec::new();
        let mut body_len = 0usize;
        let mut cmd_count = 0usize;
        while let Some(entry) = self.entries.get(cmd_count) {
            let payload = entry.payload();
            if body_len + payload.len() > PACK_LIMIT {
                break;
            }
            let mut len_bytes = [0u8; LEN_PREFIX];
            LittleEndian::write_u16(&mut len_bytes, payload.len() as u16);
            buf.extend_from_slice(&len_bytes);
            buf.extend_from_slice(payload);
            body_len += payload.len();
            cmd_count += 1;
        }

        if cmd_count == 0 {
            // A single command alone exceeds the pack limit; nothing this
            // queue can do but wait (matches the v2 "never split" rule).
            return None;
        }

        self.seq = self.seq.wrapping_add(1);
        self.pack.buf = buf;
        self.pack.seq = self.seq;
        self.last_send_ts = Some(now_us);

        if needs_ack {
            self.pack.cmd_count = cmd_count;
            self.pack.waiting_ack = true;
            self.pack.sent_ts = Some(now_us);
            self.pack.sent_count = 1;
            for i in 0..cmd_count {
                let id = self.entries.get(i).unwrap().id();
                callbacks.notify_send_status(id, SendStatus::new(SendStatusKind::Packed, false));
            }
        } else {
            let popped = self.entries.pop_front_n(cmd_count);
            for entry in popped {
                callbacks.notify_send_status(entry.id(), SendStatus::new(SendStatusKind::Sent, true));
            }
            self.pack.reset();
            self.pack.buf.clear();
        }

        Some(self.build_frame())
    }

    /// Processes a received ack (payload: `u16_le` acked seq). Matches
    /// against the in-flight pack, falling back to `last_pack` to
    /// recognize a duplicate ack from a retransmission (protocol §4.6).
    pub fn recv_ack(&mut self, acked_seq: u16, callbacks: &mut Callbacks) -> bool {
        if self.pack.waiting_ack && self.pack.seq == acked_seq {
            let popped = self.entries.pop_front_n(self.pack.cmd_count);
            for entry in popped {
                callbacks.notify_send_status(entry.id(), SendStatus::new(SendStatusKind::AckReceived, true));
            }
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

        // Protocol error: an ack for neither the current nor last pack.
        // Per §9 open questions, the original leaves the queue untouched.
        false
    }

    /// Cancels every pending entry, including whatever is currently folded
    /// into an in-flight pack (interface shutdown).
    pub fn cancel_all(&mut self, callbacks: &mut Callbacks) {
        while let Some(entry) = self.entries.pop_front() {
            callbacks.notify_send_status(entry.id(), SendStatus::new(SendStatusKind::Canceled, true));
        }
        self.pack.reset();
    }

    fn build_frame(&self) -> Frame {
        Frame::new(wire_data_type(self.info.buffer_type), self.info.transport_id, self.pack.seq as u32, self.pack.buf.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arsdk_codec::BufferType;

    fn cmd(id: u16, extra_len: usize) -> Command {
        let mut payload = vec![1, 2, id as u8, (id >> 8) as u8];
        payload.extend(std::iter::repeat(0u8).take(extra_len));
        Command::from_encoded(1, 2, id, BufferType::Ack, payload)
    }

    fn noack_cmd(id: u16) -> Command {
        Command::from_encoded(1, 2, id, BufferType::NonAck, vec![1, 2, id as u8, (id >> 8) as u8])
    }

    #[test]
    fn pack_boundary_splits_on_limit() {
        // Three 700-byte (incl. 4-byte header) commands; the 1400-byte
        // budget is spent against each command's own length (not the
        // per-command 2-byte prefix), so exactly two fit per pack (§8).
        let mut q = QueueV2::new(QueueInfo::new(BufferType::Ack, 11));
        let mut cb = Callbacks::new();
        for id in 1..=3u16 {
            q.enqueue(cmd(id, 696), &mut cb); // 4-byte header + 696 = 700 bytes
        }

        let frame1 = q.tick(0, &mut cb).unwrap();
        assert_eq!(frame1.payload.len(), 2 * (2 + 700));

        // Ack it so the next pack can be built.
        assert!(q.recv_ack(0, &mut cb));
        let frame2 = q.tick(0, &mut cb).unwrap();
        assert_eq!(frame2.payload.len(), 2 + 700);
    }

    #[test]
    fn noack_queue_packs_all_fitting_commands_into_one_frame() {
        let mut q = QueueV2::new(QueueInfo::new(BufferType::NonAck, 10));
        let mut cb = Callbacks::new();
        for id in 0..10u16 {
            q.enqueue(noack_cmd(id), &mut cb); // 4 bytes payload each
        }

        let frame = q.tick(0, &mut cb).unwrap();
        assert_eq!(frame.seq, 0);
        assert_eq!(frame.payload.len(), 10 * (2 + 4));
        assert!(q.is_empty());
    }

    #[test]
    fn duplicate_ack_increments_last_pack_without_repopping() {
        let mut q = QueueV2::new(QueueInfo::new(BufferType::Ack, 11));
        let mut cb = Callbacks::new();
        q.enqueue(cmd(1, 0), &mut cb);

        q.tick(0, &mut cb);
        assert!(q.recv_ack(0, &mut cb));
        assert_eq!(q.last_pack.as_ref().unwrap().ack_count, 1);

        // A second ack for the same (now stale) seq is a retransmit dup.
        assert!(q.recv_ack(0, &mut cb));
        assert_eq!(q.last_pack.as_ref().unwrap().ack_count, 2);
    }

    #[test]
    fn ack_for_unknown_seq_is_ignored() {
        let mut q = QueueV2::new(QueueInfo::new(BufferType::Ack, 11));
        let mut cb = Callbacks::new();
        q.enqueue(cmd(1, 0), &mut cb);
        q.tick(0, &mut cb);
        assert!(!q.recv_ack(99, &mut cb));
    }

    #[test]
    fn retry_resends_identical_bytes_without_repacking() {
        let mut q = QueueV2::new(QueueInfo::new(BufferType::Ack, 11).with_ack_timeout_ms(50));
        let mut cb = Callbacks::new();
        q.enqueue(cmd(1, 0), &mut cb);

        let first = q.tick(0, &mut cb).unwrap();
        let retry = q.tick(100_000, &mut cb).unwrap();
        assert_eq!(first.payload, retry.payload);
        assert_eq!(first.seq, retry.seq);
    }
}

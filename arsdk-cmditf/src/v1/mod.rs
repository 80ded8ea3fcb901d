//! CmdItf v1 (legacy, protocol §4.5): one command per frame, 8-bit sequence,
//! at most one in-flight entry per ack-class queue, per-entry retry/timeout.

use crate::queue_info::QueueInfo;
use crate::ring::Ring;
use crate::status::{Callbacks, SendStatus, SendStatusKind};
use crate::wire::{expects_ack, wire_data_type};
use arsdk_codec::{Command, TimeoutPolicy};
use arsdk_transport::Frame;

struct EntryV1 {
    cmd: Command,
    waiting_ack: bool,
    retry_count: i32,
    max_retry_count: i32,
    sent_ts: Option<u64>,
    seq: u8,
    timeout_policy: TimeoutPolicy,
}

pub struct QueueV1 {
    pub info: QueueInfo,
    entries: Ring<EntryV1>,
    /// Pre-wrapped to `u8::MAX` so the first fresh send uses seq `0`.
    seq: u8,
}

impl QueueV1 {
    pub fn new(info: QueueInfo) -> QueueV1 {
        QueueV1 { info, entries: Ring::new(), seq: u8::MAX }
    }

    /// Enqueues `cmd`. `max_retry_count` is `i32::MAX` for a RETRY-policy
    /// descriptor, else the queue's configured default (protocol §4.5).
    /// `timeout_policy` drives what happens once retries are exhausted
    /// (`Pop` just drops the entry, `Flush` also drops every later-queued
    /// entry sharing this command's id -- see `tick`'s `Action::TimedOut`).
    pub fn enqueue(&mut self, cmd: Command, max_retry_count: i32, timeout_policy: TimeoutPolicy, callbacks: &mut Callbacks) {
        if self.info.overwrite {
            let id = cmd.id();
            if let Some(old) = self.entries.remove_first(|e| !e.waiting_ack && e.cmd.id() == id) {
                callbacks.notify_send_status(old.cmd.id(), SendStatus::new(SendStatusKind::Canceled, true));
            }
        }

        self.entries.push_back(EntryV1 {
            cmd,
            waiting_ack: false,
            retry_count: 0,
            max_retry_count,
            sent_ts: None,
            seq: 0,
            timeout_policy,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drives one scheduler tick: sends the head entry if it has never been
    /// sent, retries it if its ack timeout elapsed, pops it if retries are
    /// exhausted, or pops-and-notifies immediately for a NOACK head. Returns
    /// the frame to transmit, if any.
    pub fn tick(&mut self, now_us: u64, callbacks: &mut Callbacks) -> Option<Frame> {
        loop {
            let needs_ack = expects_ack(self.info.buffer_type);

            let action = {
                let entry = self.entries.front()?;
                if !needs_ack {
                    Action::SendNoAck
                } else if !entry.waiting_ack {
                    Action::SendFresh
                } else {
                    let elapsed_us = now_us.saturating_sub(entry.sent_ts.unwrap_or(now_us));
                    if elapsed_us < self.info.ack_timeout_ms.saturating_mul(1000) {
                        Action::Wait
                    } else if entry.retry_count < entry.max_retry_count {
                        Action::Retry
                    } else {
                        Action::TimedOut
                    }
                }
            };

            match action {
                Action::Wait => return None,
                Action::SendNoAck => {
                    let entry = self.entries.pop_front().unwrap();
                    let frame = self.build_frame(&entry);
                    callbacks.notify_send_status(entry.cmd.id(), SendStatus::new(SendStatusKind::Sent, true));
                    return Some(frame);
                }
                Action::SendFresh => {
                    self.seq = self.seq.wrapping_add(1);
                    let seq = self.seq;
                    let entry = self.entries.front_mut().unwrap();
                    entry.seq = seq;
                    entry.waiting_ack = true;
                    entry.sent_ts = Some(now_us);
                    let frame = self.build_frame(entry);
                    callbacks.notify_send_status(entry.cmd.id(), SendStatus::new(SendStatusKind::Sent, false));
                    return Some(frame);
                }
                Action::Retry => {
                    let entry = self.entries.front_mut().unwrap();
                    entry.retry_count += 1;
                    entry.sent_ts = Some(now_us);
                    let frame = self.build_frame(entry);
                    callbacks.notify_send_status(entry.cmd.id(), SendStatus::new(SendStatusKind::Sent, false));
                    return Some(frame);
                }
                Action::TimedOut => {
                    let entry = self.entries.pop_front().unwrap();
                    let id = entry.cmd.id();
                    let flush = entry.timeout_policy == TimeoutPolicy::Flush;
                    callbacks.notify_send_status(id, SendStatus::new(SendStatusKind::Timeout, true));

                    if flush {
                        // FLUSH: a timed-out entry also drops every later
                        // queued entry sharing its command id, rather than
                        // letting them take their own turn at head-of-queue
                        // (protocol §4.5 descriptor timeout policy).
                        for dropped in self.entries.remove_all(|e| e.cmd.id() == id) {
                            callbacks.notify_send_status(dropped.cmd.id(), SendStatus::new(SendStatusKind::Canceled, true));
                        }
                    }

                    // Loop back around: the new head (if any) may be sendable
                    // in this same tick.
                    continue;
                }
            }
        }
    }

    /// Processes a received ack (payload byte 0 is the acked seq). Matched
    /// only against the head of queue; any mismatch is ignored (protocol
    /// §4.5).
    pub fn recv_ack(&mut self, acked_seq: u8, callbacks: &mut Callbacks) -> bool {
        let matched = matches!(self.entries.front(), Some(entry) if entry.waiting_ack && entry.seq == acked_seq);
        if !matched {
            return false;
        }
        let entry = self.entries.pop_front().unwrap();
        callbacks.notify_send_status(entry.cmd.id(), SendStatus::new(SendStatusKind::AckReceived, true));
        true
    }

    /// Cancels every pending entry head-to-tail (interface shutdown).
    pub fn cancel_all(&mut self, callbacks: &mut Callbacks) {
        while let Some(entry) = self.entries.pop_front() {
            callbacks.notify_send_status(entry.cmd.id(), SendStatus::new(SendStatusKind::Canceled, true));
        }
    }

    fn build_frame(&self, entry: &EntryV1) -> Frame {
        Frame::new(wire_data_type(self.info.buffer_type), self.info.transport_id, entry.seq as u32, entry.cmd.payload().to_vec())
    }
}

enum Action {
    Wait,
    SendNoAck,
    SendFresh,
    Retry,
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use arsdk_codec::BufferType;

    fn cmd(id: u16) -> Command {
        Command::from_encoded(1, 2, id, BufferType::Ack, vec![1, 2, id as u8, (id >> 8) as u8])
    }

    fn ack_queue() -> QueueV1 {
        QueueV1::new(QueueInfo::new(BufferType::Ack, 11).with_ack_timeout_ms(50))
    }

    #[test]
    fn at_most_one_in_flight() {
        let mut q = ack_queue();
        let mut cb = Callbacks::new();
        q.enqueue(cmd(1), -1, TimeoutPolicy::Pop, &mut cb);
        q.enqueue(cmd(2), -1, TimeoutPolicy::Pop, &mut cb);

        q.tick(0, &mut cb); // sends entry 1
        // Ticking again immediately (no timeout elapsed) must not send entry 2.
        assert!(q.tick(10, &mut cb).is_none());
    }

    #[test]
    fn retry_count_emits_sent_then_timeout() {
        let mut q = QueueV1::new(QueueInfo::new(BufferType::Ack, 11).with_ack_timeout_ms(50));

        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let log2 = log.clone();
        let mut cb = Callbacks::new();
        cb.cmd_send_status = Some(Box::new(move |_id, status| log2.borrow_mut().push(status)));

        q.enqueue(cmd(1), 3, TimeoutPolicy::Pop, &mut cb);

        let mut now = 0u64;
        for _ in 0..4 {
            q.tick(now, &mut cb);
            now += 50_000; // 50ms in microseconds
        }
        // One final tick to observe the timeout after the 4th (3rd retry) send.
        q.tick(now, &mut cb);

        let kinds: Vec<_> = log.borrow().iter().map(|s| s.kind).collect();
        use crate::status::SendStatusKind::*;
        assert_eq!(kinds, vec![Sent, Sent, Sent, Sent, Timeout]);
    }

    #[test]
    fn ack_timeout_is_compared_in_microseconds() {
        // `ack_timeout_ms(50)` is 50_000us. A tick 10_000us after the first
        // send must still be waiting, not retrying -- guards against
        // comparing `elapsed_us` directly to `ack_timeout_ms`, which would
        // fire the retry 1000x too early.
        let mut q = QueueV1::new(QueueInfo::new(BufferType::Ack, 11).with_ack_timeout_ms(50));
        let mut cb = Callbacks::new();
        q.enqueue(cmd(1), 3, TimeoutPolicy::Pop, &mut cb);

        let first = q.tick(0, &mut cb);
        assert!(first.is_some());
        assert!(q.tick(10_000, &mut cb).is_none());
    }

    #[test]
    fn overwrite_cancels_previous_entry() {
        let mut q = QueueV1::new(QueueInfo::new(BufferType::NonAck, 10).with_overwrite(true));
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let log2 = log.clone();
        let mut cb = Callbacks::new();
        cb.cmd_send_status = Some(Box::new(move |id, status| log2.borrow_mut().push((id, status))));

        q.enqueue(cmd(5), -1, TimeoutPolicy::Pop, &mut cb);
        q.enqueue(cmd(5), -1, TimeoutPolicy::Pop, &mut cb);

        assert_eq!(q.entries.len(), 1);
        let events = log.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.kind, crate::status::SendStatusKind::Canceled);
    }

    #[test]
    fn noack_queue_fifo_order() {
        let mut q = QueueV1::new(QueueInfo::new(BufferType::NonAck, 10));
        let mut cb = Callbacks::new();
        q.enqueue(cmd(1), -1, TimeoutPolicy::Pop, &mut cb);
        q.enqueue(cmd(2), -1, TimeoutPolicy::Pop, &mut cb);
        q.enqueue(cmd(3), -1, TimeoutPolicy::Pop, &mut cb);

        let f1 = q.tick(0, &mut cb).unwrap();
        let f2 = q.tick(0, &mut cb).unwrap();
        let f3 = q.tick(0, &mut cb).unwrap();
        assert_eq!(f1.seq, 0);
        assert_eq!(f2.seq, 0);
        assert_eq!(f3.seq, 0);
        assert!(q.is_empty());
    }

    #[test]
    fn ack_mismatch_is_ignored() {
        let mut q = ack_queue();
        let mut cb = Callbacks::new();
        q.enqueue(cmd(1), -1, TimeoutPolicy::Pop, &mut cb);
        q.tick(0, &mut cb);
        assert!(!q.recv_ack(99, &mut cb));
        assert!(q.recv_ack(0, &mut cb));
    }

    #[test]
    fn flush_policy_drops_later_entries_sharing_the_command_id() {
        let mut q = QueueV1::new(QueueInfo::new(BufferType::Ack, 11).with_ack_timeout_ms(50));
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let log2 = log.clone();
        let mut cb = Callbacks::new();
        cb.cmd_send_status = Some(Box::new(move |id, status| log2.borrow_mut().push((id, status))));

        // Two entries sharing id 1's command, one entry for id 2 behind them.
        q.enqueue(cmd(1), 0, TimeoutPolicy::Flush, &mut cb);
        q.enqueue(cmd(1), 0, TimeoutPolicy::Flush, &mut cb);
        q.enqueue(cmd(2), 0, TimeoutPolicy::Flush, &mut cb);

        q.tick(0, &mut cb); // send
        q.tick(50_000, &mut cb); // ack_timeout elapses with max_retry_count=0 -> times out immediately

        let kinds: Vec<_> = log.borrow().iter().map(|(id, s)| (*id, s.kind)).collect();
        use crate::status::SendStatusKind::*;
        assert_eq!(kinds[0], (cmd(1).id(), Sent));
        assert_eq!(kinds[1], (cmd(1).id(), Timeout));
        assert_eq!(kinds[2], (cmd(1).id(), Canceled));
        assert_eq!(q.entries.len(), 1);
        assert_eq!(q.entries.front().unwrap().cmd.id(), cmd(2).id());
    }

    #[test]
    fn pop_policy_leaves_later_same_id_entries_queued() {
        let mut q = QueueV1::new(QueueInfo::new(BufferType::Ack, 11).with_ack_timeout_ms(50));
        let mut cb = Callbacks::new();

        q.enqueue(cmd(1), 0, TimeoutPolicy::Pop, &mut cb);
        q.enqueue(cmd(1), 0, TimeoutPolicy::Pop, &mut cb);

        q.tick(0, &mut cb);
        q.tick(50_000, &mut cb);

        assert_eq!(q.entries.len(), 1);
    }
}

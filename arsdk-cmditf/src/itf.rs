//! The command-interface driver: ties a [`Transport`], a version-specific
//! set of TX queues, and the RX un-packing/ack/recv-seq-window machinery
//! into the single object application code talks to (protocol §3 "Command
//! Interface", §6.5).

use crate::linkquality::{LinkQualityCounters, LINK_QUALITY_PERIOD_MS};
use crate::queue_info::QueueInfo;
use crate::recv::{self, PartialCmd};
use crate::status::{Callbacks, PackRecvStatus};
use crate::{v1, v2, v3};
use arsdk_codec::{find_descriptor, BufferType, Command, TimeoutPolicy};
use arsdk_support::logging::{debug, Logger};
use arsdk_support::{Error, Result};
use arsdk_transport::{ack_id, tx_queue_id, DataType, Frame, FrameTransport, Transport, TransportEvent, ACKOFF};
use byteorder::{ByteOrder, LittleEndian};

/// Version-specific TX queue storage. An interface is pinned to one
/// protocol version for its whole lifetime (negotiated once at connection
/// time, protocol §4.8) -- there's no per-frame dispatch cost in the hot
/// path (protocol §9 design notes).
pub enum Queues {
    V1(Vec<v1::QueueV1>),
    V2(Vec<v2::QueueV2>),
    V3(Vec<v3::QueueV3>),
}

impl Queues {
    fn seq_width_bits(&self) -> u32 {
        match self {
            Queues::V1(_) => 8,
            Queues::V2(_) | Queues::V3(_) => 16,
        }
    }
}

pub struct CmdItf<T: FrameTransport> {
    transport: Transport<T>,
    queues: Queues,
    callbacks: Callbacks,
    recv_seq: Vec<Option<u32>>,
    partial_v3: Vec<Option<PartialCmd>>,
    max_partial_cmd_len: usize,
    link_quality: LinkQualityCounters,
    last_link_quality_us: Option<u64>,
    stopped: bool,
    log: Logger,
}

impl<T: FrameTransport> CmdItf<T> {
    pub fn new(transport: Transport<T>, queues: Queues, callbacks: Callbacks, log: Logger) -> CmdItf<T> {
        CmdItf {
            transport,
            queues,
            callbacks,
            recv_seq: vec![None; 256],
            partial_v3: (0..256).map(|_| None).collect(),
            max_partial_cmd_len: recv::DEFAULT_MAX_PARTIAL_CMD_LEN,
            link_quality: LinkQualityCounters::new(),
            last_link_quality_us: None,
            stopped: false,
            log,
        }
    }

    pub fn with_max_partial_cmd_len(mut self, max_len: usize) -> CmdItf<T> {
        self.max_partial_cmd_len = max_len;
        self
    }

    pub fn link_status(&self) -> Option<arsdk_transport::LinkStatus> {
        self.transport.link_status()
    }

    /// Enqueues `cmd` on the queue matching its `buffer_type`
    /// (protocol §3 invariant: at most one queue per `buffer_type`).
    pub fn send(&mut self, cmd: Command) -> Result<()> {
        if self.stopped {
            return Err(Error::NotConnected);
        }

        match &mut self.queues {
            Queues::V1(qs) => {
                let timeout_policy =
                    find_descriptor(cmd.prj_id, cmd.cls_id, cmd.cmd_id).map(|d| d.timeout_policy).unwrap_or(TimeoutPolicy::Pop);
                let max_retry_count = if timeout_policy == TimeoutPolicy::Retry { Some(i32::MAX) } else { None };
                let q = qs.iter_mut().find(|q| q.info.buffer_type == cmd.buffer_type).ok_or(Error::InvalidArgument)?;
                let max_retry_count = max_retry_count.unwrap_or(q.info.default_max_retry_count);
                q.enqueue(cmd, max_retry_count, timeout_policy, &mut self.callbacks);
            }
            Queues::V2(qs) => {
                let q = qs.iter_mut().find(|q| q.info.buffer_type == cmd.buffer_type).ok_or(Error::InvalidArgument)?;
                q.enqueue(cmd, &mut self.callbacks);
            }
            Queues::V3(qs) => {
                let q = qs.iter_mut().find(|q| q.info.buffer_type == cmd.buffer_type).ok_or(Error::InvalidArgument)?;
                q.enqueue(cmd, &mut self.callbacks);
            }
        }
        Ok(())
    }

    /// Drives one scheduler tick: processes inbound transport events (RX
    /// un-packing, ack routing, link status), sends whatever the TX
    /// queues have ready, and samples the link-quality timer.
    pub fn step(&mut self, now_us: u64) {
        if self.stopped {
            return;
        }

        let events = self.transport.poll(now_us);
        for event in events {
            match event {
                TransportEvent::Frame(frame) => self.handle_inbound(frame),
                TransportEvent::LinkStatus(status) => self.callbacks.notify_link_status(status),
            }
        }

        self.drive_tx(now_us);
        self.sample_link_quality(now_us);
    }

    /// Cancels every pending TX entry (head-to-tail per queue) and marks
    /// the interface stopped; further `send()` calls fail with
    /// `NotConnected` (protocol §5 "Cancellation").
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        match &mut self.queues {
            Queues::V1(qs) => qs.iter_mut().for_each(|q| q.cancel_all(&mut self.callbacks)),
            Queues::V2(qs) => qs.iter_mut().for_each(|q| q.cancel_all(&mut self.callbacks)),
            Queues::V3(qs) => qs.iter_mut().for_each(|q| q.cancel_all(&mut self.callbacks)),
        }
        self.transport.stop();
        self.stopped = true;
    }

    fn drive_tx(&mut self, now_us: u64) {
        let frames: Vec<Frame> = match &mut self.queues {
            Queues::V1(qs) => qs.iter_mut().filter_map(|q| q.tick(now_us, &mut self.callbacks)).collect(),
            Queues::V2(qs) => qs.iter_mut().filter_map(|q| q.tick(now_us, &mut self.callbacks)).collect(),
            Queues::V3(qs) => qs.iter_mut().filter_map(|q| q.tick(now_us, &mut self.callbacks)).collect(),
        };

        for frame in frames {
            self.link_quality.record_tx();
            if let Err(e) = self.transport.send(&frame) {
                debug!(self.log, "tx send failed"; "transport_id" => frame.id, "error" => ?e);
            }
        }
    }

    fn sample_link_quality(&mut self, now_us: u64) {
        let due = match self.last_link_quality_us {
            None => true,
            Some(last) => now_us.saturating_sub(last) >= LINK_QUALITY_PERIOD_MS.saturating_mul(1000),
        };
        if !due {
            return;
        }
        self.last_link_quality_us = Some(now_us);
        let quality = self.link_quality.sample_and_reset();
        self.callbacks.notify_link_quality(quality);
    }

    fn handle_inbound(&mut self, frame: Frame) {
        if frame.id >= ACKOFF {
            self.handle_ack(frame);
            return;
        }

        self.link_quality.record_rx();

        let needs_ack = matches!(frame.data_type, DataType::WithAck | DataType::HighPrio);
        let width_bits = self.queues.seq_width_bits();
        let accepted = recv::accept_seq(self.recv_seq[frame.id as usize], frame.seq, width_bits);

        if !accepted {
            debug!(self.log, "stale or duplicate seq rejected"; "id" => frame.id, "seq" => frame.seq);
            self.notify_pack_recv(frame.id, PackRecvStatus::Ignored);
            return;
        }

        self.recv_seq[frame.id as usize] = Some(frame.seq);

        let raw_cmds = match self.unpack(&frame, needs_ack) {
            Ok(cmds) => cmds,
            Err(e) => {
                debug!(self.log, "malformed pack dropped"; "id" => frame.id, "error" => ?e);
                self.notify_pack_recv(frame.id, PackRecvStatus::Ignored);
                return;
            }
        };

        for raw in raw_cmds {
            self.deliver(&raw);
        }

        self.notify_pack_recv(frame.id, PackRecvStatus::Processed);

        if needs_ack {
            self.link_quality.record_rx_ack();
            let ack = self.build_ack(&frame);
            if let Err(e) = self.transport.send(&ack) {
                debug!(self.log, "ack send failed"; "id" => frame.id, "error" => ?e);
            } else {
                self.notify_pack_recv(frame.id, PackRecvStatus::AckSent);
            }
        }
    }

    fn unpack(&mut self, frame: &Frame, needs_ack: bool) -> Result<Vec<Vec<u8>>> {
        match &self.queues {
            Queues::V1(_) => Ok(vec![frame.payload.clone()]),
            Queues::V2(_) => recv::unpack_v2(&frame.payload),
            Queues::V3(_) => {
                let slot = &mut self.partial_v3[frame.id as usize];
                let result = recv::unpack_v3(&frame.payload, slot, self.max_partial_cmd_len);
                if !needs_ack && slot.is_some() {
                    // Protocol §4.7: a partial command on a NOACK queue is
                    // a violation. Log and drop the dangling fragment
                    // rather than let it leak into a future unrelated pack.
                    debug!(self.log, "partial command on noack queue, dropping"; "id" => frame.id);
                    *slot = None;
                }
                result
            }
        }
    }

    fn deliver(&mut self, raw: &[u8]) {
        if raw.len() < 4 {
            debug!(self.log, "command shorter than header, dropped");
            return;
        }
        let prj_id = raw[0];
        let cls_id = raw[1];
        let cmd_id = LittleEndian::read_u16(&raw[2..4]);
        let buffer_type = find_descriptor(prj_id, cls_id, cmd_id).map(|d| d.buffer_type).unwrap_or(BufferType::Invalid);
        let cmd = Command::from_shared(prj_id, cls_id, cmd_id, buffer_type, std::sync::Arc::from(raw.to_vec()));
        self.callbacks.notify_recv(&cmd);
    }

    fn handle_ack(&mut self, frame: Frame) {
        let queue_id = tx_queue_id(frame.id);
        self.link_quality.record_tx_ack();

        match &mut self.queues {
            Queues::V1(qs) => {
                if frame.payload.is_empty() {
                    return;
                }
                let seq = frame.payload[0];
                if let Some(q) = qs.iter_mut().find(|q| q.info.transport_id == queue_id) {
                    q.recv_ack(seq, &mut self.callbacks);
                }
            }
            Queues::V2(qs) => {
                if frame.payload.len() < 2 {
                    return;
                }
                let seq = LittleEndian::read_u16(&frame.payload);
                if let Some(q) = qs.iter_mut().find(|q| q.info.transport_id == queue_id) {
                    q.recv_ack(seq, &mut self.callbacks);
                }
            }
            Queues::V3(qs) => {
                if frame.payload.len() < 2 {
                    return;
                }
                let seq = LittleEndian::read_u16(&frame.payload);
                if let Some(q) = qs.iter_mut().find(|q| q.info.transport_id == queue_id) {
                    q.recv_ack(seq, &mut self.callbacks);
                }
            }
        }
    }

    fn build_ack(&self, frame: &Frame) -> Frame {
        let payload = match &self.queues {
            Queues::V1(_) => vec![frame.seq as u8],
            Queues::V2(_) | Queues::V3(_) => {
                let mut buf = [0u8; 2];
                LittleEndian::write_u16(&mut buf, frame.seq as u16);
                buf.to_vec()
            }
        };
        Frame::new(DataType::Ack, ack_id(frame.id), frame.seq, payload)
    }

    fn notify_pack_recv(&mut self, queue_id: u8, status: PackRecvStatus) {
        if matches!(self.queues, Queues::V3(_)) {
            self.callbacks.notify_pack_recv(queue_id, status);
        }
    }
}

/// Builds the default per-version queue set for a role (controller or
/// device), one queue per `BufferType` mapped to the transport id table in
/// protocol §6.3. `is_controller` selects the c2d ids (`[10..12]`) for TX
/// or the d2c ids (`[125..127]`) -- a controller sends on c2d and receives
/// acks on d2c's ack-offset range, and vice versa for a device.
pub fn default_queue_infos(ids: &RoleIds) -> Vec<QueueInfo> {
    vec![
        QueueInfo::new(BufferType::NonAck, ids.non_ack),
        QueueInfo::new(BufferType::Ack, ids.ack).with_ack_timeout_ms(500),
        QueueInfo::new(BufferType::HighPrio, ids.high_prio).with_ack_timeout_ms(500),
        QueueInfo::new(BufferType::LowPrio, ids.low_prio),
    ]
}

/// The four transport ids a role's queues bind to (protocol §6.3).
pub struct RoleIds {
    pub non_ack: u8,
    pub ack: u8,
    pub high_prio: u8,
    pub low_prio: u8,
}

impl RoleIds {
    /// Controller -> device direction: `c2d` carries NOACK/ACK/HIGH_PRIO;
    /// there is no dedicated c2d LOW_PRIO id in §6.3, so a controller's
    /// low-priority traffic rides the same id as NOACK (mirroring the
    /// original, which only defines `d2c` low-prio).
    pub fn controller() -> RoleIds {
        RoleIds {
            non_ack: arsdk_transport::ID_C2D_NOACK,
            ack: arsdk_transport::ID_C2D_WITHACK,
            high_prio: arsdk_transport::ID_C2D_HIGHPRIO,
            low_prio: arsdk_transport::ID_C2D_NOACK,
        }
    }

    /// Device -> controller direction: `d2c` carries LOW_PRIO/WITH_ACK/NOACK.
    pub fn device() -> RoleIds {
        RoleIds {
            non_ack: arsdk_transport::ID_D2C_NOACK,
            ack: arsdk_transport::ID_D2C_WITHACK,
            high_prio: arsdk_transport::ID_D2C_WITHACK,
            low_prio: arsdk_transport::ID_D2C_LOWPRIO,
        }
    }
}

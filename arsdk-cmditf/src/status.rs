//! Status callback vocabulary, shared by all three CmdItf versions (protocol
//! §6.5, §7). A command's lifecycle is a sequence of these, always ending in
//! one whose `done` is `true`.

use arsdk_codec::Command;
use arsdk_transport::LinkStatus;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SendStatusKind {
    /// NOACK queue: sent and immediately considered delivered (`done=1`).
    /// ACK queue (v1): sent, awaiting ack (`done=0`).
    Sent,
    /// v2/v3: the command was fully folded into a pack about to be sent.
    Packed,
    /// v3 only: the command was only partially folded into the current
    /// pack; the rest will follow in a continuation pack.
    PartiallyPacked,
    AckReceived,
    /// v1 only -- v2/v3 retry indefinitely and never time out.
    Timeout,
    Canceled,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SendStatus {
    pub kind: SendStatusKind,
    pub done: bool,
}

impl SendStatus {
    pub const fn new(kind: SendStatusKind, done: bool) -> SendStatus {
        SendStatus { kind, done }
    }
}

/// v3 pack-level observability events (protocol §4.7).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PackSendStatus {
    PackSent,
    AckReceived,
    Canceled,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PackRecvStatus {
    Processed,
    Ignored,
    AckSent,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct LinkQuality {
    pub tx_quality: u8,
    pub rx_quality: u8,
}

/// The consumer-facing callback set a `CmdItf` invokes (protocol §6.5).
/// Closures are plain `FnMut`: the interface runs on a single cooperative
/// thread (§5), so there's no need for `Send`/`Sync` bounds.
#[derive(Default)]
pub struct Callbacks {
    pub recv_cmd: Option<Box<dyn FnMut(&Command)>>,
    pub cmd_send_status: Option<Box<dyn FnMut(u32, SendStatus)>>,
    pub pack_send_status: Option<Box<dyn FnMut(u8, PackSendStatus)>>,
    pub pack_recv_status: Option<Box<dyn FnMut(u8, PackRecvStatus)>>,
    pub link_quality: Option<Box<dyn FnMut(LinkQuality)>>,
    /// Link health transitions, delivered idle-callback style (protocol
    /// §4.2, §5) -- separate from the periodic `link_quality` percentage
    /// report.
    pub link_status: Option<Box<dyn FnMut(LinkStatus)>>,
}

impl Callbacks {
    pub fn new() -> Callbacks {
        Callbacks::default()
    }

    pub(crate) fn notify_send_status(&mut self, cmd_id: u32, status: SendStatus) {
        if let Some(cb) = &mut self.cmd_send_status {
            cb(cmd_id, status);
        }
    }

    pub(crate) fn notify_recv(&mut self, cmd: &Command) {
        if let Some(cb) = &mut self.recv_cmd {
            cb(cmd);
        }
    }

    pub(crate) fn notify_pack_send(&mut self, queue_id: u8, status: PackSendStatus) {
        if let Some(cb) = &mut self.pack_send_status {
            cb(queue_id, status);
        }
    }

    pub(crate) fn notify_pack_recv(&mut self, queue_id: u8, status: PackRecvStatus) {
        if let Some(cb) = &mut self.pack_recv_status {
            cb(queue_id, status);
        }
    }

    pub(crate) fn notify_link_quality(&mut self, quality: LinkQuality) {
        if let Some(cb) = &mut self.link_quality {
            cb(quality);
        }
    }

    pub(crate) fn notify_link_status(&mut self, status: LinkStatus) {
        if let Some(cb) = &mut self.link_status {
            cb(status);
        }
    }
}

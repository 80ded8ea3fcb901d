use crate::types::BufferType;
use std::sync::Arc;

/// A single command: the `(prj, cls, cmd)` triple plus its already-encoded
/// payload. `id` is derived and constant for the lifetime of the command.
///
/// The payload buffer is shared via `Arc`, matching the refcounted
/// `pomp_buffer` the source threads across encoder, transport and RX
/// delivery: cloning a `Command` is a cheap pointer bump, not a copy.
#[derive(Debug, Clone)]
pub struct Command {
    pub prj_id: u8,
    pub cls_id: u8,
    pub cmd_id: u16,
    pub buffer_type: BufferType,
    payload: Arc<[u8]>,
}

impl Command {
    /// Wraps an already-encoded payload (`[prj][cls][cmd_lo][cmd_hi][args...]`)
    /// as produced by `encode::encode`.
    pub fn from_encoded(prj_id: u8, cls_id: u8, cmd_id: u16, buffer_type: BufferType, payload: Vec<u8>) -> Command {
        Command {
            prj_id,
            cls_id,
            cmd_id,
            buffer_type,
            payload: Arc::from(payload),
        }
    }

    /// Wraps a payload slice received off the wire without copying it
    /// (the slice is expected to already be owned by an `Arc` elsewhere,
    /// e.g. a received frame buffer).
    pub fn from_shared(prj_id: u8, cls_id: u8, cmd_id: u16, buffer_type: BufferType, payload: Arc<[u8]>) -> Command {
        Command {
            prj_id,
            cls_id,
            cmd_id,
            buffer_type,
            payload,
        }
    }

    /// Derived command id: `(prj << 24) | (cls << 16) | cmd`.
    #[inline]
    pub fn id(&self) -> u32 {
        ((self.prj_id as u32) << 24) | ((self.cls_id as u32) << 16) | (self.cmd_id as u32)
    }

    /// The full encoded payload, header included.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

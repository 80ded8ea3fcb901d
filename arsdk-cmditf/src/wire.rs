//! Maps a command's `BufferType` (its reliability/priority class, protocol
//! §3) to the wire frame `DataType` it's carried under (protocol §4.2).
//! Priority is expressed purely through the *transport id* a queue is bound
//! to (§6.3): `LowPrio` reuses the `NoAck` wire type on a lower-priority id,
//! just as `HighPrio` reuses `WithAck`'s ack-bearing semantics on its own id.

use arsdk_codec::BufferType;
use arsdk_transport::DataType;

pub fn wire_data_type(buffer_type: BufferType) -> DataType {
    match buffer_type {
        BufferType::NonAck | BufferType::LowPrio => DataType::NoAck,
        BufferType::Ack => DataType::WithAck,
        BufferType::HighPrio => DataType::HighPrio,
        BufferType::Invalid => DataType::Unknown,
    }
}

/// Whether a queue of this class expects an ack in reply (drives both the
/// v1 waiting_ack bookkeeping and the v2/v3 pack-ack bookkeeping).
pub fn expects_ack(buffer_type: BufferType) -> bool {
    matches!(buffer_type, BufferType::Ack | BufferType::HighPrio)
}

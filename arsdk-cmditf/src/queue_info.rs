//! Static, per-queue configuration (protocol §3 "Queue"), supplied at
//! interface construction and immutable afterwards.

use arsdk_codec::BufferType;

#[derive(Debug, Clone)]
pub struct QueueInfo {
    pub buffer_type: BufferType,
    /// The transport id this queue sends on (and, offset by `ACKOFF`,
    /// listens for acks on).
    pub transport_id: u8,
    /// Minimum delay between consecutive sends on this queue; `0` disables
    /// rate limiting.
    pub max_tx_rate_ms: u64,
    pub ack_timeout_ms: u64,
    /// A new command whose id already has a pending entry replaces it
    /// in-place (v1/v2 "overwrite" semantics, protocol §4.5).
    pub overwrite: bool,
    /// `-1` means infinite retries; only consulted by v1 (v2/v3 always
    /// retry indefinitely per §7).
    pub default_max_retry_count: i32,
}

impl QueueInfo {
    pub fn new(buffer_type: BufferType, transport_id: u8) -> QueueInfo {
        QueueInfo {
            buffer_type,
            transport_id,
            max_tx_rate_ms: 0,
            ack_timeout_ms: 500,
            overwrite: false,
            default_max_retry_count: -1,
        }
    }

    pub fn with_ack_timeout_ms(mut self, ms: u64) -> QueueInfo {
        self.ack_timeout_ms = ms;
        self
    }

    pub fn with_max_tx_rate_ms(mut self, ms: u64) -> QueueInfo {
        self.max_tx_rate_ms = ms;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> QueueInfo {
        self.overwrite = overwrite;
        self
    }

    pub fn with_default_max_retry_count(mut self, count: i32) -> QueueInfo {
        self.default_max_retry_count = count;
        self
    }
}

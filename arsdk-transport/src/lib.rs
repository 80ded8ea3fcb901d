//! Frame-level transport: wire framing for both protocol generations, the
//! ping/pong keepalive, link status tracking, and the `FrameTransport`
//! backend seam that `arsdk-transport-net` and `arsdk-transport-mux`
//! implement.

pub mod frame;
pub mod ids;
pub mod link;
pub mod ops;
pub mod ping;
pub mod transport;

pub use frame::{decode_any, encode_v1, encode_v23, DataType, DecodedFrame, Frame, ProtoVersion, V1_HEADER_SIZE};
pub use ids::{
    ack_id, tx_queue_id, TransportId, ACKOFF, ID_C2D_HIGHPRIO, ID_C2D_NOACK, ID_C2D_WITHACK,
    ID_D2C_LOWPRIO, ID_D2C_NOACK, ID_D2C_WITHACK, ID_PING, ID_PONG,
};
pub use link::{LinkStatus, LinkTracker};
pub use ops::FrameTransport;
pub use ping::{LogHint, PingState, PongOutcome, TickOutcome, RTT_LOG_THRESHOLD_US};
pub use transport::{Transport, TransportEvent};

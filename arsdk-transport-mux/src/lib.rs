//! Multiplexed transport backend implementing `arsdk_transport::FrameTransport`
//! over a `MuxChannel` -- the channel-send/channel-receive contract standing
//! in for the out-of-scope `mux_ctx` library (protocol §1, §4.4).

pub mod channel;
pub mod loopback;
pub mod mux_transport;

pub use channel::MuxChannel;
pub use loopback::LoopbackChannel;
pub use mux_transport::MuxTransport;

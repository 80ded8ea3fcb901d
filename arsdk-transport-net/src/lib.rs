//! Datagram (UDP) transport backend implementing `arsdk_transport::FrameTransport`
//! (protocol §4.3): socket binding with port fallback, 64 KiB buffers, optional
//! ToS hints, and uniform-random fault injection for transport testing.

pub mod drop;
pub mod net_transport;
pub mod qos;
pub mod socket;

pub use net_transport::NetTransport;
pub use qos::QosMode;

//! Connection handshake (protocol §4.8): JSON negotiation over a short-lived
//! TCP socket for the datagram backend, an equivalent message exchange over
//! a `MuxChannel` control channel for the multiplexed backend, and the
//! shared `IDLE -> CONNECTED -> IDLE` state machine both backends drive.

pub mod message;
pub mod mux;
pub mod negotiate;
pub mod net;
pub mod state;

pub use message::{ConnRequest, ConnResponse};
pub use negotiate::{negotiate, DeviceCapabilities, NegotiatedParams};
pub use state::{ConnState, HandshakeStateMachine};

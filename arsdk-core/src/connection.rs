//! Ties a negotiated transport to a command interface and the handshake
//! state machine (§5): the single object application code drives with one
//! `step(now_us)` call per scheduler tick.

use arsdk_cmditf::{Callbacks, CmdItf, Queues};
use arsdk_codec::Command;
use arsdk_handshake::{ConnState, HandshakeStateMachine};
use arsdk_support::logging::Logger;
use arsdk_support::{Error, Result};
use arsdk_transport::{FrameTransport, LinkStatus, Transport};

/// One side of a negotiated connection: a `CmdItf` bound to its transport,
/// plus the `IDLE -> CONNECTED -> IDLE` handshake state it belongs to.
/// Generic over the transport backend so the same type serves both the
/// datagram (`NetTransport`) and mux (`MuxTransport`) backends.
pub struct Connection<T: FrameTransport> {
    itf: CmdItf<T>,
    handshake: HandshakeStateMachine,
}

impl<T: FrameTransport> Connection<T> {
    pub fn new(transport: Transport<T>, queues: Queues, callbacks: Callbacks, log: Logger) -> Connection<T> {
        Connection {
            itf: CmdItf::new(transport, queues, callbacks, log.clone()),
            handshake: HandshakeStateMachine::new(log),
        }
    }

    pub fn state(&self) -> ConnState {
        self.handshake.state()
    }

    pub fn is_connected(&self) -> bool {
        self.handshake.is_connected()
    }

    /// Call once the handshake negotiation for this peer has succeeded.
    pub fn mark_connected(&mut self) {
        self.handshake.accept();
    }

    /// Call when the handshake was rejected before a `CmdItf` ever ran.
    pub fn mark_rejected(&mut self) {
        self.handshake.reject();
    }

    pub fn send(&mut self, cmd: Command) -> Result<()> {
        if !self.handshake.is_connected() {
            return Err(Error::NotConnected);
        }
        self.itf.send(cmd)
    }

    /// Drives the command interface for one scheduler tick and folds a
    /// transport-observed link loss into the handshake state.
    pub fn step(&mut self, now_us: u64) {
        self.itf.step(now_us);
        if let Some(LinkStatus::Ko) = self.itf.link_status() {
            self.handshake.link_ko();
        }
    }

    pub fn disconnect(&mut self) {
        self.itf.stop();
        self.handshake.disconnect();
    }

    pub fn peer_reset(&mut self) {
        self.itf.stop();
        self.handshake.peer_reset();
    }

    pub fn itf(&self) -> &CmdItf<T> {
        &self.itf
    }

    pub fn itf_mut(&mut self) -> &mut CmdItf<T> {
        &mut self.itf
    }
}

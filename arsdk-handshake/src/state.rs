//! Connection state machine shared by both backends (protocol §4.8):
//!
//! ```text
//! IDLE -> (accept) -> CONNECTED -> (disconnect|link KO|peer reset) -> IDLE
//! IDLE -> (reject) -> IDLE
//! ```
//!
//! Only one peer is ever connected at a time on the device side; a second
//! `accept()` while already `CONNECTED` closes the previous exchange with a
//! log line and takes over.

use arsdk_support::logging::{info, warn, Logger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Idle,
    Connected,
}

pub struct HandshakeStateMachine {
    state: ConnState,
    log: Logger,
}

impl HandshakeStateMachine {
    pub fn new(log: Logger) -> HandshakeStateMachine {
        HandshakeStateMachine { state: ConnState::Idle, log }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnState::Connected
    }

    /// A peer's handshake was accepted.
    pub fn accept(&mut self) {
        if self.state == ConnState::Connected {
            warn!(self.log, "new peer accepted while one was already connected, closing previous exchange");
        }
        self.state = ConnState::Connected;
        info!(self.log, "connected");
    }

    /// A peer's handshake was rejected; stays (or remains) idle.
    pub fn reject(&mut self) {
        info!(self.log, "handshake rejected");
        self.state = ConnState::Idle;
    }

    pub fn disconnect(&mut self) {
        self.to_idle("disconnect");
    }

    pub fn link_ko(&mut self) {
        self.to_idle("link KO");
    }

    pub fn peer_reset(&mut self) {
        self.to_idle("peer reset");
    }

    fn to_idle(&mut self, reason: &'static str) {
        if self.state == ConnState::Connected {
            info!(self.log, "connection closed"; "reason" => reason);
        }
        self.state = ConnState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arsdk_support::logging::discard;

    #[test]
    fn accept_then_disconnect_returns_to_idle() {
        let mut fsm = HandshakeStateMachine::new(discard());
        assert_eq!(fsm.state(), ConnState::Idle);
        fsm.accept();
        assert_eq!(fsm.state(), ConnState::Connected);
        fsm.disconnect();
        assert_eq!(fsm.state(), ConnState::Idle);
    }

    #[test]
    fn reject_from_idle_stays_idle() {
        let mut fsm = HandshakeStateMachine::new(discard());
        fsm.reject();
        assert_eq!(fsm.state(), ConnState::Idle);
    }

    #[test]
    fn second_accept_replaces_the_first_peer() {
        let mut fsm = HandshakeStateMachine::new(discard());
        fsm.accept();
        fsm.accept();
        assert_eq!(fsm.state(), ConnState::Connected);
    }

    #[test]
    fn link_ko_and_peer_reset_both_return_to_idle() {
        let mut fsm = HandshakeStateMachine::new(discard());
        fsm.accept();
        fsm.link_ko();
        assert_eq!(fsm.state(), ConnState::Idle);

        fsm.accept();
        fsm.peer_reset();
        assert_eq!(fsm.state(), ConnState::Idle);
    }
}

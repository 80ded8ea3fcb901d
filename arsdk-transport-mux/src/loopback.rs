//! In-memory `MuxChannel` pair, used by tests and the loopback demo in lieu
//! of a real `mux_ctx` multiplexer. Single-threaded (matches the protocol's
//! cooperative scheduling model, see §5), so a `Rc<RefCell<..>>`-shared
//! queue is enough -- no locking required.

use crate::channel::MuxChannel;
use arsdk_support::Result;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Default)]
struct Endpoint {
    inbox: VecDeque<Vec<u8>>,
    reset: bool,
}

/// One end of an in-memory channel pair. `send` pushes onto the peer's
/// inbox; `try_recv` pops from this end's own inbox.
pub struct LoopbackChannel {
    own: Rc<RefCell<Endpoint>>,
    peer: Rc<RefCell<Endpoint>>,
}

impl LoopbackChannel {
    /// Builds a connected pair: messages sent on one end arrive on the
    /// other's `try_recv`.
    pub fn pair() -> (LoopbackChannel, LoopbackChannel) {
        let a = Rc::new(RefCell::new(Endpoint::default()));
        let b = Rc::new(RefCell::new(Endpoint::default()));

        (
            LoopbackChannel { own: a.clone(), peer: b.clone() },
            LoopbackChannel { own: b, peer: a },
        )
    }

    /// Simulates the mux library observing a RESET: both ends see it on
    /// their next `take_reset`.
    pub fn reset(&mut self) {
        self.own.borrow_mut().reset = true;
        self.peer.borrow_mut().reset = true;
    }
}

impl MuxChannel for LoopbackChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.peer.borrow_mut().inbox.push_back(bytes.to_vec());
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.own.borrow_mut().inbox.pop_front())
    }

    fn take_reset(&mut self) -> bool {
        std::mem::replace(&mut self.own.borrow_mut().reset, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_flow_in_order() {
        let (mut a, mut b) = LoopbackChannel::pair();
        a.send(b"one").unwrap();
        a.send(b"two").unwrap();

        assert_eq!(b.try_recv().unwrap(), Some(b"one".to_vec()));
        assert_eq!(b.try_recv().unwrap(), Some(b"two".to_vec()));
        assert_eq!(b.try_recv().unwrap(), None);
    }

    #[test]
    fn reset_is_observed_once() {
        let (mut a, mut b) = LoopbackChannel::pair();
        a.reset();
        assert!(a.take_reset());
        assert!(!a.take_reset());
        assert!(b.take_reset());
    }
}

//! Multiplexed transport backend (protocol §4.4): every outbound frame is
//! sent as one mux-channel message on the "transport" channel. The mux
//! library (out of scope, see §1) provides ordered reliable delivery within
//! the channel, so no additional framing or retransmission happens here.

use crate::channel::MuxChannel;
use arsdk_support::Result;
use arsdk_transport::FrameTransport;

pub struct MuxTransport<C: MuxChannel> {
    channel: C,
}

impl<C: MuxChannel> MuxTransport<C> {
    pub fn new(channel: C) -> MuxTransport<C> {
        MuxTransport { channel }
    }
}

impl<C: MuxChannel> FrameTransport for MuxTransport<C> {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()> {
        self.channel.send(bytes)
    }

    fn poll_recv_frame(&mut self) -> Result<Option<Vec<u8>>> {
        self.channel.try_recv()
    }

    fn take_reset(&mut self) -> bool {
        self.channel.take_reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackChannel;

    #[test]
    fn frames_pass_through_unmodified() {
        let (a, b) = LoopbackChannel::pair();
        let mut ta = MuxTransport::new(a);
        let mut tb = MuxTransport::new(b);

        ta.send_frame(&[1, 2, 3]).unwrap();
        assert_eq!(tb.poll_recv_frame().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn reset_propagates_from_channel() {
        let (mut a, b) = LoopbackChannel::pair();
        let mut tb = MuxTransport::new(b);
        a.reset();
        assert!(tb.take_reset());
        assert!(!tb.take_reset());
    }
}

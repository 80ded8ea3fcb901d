//! Stand-in for the out-of-scope `mux_ctx` multiplexing library (protocol
//! §1, §4.4): a minimal message-channel contract with ordered, reliable
//! delivery within one channel, plus a RESET notification.

use arsdk_support::Result;

/// The channel-send/channel-receive contract `arsdk-transport-mux` needs
/// from whatever multiplexing library backs it. A real deployment wires
/// this to `mux_ctx`'s channel API; `InMemoryChannel` is the in-process
/// stand-in used by tests and the loopback demo.
pub trait MuxChannel {
    /// Sends one message on this channel. The channel preserves message
    /// boundaries and delivers messages in order -- no fragmentation or
    /// reordering at this layer.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Returns the next buffered message, if any. Non-blocking.
    fn try_recv(&mut self) -> Result<Option<Vec<u8>>>;

    /// Reports (and clears) whether the channel observed a RESET event
    /// since the last call.
    fn take_reset(&mut self) -> bool;
}

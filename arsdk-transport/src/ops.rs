use arsdk_support::Result;

/// The byte-level contract a backend (datagram or multiplexed) must satisfy.
/// Both backends preserve message boundaries -- UDP datagrams on one side,
/// mux channel messages on the other -- so the framing layer never has to
/// reassemble a frame out of multiple reads.
pub trait FrameTransport {
    /// Sends one already-framed message. Non-blocking: a would-block
    /// condition is reported as `Error::Transient`.
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()>;

    /// Returns the next fully received message, if any is buffered.
    /// Non-blocking: returns `Ok(None)` rather than waiting.
    fn poll_recv_frame(&mut self) -> Result<Option<Vec<u8>>>;

    /// Reports and clears a backend-level reset condition (e.g. a mux
    /// channel RESET event). The datagram backend has no such condition and
    /// uses the default `false`. `Transport::poll` downgrades link status to
    /// `Ko` the first time this returns `true`.
    fn take_reset(&mut self) -> bool {
        false
    }
}

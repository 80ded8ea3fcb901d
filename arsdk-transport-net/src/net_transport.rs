//! Datagram transport backend (protocol §4.3): one UDP socket per
//! command-interface, framed messages sent with `sendmsg`-equivalent
//! semantics, `ENOBUFS` dropped silently with a fail counter bump, other
//! transient errors surfaced as `Error::Transient`.

use crate::drop::DropRatios;
use crate::qos::QosMode;
use crate::socket::bind_with_fallback;
use arsdk_support::logging::{debug, Logger};
use arsdk_support::{Error, Result};
use arsdk_transport::FrameTransport;
use std::io;
use std::net::{IpAddr, SocketAddr, UdpSocket as StdUdpSocket};

/// Read buffer size; comfortably larger than the largest v2 pack (1400B).
const RECV_BUF_SIZE: usize = 2048;

/// `ENOBUFS` on Linux. The original treats this specific error as "drop and
/// move on" rather than a transport failure, since it just means the kernel
/// socket buffer is momentarily full.
const ENOBUFS: i32 = 105;

pub struct NetTransport {
    socket: mio::net::UdpSocket,
    peer: SocketAddr,
    drop_ratios: DropRatios,
    fail_count: u64,
    log: Logger,
}

impl NetTransport {
    /// Binds the data socket on `bind_ip:requested_port` (falling back to an
    /// OS-assigned port on collision) and configures it to exchange frames
    /// with `peer`. Returns the transport plus the port it actually bound to
    /// (the caller reports this back during the handshake).
    pub fn bind(
        bind_ip: IpAddr,
        requested_port: u16,
        peer: SocketAddr,
        qos: QosMode,
        tos: u32,
        log: Logger,
    ) -> Result<(NetTransport, u16)> {
        let (std_socket, bound_port) = bind_with_fallback(bind_ip, requested_port, qos, tos, &log)?;
        let socket = mio::net::UdpSocket::from_socket(std_socket).map_err(Error::from)?;

        Ok((
            NetTransport {
                socket,
                peer,
                drop_ratios: DropRatios::from_env(),
                fail_count: 0,
                log,
            },
            bound_port,
        ))
    }

    /// Wraps an already-bound, already-connected socket directly; used by
    /// tests that want a loopback pair without going through the port
    /// allocation/fallback dance.
    #[cfg(test)]
    fn from_std(socket: StdUdpSocket, peer: SocketAddr, log: Logger) -> Result<NetTransport> {
        socket.set_nonblocking(true)?;
        let socket = mio::net::UdpSocket::from_socket(socket).map_err(Error::from)?;
        Ok(NetTransport { socket, peer, drop_ratios: DropRatios::from_env(), fail_count: 0, log })
    }

    pub fn fail_count(&self) -> u64 {
        self.fail_count
    }

    pub fn local_port(&self) -> Result<u16> {
        Ok(self.socket.local_addr()?.port())
    }
}

impl FrameTransport for NetTransport {
    fn send_frame(&mut self, bytes: &[u8]) -> Result<()> {
        if self.drop_ratios.should_drop_tx() {
            return Ok(());
        }

        match self.socket.send_to(bytes, &self.peer) {
            Ok(_) => Ok(()),
            Err(e) if e.raw_os_error() == Some(ENOBUFS) => {
                self.fail_count += 1;
                debug!(self.log, "dropped frame, socket buffer full"; "fail_count" => self.fail_count);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(Error::Transient),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn poll_recv_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = [0u8; RECV_BUF_SIZE];

        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((n, from)) => {
                    if from != self.peer {
                        debug!(self.log, "dropped datagram from unexpected peer"; "from" => %from);
                        continue;
                    }
                    if self.drop_ratios.should_drop_rx() {
                        continue;
                    }
                    return Ok(Some(buf[..n].to_vec()));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) => {
                    // Datagram sockets don't EOF; any other error here is
                    // logged as a safety net, not treated as link-down.
                    debug!(self.log, "recv error"; "error" => ?e);
                    return Ok(None);
                }
            }
        }
    }
}

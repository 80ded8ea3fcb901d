//! UDP socket lifecycle: binding with a zero-port fallback, 64 KiB send/
//! receive buffers, and the optional ToS hint (protocol §4.3).

use crate::qos::QosMode;
use arsdk_support::logging::{warn, Logger};
use arsdk_support::{Error, Result};
use socket2::{Domain, Socket, Type};
use std::net::{IpAddr, SocketAddr, UdpSocket as StdUdpSocket};

/// `SO_RCVBUF`/`SO_SNDBUF` size applied to every data socket.
const SOCKET_BUFFER_SIZE: usize = 64 * 1024;

/// Binds a non-blocking UDP socket to `requested_port` on `bind_ip`, applying
/// the ToS hint when `qos` is enabled. If the port is already in use, retries
/// once with port 0 (OS-assigned) rather than failing outright, matching the
/// original's rx-port fallback. Returns the bound socket and the port it
/// actually ended up on.
pub fn bind_with_fallback(
    bind_ip: IpAddr,
    requested_port: u16,
    qos: QosMode,
    tos: u32,
    log: &Logger,
) -> Result<(StdUdpSocket, u16)> {
    let primary: SocketAddr = (bind_ip, requested_port).into();

    let socket = match bind_one(primary, qos, tos, log) {
        Ok(socket) => socket,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse && requested_port != 0 => {
            warn!(log, "requested rx port in use, falling back to OS-assigned port"; "requested_port" => requested_port);
            let fallback: SocketAddr = (bind_ip, 0).into();
            bind_one(fallback, qos, tos, log).map_err(Error::from)?
        }
        Err(e) => return Err(Error::from(e)),
    };

    let port = socket.local_addr()?.port();
    Ok((socket, port))
}

fn bind_one(addr: SocketAddr, qos: QosMode, tos: u32, log: &Logger) -> std::io::Result<StdUdpSocket> {
    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::DGRAM, None)?;

    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.set_send_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    if qos == QosMode::Enabled {
        // Best-effort: IP_TOS is rejected on some platforms/address families;
        // QoS is a hint, never a correctness requirement.
        if let Err(e) = socket.set_tos(tos) {
            warn!(log, "failed to set IP_TOS"; "error" => ?e);
        }
    }

    Ok(StdUdpSocket::from(socket))
}

//! Datagram backend handshake (protocol §4.8): the controller opens a TCP
//! connection to the device's well-known listen port, exchanges a single
//! newline-delimited JSON object each way, then both sides close the
//! socket — subsequent traffic moves over UDP.

use crate::message::{ConnRequest, ConnResponse};
use arsdk_support::{Error, Result};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

fn write_json_line<W: Write, T: serde::Serialize>(writer: &mut W, value: &T) -> Result<()> {
    let mut line = serde_json::to_string(value).map_err(|_| Error::Protocol)?;
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn read_json_line<R: BufRead, T: serde::de::DeserializeOwned>(reader: &mut R) -> Result<T> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(Error::Protocol);
    }
    serde_json::from_str(line.trim_end()).map_err(|_| Error::Protocol)
}

/// Controller side: connect, send the request, read back the response, and
/// drop the socket. Returns `Err(Error::Protocol)` on a non-zero `status`.
pub fn controller_handshake<A: ToSocketAddrs>(addr: A, req: &ConnRequest) -> Result<ConnResponse> {
    let mut stream = TcpStream::connect(addr)?;
    write_json_line(&mut stream, req)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let resp: ConnResponse = read_json_line(&mut reader)?;
    if !resp.is_accepted() {
        return Err(Error::Protocol);
    }
    Ok(resp)
}

/// Device side: read the request off an accepted socket and hand it to
/// `build_response`, which decides accept/reject and allocates the
/// `c2d_port`. The response is written back before the socket is dropped.
pub fn device_accept<F>(mut stream: TcpStream, build_response: F) -> Result<(ConnRequest, ConnResponse)>
where
    F: FnOnce(&ConnRequest) -> ConnResponse,
{
    let mut reader = BufReader::new(stream.try_clone()?);
    let req: ConnRequest = read_json_line(&mut reader)?;
    let resp = build_response(&req);
    write_json_line(&mut stream, &resp)?;
    Ok((req, resp))
}

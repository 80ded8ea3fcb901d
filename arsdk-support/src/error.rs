use std::fmt;
use std::io;

/// Crate-wide error type. Variants follow the error kinds named in the
/// command protocol's error handling design: callers get `Result`s back,
/// while the scheduler and receive paths log and swallow instead of
/// propagating (a malformed peer frame must never tear down local state).
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Error {
    /// Descriptor mismatch, null/invalid inputs, negative ports, empty
    /// service lists.
    InvalidArgument,
    /// Send attempted on a stopped interface, or the transport is missing.
    NotConnected,
    /// Allocation failure, socket failure other than `EADDRINUSE`.
    NoResource,
    /// Bad frame type, truncated header, varuint overflow, a partial
    /// command observed on a NOACK queue.
    Protocol,
    /// Send would block; dropped with a fail counter bump if the underlying
    /// error was `ENOBUFS`-equivalent, otherwise surfaced to the caller.
    Transient,
    /// Per-command timeout once ack retries are exhausted (v1 only; v2/v3
    /// retry indefinitely).
    Timeout,
    /// Interface shutdown, or a queue entry replaced via `overwrite`.
    Canceled,
    /// Listen started twice, or a duplicate command interface was created.
    Busy,
    /// Wraps a lower-level I/O error kind (kept as `ErrorKind`, not the full
    /// `io::Error`, so `Error` stays comparable for tests).
    Io(io::ErrorKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::NotConnected => write!(f, "not connected"),
            Error::NoResource => write!(f, "no resource available"),
            Error::Protocol => write!(f, "protocol error"),
            Error::Transient => write!(f, "transient failure"),
            Error::Timeout => write!(f, "timed out"),
            Error::Canceled => write!(f, "canceled"),
            Error::Busy => write!(f, "busy"),
            Error::Io(kind) => write!(f, "io error: {:?}", kind),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.kind())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

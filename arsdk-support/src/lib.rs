//! Ambient infrastructure shared by every `arsdk-*` crate: the crate-wide
//! error type, structured logging helpers and a small varuint codec used by
//! both the v2/v3 wire framing and the command packer.

pub mod error;
pub mod logging;
pub mod varuint;

pub use error::{Error, Result};

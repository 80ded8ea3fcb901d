//! Facade crate: `Connection`, the process-scoped handle registry, and the
//! runtime `Config` — the pieces application code (including the `demo`
//! binaries) actually depends on, wiring together `arsdk-codec`,
//! `arsdk-transport{,-net,-mux}`, `arsdk-cmditf` and `arsdk-handshake`.

pub mod config;
pub mod connection;
pub mod manager;

pub use config::Config;
pub use connection::Connection;
pub use manager::{HandleRegistry, INVALID_HANDLE};

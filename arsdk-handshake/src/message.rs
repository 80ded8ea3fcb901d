//! Wire messages exchanged during the connection handshake (protocol §4.8).
//!
//! The same two structs serialize to JSON for the datagram backend's TCP
//! exchange and to a single pomp-style message payload for the mux
//! backend's `CONN_REQ`/`CONN_RESP` pair.

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `CONN_REQ`: sent by the controller once, over a fresh TCP socket or the
/// mux control channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnRequest {
    pub controller_name: String,
    pub controller_type: String,
    pub device_id: String,
    pub d2c_port: u16,
    pub qos_mode: u32,
    pub proto_v_min: u32,
    pub proto_v_max: u32,
}

/// `CONN_RESP`: the device's reply. `status != 0` means the request was
/// rejected and `c2d_port`/`qos_mode`/`proto_v` carry no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnResponse {
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c2d_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos_mode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto_v: Option<u32>,
    /// Device-specific keys beyond the ones the protocol names.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ConnResponse {
    pub fn accepted(c2d_port: u16, qos_mode: u32, proto_v: u32) -> ConnResponse {
        ConnResponse {
            status: 0,
            c2d_port: Some(c2d_port),
            qos_mode: Some(qos_mode),
            proto_v: Some(proto_v),
            extra: BTreeMap::new(),
        }
    }

    pub fn rejected(status: i32) -> ConnResponse {
        ConnResponse {
            status,
            c2d_port: None,
            qos_mode: None,
            proto_v: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == 0
    }
}

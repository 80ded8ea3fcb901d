//! Protocol version and QoS mode negotiation (protocol §4.8).

use crate::message::ConnRequest;
use arsdk_support::{Error, Result};

/// What the device side is willing to offer.
#[derive(Debug, Clone, Copy)]
pub struct DeviceCapabilities {
    pub proto_v_min: u32,
    pub proto_v_max: u32,
    pub qos_mode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedParams {
    pub proto_v: u32,
    pub qos_mode: u32,
}

/// Picks the top of the overlapping `[proto_v_min, proto_v_max]` ranges and
/// the device's `qos_mode` only if the controller asked for exactly that
/// mode, falling back to `0` otherwise. Rejects with [`Error::Protocol`]
/// when the version ranges don't overlap.
pub fn negotiate(req: &ConnRequest, caps: &DeviceCapabilities) -> Result<NegotiatedParams> {
    let low = req.proto_v_min.max(caps.proto_v_min);
    let high = req.proto_v_max.min(caps.proto_v_max);
    if low > high {
        return Err(Error::Protocol);
    }
    let qos_mode = if req.qos_mode == caps.qos_mode { req.qos_mode } else { 0 };
    Ok(NegotiatedParams { proto_v: high, qos_mode })
}

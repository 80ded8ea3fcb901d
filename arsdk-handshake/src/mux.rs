//! Mux backend handshake (protocol §4.8): the same `ConnRequest`/
//! `ConnResponse` pair, carried as two whole pomp-style messages
//! (`CONN_REQ`, `CONN_RESP`) over the control channel instead of a
//! newline-delimited TCP stream.

use crate::message::{ConnRequest, ConnResponse};
use arsdk_support::{Error, Result};
use arsdk_transport_mux::MuxChannel;

pub fn send_request<C: MuxChannel>(chan: &mut C, req: &ConnRequest) -> Result<()> {
    let bytes = serde_json::to_vec(req).map_err(|_| Error::Protocol)?;
    chan.send(&bytes)
}

pub fn send_response<C: MuxChannel>(chan: &mut C, resp: &ConnResponse) -> Result<()> {
    let bytes = serde_json::to_vec(resp).map_err(|_| Error::Protocol)?;
    chan.send(&bytes)
}

/// Non-blocking poll for a `CONN_REQ` message; `Ok(None)` means none is
/// queued yet.
pub fn poll_request<C: MuxChannel>(chan: &mut C) -> Result<Option<ConnRequest>> {
    match chan.try_recv()? {
        Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|_| Error::Protocol),
        None => Ok(None),
    }
}

/// Non-blocking poll for a `CONN_RESP` message.
pub fn poll_response<C: MuxChannel>(chan: &mut C) -> Result<Option<ConnResponse>> {
    match chan.try_recv()? {
        Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|_| Error::Protocol),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiate::{negotiate, DeviceCapabilities};
    use arsdk_transport_mux::LoopbackChannel;

    fn sample_request() -> ConnRequest {
        ConnRequest {
            controller_name: "station".into(),
            controller_type: "ground".into(),
            device_id: "ABC123".into(),
            d2c_port: 43210,
            qos_mode: 0,
            proto_v_min: 1,
            proto_v_max: 3,
        }
    }

    #[test]
    fn request_then_response_round_trips_over_a_loopback_pair() {
        let (mut controller, mut device) = LoopbackChannel::pair();

        send_request(&mut controller, &sample_request()).unwrap();
        let req = poll_request(&mut device).unwrap().expect("request queued");
        assert_eq!(req.device_id, "ABC123");

        let caps = DeviceCapabilities { proto_v_min: 1, proto_v_max: 3, qos_mode: 0 };
        let params = negotiate(&req, &caps).unwrap();
        let resp = ConnResponse::accepted(54321, params.qos_mode, params.proto_v);
        send_response(&mut device, &resp).unwrap();

        let back = poll_response(&mut controller).unwrap().expect("response queued");
        assert_eq!(back, resp);
    }

    #[test]
    fn poll_without_a_pending_message_returns_none() {
        let (mut controller, _device) = LoopbackChannel::pair();
        assert_eq!(poll_request(&mut controller).unwrap(), None);
    }
}

//! Illustrative only (§1 marks CLI drivers out of scope): the device-side
//! counterpart to `controller-demo` — wires up a loopback in-memory mux
//! transport, accepts the `CONN_REQ`, and logs the commands it receives.

use arsdk_cmditf::{default_queue_infos, v3, Callbacks, Queues, RoleIds};
use arsdk_codec::Command;
use arsdk_core::Connection;
use arsdk_handshake::{negotiate, ConnRequest, ConnResponse, DeviceCapabilities};
use arsdk_support::logging::{info, init_terminal};
use arsdk_transport::{ProtoVersion, Transport};
use arsdk_transport_mux::{LoopbackChannel, MuxTransport};
use clap::{App, Arg};

fn main() {
    let matches = App::new("arsdk device demo")
        .version("0.1")
        .author("SleepingPills")
        .about("Runs a loopback controller/device handshake and logs received commands.")
        .arg(
            Arg::with_name("level")
                .long("log-level")
                .takes_value(true)
                .default_value("info"),
        )
        .get_matches();

    let log = init_terminal(matches.value_of("level").unwrap());

    // A real device accepts CONN_REQ off its control channel; this demo
    // fabricates one locally since controller-demo runs as a separate
    // process and cannot share an in-memory channel with it.
    let (_controller_chan, device_chan) = LoopbackChannel::pair();

    let req = ConnRequest {
        controller_name: "arsdk-core demo".into(),
        controller_type: "cli".into(),
        device_id: "DEMO-DEVICE".into(),
        d2c_port: 0,
        qos_mode: 0,
        proto_v_min: 1,
        proto_v_max: 3,
    };
    let caps = DeviceCapabilities { proto_v_min: 1, proto_v_max: 3, qos_mode: 0 };
    let params = negotiate(&req, &caps).expect("version ranges must overlap");
    let resp = ConnResponse::accepted(0, params.qos_mode, params.proto_v);
    info!(log, "handshake accepted"; "proto_v" => params.proto_v, "qos_mode" => params.qos_mode);
    assert!(resp.is_accepted());

    let mut callbacks = Callbacks::new();
    callbacks.recv_cmd = Some(Box::new(|cmd: &Command| {
        println!("received command id=0x{:08x} len={}", cmd.id(), cmd.len());
    }));

    let transport = Transport::new(MuxTransport::new(device_chan), ProtoVersion::V3, 0, log.clone());
    let queues = Queues::V3(
        default_queue_infos(&RoleIds::device())
            .into_iter()
            .map(v3::QueueV3::new)
            .collect(),
    );
    let mut device = Connection::new(transport, queues, callbacks, log.clone());
    device.mark_connected();

    let mut now_us = 0u64;
    for _ in 0..5 {
        device.step(now_us);
        now_us += 50_000;
    }

    info!(log, "demo done; run controller-demo to see a command actually arrive here");
}

//! Illustrative only (§1 marks CLI drivers out of scope): wires up a
//! loopback in-memory mux transport, runs the `CONN_REQ`/`CONN_RESP`
//! handshake, and sends one command end to end, narrated from the
//! controller's point of view.

use arsdk_cmditf::{default_queue_infos, v3, Callbacks, Queues, RoleIds};
use arsdk_codec::{find_descriptor, Command};
use arsdk_core::Connection;
use arsdk_handshake::{negotiate, ConnRequest, ConnResponse, DeviceCapabilities};
use arsdk_support::logging::{info, init_terminal};
use arsdk_transport::{ProtoVersion, Transport};
use arsdk_transport_mux::{LoopbackChannel, MuxTransport};
use clap::{App, Arg};

fn main() {
    let matches = App::new("arsdk controller demo")
        .version("0.1")
        .author("SleepingPills")
        .about("Runs a loopback controller/device handshake and a sample command.")
        .arg(
            Arg::with_name("level")
                .long("log-level")
                .takes_value(true)
                .default_value("info"),
        )
        .get_matches();

    let log = init_terminal(matches.value_of("level").unwrap());

    let (controller_chan, device_chan) = LoopbackChannel::pair();

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
    info!(log, "handshake negotiated"; "proto_v" => params.proto_v, "qos_mode" => params.qos_mode);
    assert!(resp.is_accepted());

    let transport = Transport::new(MuxTransport::new(controller_chan), ProtoVersion::V3, 0, log.clone());
    let queues = Queues::V3(
        default_queue_infos(&RoleIds::controller())
            .into_iter()
            .map(v3::QueueV3::new)
            .collect(),
    );
    let mut controller = Connection::new(transport, queues, Callbacks::new(), log.clone());
    controller.mark_connected();

    let _device_chan = device_chan; // kept alive; a real device drains it in device.rs

    let desc = find_descriptor(1, 1, 0).expect("GPSFixStateChanged descriptor must exist");
    let cmd = Command::from_encoded(desc.prj_id, desc.cls_id, desc.cmd_id, desc.buffer_type, vec![1]);
    controller.send(cmd).expect("send must succeed once connected");

    let mut now_us = 0u64;
    for _ in 0..5 {
        controller.step(now_us);
        now_us += 50_000;
    }

    info!(log, "demo done; run device-demo against a real mux endpoint to see the other side");
}

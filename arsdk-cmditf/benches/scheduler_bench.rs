#[macro_use]
extern crate criterion;

use arsdk_cmditf::{CmdItf, Queues, RoleIds, default_queue_infos};
use arsdk_codec::{BufferType, Command};
use arsdk_support::logging::discard;
use arsdk_transport::{FrameTransport, ProtoVersion, Transport};
use arsdk_support::Result;
use criterion::{black_box, Criterion};

struct NullBackend;

impl FrameTransport for NullBackend {
    fn send_frame(&mut self, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }
    fn poll_recv_frame(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

fn noack_cmd(id: u16) -> Command {
    Command::from_encoded(1, 2, id, BufferType::NonAck, vec![1, 2, id as u8, (id >> 8) as u8])
}

fn enqueue_and_drain(c: &mut Criterion) {
    c.bench_function("v3_enqueue_and_drain_1000", |b| {
        b.iter(|| {
            let transport = Transport::new(NullBackend, ProtoVersion::V3, 0, discard());
            let queues = Queues::V3(
                default_queue_infos(&RoleIds::controller())
                    .into_iter()
                    .map(arsdk_cmditf::v3::QueueV3::new)
                    .collect(),
            );
            let mut itf = CmdItf::new(transport, queues, Default::default(), discard());

            for id in 0..1000u16 {
                itf.send(noack_cmd(id)).unwrap();
            }

            let mut now = 0u64;
            for _ in 0..1000 {
                itf.step(now);
                now += 1_000;
            }

            black_box(&itf);
        })
    });
}

criterion_group!(benches, enqueue_and_drain);
criterion_main!(benches);

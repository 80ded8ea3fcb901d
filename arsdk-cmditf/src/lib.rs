//! Command interface: the per-queue TX scheduling (v1/v2/v3), RX pack
//! un-packing, ack routing, and the driver that ties them to a
//! [`arsdk_transport::Transport`] (protocol §3, §4.5-§4.7, §6.5).

pub mod itf;
pub mod linkquality;
pub mod queue_info;
pub mod recv;
pub mod ring;
pub mod status;
pub mod v1;
pub mod v2;
pub mod v3;
pub mod wire;

pub use itf::{default_queue_infos, CmdItf, Queues, RoleIds};
pub use linkquality::LinkQualityCounters;
pub use queue_info::QueueInfo;
pub use status::{Callbacks, LinkQuality, PackRecvStatus, PackSendStatus, SendStatus, SendStatusKind};

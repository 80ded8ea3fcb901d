//! Typed command argument codec: encode/decode against a static command
//! descriptor table, plus a logging formatter.

pub mod command;
pub mod decode;
pub mod descriptor;
pub mod encode;
pub mod format;
pub mod table;
pub mod types;

pub use command::Command;
pub use decode::decode;
pub use descriptor::find_descriptor;
pub use encode::encode;
pub use format::format;
pub use types::{ArgDescriptor, ArgType, ArgValue, BufferType, CommandDescriptor, EnumEntry, TimeoutPolicy};

//! A small, explicitly non-exhaustive static command descriptor table.
//!
//! Real `arsdk` deployments generate thousands of project-specific command
//! descriptors from XML; doing so is a code-generation concern outside this
//! crate's scope. This table instead carries a handful of representative
//! commands -- enough to exercise every `ArgType` and to drive the
//! end-to-end scenarios -- while reproducing the original's lookup shape
//! faithfully: a three-level (project, class, command) linear scan with
//! short-circuiting class lookup.

use crate::types::{ArgDescriptor, ArgType, BufferType, CommandDescriptor, EnumEntry, TimeoutPolicy};

pub struct ClassTable {
    pub cls_id: u8,
    pub name: &'static str,
    pub commands: &'static [CommandDescriptor],
}

pub struct ProjectTable {
    pub prj_id: u8,
    pub name: &'static str,
    pub classes: &'static [ClassTable],
}

pub const FIX_TYPE_TABLE: &[EnumEntry] = &[
    EnumEntry { value: 0, name: "NONE", bitfield: false },
    EnumEntry { value: 1, name: "TWO_D", bitfield: false },
    EnumEntry { value: 2, name: "THREE_D", bitfield: false },
];

pub const FLAG_TABLE: &[EnumEntry] = &[
    EnumEntry { value: 1, name: "CHARGING", bitfield: true },
    EnumEntry { value: 2, name: "USB", bitfield: true },
    EnumEntry { value: 4, name: "LOW_BATTERY", bitfield: true },
];

pub const ARDRONE3_GPS_SETTINGS_STATE: &[CommandDescriptor] = &[CommandDescriptor {
    prj_id: 1,
    cls_id: 1,
    cmd_id: 0,
    name: "GPSFixStateChanged",
    buffer_type: BufferType::Ack,
    timeout_policy: TimeoutPolicy::Retry,
    args: &[ArgDescriptor {
        name: "fixed",
        arg_type: ArgType::U8,
        enum_table: None,
    }],
}];

pub const ARDRONE3_PILOTING_STATE: &[CommandDescriptor] = &[CommandDescriptor {
    prj_id: 1,
    cls_id: 2,
    cmd_id: 0,
    name: "PositionChanged",
    buffer_type: BufferType::NonAck,
    timeout_policy: TimeoutPolicy::Pop,
    args: &[
        ArgDescriptor { name: "latitude", arg_type: ArgType::Double, enum_table: None },
        ArgDescriptor { name: "longitude", arg_type: ArgType::Double, enum_table: None },
        ArgDescriptor { name: "altitude", arg_type: ArgType::Float, enum_table: None },
    ],
}];

pub const COMMON_COMMON_STATE: &[CommandDescriptor] = &[
    CommandDescriptor {
        prj_id: 0,
        cls_id: 0,
        cmd_id: 0,
        name: "AllStates",
        buffer_type: BufferType::HighPrio,
        timeout_policy: TimeoutPolicy::Retry,
        args: &[],
    },
    CommandDescriptor {
        prj_id: 0,
        cls_id: 0,
        cmd_id: 1,
        name: "BatteryStateChanged",
        buffer_type: BufferType::Ack,
        timeout_policy: TimeoutPolicy::Retry,
        args: &[
            ArgDescriptor { name: "percent", arg_type: ArgType::U8, enum_table: None },
            ArgDescriptor { name: "fix_type", arg_type: ArgType::Enum, enum_table: Some(FIX_TYPE_TABLE) },
            ArgDescriptor { name: "flags", arg_type: ArgType::Enum, enum_table: Some(FLAG_TABLE) },
        ],
    },
    CommandDescriptor {
        prj_id: 0,
        cls_id: 0,
        cmd_id: 2,
        name: "ProductSerialChanged",
        buffer_type: BufferType::LowPrio,
        timeout_policy: TimeoutPolicy::Pop,
        args: &[
            ArgDescriptor { name: "serial", arg_type: ArgType::String, enum_table: None },
            ArgDescriptor { name: "firmware", arg_type: ArgType::Binary, enum_table: None },
            ArgDescriptor { name: "build", arg_type: ArgType::I64, enum_table: None },
            ArgDescriptor { name: "crc", arg_type: ArgType::U64, enum_table: None },
            ArgDescriptor { name: "revision", arg_type: ArgType::I16, enum_table: None },
            ArgDescriptor { name: "variant", arg_type: ArgType::U16, enum_table: None },
            ArgDescriptor { name: "hw_rev", arg_type: ArgType::I8, enum_table: None },
            ArgDescriptor { name: "flags32", arg_type: ArgType::U32, enum_table: None },
            ArgDescriptor { name: "signed", arg_type: ArgType::I32, enum_table: None },
        ],
    },
];

pub const PROJECTS: &[ProjectTable] = &[
    ProjectTable {
        prj_id: 0,
        name: "Common",
        classes: &[ClassTable {
            cls_id: 0,
            name: "Common",
            commands: COMMON_COMMON_STATE,
        }],
    },
    ProjectTable {
        prj_id: 1,
        name: "Ardrone3",
        classes: &[
            ClassTable {
                cls_id: 1,
                name: "GPSSettingsState",
                commands: ARDRONE3_GPS_SETTINGS_STATE,
            },
            ClassTable {
                cls_id: 2,
                name: "PilotingState",
                commands: ARDRONE3_PILOTING_STATE,
            },
        ],
    },
];

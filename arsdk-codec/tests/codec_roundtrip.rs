use arsdk_codec::types::{ArgDescriptor, ArgType, ArgValue, BufferType, CommandDescriptor, TimeoutPolicy};
use arsdk_codec::{decode, encode, find_descriptor, format};
use std::borrow::Cow;

const NUMERIC_DESC: CommandDescriptor = CommandDescriptor {
    prj_id: 42,
    cls_id: 7,
    cmd_id: 99,
    name: "AllNumerics",
    buffer_type: BufferType::Ack,
    timeout_policy: TimeoutPolicy::Retry,
    args: &[
        ArgDescriptor { name: "i8", arg_type: ArgType::I8, enum_table: None },
        ArgDescriptor { name: "u8", arg_type: ArgType::U8, enum_table: None },
        ArgDescriptor { name: "i16", arg_type: ArgType::I16, enum_table: None },
        ArgDescriptor { name: "u16", arg_type: ArgType::U16, enum_table: None },
        ArgDescriptor { name: "i32", arg_type: ArgType::I32, enum_table: None },
        ArgDescriptor { name: "u32", arg_type: ArgType::U32, enum_table: None },
        ArgDescriptor { name: "i64", arg_type: ArgType::I64, enum_table: None },
        ArgDescriptor { name: "u64", arg_type: ArgType::U64, enum_table: None },
        ArgDescriptor { name: "f32", arg_type: ArgType::Float, enum_table: None },
        ArgDescriptor { name: "f64", arg_type: ArgType::Double, enum_table: None },
        ArgDescriptor { name: "enum", arg_type: ArgType::Enum, enum_table: None },
        ArgDescriptor { name: "bin", arg_type: ArgType::Binary, enum_table: None },
    ],
};

fn boundary_args() -> Vec<ArgValue<'static>> {
    vec![
        ArgValue::I8(i8::MIN),
        ArgValue::U8(u8::MAX),
        ArgValue::I16(i16::MIN),
        ArgValue::U16(u16::MAX),
        ArgValue::I32(i32::MIN),
        ArgValue::U32(u32::MAX),
        ArgValue::I64(i64::MIN),
        ArgValue::U64(u64::MAX),
        ArgValue::Float(f32::EPSILON),
        ArgValue::Double(f64::EPSILON),
        ArgValue::Enum(-1),
        ArgValue::Binary(Cow::Borrowed(&[0u8, 1, 2, 3])),
    ]
}

#[test]
fn boundary_values_round_trip() {
    let args = boundary_args();
    let buf = encode(&NUMERIC_DESC, &args).unwrap();
    let decoded = decode(&buf, &NUMERIC_DESC).unwrap();
    assert_eq!(decoded, args);
}

#[test]
fn zero_and_minus_one_round_trip() {
    let mut args = boundary_args();
    args[4] = ArgValue::I32(0);
    args[5] = ArgValue::U32(0);
    args[10] = ArgValue::Enum(-1);

    let buf = encode(&NUMERIC_DESC, &args).unwrap();
    let decoded = decode(&buf, &NUMERIC_DESC).unwrap();
    assert_eq!(decoded, args);
}

#[test]
fn oversized_binary_forces_growth() {
    let mut args = boundary_args();
    let big: Vec<u8> = (0..2000).map(|i| (i % 256) as u8).collect();
    args[11] = ArgValue::Binary(Cow::Owned(big.clone()));

    let buf = encode(&NUMERIC_DESC, &args).unwrap();
    let decoded = decode(&buf, &NUMERIC_DESC).unwrap();
    match &decoded[11] {
        ArgValue::Binary(b) => assert_eq!(b.as_ref(), big.as_slice()),
        _ => panic!("expected binary"),
    }
}

#[test]
fn find_descriptor_and_format_end_to_end() {
    // Scenario from the spec: Ardrone3.GPSSettingsState.GPSFixStateChanged(fixed=0)
    let desc = find_descriptor(1, 1, 0).expect("descriptor must be registered");
    let args = vec![ArgValue::U8(0)];
    let buf = encode(desc, &args).unwrap();

    assert_eq!(&buf[..4], &[1, 1, 0, 0]);

    let decoded = decode(&buf, desc).unwrap();
    assert_eq!(decoded, args);
    assert_eq!(format(desc, &decoded), "GPSFixStateChanged | fixed=0");
}

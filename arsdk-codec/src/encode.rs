use crate::types::{ArgType, ArgValue, CommandDescriptor};
use arsdk_support::{Error, Result};
use byteorder::{LittleEndian, WriteBytesExt};

/// Allocation step for the encode buffer (mirrors the original encoder's
/// `BUFFER_ALLOC_STEP`): growth happens in 256-byte increments rather than
/// `Vec`'s default doubling, so a freshly-encoded command's buffer
/// capacity is always a multiple of 256.
const ALLOC_STEP: usize = 256;

#[inline]
fn align_alloc(size: usize) -> usize {
    (size + ALLOC_STEP - 1) & !(ALLOC_STEP - 1)
}

#[inline]
fn reserve_step(buf: &mut Vec<u8>, additional: usize) {
    let needed = buf.len() + additional;
    if needed > buf.capacity() {
        let target = align_alloc(needed);
        buf.reserve(target - buf.len());
    }
}

/// Encodes `desc`'s header (`[prj][cls][cmd_lo][cmd_hi]`) followed by
/// `args` in declared order. `args` must match `desc.args` in length and
/// type or `Error::InvalidArgument` is returned.
pub fn encode(desc: &CommandDescriptor, args: &[ArgValue]) -> Result<Vec<u8>> {
    if args.len() != desc.args.len() {
        return Err(Error::InvalidArgument);
    }

    let mut buf = Vec::new();
    reserve_step(&mut buf, ALLOC_STEP);

    buf.write_u8(desc.prj_id)?;
    buf.write_u8(desc.cls_id)?;
    buf.write_u16::<LittleEndian>(desc.cmd_id)?;

    for (arg_desc, value) in desc.args.iter().zip(args.iter()) {
        if arg_desc.arg_type != value.arg_type() {
            return Err(Error::InvalidArgument);
        }
        encode_value(&mut buf, value)?;
    }

    Ok(buf)
}

fn encode_value(buf: &mut Vec<u8>, value: &ArgValue) -> Result<()> {
    match value {
        ArgValue::I8(v) => {
            reserve_step(buf, 1);
            buf.write_i8(*v)?;
        }
        ArgValue::U8(v) => {
            reserve_step(buf, 1);
            buf.write_u8(*v)?;
        }
        ArgValue::I16(v) => {
            reserve_step(buf, 2);
            buf.write_i16::<LittleEndian>(*v)?;
        }
        ArgValue::U16(v) => {
            reserve_step(buf, 2);
            buf.write_u16::<LittleEndian>(*v)?;
        }
        ArgValue::I32(v) => {
            reserve_step(buf, 4);
            buf.write_i32::<LittleEndian>(*v)?;
        }
        ArgValue::U32(v) => {
            reserve_step(buf, 4);
            buf.write_u32::<LittleEndian>(*v)?;
        }
        ArgValue::I64(v) => {
            reserve_step(buf, 8);
            buf.write_i64::<LittleEndian>(*v)?;
        }
        ArgValue::U64(v) => {
            reserve_step(buf, 8);
            buf.write_u64::<LittleEndian>(*v)?;
        }
        ArgValue::Float(v) => {
            reserve_step(buf, 4);
            buf.write_f32::<LittleEndian>(*v)?;
        }
        ArgValue::Double(v) => {
            reserve_step(buf, 8);
            buf.write_f64::<LittleEndian>(*v)?;
        }
        ArgValue::String(s) => {
            let bytes = s.as_bytes();
            reserve_step(buf, bytes.len() + 1);
            buf.extend_from_slice(bytes);
            buf.push(0);
        }
        ArgValue::Enum(v) => {
            reserve_step(buf, 4);
            buf.write_i32::<LittleEndian>(*v)?;
        }
        ArgValue::Binary(b) => {
            reserve_step(buf, 4 + b.len());
            buf.write_u32::<LittleEndian>(b.len() as u32)?;
            buf.extend_from_slice(b);
        }
    }
    Ok(())
}

use crate::types::{ArgType, ArgValue, CommandDescriptor};
use arsdk_support::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::borrow::Cow;
use std::ffi::CStr;

/// Decodes `buf` (the full `[prj][cls][cmd_lo][cmd_hi][args...]` payload)
/// against `desc`, returning the argument list. Strings and binaries are
/// returned as zero-copy borrows into `buf` -- callers must not outlive it.
///
/// Fails with `Error::Protocol` if the project/class/command triple in the
/// header does not match the descriptor, or if there aren't enough bytes
/// remaining for a declared argument.
pub fn decode<'a>(buf: &'a [u8], desc: &CommandDescriptor) -> Result<Vec<ArgValue<'a>>> {
    if buf.len() < 4 {
        return Err(Error::Protocol);
    }

    let prj_id = buf[0];
    let cls_id = buf[1];
    let cmd_id = LittleEndian::read_u16(&buf[2..4]);

    if prj_id != desc.prj_id || cls_id != desc.cls_id || cmd_id != desc.cmd_id {
        return Err(Error::Protocol);
    }

    let mut cursor = &buf[4..];
    let mut args = Vec::with_capacity(desc.args.len());

    for arg_desc in desc.args {
        let (value, consumed) = decode_value(cursor, arg_desc.arg_type)?;
        cursor = &cursor[consumed..];
        args.push(value);
    }

    Ok(args)
}

fn decode_value(buf: &[u8], arg_type: ArgType) -> Result<(ArgValue<'_>, usize)> {
    Ok(match arg_type {
        ArgType::I8 => {
            require(buf, 1)?;
            (ArgValue::I8(buf[0] as i8), 1)
        }
        ArgType::U8 => {
            require(buf, 1)?;
            (ArgValue::U8(buf[0]), 1)
        }
        ArgType::I16 => {
            require(buf, 2)?;
            (ArgValue::I16(LittleEndian::read_i16(buf)), 2)
        }
        ArgType::U16 => {
            require(buf, 2)?;
            (ArgValue::U16(LittleEndian::read_u16(buf)), 2)
        }
        ArgType::I32 => {
            require(buf, 4)?;
            (ArgValue::I32(LittleEndian::read_i32(buf)), 4)
        }
        ArgType::U32 => {
            require(buf, 4)?;
            (ArgValue::U32(LittleEndian::read_u32(buf)), 4)
        }
        ArgType::I64 => {
            require(buf, 8)?;
            (ArgValue::I64(LittleEndian::read_i64(buf)), 8)
        }
        ArgType::U64 => {
            require(buf, 8)?;
            (ArgValue::U64(LittleEndian::read_u64(buf)), 8)
        }
        ArgType::Float => {
            require(buf, 4)?;
            (ArgValue::Float(LittleEndian::read_f32(buf)), 4)
        }
        ArgType::Double => {
            require(buf, 8)?;
            (ArgValue::Double(LittleEndian::read_f64(buf)), 8)
        }
        ArgType::Enum => {
            require(buf, 4)?;
            (ArgValue::Enum(LittleEndian::read_i32(buf)), 4)
        }
        ArgType::String => {
            let nul = buf.iter().position(|&b| b == 0).ok_or(Error::Protocol)?;
            let cstr = CStr::from_bytes_with_nul(&buf[..=nul]).map_err(|_| Error::Protocol)?;
            let s = cstr.to_str().map_err(|_| Error::Protocol)?;
            (ArgValue::String(Cow::Borrowed(s)), nul + 1)
        }
        ArgType::Binary => {
            require(buf, 4)?;
            let len = LittleEndian::read_u32(buf) as usize;
            require(&buf[4..], len)?;
            (ArgValue::Binary(Cow::Borrowed(&buf[4..4 + len])), 4 + len)
        }
    })
}

#[inline]
fn require(buf: &[u8], len: usize) -> Result<()> {
    if buf.len() < len {
        Err(Error::Protocol)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::types::{ArgDescriptor, BufferType, TimeoutPolicy};

    const DESC: CommandDescriptor = CommandDescriptor {
        prj_id: 1,
        cls_id: 2,
        cmd_id: 3,
        name: "test",
        buffer_type: BufferType::Ack,
        timeout_policy: TimeoutPolicy::Retry,
        args: &[
            ArgDescriptor {
                name: "value",
                arg_type: ArgType::U32,
                enum_table: None,
            },
            ArgDescriptor {
                name: "label",
                arg_type: ArgType::String,
                enum_table: None,
            },
        ],
    };

    #[test]
    fn round_trips() {
        let args = vec![ArgValue::U32(7), ArgValue::String(Cow::Borrowed("hi"))];
        let buf = encode(&DESC, &args).unwrap();
        let decoded = decode(&buf, &DESC).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn truncated_buffer_is_protocol_error() {
        let buf = [1u8, 2, 3, 0];
        assert_eq!(decode(&buf, &DESC), Err(Error::Protocol));
    }

    #[test]
    fn header_mismatch_is_protocol_error() {
        let args = vec![ArgValue::U32(7), ArgValue::String(Cow::Borrowed("hi"))];
        let mut buf = encode(&DESC, &args).unwrap();
        buf[1] = 99;
        assert_eq!(decode(&buf, &DESC), Err(Error::Protocol));
    }

    #[test]
    fn oversized_string_forces_growth() {
        const STR_DESC: CommandDescriptor = CommandDescriptor {
            prj_id: 9,
            cls_id: 9,
            cmd_id: 9,
            name: "bigstr",
            buffer_type: BufferType::NonAck,
            timeout_policy: TimeoutPolicy::Pop,
            args: &[ArgDescriptor {
                name: "s",
                arg_type: ArgType::String,
                enum_table: None,
            }],
        };

        let big = "x".repeat(500);
        let buf = encode(&STR_DESC, &[ArgValue::String(Cow::Borrowed(&big))]).unwrap();
        let decoded = decode(&buf, &STR_DESC).unwrap();
        assert_eq!(decoded, vec![ArgValue::String(Cow::Borrowed(big.as_str()))]);
    }
}

use crate::types::{ArgDescriptor, ArgValue, CommandDescriptor};
use std::fmt::Write;

/// Formats a decoded command for logging: `name | arg=value | ...`.
///
/// Enum arguments backed by a bitfield table are rendered as `A|B|...`,
/// with any bits not covered by the table rendered as `UNKNOWN(bit)`.
pub fn format(desc: &CommandDescriptor, args: &[ArgValue]) -> String {
    let mut out = String::new();
    out.push_str(desc.name);

    for (arg_desc, value) in desc.args.iter().zip(args.iter()) {
        out.push_str(" | ");
        out.push_str(arg_desc.name);
        out.push('=');
        format_value(&mut out, arg_desc, value);
    }

    out
}

fn format_value(out: &mut String, arg_desc: &ArgDescriptor, value: &ArgValue) {
    match value {
        ArgValue::Enum(raw) => match arg_desc.enum_table {
            Some(table) if table.iter().any(|e| e.bitfield) => format_bitfield(out, table, *raw),
            Some(table) => match table.iter().find(|e| e.value == *raw) {
                Some(entry) => out.push_str(entry.name),
                None => {
                    let _ = write!(out, "UNKNOWN({})", raw);
                }
            },
            None => {
                let _ = write!(out, "{}", raw);
            }
        },
        other => {
            let _ = write!(out, "{}", format_scalar(other));
        }
    }
}

fn format_scalar(value: &ArgValue) -> String {
    match value {
        ArgValue::I8(v) => v.to_string(),
        ArgValue::U8(v) => v.to_string(),
        ArgValue::I16(v) => v.to_string(),
        ArgValue::U16(v) => v.to_string(),
        ArgValue::I32(v) => v.to_string(),
        ArgValue::U32(v) => v.to_string(),
        ArgValue::I64(v) => v.to_string(),
        ArgValue::U64(v) => v.to_string(),
        ArgValue::Float(v) => v.to_string(),
        ArgValue::Double(v) => v.to_string(),
        ArgValue::String(s) => s.to_string(),
        ArgValue::Enum(v) => v.to_string(),
        ArgValue::Binary(b) => format!("<{} bytes>", b.len()),
    }
}

fn format_bitfield(out: &mut String, table: &[crate::types::EnumEntry], raw: i32) {
    let value = raw as u32;
    let mut remaining = value;
    let mut parts: Vec<&str> = Vec::new();

    for entry in table {
        let bit = entry.value as u32;
        if bit != 0 && (remaining & bit) == bit {
            parts.push(entry.name);
            remaining &= !bit;
        }
    }

    let mut unknown_bits = Vec::new();
    let mut bit = 1u32;
    while bit != 0 && bit <= remaining {
        if remaining & bit != 0 {
            unknown_bits.push(format!("UNKNOWN({})", bit));
        }
        bit = bit.checked_shl(1).unwrap_or(0);
        if bit == 0 {
            break;
        }
    }

    if parts.is_empty() && unknown_bits.is_empty() {
        out.push_str("0");
        return;
    }

    out.push_str(&parts.join("|"));
    if !unknown_bits.is_empty() {
        if !parts.is_empty() {
            out.push('|');
        }
        out.push_str(&unknown_bits.join("|"));
    }
}

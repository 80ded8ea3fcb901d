//! Receive-side helpers shared by the interface driver (`itf.rs`): the
//! sequence-acceptance window (protocol §3 invariant), and the v2/v3 pack
//! un-packers.

use arsdk_support::{varuint, Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// A received seq is accepted over `prev` if it's strictly newer, or if
/// the gap looks like a wraparound (protocol §3):
/// `(recv - prev) > 0 || (recv - prev) < -10`, computed as the minimal
/// signed difference in `width_bits`-wide modular arithmetic so an 8-bit
/// (v1) or 16-bit (v2/v3) sequence space wraps the same way.
pub fn accept_seq(prev: Option<u32>, recv: u32, width_bits: u32) -> bool {
    let prev = match prev {
        None => return true,
        Some(p) => p,
    };

    let modulus = 1i64 << width_bits;
    let mut diff = (recv as i64 - prev as i64) % modulus;
    if diff > modulus / 2 {
        diff -= modulus;
    } else if diff < -(modulus / 2) {
        diff += modulus;
    }

    diff > 0 || diff < -10
}

/// Default ceiling on a v3 partial command's declared size (protocol §9
/// design notes): bounds memory a hostile peer could force us to hold
/// across packs.
pub const DEFAULT_MAX_PARTIAL_CMD_LEN: usize = 1 << 20;

/// Un-packs a v2 pack payload into its whole commands: a sequence of
/// `[len:u16_le][bytes]`.
pub fn unpack_v2(payload: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut cursor = payload;
    let mut out = Vec::new();

    while !cursor.is_empty() {
        if cursor.len() < 2 {
            return Err(Error::Protocol);
        }
        let len = LittleEndian::read_u16(cursor) as usize;
        cursor = &cursor[2..];
        if cursor.len() < len {
            return Err(Error::Protocol);
        }
        out.push(cursor[..len].to_vec());
        cursor = &cursor[len..];
    }

    Ok(out)
}

/// One in-progress v3 command buffer, keyed by transport id at the call
/// site (protocol §4.7, §9 "Partial-command state").
#[derive(Debug, Default)]
pub struct PartialCmd {
    declared_len: usize,
    buf: Vec<u8>,
}

/// Un-packs a v3 pack payload, resuming `partial` (if any) before parsing
/// further `[len:varuint][bytes]` commands from the remainder. Leaves
/// `partial` populated if the pack ends mid-command. Rejects a declared
/// command size above `max_cmd_len` with `Error::NoResource` (a hostile
/// peer trying to force unbounded buffering).
pub fn unpack_v3(payload: &[u8], partial: &mut Option<PartialCmd>, max_cmd_len: usize) -> Result<Vec<Vec<u8>>> {
    let mut cursor = payload;
    let mut out = Vec::new();

    if let Some(p) = partial {
        let need = p.declared_len - p.buf.len();
        let take = need.min(cursor.len());
        p.buf.extend_from_slice(&cursor[..take]);
        cursor = &cursor[take..];

        if p.buf.len() == p.declared_len {
            out.push(std::mem::take(&mut p.buf));
            *partial = None;
        }
    }

    while !cursor.is_empty() {
        let (len, consumed) = varuint::decode(cursor)?;
        let len = len as usize;
        if len > max_cmd_len {
            return Err(Error::NoResource);
        }
        cursor = &cursor[consumed..];

        if cursor.len() >= len {
            out.push(cursor[..len].to_vec());
            cursor = &cursor[len..];
        } else {
            *partial = Some(PartialCmd { declared_len: len, buf: cursor.to_vec() });
            cursor = &[];
        }
    }

    Ok(out)
}

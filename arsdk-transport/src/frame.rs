//! Wire framing for both protocol generations: the fixed 7-byte v1 header
//! and the variable-length v2/v3 header. See protocol §4.2/§6.1.

use arsdk_support::varuint;
use arsdk_support::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Frame `type` byte. Mirrors the original's `arsdk_transport_data_type`:
/// `Unknown=0, Ack=1, NoAck=2, HighPrio=3, WithAck=4`. v1 requires
/// `type < 10`, which is also what disambiguates a v1 frame from a v2/v3
/// one (the v2/v3 `version` byte is always `>= 10`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DataType {
    Unknown,
    Ack,
    NoAck,
    HighPrio,
    WithAck,
}

impl DataType {
    pub const MAX: u8 = 10;

    pub fn from_u8(v: u8) -> Result<DataType> {
        Ok(match v {
            0 => DataType::Unknown,
            1 => DataType::Ack,
            2 => DataType::NoAck,
            3 => DataType::HighPrio,
            4 => DataType::WithAck,
            _ => return Err(Error::Protocol),
        })
    }

    pub fn to_u8(self) -> u8 {
        match self {
            DataType::Unknown => 0,
            DataType::Ack => 1,
            DataType::NoAck => 2,
            DataType::HighPrio => 3,
            DataType::WithAck => 4,
        }
    }
}

/// Protocol generation. `version_byte()` is what actually goes on the wire
/// for v2/v3 (`real_version + 10`); v1 has no version byte at all.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ProtoVersion {
    V1,
    V2,
    V3,
}

impl ProtoVersion {
    const WIRE_OFFSET: u8 = 10;

    fn version_byte(self) -> u8 {
        match self {
            ProtoVersion::V1 => panic!("v1 frames have no version byte"),
            ProtoVersion::V2 => 2 + Self::WIRE_OFFSET,
            ProtoVersion::V3 => 3 + Self::WIRE_OFFSET,
        }
    }

    fn from_wire_byte(byte: u8) -> Result<ProtoVersion> {
        if byte < Self::WIRE_OFFSET {
            // Caller should have dispatched to v1 parsing already.
            return Err(Error::Protocol);
        }

        match byte - Self::WIRE_OFFSET {
            2 => Ok(ProtoVersion::V2),
            3 => Ok(ProtoVersion::V3),
            _ => Err(Error::Protocol),
        }
    }
}

/// A parsed or about-to-be-sent transport frame, version-agnostic. `seq` is
/// kept as `u32` to unify v1's 8-bit and v2/v3's 16-bit sequence space; the
/// encoder truncates it to the wire width for the selected version.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub data_type: DataType,
    pub id: u8,
    pub seq: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(data_type: DataType, id: u8, seq: u32, payload: Vec<u8>) -> Frame {
        Frame { data_type, id, seq, payload }
    }
}

/// Fixed v1 header size (`type` + `id` + `seq` + `frame_len`).
pub const V1_HEADER_SIZE: usize = 7;

/// Encodes `frame` as a v1 frame: `[type][id][seq:u8][frame_len:u32_le]` + payload.
pub fn encode_v1(frame: &Frame) -> Vec<u8> {
    let frame_len = V1_HEADER_SIZE + frame.payload.len();
    let mut buf = Vec::with_capacity(frame_len);

    buf.push(frame.data_type.to_u8());
    buf.push(frame.id);
    buf.push(frame.seq as u8);

    let mut len_bytes = [0u8; 4];
    LittleEndian::write_u32(&mut len_bytes, frame_len as u32);
    buf.extend_from_slice(&len_bytes);

    buf.extend_from_slice(&frame.payload);
    buf
}

/// Decodes a v1 frame from the front of `buf`. Returns the frame and the
/// number of bytes consumed, or `Error::Protocol` if the header is
/// malformed, the declared length overflows the buffer, or `type >= 10`.
pub fn decode_v1(buf: &[u8]) -> Result<(Frame, usize)> {
    if buf.len() < V1_HEADER_SIZE {
        return Err(Error::Protocol);
    }

    let type_byte = buf[0];
    if type_byte >= DataType::MAX {
        return Err(Error::Protocol);
    }
    let data_type = DataType::from_u8(type_byte)?;
    let id = buf[1];
    let seq = buf[2] as u32;
    let frame_len = LittleEndian::read_u32(&buf[3..7]) as usize;

    if frame_len < V1_HEADER_SIZE || buf.len() < frame_len {
        return Err(Error::Protocol);
    }

    let payload = buf[V1_HEADER_SIZE..frame_len].to_vec();
    Ok((Frame { data_type, id, seq, payload }, frame_len))
}

/// Encodes `frame` as a v2/v3 frame:
/// `[version:varuint][type][id][seq:u16_le][payload_len:varuint]` + payload.
pub fn encode_v23(frame: &Frame, version: ProtoVersion) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + frame.payload.len());

    varuint::encode(version.version_byte() as u32, &mut buf);
    buf.push(frame.data_type.to_u8());
    buf.push(frame.id);

    let mut seq_bytes = [0u8; 2];
    LittleEndian::write_u16(&mut seq_bytes, frame.seq as u16);
    buf.extend_from_slice(&seq_bytes);

    varuint::encode(frame.payload.len() as u32, &mut buf);
    buf.extend_from_slice(&frame.payload);
    buf
}

/// Decodes a v2/v3 frame from the front of `buf`, assuming `buf[0] >= 10`
/// has already been established by the caller (disambiguating from v1).
/// Returns the frame, the protocol version and the number of bytes
/// consumed.
pub fn decode_v23(buf: &[u8]) -> Result<(Frame, ProtoVersion, usize)> {
    let (version_raw, mut offset) = varuint::decode(buf)?;
    if version_raw > u8::MAX as u32 {
        return Err(Error::Protocol);
    }
    let version = ProtoVersion::from_wire_byte(version_raw as u8)?;

    if buf.len() < offset + 4 {
        return Err(Error::Protocol);
    }

    let data_type = DataType::from_u8(buf[offset])?;
    offset += 1;
    let id = buf[offset];
    offset += 1;
    let seq = LittleEndian::read_u16(&buf[offset..offset + 2]) as u32;
    offset += 2;

    let (payload_len, consumed) = varuint::decode(&buf[offset..])?;
    offset += consumed;
    let payload_len = payload_len as usize;

    if buf.len() < offset + payload_len {
        return Err(Error::Protocol);
    }

    let payload = buf[offset..offset + payload_len].to_vec();
    offset += payload_len;

    Ok((Frame { data_type, id, seq, payload }, version, offset))
}

/// Parsed frame header's version tag, as the transport layer needs to know
/// which encoder to use for replies.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    V1(Frame),
    V23(Frame, ProtoVersion),
}

/// Decodes one frame from the front of `buf`, dispatching on whether the
/// first byte is a v1 `type` (`< 10`) or a v2/v3 `version` (`>= 10`).
/// Returns the frame and the number of bytes consumed.
pub fn decode_any(buf: &[u8]) -> Result<(DecodedFrame, usize)> {
    if buf.is_empty() {
        return Err(Error::Protocol);
    }

    if buf[0] < ProtoVersion::WIRE_OFFSET {
        let (frame, consumed) = decode_v1(buf)?;
        Ok((DecodedFrame::V1(frame), consumed))
    } else {
        let (frame, version, consumed) = decode_v23(buf)?;
        Ok((DecodedFrame::V23(frame, version), consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(payload_len: usize) -> Frame {
        Frame::new(DataType::WithAck, 42, 7, vec![0xABu8; payload_len])
    }

    #[test]
    fn v1_round_trips_over_payload_sizes() {
        for &len in &[0usize, 1, 7, 1000, 1400] {
            let frame = sample(len);
            let encoded = encode_v1(&frame);
            let (decoded, consumed) = decode_v1(&encoded).unwrap();
            assert_eq!(consumed, encoded.len());
            assert_eq!(decoded, frame);
        }
    }

    #[test]
    fn v23_round_trips_over_payload_sizes() {
        for &len in &[0usize, 1, 7, 1000, 1400] {
            for version in [ProtoVersion::V2, ProtoVersion::V3] {
                let frame = sample(len);
                let encoded = encode_v23(&frame, version);
                let (decoded, decoded_version, consumed) = decode_v23(&encoded).unwrap();
                assert_eq!(consumed, encoded.len());
                assert_eq!(decoded, frame);
                assert_eq!(decoded_version, version);
            }
        }
    }

    #[test]
    fn decode_any_dispatches_on_first_byte() {
        let frame = sample(10);
        let v1 = encode_v1(&frame);
        match decode_any(&v1).unwrap().0 {
            DecodedFrame::V1(f) => assert_eq!(f, frame),
            _ => panic!("expected v1"),
        }

        let v3 = encode_v23(&frame, ProtoVersion::V3);
        match decode_any(&v3).unwrap().0 {
            DecodedFrame::V23(f, ProtoVersion::V3) => assert_eq!(f, frame),
            _ => panic!("expected v3"),
        }
    }

    #[test]
    fn v1_rejects_type_ge_10() {
        let mut encoded = encode_v1(&sample(0));
        encoded[0] = 10;
        assert_eq!(decode_v1(&encoded), Err(Error::Protocol));
    }

    #[test]
    fn truncated_header_is_protocol_error() {
        assert_eq!(decode_v1(&[1, 2, 3]), Err(Error::Protocol));
        assert_eq!(decode_v23(&[12]), Err(Error::Protocol));
    }
}

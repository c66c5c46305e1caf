use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::Checksum;
use crate::error::{FrameError, Result};

/// Start-of-packet marker byte.
pub const START_OF_PACKET: u8 = 0xAA;

/// Header wire size: marker (1) + flags (1) + src (4) + dst (4) + length (2)
/// + checksum (2) = 14 bytes.
pub const HEADER_LENGTH: usize = 14;

/// Header bytes covered by the checksum: flags through length, excluding the
/// marker and the checksum pair itself.
pub const CHECKED_LENGTH: usize = HEADER_LENGTH - 3;

/// Maximum payload size encodable in the 16-bit length field.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Largest possible frame: payload + header + the two-byte payload checksum
/// trailer the wire reserves (not validated by this crate).
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD + HEADER_LENGTH + 2;

/// Fixed-layout packet header.
///
/// Wire format, little-endian, relative to the marker position:
/// ```text
/// ┌────────┬───────┬──────────┬──────────┬──────────┬──────────────┐
/// │ Marker │ Flags │ Src      │ Dst      │ Length   │ Checksum     │
/// │ 0xAA   │ (1B)  │ (4B LE)  │ (4B LE)  │ (2B LE)  │ A, B (2B)    │
/// └────────┴───────┴──────────┴──────────┴──────────┴──────────────┘
/// ```
/// Flags, src, and dst are opaque at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub flags: u8,
    pub src: u32,
    pub dst: u32,
    pub length: u16,
}

impl PacketHeader {
    /// Decode the fixed header fields from a confirmed header region.
    ///
    /// `buf` starts at the marker byte and must hold at least
    /// [`HEADER_LENGTH`] bytes. No validation happens here — callers only
    /// pass offsets that already passed checksum confirmation.
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            flags: buf[1],
            src: u32::from_le_bytes(buf[2..6].try_into().unwrap()),
            dst: u32::from_le_bytes(buf[6..10].try_into().unwrap()),
            length: u16::from_le_bytes(buf[10..12].try_into().unwrap()),
        }
    }
}

/// Encode a header into the wire format, computing its checksum.
pub fn encode_header(header: &PacketHeader, dst: &mut BytesMut) {
    dst.reserve(HEADER_LENGTH);
    let start = dst.len();
    dst.put_u8(START_OF_PACKET);
    dst.put_u8(header.flags);
    dst.put_u32_le(header.src);
    dst.put_u32_le(header.dst);
    dst.put_u16_le(header.length);
    let sum = Checksum::over(&dst[start + 1..start + 1 + CHECKED_LENGTH]);
    dst.put_u8(sum.a);
    dst.put_u8(sum.b);
}

/// Encode a complete packet (header + payload) into the wire format.
pub fn encode_packet(
    flags: u8,
    src: u32,
    dst_addr: u32,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let header = PacketHeader {
        flags,
        src,
        dst: dst_addr,
        length: payload.len() as u16,
    };
    dst.reserve(HEADER_LENGTH + payload.len());
    encode_header(&header, dst);
    dst.put_slice(payload);
    Ok(())
}

/// A validated header plus its payload bytes.
#[derive(Debug, Clone)]
pub struct Packet {
    /// The checksum-confirmed header.
    pub header: PacketHeader,
    /// Owned copy of the payload, `header.length` bytes.
    pub payload: Bytes,
}

impl Packet {
    /// Create a new packet.
    pub fn new(header: PacketHeader, payload: impl Into<Bytes>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    /// The total wire size of this packet (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_LENGTH + self.payload.len()
    }
}

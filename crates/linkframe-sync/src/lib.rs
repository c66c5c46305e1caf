//! Frame synchronization and packet deframing for noisy serial links.
//!
//! This is the core value-add layer of linkframe. Every packet on the wire
//! carries:
//! - A 1-byte start marker (0xAA) for stream synchronization
//! - A fixed 14-byte header with flags, source, destination, and payload length
//! - A 2-byte Fletcher-style checksum over the header fields
//!
//! The marker value may legitimately recur inside a not-yet-validated
//! header, so finding the real frame start is not a plain byte search: the
//! synchronizer tracks every plausible start position at once and lets the
//! header checksum pick the one that actually begins a frame. No partial
//! packets, no buffer management in user code.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod reader;
pub mod sync;
pub mod writer;

pub use checksum::Checksum;
pub use codec::{
    encode_header, encode_packet, Packet, PacketHeader, CHECKED_LENGTH, HEADER_LENGTH,
    MAX_FRAME_SIZE, MAX_PAYLOAD, START_OF_PACKET,
};
pub use error::{FrameError, Result};
pub use reader::PacketReader;
pub use sync::{FrameSynchronizer, SyncConfig};
pub use writer::PacketWriter;

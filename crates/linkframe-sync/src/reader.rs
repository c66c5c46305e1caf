use bytes::BytesMut;
use linkframe_transport::{ByteSource, LinkStream};

use crate::codec::{Packet, PacketHeader, HEADER_LENGTH};
use crate::error::{FrameError, Result};
use crate::sync::{FrameSynchronizer, SyncConfig};

/// Reads complete packets from a raw serial byte stream.
///
/// Synchronization, header validation, and payload transfer are handled
/// internally — callers always get whole packets. A failed attempt
/// ([`FrameError::FrameNotFound`]) leaves the reader ready for the next
/// call; retrying is the caller's policy.
pub struct PacketReader<T> {
    sync: FrameSynchronizer<T>,
}

impl<T: ByteSource> PacketReader<T> {
    /// Create a new packet reader with default configuration.
    pub fn new(source: T) -> Self {
        Self::with_config(source, SyncConfig::default())
    }

    /// Create a new packet reader with explicit configuration.
    pub fn with_config(source: T, config: SyncConfig) -> Self {
        Self {
            sync: FrameSynchronizer::with_config(source, config),
        }
    }

    /// Read the next complete packet (blocking).
    pub fn read_packet(&mut self) -> Result<Packet> {
        let start = self.sync.find_header()?;
        let header = PacketHeader::decode(&self.sync.buffer()[start..]);
        let length = header.length as usize;

        let mut payload = BytesMut::with_capacity(length);

        // Ruling out later candidates may have read past this header; those
        // bytes are the front of the payload. Anything beyond the payload
        // belongs to the next frame and goes back to the synchronizer.
        let buffered = &self.sync.buffer()[start + HEADER_LENGTH..];
        let take = buffered.len().min(length);
        payload.extend_from_slice(&buffered[..take]);
        let surplus = buffered[take..].to_vec();

        if !surplus.is_empty() {
            self.sync.unread(&surplus);
        }

        if payload.len() < length {
            let offset = payload.len();
            payload.resize(length, 0);
            self.sync.fill_from_stream(&mut payload[offset..])?;
        }

        Ok(Packet {
            header,
            payload: payload.freeze(),
        })
    }

    /// Borrow the underlying byte source.
    pub fn get_ref(&self) -> &T {
        self.sync.get_ref()
    }

    /// Mutably borrow the underlying byte source.
    pub fn get_mut(&mut self) -> &mut T {
        self.sync.get_mut()
    }

    /// Consume the reader and return the inner byte source.
    pub fn into_inner(self) -> T {
        self.sync.into_inner()
    }

    /// Current reader configuration.
    pub fn config(&self) -> &SyncConfig {
        self.sync.config()
    }
}

impl PacketReader<LinkStream> {
    /// Create a packet reader for [`LinkStream`] and apply the read timeout
    /// from config.
    pub fn with_config_link(inner: LinkStream, config: SyncConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: linkframe_transport::TransportError) -> FrameError {
    match err {
        linkframe_transport::TransportError::Io(io) => FrameError::Io(io),
        linkframe_transport::TransportError::Open { source, .. }
        | linkframe_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

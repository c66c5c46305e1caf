use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use linkframe_transport::LinkStream;

use crate::codec::{encode_packet, Packet};
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete packets to any `Write` stream.
pub struct PacketWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> PacketWriter<T> {
    /// Create a new packet writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and send one packet (blocking).
    pub fn send(&mut self, flags: u8, src: u32, dst: u32, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_packet(flags, src, dst, payload, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::SourceClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Write a complete packet (blocking).
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.send(
            packet.header.flags,
            packet.header.src,
            packet.header.dst,
            packet.payload.as_ref(),
        )
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl PacketWriter<LinkStream> {
    /// Create a packet writer for [`LinkStream`] with a write timeout.
    pub fn with_timeout_link(
        inner: LinkStream,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self> {
        inner
            .set_write_timeout(timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::new(inner))
    }
}

use std::collections::VecDeque;
use std::io::ErrorKind;

use linkframe_transport::ByteSource;
use tracing::{debug, trace};

use crate::checksum::Checksum;
use crate::codec::{HEADER_LENGTH, MAX_FRAME_SIZE, START_OF_PACKET};
use crate::error::{FrameError, Result};

/// Limits and timeouts applied while a scan window is open.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Largest scan window in bytes before synchronization gives up.
    /// The scan buffer reserves this much capacity once, at construction,
    /// and never reallocates mid-scan. Default: [`MAX_FRAME_SIZE`].
    pub max_window: usize,
    /// Most marker candidates tracked in one window. Marker-dense noise
    /// (e.g. an all-0xAA burst) would otherwise extend the window without
    /// limit. Default: 64.
    pub max_candidates: usize,
    /// Read timeout for blocking operations on socket-backed streams.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations on socket-backed streams.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_window: MAX_FRAME_SIZE,
            max_candidates: 64,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// Locates checksum-confirmed frame headers in a raw byte stream.
///
/// The marker byte may legitimately recur inside a not-yet-validated header,
/// so every occurrence inside the current window is tracked as a candidate
/// start position and the window is extended until the newest candidate has
/// a full header's worth of bytes behind it. Candidates are then evaluated
/// earliest-first; the checksum decides which one really starts a frame.
///
/// One synchronizer owns one stream. All state (scan buffer, candidate
/// list, pending bytes) belongs to a single synchronization flow; decoding
/// several streams concurrently takes one instance per stream.
pub struct FrameSynchronizer<T> {
    source: T,
    buf: Vec<u8>,
    candidates: Vec<usize>,
    /// Bytes over-read past a confirmed frame, consumed before the source
    /// on the next attempt.
    pending: VecDeque<u8>,
    config: SyncConfig,
}

impl<T: ByteSource> FrameSynchronizer<T> {
    /// Create a new synchronizer with default configuration.
    pub fn new(source: T) -> Self {
        Self::with_config(source, SyncConfig::default())
    }

    /// Create a new synchronizer with explicit configuration.
    pub fn with_config(source: T, config: SyncConfig) -> Self {
        Self {
            source,
            buf: Vec::with_capacity(config.max_window),
            candidates: Vec::new(),
            pending: VecDeque::new(),
            config,
        }
    }

    /// Locate the next checksum-confirmed header in the stream.
    ///
    /// Discards bytes until a marker is seen, then grows the scan window one
    /// byte at a time, recording every further marker occurrence as a later
    /// candidate. Once every candidate has a complete header window, returns
    /// the offset into [`buffer`](Self::buffer) of the earliest candidate
    /// whose checksum matches.
    ///
    /// Fails with [`FrameError::FrameNotFound`] when no candidate validates;
    /// the examined bytes are discarded and the next call starts at the next
    /// incoming byte. Every marker position in the window has been tested at
    /// that point, so the discard cannot skip a viable frame start.
    pub fn find_header(&mut self) -> Result<usize> {
        self.buf.clear();
        self.candidates.clear();

        self.wait_for_marker()?;
        self.buf.push(START_OF_PACKET);
        self.candidates.push(0);

        let mut required = HEADER_LENGTH;
        let mut prev_candidate = 0usize;

        while self.buf.len() < required {
            let byte = self.next_byte()?;
            self.buf.push(byte);

            if byte == START_OF_PACKET {
                let position = self.buf.len() - 1;
                // Header bytes between the previous candidate and this one
                // cannot be ruled out yet, so this marker may itself start
                // the real frame. Extend the window so it, too, gets a full
                // header's worth of bytes.
                let extended = required + (position - prev_candidate);
                if extended > self.config.max_window
                    || self.candidates.len() >= self.config.max_candidates
                {
                    return Err(FrameError::WindowExceeded {
                        required: extended,
                        max: self.config.max_window,
                    });
                }
                trace!(position, required = extended, "marker candidate recorded");
                required = extended;
                self.candidates.push(position);
                prev_candidate = position;
            }
        }

        // Earliest candidate wins; later ones are only consulted after the
        // checksum rules the earlier ones out.
        for &start in &self.candidates {
            let fields = &self.buf[start + 1..start + HEADER_LENGTH - 2];
            let stored = Checksum::stored([
                self.buf[start + HEADER_LENGTH - 2],
                self.buf[start + HEADER_LENGTH - 1],
            ]);
            if Checksum::over(fields) == stored {
                debug!(
                    start,
                    candidates = self.candidates.len(),
                    window = self.buf.len(),
                    "header confirmed"
                );
                return Ok(start);
            }
        }

        debug!(
            candidates = self.candidates.len(),
            window = self.buf.len(),
            "no candidate validated"
        );
        Err(FrameError::FrameNotFound)
    }

    /// The current scan window. Valid until the next synchronization attempt.
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    /// Candidate start positions recorded during the last attempt.
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Borrow the underlying byte source.
    pub fn get_ref(&self) -> &T {
        &self.source
    }

    /// Mutably borrow the underlying byte source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.source
    }

    /// Consume the synchronizer and return the inner byte source.
    pub fn into_inner(self) -> T {
        self.source
    }

    /// Current synchronizer configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Hand back bytes that were read past the end of a frame. They are
    /// consumed before anything else — returned bytes always precede any
    /// bytes still pending, because the scan window they came from was
    /// drained first.
    pub(crate) fn unread(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.pending.push_front(byte);
        }
    }

    /// Read exactly `buf.len()` bytes, draining pending bytes first.
    pub(crate) fn fill_from_stream(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.pending.pop_front() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        if filled < buf.len() {
            self.source
                .fill(&mut buf[filled..])
                .map_err(map_source_error)?;
        }
        Ok(())
    }

    fn wait_for_marker(&mut self) -> Result<()> {
        loop {
            if self.next_byte()? == START_OF_PACKET {
                return Ok(());
            }
        }
    }

    fn next_byte(&mut self) -> Result<u8> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(byte);
        }
        self.source.next_byte().map_err(map_source_error)
    }
}

fn map_source_error(err: std::io::Error) -> FrameError {
    if err.kind() == ErrorKind::UnexpectedEof {
        FrameError::SourceClosed
    } else {
        FrameError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{encode_header, encode_packet, PacketHeader};

    fn header_bytes(flags: u8, src: u32, dst: u32, length: u16) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_header(
            &PacketHeader {
                flags,
                src,
                dst,
                length,
            },
            &mut buf,
        );
        buf.to_vec()
    }

    #[test]
    fn clean_header_confirms_at_offset_zero() {
        let mut wire = header_bytes(0x01, 2, 3, 5);
        wire.extend_from_slice(b"hello");

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        let start = sync.find_header().unwrap();

        assert_eq!(start, 0);
        assert_eq!(sync.candidates(), &[0]);
        assert_eq!(sync.buffer().len(), HEADER_LENGTH);
    }

    #[test]
    fn consumes_exactly_the_header_on_clean_streams() {
        let mut wire = header_bytes(0x01, 2, 3, 5);
        wire.extend_from_slice(b"hello");

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        sync.find_header().unwrap();

        // Payload bytes stay in the source, untouched.
        assert_eq!(sync.get_ref().position(), HEADER_LENGTH as u64);
    }

    #[test]
    fn leading_noise_is_discarded() {
        let mut wire = vec![0x00, 0x13, 0x37, 0x42];
        wire.extend_from_slice(&header_bytes(0x01, 2, 3, 0));

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        let start = sync.find_header().unwrap();

        assert_eq!(start, 0);
    }

    #[test]
    fn marker_in_flags_still_confirms_the_true_start() {
        // flags = 0xAA puts a second marker at window position 1.
        let mut wire = header_bytes(0xAA, 2, 3, 5);
        wire.extend_from_slice(b"hello");

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        let start = sync.find_header().unwrap();

        assert_eq!(start, 0);
        assert_eq!(sync.candidates(), &[0, 1]);
        // The spurious candidate stretched the window by one byte.
        assert_eq!(sync.buffer().len(), HEADER_LENGTH + 1);
    }

    #[test]
    fn noise_marker_before_the_true_start_falls_through() {
        // A lone 0xAA of line noise immediately before a real frame. The
        // first candidate fails checksum; the second validates.
        let mut wire = vec![START_OF_PACKET];
        wire.extend_from_slice(&header_bytes(0x02, 2, 3, 5));

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        let start = sync.find_header().unwrap();

        assert_eq!(start, 1);
        assert_eq!(sync.candidates(), &[0, 1]);
    }

    #[test]
    fn concrete_two_candidate_stream_returns_offset_one() {
        // Byte-for-byte scenario: the second byte is both the first
        // candidate's flags field and the real frame's marker.
        let mut wire = vec![0xAA];
        let real = header_bytes(0xAA, 2, 3, 5);
        assert_eq!(real[0], 0xAA);
        wire.extend_from_slice(&real);
        wire.extend_from_slice(b"hello");

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        let start = sync.find_header().unwrap();
        assert_eq!(start, 1);
    }

    #[test]
    fn all_candidates_failing_is_frame_not_found() {
        let mut wire = vec![START_OF_PACKET];
        wire.extend_from_slice(&[0x11; 32]);

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        let err = sync.find_header().unwrap_err();

        assert!(matches!(err, FrameError::FrameNotFound));
    }

    #[test]
    fn corrupted_checksum_is_frame_not_found() {
        let mut wire = header_bytes(0x01, 2, 3, 5);
        wire[HEADER_LENGTH - 1] ^= 0xFF;

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        let err = sync.find_header().unwrap_err();

        assert!(matches!(err, FrameError::FrameNotFound));
    }

    #[test]
    fn recovers_on_the_attempt_after_a_failure() {
        // A corrupted frame followed by a good one; the caller retries.
        let mut corrupted = header_bytes(0x01, 2, 3, 0);
        corrupted[5] ^= 0x40;
        let mut wire = corrupted;
        wire.extend_from_slice(&header_bytes(0x07, 8, 9, 0));

        let mut sync = FrameSynchronizer::new(Cursor::new(wire));
        assert!(matches!(
            sync.find_header().unwrap_err(),
            FrameError::FrameNotFound
        ));

        let start = sync.find_header().unwrap();
        let header = PacketHeader::decode(&sync.buffer()[start..]);
        assert_eq!(header.flags, 0x07);
        assert_eq!(header.src, 8);
    }

    #[test]
    fn marker_burst_exceeds_candidate_limit() {
        let wire = vec![START_OF_PACKET; 4096];
        let mut sync = FrameSynchronizer::new(Cursor::new(wire));

        let err = sync.find_header().unwrap_err();
        assert!(matches!(err, FrameError::WindowExceeded { .. }));
    }

    #[test]
    fn window_limit_is_enforced() {
        let config = SyncConfig {
            max_window: 20,
            ..SyncConfig::default()
        };
        // Markers every 10 bytes keep extending the window past the cap.
        let mut wire = Vec::new();
        for _ in 0..8 {
            wire.push(START_OF_PACKET);
            wire.extend_from_slice(&[0x01; 9]);
        }

        let mut sync = FrameSynchronizer::with_config(Cursor::new(wire), config);
        let err = sync.find_header().unwrap_err();
        assert!(matches!(
            err,
            FrameError::WindowExceeded { max: 20, .. }
        ));
    }

    #[test]
    fn eof_before_marker_is_source_closed() {
        let mut sync = FrameSynchronizer::new(Cursor::new(vec![0x00, 0x01]));
        let err = sync.find_header().unwrap_err();
        assert!(matches!(err, FrameError::SourceClosed));
    }

    #[test]
    fn eof_mid_header_is_source_closed() {
        let wire = header_bytes(0x01, 2, 3, 0);
        let mut sync = FrameSynchronizer::new(Cursor::new(wire[..8].to_vec()));
        let err = sync.find_header().unwrap_err();
        assert!(matches!(err, FrameError::SourceClosed));
    }

    #[test]
    fn io_errors_propagate_unchanged() {
        struct FailingSource;

        impl std::io::Read for FailingSource {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::BrokenPipe))
            }
        }

        let mut sync = FrameSynchronizer::new(FailingSource);
        let err = sync.find_header().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn unread_bytes_are_scanned_before_the_source() {
        let follow_up = header_bytes(0x05, 6, 7, 0);
        let mut sync = FrameSynchronizer::new(Cursor::new(follow_up[4..].to_vec()));
        sync.unread(&follow_up[..4]);

        let start = sync.find_header().unwrap();
        assert_eq!(start, 0);
        assert_eq!(PacketHeader::decode(&sync.buffer()[start..]).flags, 0x05);
    }

    #[test]
    fn unread_bytes_precede_pending_bytes() {
        let mut sync = FrameSynchronizer::new(Cursor::new(vec![0x99]));
        sync.unread(&[0x03, 0x04]);
        // Returned later, but read earlier in the stream.
        sync.unread(&[0x01, 0x02]);

        let mut buf = [0u8; 5];
        sync.fill_from_stream(&mut buf).unwrap();
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04, 0x99]);
    }

    #[test]
    fn synchronizes_across_byte_by_byte_sources() {
        struct ByteByByteReader {
            bytes: Vec<u8>,
            pos: usize,
        }

        impl std::io::Read for ByteByByteReader {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.pos >= self.bytes.len() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.bytes[self.pos];
                self.pos += 1;
                Ok(1)
            }
        }

        let mut wire = BytesMut::new();
        encode_packet(0x01, 2, 3, b"drip", &mut wire).unwrap();

        let reader = ByteByByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut sync = FrameSynchronizer::new(reader);
        assert_eq!(sync.find_header().unwrap(), 0);
    }
}

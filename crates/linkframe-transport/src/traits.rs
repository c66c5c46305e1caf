use std::io::{ErrorKind, Read, Write};

use crate::error::{Result, TransportError};

/// A connected serial link stream — implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// It wraps either an opened character device (a real serial port) or a
/// Unix domain socket carrying the same byte stream (bridges, tests).
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    Device(std::fs::File),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Device(file) => file.read(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            LinkStreamInner::Device(file) => file.write(buf),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            LinkStreamInner::Device(file) => file.flush(),
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl LinkStream {
    /// Create a LinkStream from an opened character device.
    pub(crate) fn from_device(file: std::fs::File) -> Self {
        Self {
            inner: LinkStreamInner::Device(file),
        }
    }

    /// Create a LinkStream from a Unix domain socket stream.
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Supported for socket-backed streams. Character devices cannot enforce
    /// timeouts at this layer; asking for one fails with
    /// [`TransportError::TimeoutUnsupported`] rather than silently doing
    /// nothing. Clearing the timeout (`None`) always succeeds.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            LinkStreamInner::Device(_) => match timeout {
                None => Ok(()),
                Some(_) => Err(TransportError::TimeoutUnsupported),
            },
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    ///
    /// Same support matrix as [`set_read_timeout`](Self::set_read_timeout).
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            LinkStreamInner::Device(_) => match timeout {
                None => Ok(()),
                Some(_) => Err(TransportError::TimeoutUnsupported),
            },
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            LinkStreamInner::Device(file) => {
                let cloned = file.try_clone()?;
                Ok(Self::from_device(cloned))
            }
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => {
                let cloned = stream.try_clone()?;
                Ok(Self::from_unix(cloned))
            }
        }
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            LinkStreamInner::Device(_) => f
                .debug_struct("LinkStream")
                .field("type", &"device")
                .finish(),
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => {
                f.debug_struct("LinkStream").field("type", &"unix").finish()
            }
        }
    }
}

/// Pull-one-byte capability consumed by the deframing layer.
///
/// The single blocking point of a synchronization attempt is "wait for the
/// next byte"; `next_byte` suspends the calling thread in the OS read rather
/// than polling. End of stream surfaces as [`ErrorKind::UnexpectedEof`] —
/// a live serial link has no natural end, so EOF means the device or bridge
/// went away.
pub trait ByteSource {
    /// Block until one byte is available and return it.
    fn next_byte(&mut self) -> std::io::Result<u8>;

    /// Read exactly `buf.len()` bytes.
    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.next_byte()?;
        }
        Ok(())
    }
}

impl<R: Read> ByteSource for R {
    fn next_byte(&mut self) -> std::io::Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.read(&mut byte) {
                Ok(0) => return Err(std::io::Error::from(ErrorKind::UnexpectedEof)),
                Ok(_) => return Ok(byte[0]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        self.read_exact(buf)
    }
}

use std::fs::OpenOptions;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::LinkStream;

/// Serial device transport.
///
/// Opens character devices directly, or connects to a Unix domain socket
/// when the link is carried by a ser2net-style bridge. The device must
/// already be configured (baud rate, parity); this layer only moves bytes.
pub struct SerialDevice;

impl SerialDevice {
    /// Open a serial character device read/write.
    ///
    /// Fails with [`TransportError::NotACharDevice`] if the path exists but
    /// is a regular file, directory, or socket — deframing a non-device
    /// usually means a mistyped path, and reading it would desynchronize
    /// silently instead of failing loudly.
    pub fn open(path: impl AsRef<Path>) -> Result<LinkStream> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| TransportError::Open {
                path: path.clone(),
                source: e,
            })?;

        let metadata = file.metadata().map_err(|e| TransportError::Open {
            path: path.clone(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if !metadata.file_type().is_char_device() {
                return Err(TransportError::NotACharDevice { path });
            }
        }
        #[cfg(not(unix))]
        let _ = &metadata;

        info!(?path, "opened serial device");
        Ok(LinkStream::from_device(file))
    }

    /// Connect to a Unix domain socket carrying a serial byte stream (blocking).
    #[cfg(unix)]
    pub fn connect_socket(path: impl AsRef<Path>) -> Result<LinkStream> {
        let path = path.as_ref();
        let stream =
            std::os::unix::net::UnixStream::connect(path).map_err(|e| TransportError::Connect {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(?path, "connected to serial bridge socket");
        Ok(LinkStream::from_unix(stream))
    }

    /// Transport name for diagnostics.
    pub fn transport_name() -> &'static str {
        "serial-device"
    }
}

use std::path::PathBuf;

/// Errors that can occur in serial link transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the specified device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to connect to the specified socket.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The path exists but is not a character device.
    #[error("not a character device: {path}")]
    NotACharDevice { path: PathBuf },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying stream type cannot enforce read/write timeouts.
    #[error("timeouts are not supported on character devices")]
    TimeoutUnsupported,
}

pub type Result<T> = std::result::Result<T, TransportError>;

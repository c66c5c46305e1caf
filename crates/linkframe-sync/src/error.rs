/// Errors that can occur during frame synchronization and packet transfer.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No candidate start position in the scanned window passed checksum.
    ///
    /// Recoverable: the examined bytes are discarded and the next attempt
    /// starts at the next incoming byte. Whether and how often to retry is
    /// the caller's decision.
    #[error("no valid frame header found in scan window")]
    FrameNotFound,

    /// The scan window or candidate count outgrew the configured limits.
    #[error("scan window exceeded ({required} bytes required, max {max})")]
    WindowExceeded { required: usize, max: usize },

    /// The payload exceeds the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred on the underlying byte source.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source reached end of stream before a complete frame.
    #[error("byte source closed (incomplete frame)")]
    SourceClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;

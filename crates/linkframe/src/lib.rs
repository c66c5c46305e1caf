//! Deframe serial byte streams into checksum-validated packets.
//!
//! linkframe recovers discrete application packets from a continuous byte
//! stream on an unreliable serial link — marker scanning, candidate
//! tracking, and header checksum validation included.
//!
//! # Crate Structure
//!
//! - [`transport`] — Serial device / socket byte-stream transport
//! - [`sync`] — Frame synchronization, packet reading and writing

/// Re-export transport types.
pub mod transport {
    pub use linkframe_transport::*;
}

/// Re-export synchronization and packet types.
pub mod sync {
    pub use linkframe_sync::*;
}

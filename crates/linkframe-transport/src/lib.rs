//! Serial link transport abstraction.
//!
//! Provides a unified byte-stream interface over the ways a serial link
//! reaches a process:
//! - Character devices (`/dev/ttyUSB0` and friends)
//! - Unix domain sockets (ser2net-style bridges, tests)
//!
//! This is the lowest layer of linkframe. Everything else builds on the
//! [`LinkStream`] type and the [`ByteSource`] capability provided here.
//! Port configuration (baud rate, parity, port selection) is deliberately
//! outside this layer; devices are used as already configured.

pub mod device;
pub mod error;
pub mod traits;

pub use device::SerialDevice;
pub use error::{Result, TransportError};
pub use traits::{ByteSource, LinkStream};

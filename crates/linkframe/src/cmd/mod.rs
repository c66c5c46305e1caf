use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use linkframe_transport::{LinkStream, SerialDevice};

use crate::exit::{transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod inspect;
pub mod send;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch a serial link and print received packets.
    Watch(WatchArgs),
    /// Encode and send a single packet.
    Send(SendArgs),
    /// Deframe a captured byte-stream file.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Watch(args) => watch::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Serial device or bridge socket to read from.
    pub path: PathBuf,
    /// Exit after receiving N packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Largest scan window in bytes.
    #[arg(long)]
    pub max_window: Option<usize>,
    /// Most marker candidates tracked per scan window.
    #[arg(long)]
    pub max_candidates: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial device or bridge socket to write to.
    pub path: PathBuf,
    /// Flags byte (decimal or 0x-prefixed hex).
    #[arg(long, default_value = "0")]
    pub flags: String,
    /// Source address (decimal or 0x-prefixed hex).
    #[arg(long, default_value = "0")]
    pub src: String,
    /// Destination address (decimal or 0x-prefixed hex).
    #[arg(long, default_value = "0")]
    pub dst: String,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Capture file holding raw link bytes.
    pub path: PathBuf,
    /// Keep scanning after a window with no valid header.
    #[arg(long)]
    pub keep_going: bool,
    /// Stop after decoding N packets.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open `path` as whatever kind of link it is: character devices are opened
/// directly, sockets are connected to, anything else is a usage error.
pub fn open_stream(path: &Path) -> CliResult<LinkStream> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        let metadata = std::fs::metadata(path).map_err(|err| {
            crate::exit::io_error(&format!("cannot stat {}", path.display()), err)
        })?;
        if metadata.file_type().is_socket() {
            return SerialDevice::connect_socket(path)
                .map_err(|err| transport_error("connect failed", err));
        }
    }
    SerialDevice::open(path).map_err(|err| transport_error("open failed", err))
}

pub fn parse_u32(input: &str) -> CliResult<u32> {
    let input = input.trim();
    let parsed = if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        input.parse()
    };
    parsed.map_err(|_| CliError::new(USAGE, format!("invalid numeric value: {input}")))
}

pub fn parse_u8(input: &str) -> CliResult<u8> {
    let value = parse_u32(input)?;
    u8::try_from(value)
        .map_err(|_| CliError::new(USAGE, format!("value does not fit in one byte: {input}")))
}

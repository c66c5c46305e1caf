use std::fs::File;
use std::io::BufReader;

use linkframe_sync::{FrameError, PacketReader};
use tracing::debug;

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let file = File::open(&args.path).map_err(|err| {
        crate::exit::io_error(&format!("cannot open {}", args.path.display()), err)
    })?;
    let mut reader = PacketReader::new(BufReader::new(file));

    let mut decoded = 0usize;

    loop {
        match reader.read_packet() {
            Ok(packet) => {
                print_packet(&packet, format);
                decoded += 1;
                if let Some(count) = args.count {
                    if decoded >= count {
                        break;
                    }
                }
            }
            // A capture ends where the bytes end; that's the normal exit.
            Err(FrameError::SourceClosed) => break,
            Err(err @ FrameError::FrameNotFound) | Err(err @ FrameError::WindowExceeded { .. }) => {
                if args.keep_going {
                    debug!("skipping invalid scan window");
                    continue;
                }
                return Err(frame_error("inspect failed", err));
            }
            Err(err) => return Err(frame_error("inspect failed", err)),
        }
    }

    debug!(decoded, "capture exhausted");
    Ok(SUCCESS)
}

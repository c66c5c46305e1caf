use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use linkframe_sync::{FrameError, PacketReader, SyncConfig};
use tracing::warn;

use crate::cmd::{open_stream, WatchArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = SyncConfig::default();
    if let Some(max_window) = args.max_window {
        config.max_window = max_window;
    }
    if let Some(max_candidates) = args.max_candidates {
        config.max_candidates = max_candidates;
    }

    let stream = open_stream(&args.path)?;
    let mut reader = PacketReader::with_config(stream, config);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let packet = match reader.read_packet() {
            Ok(packet) => packet,
            // The link is noisy by assumption; a bad window just means the
            // next attempt starts at the next incoming byte.
            Err(FrameError::FrameNotFound) => {
                warn!("scan window had no valid header, resynchronizing");
                continue;
            }
            Err(FrameError::WindowExceeded { required, max }) => {
                warn!(required, max, "scan window limit hit, resynchronizing");
                continue;
            }
            Err(FrameError::SourceClosed) => break,
            Err(err) => return Err(frame_error("receive failed", err)),
        };

        print_packet(&packet, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

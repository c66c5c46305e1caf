use std::fs;

use linkframe_sync::{PacketWriter, MAX_PAYLOAD};

use crate::cmd::{open_stream, parse_u32, parse_u8, SendArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, _format: OutputFormat) -> CliResult<i32> {
    let flags = parse_u8(&args.flags)?;
    let src = parse_u32(&args.src)?;
    let dst = parse_u32(&args.dst)?;
    let payload = resolve_payload(&args)?;

    if payload.len() > MAX_PAYLOAD {
        return Err(CliError::new(
            USAGE,
            format!("payload too large ({} bytes, max {MAX_PAYLOAD})", payload.len()),
        ));
    }

    let stream = open_stream(&args.path)?;
    let mut writer = PacketWriter::new(stream);
    writer
        .send(flags, src, dst, &payload)
        .map_err(|err| frame_error("send failed", err))?;

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(hex) = &args.hex {
        return decode_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(Vec::new())
}

fn decode_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            "--hex needs an even number of hex digits",
        ));
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("--hex is not valid hex: {input}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_accepts_spaced_pairs() {
        assert_eq!(decode_hex("AA 01 ff").unwrap(), vec![0xAA, 0x01, 0xFF]);
        assert_eq!(decode_hex("deadbeef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn decode_hex_rejects_odd_length_and_garbage() {
        assert!(decode_hex("ABC").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn empty_payload_when_no_source_given() {
        let args = SendArgs {
            path: "/dev/null".into(),
            flags: "0".into(),
            src: "0".into(),
            dst: "0".into(),
            data: None,
            hex: None,
            file: None,
        };
        assert!(resolve_payload(&args).unwrap().is_empty());
    }
}

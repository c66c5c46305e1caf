use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use linkframe_sync::Packet;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput {
    flags: u8,
    src: u32,
    dst: u32,
    length: u16,
    payload: String,
    timestamp: String,
}

pub fn print_packet(packet: &Packet, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                flags: packet.header.flags,
                src: packet.header.src,
                dst: packet.header.dst,
                length: packet.header.length,
                payload: payload_preview(packet.payload.as_ref()),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FLAGS", "SRC", "DST", "LEN", "PAYLOAD"])
                .add_row(vec![
                    format!("0x{:02X}", packet.header.flags),
                    format!("0x{:08X}", packet.header.src),
                    format!("0x{:08X}", packet.header.dst),
                    packet.header.length.to_string(),
                    payload_preview(packet.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "flags=0x{:02X} src=0x{:08X} dst=0x{:08X} len={} payload={}",
                packet.header.flags,
                packet.header.src,
                packet.header.dst,
                packet.header.length,
                payload_preview(packet.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(packet.payload.as_ref());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

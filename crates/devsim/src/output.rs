use std::io::{IsTerminal, Write};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use devsim_device::Status;
use devsim_frame::{type_name, Frame};
use serde::Serialize;

/// Local identifiers for the JSON output shapes; not resolvable URLs.
pub const RESPONSE_SCHEMA_ID: &str = "urn:devsim:cli:v1:response";
pub const LISTENING_SCHEMA_ID: &str = "urn:devsim:cli:v1:listening";

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
struct ResponseOutput<'a> {
    schema_id: &'a str,
    transport: &'a str,
    remote: String,
    msg_type: u8,
    type_name: &'a str,
    payload_size: usize,
    payload: String,
    elapsed_ms: u128,
    timestamp: String,
}

pub fn print_response(
    frame: &Frame,
    transport: &str,
    remote: SocketAddr,
    elapsed: Duration,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = ResponseOutput {
                schema_id: RESPONSE_SCHEMA_ID,
                transport,
                remote: remote.to_string(),
                msg_type: frame.msg_type,
                type_name: type_name(frame.msg_type),
                payload_size: frame.payload.len(),
                payload: payload_preview(frame),
                elapsed_ms: elapsed.as_millis(),
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
                .set_header(vec!["TRANSPORT", "TYPE", "SIZE", "PAYLOAD", "ELAPSED"])
                .add_row(vec![
                    transport.to_string(),
                    format!("{} ({})", type_name(frame.msg_type), frame.msg_type),
                    frame.payload.len().to_string(),
                    payload_preview(frame),
                    format!("{}ms", elapsed.as_millis()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "transport={} remote={} type={} ({}) size={} payload={} elapsed={}ms",
                transport,
                remote,
                frame.msg_type,
                type_name(frame.msg_type),
                frame.payload.len(),
                payload_preview(frame),
                elapsed.as_millis()
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

#[derive(Serialize)]
struct ListeningOutput<'a> {
    schema_id: &'a str,
    udp: String,
    tcp: String,
    device: &'a Status,
}

/// Announce the bound endpoints. Always a single line so scripts can wait on it.
pub fn print_listening(udp: SocketAddr, tcp: SocketAddr, status: &Status, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ListeningOutput {
                schema_id: LISTENING_SCHEMA_ID,
                udp: udp.to_string(),
                tcp: tcp.to_string(),
                device: status,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => {
            let faults = &status.faults;
            println!(
                "udp={udp} tcp={tcp} state={} delay_ms={} drop_rate={} corrupt_rate={}",
                status.state,
                faults.delay_ms(),
                faults.drop_rate(),
                faults.corrupt_rate()
            );
        }
    }
    let _ = std::io::stdout().flush();
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(frame: &Frame) -> String {
    match frame.payload_str() {
        Some(text) => text.to_string(),
        None => format!("<binary {} bytes>", frame.payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

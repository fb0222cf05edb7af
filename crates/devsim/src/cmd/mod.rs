use clap::{Args, Subcommand, ValueEnum};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulator on both transports until interrupted.
    Serve(ServeArgs),
    /// Send one request and print the response.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Datagram (UDP) listen address.
    #[arg(long, env = "SIM_UDP_ADDR", default_value = "127.0.0.1:9000")]
    pub udp: String,
    /// Stream (TCP) listen address.
    #[arg(long, env = "SIM_TCP_ADDR", default_value = "127.0.0.1:9001")]
    pub tcp: String,
    /// Delay before every reply, in milliseconds (0-5000).
    #[arg(long, env = "SIM_DELAY_MS", default_value_t = 0)]
    pub delay_ms: u64,
    /// Probability of dropping a request (0.0-1.0).
    #[arg(long, env = "SIM_DROP_RATE", default_value_t = 0.0)]
    pub drop_rate: f64,
    /// Probability of corrupting a reply (0.0-1.0).
    #[arg(long, env = "SIM_CORRUPT_RATE", default_value_t = 0.0)]
    pub corrupt_rate: f64,
    /// Seed for reproducible fault decisions.
    #[arg(long, env = "SIM_SEED")]
    pub seed: Option<u64>,
    /// Start in CONFIGURED instead of IDLE.
    #[arg(long)]
    pub configure: bool,
    /// How long a stream connection may take to deliver its request (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub read_timeout: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    Udp,
    Tcp,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Udp => "udp",
            TransportKind::Tcp => "tcp",
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Simulator address (HOST:PORT).
    pub addr: String,
    /// Transport to send over.
    #[arg(long, short = 't', value_enum, default_value = "udp")]
    pub transport: TransportKind,
    /// Request type: ping, status, start, stop or a numeric code.
    #[arg(long = "type", short = 'm', default_value = "ping")]
    pub msg_type: String,
    /// Raw string payload.
    #[arg(long)]
    pub data: Option<String>,
    /// Total attempts, including the first.
    #[arg(long, default_value_t = 1)]
    pub attempts: u32,
    /// Wait before the first retry (e.g. 50ms).
    #[arg(long, default_value = "50ms")]
    pub base_delay: String,
    /// Upper bound on the wait between retries.
    #[arg(long, default_value = "250ms")]
    pub max_delay: String,
    /// Per-attempt response timeout. Defaults to the transport's own.
    #[arg(long)]
    pub timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse "5s", "150ms" or a bare number of seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> CliResult<std::time::Duration> {
    use std::time::Duration;

    use crate::exit::{CliError, USAGE};

    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}

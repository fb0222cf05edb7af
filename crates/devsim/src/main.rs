mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "devsim", version, about = "Fault-injecting device simulator")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::TransportKind;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "devsim",
            "send",
            "127.0.0.1:9001",
            "--transport",
            "tcp",
            "--type",
            "start",
            "--attempts",
            "5",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.transport, TransportKind::Tcp);
                assert_eq!(args.msg_type, "start");
                assert_eq!(args.attempts, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_serve_subcommand() {
        let cli = Cli::try_parse_from([
            "devsim",
            "serve",
            "--udp",
            "127.0.0.1:0",
            "--drop-rate",
            "0.25",
            "--seed",
            "42",
        ])
        .expect("serve args should parse");

        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.udp, "127.0.0.1:0");
                assert_eq!(args.drop_rate, 0.25);
                assert_eq!(args.seed, Some(42));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_transport() {
        let err = Cli::try_parse_from(["devsim", "send", "127.0.0.1:9000", "--transport", "sctp"])
            .expect_err("unknown transport should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}

mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "linkframe", version, about = "Serial link deframing CLI")]
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

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "linkframe",
            "send",
            "/dev/ttyUSB0",
            "--flags",
            "0x01",
            "--src",
            "2",
            "--dst",
            "3",
            "--data",
            "hello",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "linkframe",
            "send",
            "/dev/ttyUSB0",
            "--hex",
            "AABB",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_inspect_subcommand() {
        let cli = Cli::try_parse_from(["linkframe", "inspect", "capture.bin", "--keep-going"])
            .expect("inspect args should parse");
        assert!(matches!(cli.command, Command::Inspect(_)));
    }

    #[test]
    fn parses_watch_with_limits() {
        let cli = Cli::try_parse_from([
            "linkframe",
            "watch",
            "/dev/ttyUSB0",
            "--count",
            "3",
            "--max-candidates",
            "16",
        ])
        .expect("watch args should parse");
        assert!(matches!(cli.command, Command::Watch(_)));
    }
}

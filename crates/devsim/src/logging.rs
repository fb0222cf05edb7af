use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Overrides the computed filter with a full directive string.
pub const LOG_ENV: &str = "DEVSIM_LOG";

/// Crates whose events follow `--log-level`; everything else stays at `warn`.
const DEVSIM_TARGETS: [&str; 6] = [
    "devsim",
    "devsim_transport",
    "devsim_frame",
    "devsim_device",
    "devsim_server",
    "devsim_client",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// `warn` for dependencies, `level` for the simulator's own crates.
fn default_directives(level: LogLevel) -> String {
    let mut directives = String::from("warn");
    for target in DEVSIM_TARGETS {
        directives.push_str(&format!(",{target}={}", level.as_str()));
    }
    directives
}

/// Install the stderr subscriber. Stdout is reserved for command output.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

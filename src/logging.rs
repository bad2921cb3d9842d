use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(anyhow::anyhow!(
                "Invalid log level '{}'. Valid options are: error, warn, info, debug, trace",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
    Simple,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            "simple" => Ok(LogFormat::Simple),
            _ => Err(anyhow::anyhow!(
                "Invalid log format '{}'. Valid options are: pretty, json, compact, simple",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    #[serde(default = "default_log_output")]
    pub output: LogOutput,
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_format() -> LogFormat {
    LogFormat::Simple
}

fn default_log_output() -> LogOutput {
    LogOutput::Stdout
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
        }
    }
}

/// Initialize the global `tracing` subscriber. Must be called at most once
/// per process; the engine itself never does this (library code only emits
/// `tracing` events, it never installs a subscriber).
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::new(config.level.as_str());

    match &config.output {
        LogOutput::Stdout => {
            let layer = match config.format {
                LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
                LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
                LogFormat::Compact => tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .without_time()
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .boxed(),
                LogFormat::Simple => tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_level(true)
                    .boxed(),
            };

            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogOutput::File { path } => {
            let file_appender = tracing_appender::rolling::never(
                path.parent().unwrap_or_else(|| std::path::Path::new(".")),
                path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("fidx.log")),
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = tracing_subscriber::fmt::layer().json().with_writer(non_blocking).boxed();

            tracing_subscriber::registry().with(filter).with(file_layer).init();

            // The non-blocking writer flushes on drop; leak the guard for the
            // life of the process so buffered lines aren't lost before exit.
            std::mem::forget(guard);
        }
    }

    tracing::debug!("logging initialized at {} level", config.level.as_str());

    Ok(())
}

//! Logging setup for the follower executables
//!
//! Every record goes to the session's log file at the requested level. The
//! console gets the same records, except for targets named as console quiet,
//! which are capped at `Info` there. This keeps per-tick control traces in
//! the log file without flooding the terminal.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{self, info};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Could not open the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A global logger is already set: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `console_quiet` lists log targets (module paths, e.g.
/// `follower_lib::line_ctrl`) whose debug and trace records are kept out of
/// the console but still written to the log file.
///
/// # Notes
///
/// - `min_level` must be at least `log::Level::Info`, so that state
///   transitions of the controller are never silenced.
/// - Only one logger may be set per process, a second call fails with
///   `FernInitError`.
pub fn logger_init(
    min_level: LevelFilter,
    console_quiet: &[&str],
    session: &session::Session,
) -> Result<(), LoggerInitError> {
    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let console = console_quiet.iter().fold(
        fern::Dispatch::new().chain(std::io::stdout()),
        |dispatch, target| dispatch.level_for(target.to_string(), LevelFilter::Info),
    );

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {}",
                record_prefix(
                    session::get_elapsed_seconds(),
                    record.level(),
                    record.target()
                ),
                message
            ))
        })
        .level(min_level)
        .chain(console)
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    if !console_quiet.is_empty() {
        info!("    Quiet on console: {:?}", console_quiet);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Prefix of a log line: elapsed session time and level tag, plus the
/// target for debug and trace records so per-module output can be told
/// apart.
fn record_prefix(elapsed_s: f64, level: log::Level, target: &str) -> String {
    if level > log::Level::Info {
        format!("[{:10.6} {}] {}:", elapsed_s, level_tag(level), target)
    } else {
        format!("[{:10.6} {}]", elapsed_s, level_tag(level))
    }
}

/// Three letter, coloured tag of a log level
fn level_tag(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

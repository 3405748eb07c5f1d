// ============================================================================
// scenesift-cli/src/logging.rs
// ============================================================================
//
// LOGGING: fern dispatch for console and per-run log file
//
// Everything the core prints goes through the `log` facade. The console gets
// the messages as they are (terminal module output is already styled); the
// run log gets a timestamped, level-tagged copy with colors stripped.
//
// The logger is installed once at startup, before any configuration is read,
// so early warnings reach the console. The run log file is only known after
// the log directory exists; until `attach_log_file` is called the file sink
// discards its input.
//
// The level is Info by default, Debug with `--verbose`, and RUST_LOG (when it
// names a level) wins over both.

use crate::error::{CliErrorContext, CliResult};

use log::{LevelFilter, Record};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

/// Target of the core's styled terminal output.
const TERMINAL_TARGET: &str = "scenesift_core::terminal";

/// The run log file, once attached.
static RUN_LOG: LazyLock<Mutex<Option<File>>> = LazyLock::new(|| Mutex::new(None));

/// Writer behind the file sink. Writes go nowhere until a file is attached.
struct RunLogWriter;

impl Write for RunLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match RUN_LOG.lock() {
            Ok(mut slot) => match slot.as_mut() {
                Some(file) => file.write(buf),
                None => Ok(buf.len()),
            },
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match RUN_LOG.lock() {
            Ok(mut slot) => slot.as_mut().map_or(Ok(()), File::flush),
            Err(_) => Ok(()),
        }
    }
}

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the log file for a run started now.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("scenesift_run_{}.log", get_timestamp()))
}

/// Picks the log level from the RUST_LOG value and the verbose flag.
pub fn resolve_level(rust_log: Option<&str>, verbose: bool) -> LevelFilter {
    rust_log
        .and_then(|value| value.trim().parse::<LevelFilter>().ok())
        .unwrap_or(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
}

fn console_line(record: &Record, message: &str) -> String {
    if record.target() == TERMINAL_TARGET || record.level() == log::Level::Info {
        message.to_string()
    } else {
        format!("[{}] {message}", record.level())
    }
}

/// Installs the global logger: styled messages to stdout plus a timestamped
/// copy for the run log file attached later with [`attach_log_file`].
///
/// # Errors
///
/// * If a logger was already installed
pub fn init_logging(verbose: bool) -> CliResult<()> {
    let level = resolve_level(std::env::var("RUST_LOG").ok().as_deref(), verbose);

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", console_line(record, &message.to_string())))
        })
        .chain(std::io::stdout());

    let run_log = fern::Dispatch::new()
        .format(|out, message, record| {
            let plain = strip_ansi_escapes::strip_str(message.to_string());
            out.finish(format_args!(
                "{} [{:<5}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                plain
            ))
        })
        .chain(Box::new(RunLogWriter) as Box<dyn Write + Send>);

    fern::Dispatch::new()
        .level(level)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console)
        .chain(run_log)
        .apply()
        .map_err(|e| crate::cli_error!("Failed to initialize logging: {e}"))
}

/// Starts appending every further message to `path`.
///
/// # Errors
///
/// * If the log file cannot be opened
pub fn attach_log_file(path: &Path) -> CliResult<()> {
    let file = fern::log_file(path)
        .cli_with_context(|| format!("Failed to open log file '{}'", path.display()))?;
    let mut slot = RUN_LOG
        .lock()
        .map_err(|_| crate::cli_error!("Run log lock poisoned"))?;
    *slot = Some(file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let stamp = get_timestamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_run_log_name() {
        let path = run_log_path(Path::new("/out/logs"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("scenesift_run_"));
        assert!(name.ends_with(".log"));
        assert_eq!(path.parent(), Some(Path::new("/out/logs")));
    }

    #[test]
    fn test_level_resolution() {
        assert_eq!(resolve_level(None, false), LevelFilter::Info);
        assert_eq!(resolve_level(None, true), LevelFilter::Debug);
        assert_eq!(resolve_level(Some("trace"), false), LevelFilter::Trace);
        assert_eq!(resolve_level(Some("warn"), true), LevelFilter::Warn);
        // Module filters such as "scenesift=debug" are not a plain level.
        assert_eq!(resolve_level(Some("scenesift=debug"), false), LevelFilter::Info);
    }

    fn line_for(target: &str, level: log::Level, message: &str) -> String {
        console_line(
            &Record::builder()
                .target(target)
                .level(level)
                .args(format_args!("{message}"))
                .build(),
            message,
        )
    }

    #[test]
    fn test_console_line_tags_only_plain_warnings() {
        assert_eq!(line_for("scenesift_core::pipeline", log::Level::Info, "hi"), "hi");
        assert_eq!(
            line_for("scenesift_core::config::presets", log::Level::Warn, "odd"),
            "[WARN] odd"
        );
        // Terminal output is already styled, whatever its level.
        assert_eq!(line_for(TERMINAL_TARGET, log::Level::Warn, "  ⚠ careful"), "  ⚠ careful");
        assert_eq!(line_for(TERMINAL_TARGET, log::Level::Error, "✗ broke"), "✗ broke");
    }
}

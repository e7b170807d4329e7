//! Stderr backend for the `log` facade.

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

struct Logger;

struct PrettyLogLevel(Level);

struct PrettyModulePath<'a>(Option<&'a str>);

static LOGGER: Logger = Logger;

static START: OnceLock<Instant> = OnceLock::new();

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let time = START.get_or_init(Instant::now).elapsed().as_secs_f64();
            let level = PrettyLogLevel(record.level());
            let module = PrettyModulePath(record.module_path());
            let _ = writeln!(
                std::io::stderr().lock(),
                "[{time:>11.6}] {level} {module}{}",
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

impl std::fmt::Display for PrettyLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self.0 {
            Level::Error => "\x1B[1;31mERRO\x1B[0m",
            Level::Warn => "\x1B[1;33mWARN\x1B[0m",
            Level::Info => "\x1B[1;32mINFO\x1B[0m",
            Level::Debug => "\x1B[1;36mDEBG\x1B[0m",
            Level::Trace => "\x1B[1;34mTRCE\x1B[0m",
        })
    }
}

impl std::fmt::Display for PrettyModulePath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(path) = self.0 else {
            return Ok(());
        };
        if path == "lineshell" {
            return Ok(());
        }
        let last = path.rsplit("::").next().unwrap_or(path);
        write!(f, "\x1B[1m{last}: \x1B[0m")
    }
}

/// Install the stderr logger. Can only succeed once per process.
pub fn initialize_log(level: LevelFilter) -> Result<(), SetLoggerError> {
    START.get_or_init(Instant::now);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

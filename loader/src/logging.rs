//! Code implementing the logging solution for the loader.

use core::fmt::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use sync::{Spinlock, SpinlockGuard};

/// The target of the records a halting core writes.
///
/// Such a record is dropped if the console stays held for [`HALT_ATTEMPTS`] attempts, so a core
/// that faulted while writing to the console still reaches its wait loop.
pub const HALT_TARGET: &str = "halt";

/// How often a [`HALT_TARGET`] record retries a held console.
const HALT_ATTEMPTS: usize = 1 << 16;

/// A [`Log`] implementation that writes one line per record to a console.
///
/// The console is held for the duration of a record, so records from different cores never
/// interleave.
pub struct ConsoleLogger<W> {
    /// The output every record is written to.
    console: Spinlock<W>,
    /// The most verbose level that is written.
    level: LevelFilter,
}

impl<W> ConsoleLogger<W> {
    /// Creates a [`ConsoleLogger`] writing records up to `level` to `console`.
    pub const fn new(console: W, level: LevelFilter) -> Self {
        Self {
            console: Spinlock::new(console),
            level,
        }
    }

    /// Returns the console if it becomes free within [`HALT_ATTEMPTS`] attempts.
    fn try_console(&self) -> Option<SpinlockGuard<'_, W>> {
        (0..HALT_ATTEMPTS).find_map(|_| {
            let console = self.console.try_lock();
            if console.is_none() {
                core::hint::spin_loop();
            }
            console
        })
    }

    /// Returns the console, consuming the logger.
    #[cfg(test)]
    pub fn into_console(self) -> W {
        self.console.into_inner()
    }
}

impl<W: Write + Send> Log for ConsoleLogger<W> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let args = record.args();
        let mut console = if record.target() == HALT_TARGET {
            let Some(console) = self.try_console() else {
                return;
            };
            console
        } else {
            self.console.lock()
        };
        // Ignore any logging errors because there is no method to report or deal with them.
        let _ = match record.level() {
            Level::Trace => console.write_fmt(format_args!("TRACE: {args}\n")),
            Level::Debug => console.write_fmt(format_args!("DEBUG: {args}\n")),
            Level::Info => console.write_fmt(format_args!("INFO : {args}\n")),
            Level::Warn => console.write_fmt(format_args!("WARN : {args}\n")),
            Level::Error => console.write_fmt(format_args!("ERROR: {args}\n")),
        };
    }

    fn flush(&self) {}
}

impl<W> fmt::Debug for ConsoleLogger<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Installs `logger` as the global logger and enables records up to `level`.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger was already installed.
pub fn init(logger: &'static dyn Log, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(level);

    Ok(())
}

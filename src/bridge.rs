//! Compatibility bridge for the Rust `log` crate.
//!
//! `LogBridge` implements `log::Log` so code already logging through the
//! facade can fan records out to a chat. Records carrying the crate's own
//! diagnostic target are skipped, so a failing delivery reported through
//! [`LogDiagnostics`](crate::diagnostics::LogDiagnostics) can never feed
//! back into the handler that reported it.

use std::sync::{Arc, OnceLock};

use log::{Metadata, Record};

use crate::diagnostics::DIAGNOSTIC_TARGET;
use crate::handler::TelegramHandler;
use crate::level::Level;
use crate::record::{LogRecord, RecordMetadata};

fn map_log_level(level: log::Level) -> Level {
    match level {
        log::Level::Trace => Level::Trace,
        log::Level::Debug => Level::Debug,
        log::Level::Info => Level::Info,
        log::Level::Warn => Level::Warn,
        log::Level::Error => Level::Error,
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        map_log_level(level)
    }
}

/// Adapter implementing the Rust `log::Log` trait on top of a handler.
///
/// The facade carries no function name, so converted records leave
/// `metadata.function` empty and render their origin as `[target]`.
pub struct LogBridge {
    handler: Arc<TelegramHandler>,
}

impl LogBridge {
    pub fn new(handler: Arc<TelegramHandler>) -> Self {
        Self { handler }
    }

    /// Install `handler` behind the global Rust logger.
    ///
    /// Returns `true` on success. When a different global logger is already
    /// set, installation fails and `false` is returned. Subsequent calls
    /// return the cached outcome.
    pub fn install(handler: Arc<TelegramHandler>) -> bool {
        static INSTALL_RESULT: OnceLock<bool> = OnceLock::new();
        *INSTALL_RESULT.get_or_init(|| {
            // set_logger needs a 'static reference; the bridge lives for the
            // rest of the process.
            let bridge = Box::leak(Box::new(LogBridge::new(handler)));
            if log::set_logger(bridge).is_err() {
                return false;
            }
            log::set_max_level(log::LevelFilter::Trace);
            true
        })
    }

    fn convert(record: &Record<'_>) -> LogRecord {
        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_string(),
            filename: record.file().unwrap_or_default().to_string(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        LogRecord::with_metadata(
            record.target(),
            Level::from(record.level()),
            &record.args().to_string(),
            metadata,
        )
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !metadata.target().starts_with(DIAGNOSTIC_TARGET)
            && Level::from(metadata.level()) >= self.handler.level()
    }

    fn log(&self, record: &Record<'_>) {
        if record.target().starts_with(DIAGNOSTIC_TARGET) {
            return;
        }
        self.handler.emit(&Self::convert(record));
    }

    fn flush(&self) {
        // Delivery is synchronous; there is nothing buffered to flush.
    }
}

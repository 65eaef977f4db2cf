//! # Process-Wide State
//!
//! Two pieces of state are shared across the whole process:
//!
//! - the **default logger**, used by the convenience functions in this module
//!   and by the `log` crate bridge;
//! - the **legacy level**, the single severity given to every record that
//!   arrives through the `log` facade (`log::info!`, `log::warn!`, ...). The
//!   facade's own level is ignored so that legacy output can be promoted or
//!   demoted as a whole.
//!
//! Both are written only through the explicit setters below. The
//! construction entrypoint [`crate::logger`] calls [`set_legacy_level`]
//! unconditionally and [`set_default`] only when asked to.

use crate::attr::{Attr, Source};
use crate::handler::{HandlerOptions, TextHandler};
use crate::level::Level;
use crate::logger::{Logger, Record};
use parking_lot::{const_rwlock, Once, RwLock};
use std::io;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing::debug;

static DEFAULT_LOGGER: RwLock<Option<Logger>> = const_rwlock(None);
static LEGACY_LEVEL: AtomicI32 = AtomicI32::new(Level::INFO.as_i32());
static BRIDGE_INIT: Once = Once::new();
static BRIDGE: LegacyBridge = LegacyBridge;

/// Installs `logger` as the process default and routes the `log` facade to
/// it.
///
/// Postcondition: [`default_logger`] returns a clone of `logger` until the
/// next call. The `log` bridge is registered on the first call only; if
/// another `log` implementation was registered first, that one stays in
/// place and only this crate's own entry points see the new default.
pub fn set_default(logger: Logger) {
    debug!(handler = logger.handler().name(), "Installing default logger");
    *DEFAULT_LOGGER.write() = Some(logger);

    BRIDGE_INIT.call_once(|| match log::set_logger(&BRIDGE) {
        Ok(()) => log::set_max_level(log::LevelFilter::Trace),
        Err(_) => debug!("A log facade implementation is already registered"),
    });
}

/// Returns the process default logger.
///
/// Before [`set_default`] has been called this is a text logger on standard
/// error at the INFO threshold.
pub fn default_logger() -> Logger {
    if let Some(logger) = DEFAULT_LOGGER.read().as_ref() {
        return logger.clone();
    }
    fallback_logger()
}

fn fallback_logger() -> Logger {
    let handler = TextHandler::new(Box::new(io::stderr()), HandlerOptions::default());
    Logger::new(Arc::new(handler))
}

/// Sets the level given to records arriving through the `log` facade.
pub fn set_legacy_level(level: Level) {
    LEGACY_LEVEL.store(level.as_i32(), Ordering::Relaxed);
}

/// Level currently given to records arriving through the `log` facade.
pub fn legacy_level() -> Level {
    Level(LEGACY_LEVEL.load(Ordering::Relaxed))
}

#[track_caller]
pub fn debug(message: impl AsRef<str>, attrs: &[Attr]) {
    default_logger().log(Level::DEBUG, message, attrs);
}

#[track_caller]
pub fn info(message: impl AsRef<str>, attrs: &[Attr]) {
    default_logger().log(Level::INFO, message, attrs);
}

#[track_caller]
pub fn warn(message: impl AsRef<str>, attrs: &[Attr]) {
    default_logger().log(Level::WARN, message, attrs);
}

#[track_caller]
pub fn error(message: impl AsRef<str>, attrs: &[Attr]) {
    default_logger().log(Level::ERROR, message, attrs);
}

/// `log` facade implementation forwarding into the default logger.
struct LegacyBridge;

impl log::Log for LegacyBridge {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        default_logger().enabled(legacy_level())
    }

    fn log(&self, record: &log::Record<'_>) {
        let logger = default_logger();
        let level = legacy_level();
        if !logger.enabled(level) {
            return;
        }

        let source = Source::new(
            record.module_path().unwrap_or_default(),
            record.file().unwrap_or_default(),
            record.line().unwrap_or_default(),
        );
        logger.log_record(
            Record::new(level, record.args().to_string(), Vec::new()).with_source(source),
        );
    }

    fn flush(&self) {}
}

//! Bridge from the `tracing` ecosystem into a [`Logger`].
//!
//! [`LoggerLayer`] is a `tracing_subscriber` layer that turns every `tracing`
//! event into a record on a [`Logger`], so libraries instrumented with
//! `tracing` share the same output, threshold and custom level names as the
//! application's own records.
//!
//! ```rust,no_run
//! use logflags::{logger, LogFlags, LoggerLayer};
//! use tracing_subscriber::prelude::*;
//!
//! let log = logger(&LogFlags::default(), Vec::new());
//! tracing_subscriber::registry()
//!     .with(LoggerLayer::new(log))
//!     .init();
//!
//! tracing::warn!(port = 8080, "listener busy");
//! ```

use crate::attr::{Attr, Source, Value};
use crate::global;
use crate::level::Level;
use crate::logger::{Logger, Record};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Forwards `tracing` events to a [`Logger`].
#[derive(Debug, Clone)]
pub struct LoggerLayer {
    /// `None` follows the process default logger at event time.
    logger: Option<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: Some(logger),
        }
    }

    /// A layer that looks up [`global::default_logger`] for every event.
    pub fn default_logger() -> Self {
        Self { logger: None }
    }

    /// Maps a `tracing` level onto the severity scale. `TRACE` sits below
    /// `DEBUG` with the same spacing as the built-in levels.
    pub fn map_level(level: &tracing::Level) -> Level {
        match *level {
            tracing::Level::TRACE => Level::DEBUG.offset(-4),
            tracing::Level::DEBUG => Level::DEBUG,
            tracing::Level::INFO => Level::INFO,
            tracing::Level::WARN => Level::WARN,
            tracing::Level::ERROR => Level::ERROR,
        }
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Self::map_level(metadata.level());

        let logger = match &self.logger {
            Some(logger) => logger.clone(),
            None => global::default_logger(),
        };
        if !logger.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let source = Source::new(
            metadata.module_path().unwrap_or_default(),
            metadata.file().unwrap_or_default(),
            metadata.line().unwrap_or_default(),
        );
        logger.log_record(Record::new(level, visitor.message, visitor.attrs).with_source(source));
    }
}

/// Collects event fields, pulling out the `message` field.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    attrs: Vec<Attr>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.attrs.push(Attr::new(field.name(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::Float(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::Uint(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, Value::String(format!("{:?}", value)));
    }
}

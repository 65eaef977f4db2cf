//! # Record Handlers
//!
//! A [`Handler`] decides whether a record is worth emitting and, if so,
//! renders it to its sink. Two renderings are provided:
//!
//! - [`TextHandler`]: one line of space-separated `key=value` tokens
//! - [`JsonHandler`]: one JSON object per line
//!
//! Both share the attribute walk in [`HandlerCore`]: the built-in `time`,
//! `level`, `source` and `msg` attributes followed by the record's own, each
//! passed through the configured rewrite hook with its group path before an
//! [`Encoder`] turns it into output. Keeping the walk in one place means the
//! two formats can only differ in how they spell things, never in which
//! attributes they show.

use crate::attr::{Attr, Value, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY};
use crate::config::{LogWriter, ReplaceAttrFn};
use crate::level::Level;
use crate::logger::Record;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};

pub mod json;
pub mod text;

pub use json::JsonHandler;
pub use text::TextHandler;

/// Output backend for a [`crate::Logger`].
///
/// Implementations must tolerate concurrent calls; the logger shares one
/// handler between all of its clones.
pub trait Handler: Send + Sync {
    /// Reports whether records at `level` would be emitted.
    fn enabled(&self, level: Level) -> bool;

    /// Renders and writes one record. Only called for enabled levels.
    fn handle(&self, record: &Record) -> io::Result<()>;

    /// Short name of the output format, for diagnostics.
    fn name(&self) -> &'static str;
}

/// Settings shared by the built-in handlers.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Attach the record's call-site location under `source`.
    pub add_source: bool,
    /// Minimum level emitted.
    pub level: Level,
    /// Rewrite hook applied to every non-group attribute.
    pub replace_attr: Option<ReplaceAttrFn>,
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("add_source", &self.add_source)
            .field("level", &self.level)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

/// Format-specific half of a handler. The walk calls these in document
/// order; `open_group`/`close_group` are always balanced.
pub(crate) trait Encoder {
    fn open_group(&mut self, key: &str);
    fn close_group(&mut self);
    fn scalar(&mut self, key: &str, value: &Value);
}

/// Format-independent half of a handler: options, sink and attribute walk.
pub(crate) struct HandlerCore {
    opts: HandlerOptions,
    writer: Mutex<LogWriter>,
}

impl HandlerCore {
    pub(crate) fn new(writer: LogWriter, opts: HandlerOptions) -> Self {
        Self {
            opts,
            writer: Mutex::new(writer),
        }
    }

    pub(crate) fn enabled(&self, level: Level) -> bool {
        level >= self.opts.level
    }

    /// Feeds every attribute of `record`, built-ins first, into `encoder`.
    pub(crate) fn encode<E: Encoder>(&self, record: &Record, encoder: &mut E) {
        let mut groups = Vec::new();

        self.append_attr(encoder, &mut groups, Attr::new(TIME_KEY, record.time));
        self.append_attr(encoder, &mut groups, Attr::new(LEVEL_KEY, record.level));
        if self.opts.add_source {
            if let Some(source) = &record.source {
                self.append_attr(encoder, &mut groups, Attr::new(SOURCE_KEY, source.clone()));
            }
        }
        self.append_attr(
            encoder,
            &mut groups,
            Attr::new(MESSAGE_KEY, record.message.as_str()),
        );

        for attr in &record.attrs {
            self.append_attr(encoder, &mut groups, attr.clone());
        }
    }

    fn append_attr<E: Encoder>(&self, encoder: &mut E, groups: &mut Vec<String>, mut attr: Attr) {
        if !attr.value.is_group() {
            if let Some(replace) = &self.opts.replace_attr {
                attr = replace(groups.as_slice(), attr);
            }
        }

        if attr.is_empty() {
            return;
        }

        if let Value::Source(source) = &attr.value {
            attr.value = Value::Group(source.to_attrs());
        }

        match attr.value {
            Value::Group(children) => {
                if children.is_empty() {
                    return;
                }
                if attr.key.is_empty() {
                    for child in children {
                        self.append_attr(encoder, groups, child);
                    }
                    return;
                }

                encoder.open_group(&attr.key);
                groups.push(attr.key);
                for child in children {
                    self.append_attr(encoder, groups, child);
                }
                groups.pop();
                encoder.close_group();
            }
            value => encoder.scalar(&attr.key, &value),
        }
    }

    /// Writes one fully rendered record. The lock keeps concurrent records
    /// from interleaving.
    pub(crate) fn write(&self, buf: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(buf)?;
        writer.flush()
    }
}

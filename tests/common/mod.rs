//! Shared helpers for the integration tests.

#![allow(dead_code)]

use logflags::{Attr, LogFlags, LogOption, Logger};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// In-memory sink that can be inspected after the logger has taken
/// ownership of a clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).expect("log output is UTF-8")
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn flags(level: &str, format: &str) -> LogFlags {
    LogFlags {
        level: level.to_string(),
        format: format.to_string(),
    }
}

/// Replaces the timestamp and source location with fixed values so output
/// can be compared literally.
pub fn deterministic(groups: &[String], attr: Attr) -> Attr {
    let in_source = groups.first().map(String::as_str) == Some("source");
    match attr.key.as_str() {
        "time" if groups.is_empty() => Attr::new("time", "fake-time"),
        "file" if in_source => Attr::new("file", "main.rs"),
        "function" if in_source => Attr::new("function", "app::run"),
        "line" if in_source => Attr::new("line", 87),
        _ => attr,
    }
}

/// Builds a logger writing to `buffer`, with deterministic output. The
/// writer and rewrite hook are appended after `options`, so they win.
pub fn logger_for_test(
    flags: &LogFlags,
    buffer: &SharedBuffer,
    options: Vec<LogOption>,
) -> Logger {
    let mut options = options;
    options.push(LogOption::writer(buffer.clone()));
    options.push(LogOption::replace_attr(deterministic));
    logflags::logger(flags, options)
}

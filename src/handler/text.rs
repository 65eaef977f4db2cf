use super::{Encoder, Handler, HandlerCore, HandlerOptions};
use crate::attr::Value;
use crate::config::LogWriter;
use crate::level::Level;
use crate::logger::Record;
use chrono::SecondsFormat;
use std::fmt::Write as _;
use std::io;

/// Renders each record as a line of `key=value` tokens.
///
/// Keys inside groups are joined with dots (`source.file=main.rs`). Strings
/// that are empty or contain spaces, `=`, `"` or control characters are
/// quoted and escaped.
pub struct TextHandler {
    core: HandlerCore,
}

impl TextHandler {
    pub fn new(writer: LogWriter, opts: HandlerOptions) -> Self {
        Self {
            core: HandlerCore::new(writer, opts),
        }
    }

    /// Renders `record` without writing it.
    pub fn format(&self, record: &Record) -> String {
        let mut encoder = TextEncoder::default();
        self.core.encode(record, &mut encoder);
        encoder.line.push('\n');
        encoder.line
    }
}

impl Handler for TextHandler {
    fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    fn handle(&self, record: &Record) -> io::Result<()> {
        let line = self.format(record);
        self.core.write(line.as_bytes())
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

#[derive(Default)]
struct TextEncoder {
    line: String,
    prefix: Vec<String>,
}

impl Encoder for TextEncoder {
    fn open_group(&mut self, key: &str) {
        self.prefix.push(key.to_string());
    }

    fn close_group(&mut self) {
        self.prefix.pop();
    }

    fn scalar(&mut self, key: &str, value: &Value) {
        if !self.line.is_empty() {
            self.line.push(' ');
        }

        let mut full_key = String::new();
        for group in &self.prefix {
            full_key.push_str(group);
            full_key.push('.');
        }
        full_key.push_str(key);
        push_string(&mut self.line, &full_key);

        self.line.push('=');
        match value {
            Value::String(s) => push_string(&mut self.line, s),
            Value::Time(t) => self
                .line
                .push_str(&t.to_rfc3339_opts(SecondsFormat::Millis, false)),
            other => {
                let rendered = other.to_string();
                push_string(&mut self.line, &rendered);
            }
        }
    }
}

fn push_string(out: &mut String, s: &str) {
    if needs_quoting(s) {
        let _ = write!(out, "{:?}", s);
    } else {
        out.push_str(s);
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.chars().any(|c| {
            c == '='
                || c == '"'
                || c.is_whitespace()
                || c.is_control()
                || c == char::REPLACEMENT_CHARACTER
        })
}

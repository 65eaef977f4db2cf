//! # Attributes
//!
//! Every piece of a log record, including the built-in time, level, message
//! and source fields, travels to a handler as an [`Attr`]: a key paired with
//! a typed [`Value`]. Handlers pass each attribute through the configured
//! rewrite hook before rendering it, which is how custom level names and
//! test-time timestamp scrubbing are implemented.

use crate::level::Level;
use chrono::{DateTime, Local, Utc};
use std::fmt;

/// Key of the record timestamp attribute.
pub const TIME_KEY: &str = "time";
/// Key of the record severity attribute.
pub const LEVEL_KEY: &str = "level";
/// Key of the record message attribute.
pub const MESSAGE_KEY: &str = "msg";
/// Key of the call-site location group.
pub const SOURCE_KEY: &str = "source";

/// Call-site location of a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Source {
    /// Enclosing function or module path. Empty when unknown.
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Source {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Location of the caller of a `#[track_caller]` function. The function
    /// name is not available through this route and is left empty.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(String::new(), location.file(), location.line())
    }

    /// Expands the location into `function`/`file`/`line` attributes,
    /// skipping parts that are unknown.
    pub fn to_attrs(&self) -> Vec<Attr> {
        let mut attrs = Vec::with_capacity(3);
        if !self.function.is_empty() {
            attrs.push(Attr::new("function", self.function.as_str()));
        }
        if !self.file.is_empty() {
            attrs.push(Attr::new("file", self.file.as_str()));
        }
        if self.line != 0 {
            attrs.push(Attr::new("line", u64::from(self.line)));
        }
        attrs
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Local>),
    Level(Level),
    Source(Source),
    Group(Vec<Attr>),
}

impl Value {
    /// Returns the string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the severity payload, if this is a level value.
    pub fn as_level(&self) -> Option<Level> {
        match self {
            Value::Level(level) => Some(*level),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Uint(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Time(t) => {
                f.write_str(&t.to_rfc3339_opts(chrono::SecondsFormat::Millis, false))
            }
            Value::Level(level) => write!(f, "{}", level),
            Value::Source(src) => write!(f, "{}:{}", src.file, src.line),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

macro_rules! signed_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! unsigned_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint(u64::from(v))
            }
        })*
    };
}

signed_value!(i8, i16, i32, i64);
unsigned_value!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<Level> for Value {
    fn from(v: Level) -> Self {
        Value::Level(v)
    }
}

impl From<DateTime<Local>> for Value {
    fn from(v: DateTime<Local>) -> Self {
        Value::Time(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v.with_timezone(&Local))
    }
}

impl From<Source> for Value {
    fn from(v: Source) -> Self {
        Value::Source(v)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(v: Vec<Attr>) -> Self {
        Value::Group(v)
    }
}

/// A key/value pair attached to a log record.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Builds a group attribute holding `attrs` under `key`.
    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self {
            key: key.into(),
            value: Value::Group(attrs),
        }
    }

    /// An attribute that handlers drop from the output. Returning this from a
    /// rewrite hook removes the attribute.
    pub fn empty() -> Self {
        Self::new(String::new(), Value::Group(Vec::new()))
    }

    /// Reports whether the attribute renders nothing: an empty key with a
    /// scalar value, or an empty key with an empty group.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
            && match &self.value {
                Value::Group(attrs) => attrs.is_empty(),
                _ => true,
            }
    }
}

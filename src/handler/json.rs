use super::{Encoder, Handler, HandlerCore, HandlerOptions};
use crate::attr::Value;
use crate::config::LogWriter;
use crate::level::Level;
use crate::logger::Record;
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value as JsonValue};
use std::io;

/// Renders each record as a single-line JSON object.
///
/// Groups become nested objects. A group key that appears more than once in
/// the same record (for example from both `Logger::with_group` context and
/// call-site attributes) is merged into one object.
///
/// Keys are unique within an object. An attribute whose key matches one
/// already written at the same level, including the built-in `time`,
/// `level` and `msg`, replaces that value in place; the text rendering
/// shows both. Rename such keys with a rewrite hook to keep them apart.
pub struct JsonHandler {
    core: HandlerCore,
}

impl JsonHandler {
    pub fn new(writer: LogWriter, opts: HandlerOptions) -> Self {
        Self {
            core: HandlerCore::new(writer, opts),
        }
    }

    /// Builds the JSON object for `record` without writing it.
    pub fn to_json(&self, record: &Record) -> Map<String, JsonValue> {
        let mut encoder = JsonEncoder::default();
        self.core.encode(record, &mut encoder);
        encoder.finish()
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    fn handle(&self, record: &Record) -> io::Result<()> {
        let object = self.to_json(record);
        let mut line = serde_json::to_vec(&object)?;
        line.push(b'\n');
        self.core.write(&line)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[derive(Default)]
struct JsonEncoder {
    root: Map<String, JsonValue>,
    open: Vec<(String, Map<String, JsonValue>)>,
}

impl JsonEncoder {
    fn current(&mut self) -> &mut Map<String, JsonValue> {
        match self.open.last_mut() {
            Some((_, map)) => map,
            None => &mut self.root,
        }
    }

    fn finish(mut self) -> Map<String, JsonValue> {
        while !self.open.is_empty() {
            self.close_group();
        }
        self.root
    }
}

impl Encoder for JsonEncoder {
    fn open_group(&mut self, key: &str) {
        self.open.push((key.to_string(), Map::new()));
    }

    fn close_group(&mut self) {
        let Some((key, map)) = self.open.pop() else {
            return;
        };
        if map.is_empty() {
            return;
        }

        let parent = self.current();
        if let Some(JsonValue::Object(existing)) = parent.get_mut(&key) {
            merge(existing, map);
            return;
        }
        parent.insert(key, JsonValue::Object(map));
    }

    fn scalar(&mut self, key: &str, value: &Value) {
        let json = to_json_value(value);
        self.current().insert(key.to_string(), json);
    }
}

fn merge(into: &mut Map<String, JsonValue>, from: Map<String, JsonValue>) {
    for (key, value) in from {
        if let JsonValue::Object(incoming) = value {
            if let Some(JsonValue::Object(existing)) = into.get_mut(&key) {
                merge(existing, incoming);
                continue;
            }
            into.insert(key, JsonValue::Object(incoming));
        } else {
            into.insert(key, value);
        }
    }
}

fn to_json_value(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Int(v) => JsonValue::from(*v),
        Value::Uint(v) => JsonValue::from(*v),
        Value::Float(v) => Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string())),
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::Time(t) => JsonValue::String(t.to_rfc3339_opts(SecondsFormat::Millis, false)),
        Value::Level(level) => JsonValue::String(level.to_string()),
        // Sources and groups are expanded by the attribute walk before they
        // reach the encoder; render defensively if one slips through.
        Value::Source(_) | Value::Group(_) => JsonValue::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{Attr, Source, TIME_KEY};
    use serde_json::json;
    use std::sync::Arc;

    fn handler(add_source: bool) -> JsonHandler {
        JsonHandler::new(
            Box::new(io::sink()),
            HandlerOptions {
                add_source,
                level: Level::INFO,
                replace_attr: Some(Arc::new(|_: &[String], attr: Attr| {
                    if attr.key == TIME_KEY {
                        Attr::new(TIME_KEY, "fake-time")
                    } else {
                        attr
                    }
                })),
            },
        )
    }

    #[test]
    fn test_basic_object() {
        let record = Record::new(Level::WARN, "Test", vec![Attr::new("arg1", "arg2")]);
        assert_eq!(
            JsonValue::Object(handler(false).to_json(&record)),
            json!({"time": "fake-time", "level": "WARN", "msg": "Test", "arg1": "arg2"})
        );
    }

    #[test]
    fn test_key_order() {
        let mut record = Record::new(Level::INFO, "m", vec![Attr::new("z", 1)]);
        record.source = Some(Source::new("f", "a.rs", 1));
        let keys: Vec<String> = handler(true).to_json(&record).keys().cloned().collect();
        assert_eq!(keys, vec!["time", "level", "source", "msg", "z"]);
    }

    #[test]
    fn test_source_object() {
        let mut record = Record::new(Level::WARN, "Test", Vec::new());
        record.source = Some(Source::new("app::main", "src/main.rs", 87));
        assert_eq!(
            JsonValue::Object(handler(true).to_json(&record)),
            json!({
                "time": "fake-time",
                "level": "WARN",
                "source": {"function": "app::main", "file": "src/main.rs", "line": 87},
                "msg": "Test"
            })
        );
    }

    #[test]
    fn test_repeated_groups_merge() {
        let record = Record::new(
            Level::INFO,
            "m",
            vec![
                Attr::group("req", vec![Attr::new("id", 1)]),
                Attr::group("req", vec![Attr::new("path", "/")]),
            ],
        );
        assert_eq!(
            JsonValue::Object(handler(false).to_json(&record))["req"],
            json!({"id": 1, "path": "/"})
        );
    }

    #[test]
    fn test_colliding_key_replaces_builtin_in_place() {
        let record = Record::new(Level::INFO, "m", vec![Attr::new("msg", "override")]);
        let object = handler(false).to_json(&record);
        let keys: Vec<String> = object.keys().cloned().collect();
        assert_eq!(keys, vec!["time", "level", "msg"]);
        assert_eq!(object["msg"], json!("override"));
    }

    #[test]
    fn test_real_timestamp_has_millisecond_precision() {
        let handler = JsonHandler::new(Box::new(io::sink()), HandlerOptions::default());
        let object = handler.to_json(&Record::new(Level::INFO, "m", Vec::new()));
        let time = object["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
        let fraction = time.split('.').nth(1).unwrap();
        assert_eq!(fraction.chars().take_while(|c| c.is_ascii_digit()).count(), 3);
    }

    #[test]
    fn test_non_finite_float_is_stringified() {
        let record = Record::new(Level::INFO, "m", vec![Attr::new("nan", f64::NAN)]);
        assert_eq!(
            JsonValue::Object(handler(false).to_json(&record))["nan"],
            json!("NaN")
        );
    }

    #[test]
    fn test_handle_writes_one_line() {
        let record = Record::new(Level::ERROR, "boom", vec![Attr::new("code", 23)]);
        let object = handler(false).to_json(&record);
        let line = serde_json::to_string(&object).unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(object["level"], json!("ERROR"));
        assert_eq!(object["code"], json!(23));
    }
}

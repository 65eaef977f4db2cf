//! Logging macros.
//!
//! Unlike the [`Logger`](crate::Logger) methods, the macros record the
//! calling module path as the source `function`, and accept attributes as
//! `key => value` pairs.
//!
//! ```rust
//! use logflags::{logger, LogFlags, LogOption};
//!
//! let log = logger(&LogFlags::default(), vec![LogOption::writer(std::io::sink())]);
//! logflags::warn!(log, "disk nearly full", "mount" => "/var", "free_pct" => 4);
//! logflags::event!(log, logflags::Level(6), "custom severity");
//! ```

/// Emits a record at an explicit level.
#[macro_export]
macro_rules! event {
    ($logger:expr, $level:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            let record = $crate::Record::new(
                level,
                $msg,
                vec![$($crate::Attr::new($key, $value)),*],
            )
            .with_source($crate::Source::new(module_path!(), file!(), line!()));
            logger.log_record(record);
        }
    }};
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::event!($logger, $crate::Level::DEBUG, $msg $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::event!($logger, $crate::Level::INFO, $msg $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::event!($logger, $crate::Level::WARN, $msg $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::event!($logger, $crate::Level::ERROR, $msg $(, $key => $value)*)
    };
}

#[cfg(test)]
mod tests {
    use crate::attr::{Attr, TIME_KEY};
    use crate::handler::{HandlerOptions, JsonHandler};
    use crate::{Level, Logger};
    use parking_lot::Mutex;
    use std::cell::Cell;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_macros_record_module_path() {
        let buffer = Buffer::default();
        let handler = JsonHandler::new(
            Box::new(buffer.clone()),
            HandlerOptions {
                add_source: true,
                level: Level::DEBUG,
                replace_attr: Some(Arc::new(|_: &[String], attr: Attr| {
                    if attr.key == TIME_KEY {
                        Attr::new(TIME_KEY, "fake-time")
                    } else {
                        attr
                    }
                })),
            },
        );
        let logger = Logger::new(Arc::new(handler));

        crate::warn!(logger, "Test", "arg1" => "arg2", "n" => 3);

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["msg"], "Test");
        assert_eq!(value["arg1"], "arg2");
        assert_eq!(value["n"], 3);
        assert_eq!(value["source"]["function"], module_path!());
        assert!(value["source"]["file"].as_str().unwrap().ends_with("macros.rs"));
    }

    #[test]
    fn test_disabled_macro_skips_attribute_evaluation() {
        let buffer = Buffer::default();
        let handler = JsonHandler::new(
            Box::new(buffer.clone()),
            HandlerOptions {
                level: Level::ERROR,
                ..Default::default()
            },
        );
        let logger = Logger::new(Arc::new(handler));

        let evaluated = Cell::new(0);
        let count = || {
            evaluated.set(evaluated.get() + 1);
            evaluated.get()
        };

        crate::debug!(logger, "quiet");
        crate::info!(logger, "quiet", "k" => count());
        crate::error!(logger, "loud", "k" => count());
        assert_eq!(evaluated.get(), 1);

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"loud\""));
    }
}

//! # logflags
//!
//! Configure a structured logger's verbosity and output format from
//! command-line flags, so the choice between JSON and human-readable output,
//! and how chatty the program is, can be made at deployment time rather than
//! compile time.
//!
//! ## Flags
//!
//! [`LogFlags`] adds two flags to any clap parser:
//!
//! - `--log.level`: `debug`, `info`, `warn`, `error`, or any custom level
//!   registered with [`LogOption::CustomLevels`]. Case-insensitive. Empty or
//!   unrecognised values fall back to the default level (INFO unless
//!   overridden); this is intentional and never reported as an error.
//! - `--log.format`: `json` for one JSON object per record, anything else for
//!   `key=value` text.
//!
//! ## Usage Example
//!
//! ```rust
//! use clap::Parser;
//! use logflags::{LogFlags, LogOption, Level};
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[clap(flatten)]
//!     log: LogFlags,
//! }
//!
//! let cli = Cli::parse_from(["app", "--log.level", "notice"]);
//! let log = logflags::logger(
//!     &cli.log,
//!     vec![
//!         LogOption::custom_levels([("notice", Level::INFO.offset(2))]),
//!         LogOption::writer(std::io::sink()),
//!     ],
//! );
//!
//! log.info("hidden", &[]);
//! log.log(Level::INFO.offset(2), "shown as level=NOTICE", &[]);
//! ```
//!
//! ## Custom Levels
//!
//! Custom levels sit anywhere on the integer [`Level`] scale. Records at a
//! registered severity render under the registered name (upper-cased) instead
//! of the default `BASE+N` form. When several names share a severity the
//! lexicographically smallest is shown, whatever the registration order.
//!
//! ## Process Defaults
//!
//! With [`LogOption::SetDefault`] the new logger also becomes the process
//! default used by [`global`] and by everything logged through the `log`
//! crate. Records from the `log` crate all share one level, set with
//! [`LogOption::OldLogLevel`].

/// Attributes, values and well-known keys
pub mod attr;

/// Command-line flags and output format selection
pub mod cli;

/// Option application, level resolution and attribute rewriting
///
/// Builds the [`Config`] that drives logger construction. Holds the level
/// resolver used for `--log.level` and the rewriter that renames custom
/// levels in output.
pub mod config;

/// Text and JSON record handlers
pub mod handler;

/// Process default logger, legacy `log` bridge and convenience functions
pub mod global;

pub mod level;

/// Logger front end and log records
pub mod logger;

mod macros;

/// `tracing` integration
pub mod tracing_bridge;

pub use attr::{Attr, Source, Value};
pub use cli::{Format, LogFlags};
pub use config::{Config, LogOption, ReplaceAttrFn};
pub use handler::{Handler, HandlerOptions, JsonHandler, TextHandler};
pub use level::{Level, ParseLevelError};
pub use logger::{Logger, Record};
pub use tracing_bridge::LoggerLayer;

use std::sync::Arc;

/// The current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    use crate::level::Level;

    /// Default value of `--log.format`
    pub const LOG_FORMAT: &str = "text";

    /// Threshold used when `--log.level` is empty or unrecognised
    pub const LEVEL: Level = Level::INFO;

    /// Level given to records from the `log` crate
    pub const OLD_LOG_LEVEL: Level = Level::INFO;
}

/// Builds a logger from parsed flags and configuration options.
///
/// Options are applied in order on top of the defaults. The legacy `log`
/// level is always applied process-wide before the logger is built; with
/// [`LogOption::SetDefault`] the logger is also installed as the process
/// default.
pub fn logger(flags: &LogFlags, options: impl IntoIterator<Item = LogOption>) -> Logger {
    let config = Config::new(options);

    global::set_legacy_level(config.old_log_level());

    let opts = HandlerOptions {
        add_source: config.add_source(),
        level: config.resolve_level(&flags.level),
        replace_attr: Some(config.rewriter()),
    };
    let set_default = config.set_default();
    let writer = config.into_writer();

    let handler: Arc<dyn Handler> = match flags.format() {
        Format::Json => Arc::new(JsonHandler::new(writer, opts)),
        Format::Text => Arc::new(TextHandler::new(writer, opts)),
    };
    let logger = Logger::new(handler);

    if set_default {
        global::set_default(logger.clone());
    }
    logger
}

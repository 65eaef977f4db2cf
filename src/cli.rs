use clap::Args;
use serde::{Deserialize, Serialize};

/// Logging flags shared by every binary that uses this crate.
///
/// Flatten into an application's own parser:
///
/// ```rust
/// use clap::Parser;
/// use logflags::LogFlags;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[clap(flatten)]
///     log: LogFlags,
/// }
///
/// let cli = Cli::parse_from(["app", "--log.level", "warn", "--log.format", "json"]);
/// assert_eq!(cli.log.level, "warn");
/// assert_eq!(cli.log.format(), logflags::Format::Json);
/// ```
#[derive(Args, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFlags {
    /// Lowest level of logs that should be output
    #[clap(
        id = "log.level",
        long = "log.level",
        default_value = "",
        help_heading = "Logging"
    )]
    #[serde(default)]
    pub level: String,

    /// Format of log output ('json' or 'text')
    #[clap(
        id = "log.format",
        long = "log.format",
        default_value = crate::defaults::LOG_FORMAT,
        help_heading = "Logging"
    )]
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LogFlags {
    fn default() -> Self {
        Self {
            level: String::new(),
            format: default_format(),
        }
    }
}

impl LogFlags {
    /// Output format selected by `--log.format`.
    pub fn format(&self) -> Format {
        Format::from_flag(&self.format)
    }
}

fn default_format() -> String {
    crate::defaults::LOG_FORMAT.to_string()
}

/// Rendering selected for log output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Space-separated `key=value` tokens
    Text,
    /// One JSON object per line
    Json,
}

impl Format {
    /// Exactly `"json"` selects JSON; every other value, including the empty
    /// string and differently-cased spellings, selects text.
    pub fn from_flag(value: &str) -> Self {
        if value == "json" {
            Format::Json
        } else {
            Format::Text
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Json => write!(f, "json"),
        }
    }
}

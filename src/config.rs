//! # Logger Configuration
//!
//! A [`Config`] is assembled once per logger from built-in defaults followed
//! by an ordered list of [`LogOption`] values. Scalar options overwrite each
//! other (last one wins); custom level registrations accumulate.
//!
//! The configuration also owns the two pieces of logic that give the crate
//! its behaviour:
//!
//! - [`Config::resolve_level`] maps the `--log.level` flag value to a
//!   threshold. Built-in names win over custom aliases, and anything
//!   unrecognised (including the empty string) falls back to the default
//!   level. This never fails.
//! - [`Config::rewrite_attr`] renames the `level` attribute of records whose
//!   severity was registered as a custom level, then hands the attribute to
//!   the user's own rewrite hook.

use crate::attr::{Attr, Value, LEVEL_KEY};
use crate::defaults;
use crate::level::Level;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

/// Attribute rewrite hook: receives the enclosing group path and the
/// attribute, returns the attribute to render.
pub type ReplaceAttrFn = Arc<dyn Fn(&[String], Attr) -> Attr + Send + Sync>;

/// Destination for rendered records.
pub type LogWriter = Box<dyn Write + Send>;

/// A single configuration change applied while building a logger.
pub enum LogOption {
    /// Attach the call-site location to every record.
    AddSource(bool),
    /// Register named severities. The same level may appear under several
    /// names to provide aliases; the lexicographically smallest upper-cased
    /// alias is used when rendering. May be given more than once.
    CustomLevels(Vec<(String, Level)>),
    /// Threshold used when `--log.level` is empty or not recognised.
    DefaultLevel(Level),
    /// Fixed level given to every record arriving through the `log` crate.
    OldLogLevel(Level),
    /// Final attribute rewrite hook, run after custom level renaming.
    ReplaceAttr(ReplaceAttrFn),
    /// Install the new logger as the process-wide default.
    SetDefault(bool),
    /// Output sink. Defaults to standard output.
    Writer(LogWriter),
}

impl LogOption {
    /// Convenience constructor for [`LogOption::CustomLevels`].
    pub fn custom_levels<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = (S, Level)>,
        S: Into<String>,
    {
        LogOption::CustomLevels(levels.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convenience constructor for [`LogOption::ReplaceAttr`].
    pub fn replace_attr<F>(f: F) -> Self
    where
        F: Fn(&[String], Attr) -> Attr + Send + Sync + 'static,
    {
        LogOption::ReplaceAttr(Arc::new(f))
    }

    /// Convenience constructor for [`LogOption::Writer`].
    pub fn writer<W: Write + Send + 'static>(w: W) -> Self {
        LogOption::Writer(Box::new(w))
    }
}

impl fmt::Debug for LogOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogOption::AddSource(v) => f.debug_tuple("AddSource").field(v).finish(),
            LogOption::CustomLevels(v) => f.debug_tuple("CustomLevels").field(v).finish(),
            LogOption::DefaultLevel(v) => f.debug_tuple("DefaultLevel").field(v).finish(),
            LogOption::OldLogLevel(v) => f.debug_tuple("OldLogLevel").field(v).finish(),
            LogOption::ReplaceAttr(_) => f.write_str("ReplaceAttr(..)"),
            LogOption::SetDefault(v) => f.debug_tuple("SetDefault").field(v).finish(),
            LogOption::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Finalised logging preferences.
pub struct Config {
    pub(crate) add_source: bool,
    pub(crate) custom_levels: HashMap<String, Level>,
    pub(crate) custom_level_names: HashMap<Level, String>,
    pub(crate) default_level: Level,
    pub(crate) old_log_level: Level,
    pub(crate) replace_attr: Option<ReplaceAttrFn>,
    pub(crate) set_default: bool,
    pub(crate) writer: LogWriter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            add_source: false,
            custom_levels: HashMap::new(),
            custom_level_names: HashMap::new(),
            default_level: defaults::LEVEL,
            old_log_level: defaults::OLD_LOG_LEVEL,
            replace_attr: None,
            set_default: false,
            writer: Box::new(io::stdout()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("add_source", &self.add_source)
            .field("custom_levels", &self.custom_levels)
            .field("custom_level_names", &self.custom_level_names)
            .field("default_level", &self.default_level)
            .field("old_log_level", &self.old_log_level)
            .field("replace_attr", &self.replace_attr.is_some())
            .field("set_default", &self.set_default)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Builds a configuration from defaults plus `options`, applied in order.
    pub fn new(options: impl IntoIterator<Item = LogOption>) -> Self {
        let mut config = Self::default();
        for option in options {
            config.apply(option);
        }
        config
    }

    /// Applies a single option on top of the current state.
    pub fn apply(&mut self, option: LogOption) {
        match option {
            LogOption::AddSource(add_source) => self.add_source = add_source,
            LogOption::CustomLevels(levels) => {
                for (name, level) in levels {
                    self.register_level(&name, level);
                }
            }
            LogOption::DefaultLevel(level) => self.default_level = level,
            LogOption::OldLogLevel(level) => self.old_log_level = level,
            LogOption::ReplaceAttr(f) => self.replace_attr = Some(f),
            LogOption::SetDefault(set_default) => self.set_default = set_default,
            LogOption::Writer(writer) => self.writer = writer,
        }
    }

    fn register_level(&mut self, name: &str, level: Level) {
        self.custom_levels.insert(name.to_lowercase(), level);

        let display = name.to_uppercase();
        match self.custom_level_names.get(&level) {
            Some(existing) if *existing <= display => {}
            _ => {
                self.custom_level_names.insert(level, display);
            }
        }
    }

    /// Maps a requested level name to the threshold to log at.
    ///
    /// Matching is case-insensitive. Built-in names are consulted first, then
    /// custom levels. An empty or unknown name is not an error: it silently
    /// resolves to the default level, so "not supplied" and "not recognised"
    /// behave identically.
    pub fn resolve_level(&self, requested: &str) -> Level {
        let target = requested.to_lowercase();

        if let Some(level) = Level::builtin(&target) {
            return level;
        }

        if let Some(level) = self.custom_levels.get(&target) {
            return *level;
        }

        if !target.is_empty() {
            debug!(
                requested,
                default = %self.default_level,
                "Unrecognised log level, using default"
            );
        }
        self.default_level
    }

    /// Display name registered for `level`, if it is a custom level.
    pub fn custom_level_name(&self, level: Level) -> Option<&str> {
        self.custom_level_names.get(&level).map(String::as_str)
    }

    /// Rewrites one output attribute. See [`rewrite_level_attr`].
    pub fn rewrite_attr(&self, groups: &[String], attr: Attr) -> Attr {
        rewrite_level_attr(
            &self.custom_level_names,
            self.replace_attr.as_ref(),
            groups,
            attr,
        )
    }

    /// Packages the attribute rewriter as a standalone hook for handlers.
    /// The hook holds its own copy of the alias index, so it is unaffected
    /// by anything done to this configuration afterwards.
    pub fn rewriter(&self) -> ReplaceAttrFn {
        let names = self.custom_level_names.clone();
        let user = self.replace_attr.clone();
        Arc::new(move |groups, attr| rewrite_level_attr(&names, user.as_ref(), groups, attr))
    }

    /// Consumes the configuration, returning the output sink.
    pub fn into_writer(self) -> LogWriter {
        self.writer
    }

    pub fn add_source(&self) -> bool {
        self.add_source
    }

    pub fn default_level(&self) -> Level {
        self.default_level
    }

    pub fn old_log_level(&self) -> Level {
        self.old_log_level
    }

    pub fn set_default(&self) -> bool {
        self.set_default
    }
}

/// Rewrites one output attribute.
///
/// A `level` attribute carrying a registered custom severity is replaced by
/// a string attribute holding the alias. The result is then passed to the
/// user rewrite hook, if one was configured, so the hook always sees the
/// renamed level. Built-in severities are left for the handler to render.
pub fn rewrite_level_attr(
    names: &HashMap<Level, String>,
    user: Option<&ReplaceAttrFn>,
    groups: &[String],
    mut attr: Attr,
) -> Attr {
    if attr.key == LEVEL_KEY {
        if let Some(name) = attr.value.as_level().and_then(|level| names.get(&level)) {
            attr.value = Value::String(name.clone());
        }
    }

    match user {
        Some(f) => f(groups, attr),
        None => attr,
    }
}

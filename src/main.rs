//! # logflags demo
//!
//! Small command-line program showing how an application wires the logging
//! flags into its own parser and emits records through the resulting logger.
//!
//! ## What It Does
//!
//! 1. **Initialize diagnostics**: routes the library's own `tracing`
//!    diagnostics to stderr, filtered by `RUST_LOG`
//! 2. **Parse arguments**: `--log.level`, `--log.format` plus demo options
//! 3. **Build the logger**: registers a `notice` custom level and optionally
//!    installs the logger as the process default
//! 4. **Emit records**: one per built-in level, one at the custom level, and
//!    one through the `log` crate
//!
//! Try `logflags-demo --log.level notice --log.format json --add-source`.

use anyhow::Result;
use clap::Parser;
use logflags::{Attr, Level, LogFlags, LogOption};
use tracing_subscriber::EnvFilter;

/// Severity of the demo's custom `notice` level: between INFO and WARN.
const NOTICE: Level = Level::INFO.offset(2);

/// logflags demo - emit sample records using the logging flags
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    #[clap(flatten)]
    log: LogFlags,

    /// Attach the call-site location to each record
    #[clap(long, default_value_t = false)]
    add_source: bool,

    /// Level given to records from the `log` crate (e.g. "warn", "info+2")
    #[clap(long, default_value = "info")]
    legacy_level: Level,

    /// Default threshold when --log.level is empty or unrecognised
    #[clap(long, default_value = "info")]
    default_level: Level,
}

fn main() -> Result<()> {
    // Initialize the library's own diagnostics. The subscriber is installed
    // directly rather than with `init()`, which would claim the `log` facade
    // before the legacy bridge can.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    tracing::debug!("Configuration: {:?}", args);

    let logger = logflags::logger(
        &args.log,
        vec![
            LogOption::custom_levels([("notice", NOTICE)]),
            LogOption::AddSource(args.add_source),
            LogOption::DefaultLevel(args.default_level),
            LogOption::OldLogLevel(args.legacy_level),
            LogOption::SetDefault(true),
        ],
    );

    let request = logger.with_group("request").with([
        Attr::new("method", "GET"),
        Attr::new("path", "/healthz"),
    ]);

    logger.debug(
        "Resolved configuration",
        &[Attr::new("format", args.log.format().to_string())],
    );
    logger.info("Starting up", &[Attr::new("version", logflags::VERSION)]);
    logflags::event!(logger, NOTICE, "Cache warmed", "entries" => 1024u64);
    request.warn("Slow response", &[Attr::new("elapsed_ms", 870u64)]);
    logflags::error!(logger, "Upstream unavailable", "retry_in_s" => 5);

    log::info!("Message from a library using the log crate");
    logflags::global::info("Message through the process default logger", &[]);

    Ok(())
}

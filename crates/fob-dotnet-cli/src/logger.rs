//! Logging infrastructure for the fob-dotnet CLI.
//!
//! Structured logging on the `tracing` ecosystem, with verbosity flags,
//! colored output, and `RUST_LOG` overrides.
//!
//! # Example
//!
//! ```rust,no_run
//! use fob_dotnet_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//!
//! info!("Starting dev server");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "fob_dotnet_cli=debug,fob_plugin_dotnet_wasm=debug,tower_http=debug";
const QUIET_FILTER: &str = "fob_dotnet_cli=error,fob_plugin_dotnet_wasm=error";
const DEFAULT_FILTER: &str = "fob_dotnet_cli=info,fob_plugin_dotnet_wasm=info";

/// Pick the filter directives for the given flags
///
/// The order is:
/// 1. `--verbose`: DEBUG for the fob-dotnet crates
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG`, if set
/// 4. INFO for the fob-dotnet crates
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the tracing subscriber with the specified options.
///
/// Call once at the start of the program, before any logging occurs.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging (overrides `quiet`)
/// * `quiet` - Only show error-level logs
/// * `no_color` - Disable colored output
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false) // Don't show the module path (keeps output clean)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

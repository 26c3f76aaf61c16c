//! Error handling for the fob-dotnet CLI.
//!
//! A hierarchical error type system using `thiserror`:
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`, `BuildError`) provide detailed context
//! - **Plugin errors** (`DotnetWasmError`) pass through unchanged

mod report;

pub use report::{build_error_to_miette, cli_error_to_miette};

use fob_plugin_dotnet_wasm::DotnetWasmError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid syntax, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Build process errors (missing entry points, asset failures, etc.)
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Errors from the .NET WebAssembly integration
    #[error(transparent)]
    Plugin(#[from] DotnetWasmError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create a fob-dotnet.config.json file or specify --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Config sources could not be merged or deserialized
    #[error("Failed to load configuration: {0}\n\nHint: Check field names (camelCase) and value types")]
    Load(String),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Build process errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Entry point file doesn't exist
    #[error("Entry point not found: {}\n\nHint: Check the 'entry' field in your config or --entry argument", .0.display())]
    EntryNotFound(PathBuf),

    /// Failed to write output file or asset
    #[error("Failed to write asset: {0}\n\nHint: Check output directory permissions")]
    AssetWriteFailed(String),

    /// Invalid external pattern
    #[error("External pattern '{0}' is not a valid regular expression\n\nHint: Escape special characters, e.g. '^\\./vendor/'")]
    InvalidExternal(String),

    /// Rolldown reported errors, including a failing plugin hook
    #[error("{0}")]
    Bundler(String),

    /// Output directory is not writable
    #[error("Output directory is not writable: {}\n\nHint: Check directory permissions or specify a different --out-dir", .0.display())]
    OutputNotWritable(PathBuf),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

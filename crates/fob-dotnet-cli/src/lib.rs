//! fob-dotnet CLI - host for the `fob-plugin-dotnet-wasm` integration.
//!
//! Two commands drive the plugin through its full lifecycle:
//!
//! - `dev`: a static development server with Server-Sent-Events live
//!   reload, with `dotnet watch` attached through the dev-server bridge
//! - `build`: a one-shot Rolldown bundle with the plugin installed, which
//!   runs `dotnet build` and copies `_framework` into the output
//!
//! # Architecture
//!
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal output helpers
//! - `cli` - Argument definitions
//! - `config` - `fob-dotnet.config.json` loading and validation
//! - `dev` - Development server and reload channel
//! - `commands` - Command implementations
//!
//! # Example
//!
//! ```rust
//! use fob_dotnet_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result};

//! Command-line interface definition for fob-dotnet.
//!
//! # Command Structure
//!
//! - `fob-dotnet dev` - Dev server with `dotnet watch` and live reload
//! - `fob-dotnet build` - Production bundle with the .NET runtime assets

mod commands;
pub mod enums;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use commands::{BuildArgs, Command, DevArgs, DotnetArgs};
pub use enums::ConfigurationArg;
pub use validation::{parse_external_pattern, parse_project_path};

/// fob-dotnet - serve and bundle a .NET WebAssembly front-end
#[derive(Parser, Debug)]
#[command(
    name = "fob-dotnet",
    version,
    about = "Serve and bundle a .NET WebAssembly front-end",
    long_about = "fob-dotnet runs the dotnet toolchain next to a development server or a\n\
                  production bundle. In dev, `dotnet watch` rebuilds the app and the browser\n\
                  reloads after every successful build. In build, the `_framework` runtime\n\
                  assets are copied next to the bundle."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Includes the full `dotnet` command lines and the MSBuild wwwroot lookup.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to fob-dotnet.config.json
    ///
    /// Defaults to fob-dotnet.config.json in the project root, if present.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

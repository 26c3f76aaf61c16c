use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::ConfigurationArg;
use crate::cli::validation::{parse_external_pattern, parse_project_path};

/// Available fob-dotnet subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server with `dotnet watch`
    ///
    /// Serves the project root, keeps `dotnet watch` running and reloads
    /// connected browsers whenever a rebuild finishes.
    Dev(DevArgs),

    /// Build for production
    ///
    /// Bundles the JavaScript entry with Rolldown, runs `dotnet build` once
    /// and copies the `_framework` runtime assets into the output.
    Build(BuildArgs),
}

/// Toolchain options shared by `dev` and `build`
#[derive(Args, Debug, Clone, Default)]
pub struct DotnetArgs {
    /// Path to the .NET project file
    ///
    /// Examples:
    ///   --project ../App/App.csproj
    ///   --project src/Client/Client.fsproj
    #[arg(short = 'P', long, value_name = "PROJECT", value_parser = parse_project_path)]
    pub project: Option<PathBuf>,

    /// MSBuild configuration (Debug or Release)
    #[arg(short = 'C', long, value_enum, value_name = "CONFIGURATION")]
    pub configuration: Option<ConfigurationArg>,

    /// Extra argument for `dotnet build` (repeatable)
    ///
    /// Example: --dotnet-arg=-p:RunAOTCompilation=true
    #[arg(long = "dotnet-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub dotnet_args: Vec<String>,

    /// Toolchain executable (defaults to `dotnet`)
    #[arg(long, value_name = "PROGRAM")]
    pub toolchain: Option<String>,

    /// Project root served and bundled (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Arguments for the dev command
#[derive(Args, Debug, Clone, Default)]
pub struct DevArgs {
    #[command(flatten)]
    pub dotnet: DotnetArgs,

    /// Port for the development server
    ///
    /// The next free port is used if this one is taken.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind the development server to
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Run a single `dotnet build` instead of `dotnet watch`
    #[arg(long)]
    pub no_watch: bool,

    /// Open the browser once the server is listening
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub dotnet: DotnetArgs,

    /// JavaScript entry point that loads the .NET runtime
    ///
    /// Example: fob-dotnet build src/main.js
    #[arg(value_name = "ENTRY")]
    pub entry: Option<PathBuf>,

    /// Output directory, relative to the root
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Assets directory inside the output directory
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Additional externalization pattern (repeatable, regex)
    #[arg(short, long, value_name = "PATTERN", value_parser = parse_external_pattern)]
    pub external: Vec<String>,

    /// Fail the build when wwwroot lookup, `dotnet build` or the copy fails
    #[arg(long)]
    pub strict: bool,
}

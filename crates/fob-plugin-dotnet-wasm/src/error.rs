//! Error types for the .NET WebAssembly integration

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

fn format_build_failed(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("dotnet build exited with code {}", code),
        None => "dotnet build was terminated by a signal".to_string(),
    }
}

/// Broad category of a [`DotnetWasmError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Resolution,
    Supervision,
    Copy,
}

/// Errors that can occur while driving the dotnet toolchain
#[derive(Error, Debug, Diagnostic)]
pub enum DotnetWasmError {
    /// Project path has no file name component
    #[error("Invalid .NET project path: {path}")]
    #[diagnostic(
        code(fob::dotnet::invalid_project),
        help("Point projectPath at a .csproj/.fsproj file")
    )]
    InvalidProject { path: PathBuf },

    /// The MSBuild introspection command could not be started
    #[error("Failed to run '{program} msbuild': {source}")]
    #[diagnostic(
        code(fob::dotnet::resolution_spawn),
        help("Ensure the .NET SDK is installed and '{program}' is on your PATH")
    )]
    ResolutionSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Introspection output did not contain a wwwroot line
    #[error("Could not determine the wwwroot directory from MSBuild output")]
    #[diagnostic(code(fob::dotnet::wwwroot_not_found))]
    WwwrootNotFound {
        #[help]
        output_tail: String,
    },

    /// The bundled targets file could not be written to disk
    #[error("Failed to write MSBuild targets file {path}: {source}")]
    #[diagnostic(code(fob::dotnet::targets_file))]
    TargetsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to spawn the build process
    #[error("Failed to spawn '{program}': {source}")]
    #[diagnostic(
        code(fob::dotnet::spawn_failed),
        help("Ensure the .NET SDK is installed and '{program}' is on your PATH")
    )]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Spawned process came up without a piped stream
    #[error("Failed to capture {stream} of the build process")]
    #[diagnostic(code(fob::dotnet::missing_pipe))]
    MissingPipe { stream: &'static str },

    /// Waiting on the process failed at the OS level
    #[error("Build process failed: {message}")]
    #[diagnostic(code(fob::dotnet::process_failed))]
    ProcessFailed { message: String },

    /// One-shot build finished with a non-zero status
    #[error("{}", format_build_failed(.exit_code))]
    #[diagnostic(
        code(fob::dotnet::build_failed),
        help("Run the build by hand to see the full compiler output")
    )]
    BuildFailed { exit_code: Option<i32> },

    /// A hook needed the wwwroot directory but it was never resolved
    #[error("The wwwroot directory is not known; cannot copy runtime assets")]
    #[diagnostic(
        code(fob::dotnet::web_root_unavailable),
        help("Check the project path and that 'dotnet msbuild' succeeds for it")
    )]
    WebRootUnavailable,

    /// Copying the runtime bundle failed
    #[error("Failed to copy {from} to {to}: {source}")]
    #[diagnostic(code(fob::dotnet::copy_failed))]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A hook ran before the bundler configuration was resolved
    #[error("'{hook}' ran before the bundler configuration was resolved")]
    #[diagnostic(code(fob::dotnet::not_configured))]
    NotConfigured { hook: &'static str },
}

impl DotnetWasmError {
    pub fn invalid_project(path: impl Into<PathBuf>) -> Self {
        Self::InvalidProject { path: path.into() }
    }

    pub fn resolution_spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::ResolutionSpawn {
            program: program.into(),
            source,
        }
    }

    pub fn wwwroot_not_found(output_tail: String) -> Self {
        Self::WwwrootNotFound { output_tail }
    }

    pub fn targets_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::TargetsFile {
            path: path.into(),
            source,
        }
    }

    pub fn spawn_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            source,
        }
    }

    pub fn missing_pipe(stream: &'static str) -> Self {
        Self::MissingPipe { stream }
    }

    pub fn process_failed(message: impl Into<String>) -> Self {
        Self::ProcessFailed {
            message: message.into(),
        }
    }

    pub fn build_failed(exit_code: Option<i32>) -> Self {
        Self::BuildFailed { exit_code }
    }

    pub fn copy(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Copy {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    pub fn not_configured(hook: &'static str) -> Self {
        Self::NotConfigured { hook }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidProject { .. } | Self::NotConfigured { .. } => ErrorKind::Config,
            Self::ResolutionSpawn { .. }
            | Self::WwwrootNotFound { .. }
            | Self::TargetsFile { .. }
            | Self::WebRootUnavailable => ErrorKind::Resolution,
            Self::SpawnFailed { .. }
            | Self::MissingPipe { .. }
            | Self::ProcessFailed { .. }
            | Self::BuildFailed { .. } => ErrorKind::Supervision,
            Self::Copy { .. } => ErrorKind::Copy,
        }
    }
}

pub type Result<T> = std::result::Result<T, DotnetWasmError>;

//! .NET WebAssembly plugin configuration types
//!
//! This module provides configuration options for the dotnet-wasm plugin.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Runtime-asset subdirectory inside the web-root
pub const FRAMEWORK_DIR: &str = "_framework";

/// Logical import prefix application code uses to reach the runtime bundle
pub const FRAMEWORK_IMPORT_PREFIX: &str = "./_framework";

/// Default toolchain binary
pub const DEFAULT_TOOLCHAIN: &str = "dotnet";

/// MSBuild configuration passed to `--configuration`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildConfiguration {
    #[serde(alias = "debug")]
    Debug,
    #[default]
    #[serde(alias = "release")]
    Release,
}

impl BuildConfiguration {
    /// Value handed to the toolchain
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildConfiguration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            other => Err(format!(
                "unknown build configuration '{}' (expected Debug or Release)",
                other
            )),
        }
    }
}

/// Alias table consumed by module resolution: logical prefix → absolute path
pub type FrameworkAliasMap = IndexMap<String, PathBuf>;

/// Default alias: `./_framework` → `<wwwroot>/_framework`
pub fn default_framework_alias(web_root: &Path) -> FrameworkAliasMap {
    let mut alias = FrameworkAliasMap::new();
    alias.insert(
        FRAMEWORK_IMPORT_PREFIX.to_string(),
        web_root.join(FRAMEWORK_DIR),
    );
    alias
}

/// Caller-supplied hook that builds the alias table from the resolved web-root
#[derive(Clone)]
pub struct FrameworkAliasFn(Arc<dyn Fn(&Path) -> FrameworkAliasMap + Send + Sync>);

impl FrameworkAliasFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Path) -> FrameworkAliasMap + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, web_root: &Path) -> FrameworkAliasMap {
        (self.0)(web_root)
    }
}

impl Default for FrameworkAliasFn {
    fn default() -> Self {
        Self::new(default_framework_alias)
    }
}

impl fmt::Debug for FrameworkAliasFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FrameworkAliasFn(..)")
    }
}

fn default_toolchain() -> String {
    DEFAULT_TOOLCHAIN.to_string()
}

/// Options for the dotnet-wasm plugin
///
/// Mirrors what a user writes in their bundler config. `framework_path_alias`
/// is code-only and never (de)serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DotnetWasmOptions {
    /// Path to the .NET project file (e.g. `../app/app.csproj`)
    pub project_path: PathBuf,

    /// Build configuration, `Release` unless overridden
    #[serde(default)]
    pub configuration: BuildConfiguration,

    /// Run `dotnet watch` for continuous building
    ///
    /// `None` means: watch when serving, one-shot otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,

    /// Additional arguments appended to `dotnet build`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dotnet_build_args: Vec<String>,

    /// Builds the module alias table from the wwwroot path
    #[serde(skip)]
    pub framework_path_alias: FrameworkAliasFn,

    /// Toolchain binary, `dotnet` unless overridden
    #[serde(default = "default_toolchain")]
    pub toolchain: String,

    /// Use this targets file instead of the bundled `DumpInfo.targets`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets_file: Option<PathBuf>,

    /// Turn wwwroot detection, build and copy failures into hard errors
    #[serde(default)]
    pub strict: bool,
}

impl DotnetWasmOptions {
    /// Create options for the given project file with default values
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            configuration: BuildConfiguration::default(),
            watch: None,
            dotnet_build_args: Vec::new(),
            framework_path_alias: FrameworkAliasFn::default(),
            toolchain: default_toolchain(),
            targets_file: None,
            strict: false,
        }
    }

    pub fn with_configuration(mut self, configuration: BuildConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = Some(watch);
        self
    }

    /// Add an argument for `dotnet build`
    pub fn with_build_arg(mut self, arg: impl Into<String>) -> Self {
        self.dotnet_build_args.push(arg.into());
        self
    }

    pub fn with_framework_path_alias<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> FrameworkAliasMap + Send + Sync + 'static,
    {
        self.framework_path_alias = FrameworkAliasFn::new(f);
        self
    }

    pub fn with_toolchain(mut self, toolchain: impl Into<String>) -> Self {
        self.toolchain = toolchain.into();
        self
    }

    pub fn with_targets_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.targets_file = Some(path.into());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

//! Configuration system for fob-dotnet with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use crate::error::{BuildError, Result};
use fob_plugin_dotnet_wasm::{
    BuildConfiguration, DotnetWasmOptions, ExternalOption, HostCommand, HostConfig,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAME, ConfigOverrides, env_key_to_camel};

/// fob-dotnet configuration - loaded from fob-dotnet.config.json or CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DotnetConfig {
    /// .NET project file (e.g. "../App/App.csproj")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,

    /// MSBuild configuration
    #[serde(default)]
    pub configuration: BuildConfiguration,

    /// Force `dotnet watch` on or off (default: on for dev)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,

    /// Extra arguments for `dotnet build`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dotnet_build_args: Vec<String>,

    /// Toolchain executable
    #[serde(default = "default_toolchain")]
    pub toolchain: String,

    /// Custom MSBuild targets file for the wwwroot lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets_file: Option<PathBuf>,

    /// Treat wwwroot, build and copy failures as errors
    #[serde(default)]
    pub strict: bool,

    /// Project root (served in dev, base of outDir in build)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// JavaScript entry point for `build`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    /// Output directory
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Assets directory inside outDir
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Externalization patterns (regular expressions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,

    /// Dev server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Dev server bind address
    #[serde(default = "default_host")]
    pub host: String,
}

impl DotnetConfig {
    /// Root directory, resolved against `base` when relative
    pub fn resolved_root(&self, base: &Path) -> PathBuf {
        match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        }
    }

    /// Plugin options, with the project path made absolute against `root`
    pub fn plugin_options(&self, root: &Path) -> Result<DotnetWasmOptions> {
        let project = self.project_path.as_ref().ok_or_else(|| {
            crate::error::ConfigError::MissingField {
                field: "projectPath".to_string(),
                hint: "Pass --project <path/to/App.csproj> or set projectPath".to_string(),
            }
        })?;
        let project = if project.is_absolute() {
            project.clone()
        } else {
            root.join(project)
        };

        let mut options = DotnetWasmOptions::new(project)
            .with_configuration(self.configuration)
            .with_toolchain(self.toolchain.clone())
            .with_strict(self.strict);
        options.watch = self.watch;
        options.dotnet_build_args = self.dotnet_build_args.clone();
        options.targets_file = self.targets_file.clone();
        Ok(options)
    }

    /// Host configuration the plugin's `config` hook sees
    pub fn host_config(&self, root: &Path, command: HostCommand) -> Result<HostConfig> {
        let mut host = HostConfig::new(root, command)
            .with_out_dir(self.out_dir.clone())
            .with_assets_dir(self.assets_dir.clone());

        if !self.external.is_empty() {
            let patterns = self
                .external
                .iter()
                .map(|p| Regex::new(p).map_err(|_| BuildError::InvalidExternal(p.clone())))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            host = host.with_external(ExternalOption::Patterns(patterns));
        }

        Ok(host)
    }

    /// Example fob-dotnet.config.json content.
    pub fn example_config() -> String {
        let example = Self {
            project_path: Some(PathBuf::from("../App/App.csproj")),
            configuration: BuildConfiguration::Release,
            watch: None,
            dotnet_build_args: vec!["-p:RunAOTCompilation=false".to_string()],
            toolchain: default_toolchain(),
            targets_file: None,
            strict: false,
            root: None,
            entry: Some(PathBuf::from("src/main.js")),
            out_dir: default_out_dir(),
            assets_dir: default_assets_dir(),
            external: vec![],
            port: default_port(),
            host: default_host(),
        };
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }
}

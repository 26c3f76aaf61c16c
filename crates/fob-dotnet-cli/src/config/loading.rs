use crate::cli::{BuildArgs, DevArgs, DotnetArgs};
use crate::config::DotnetConfig;
use crate::config::defaults::*;
use crate::error::{ConfigError, Result};
use fob_plugin_dotnet_wasm::BuildConfiguration;
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "fob-dotnet.config.json";

/// Prefix of environment overrides (`FOB_DOTNET_PROJECT_PATH`, `FOB_DOTNET_PORT`, ...)
const ENV_PREFIX: &str = "FOB_DOTNET_";

/// Values given on the command line; unset fields leave lower layers alone
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<BuildConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dotnet_build_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

impl ConfigOverrides {
    fn from_dotnet(args: &DotnetArgs) -> Self {
        Self {
            project_path: args.project.clone(),
            configuration: args.configuration.map(Into::into),
            dotnet_build_args: non_empty(&args.dotnet_args),
            toolchain: args.toolchain.clone(),
            root: args.root.clone(),
            ..Self::default()
        }
    }

    pub fn from_dev_args(args: &DevArgs) -> Self {
        Self {
            watch: args.no_watch.then_some(false),
            port: args.port,
            host: args.host.clone(),
            ..Self::from_dotnet(&args.dotnet)
        }
    }

    pub fn from_build_args(args: &BuildArgs) -> Self {
        Self {
            strict: args.strict.then_some(true),
            entry: args.entry.clone(),
            out_dir: args.out_dir.clone(),
            assets_dir: args.assets_dir.clone(),
            external: non_empty(&args.external),
            ..Self::from_dotnet(&args.dotnet)
        }
    }
}

/// `PROJECT_PATH` → `projectPath`
pub fn env_key_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

impl DotnetConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// Without an explicit `config_path`, `fob-dotnet.config.json` is picked
    /// up from `base_dir` when it exists.
    pub fn load(
        overrides: &ConfigOverrides,
        config_path: Option<&Path>,
        base_dir: &Path,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = base_dir.join(CONFIG_FILE_NAME);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| env_key_to_camel(key.as_str()).into())
                .lowercase(false),
        );

        figment = figment.merge(Serialized::defaults(overrides));

        figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()).into())
    }

    /// Get default configuration values.
    pub(crate) fn default_config() -> Self {
        Self {
            project_path: None,
            configuration: BuildConfiguration::default(),
            watch: None,
            dotnet_build_args: vec![],
            toolchain: default_toolchain(),
            targets_file: None,
            strict: false,
            root: None,
            entry: None,
            out_dir: default_out_dir(),
            assets_dir: default_assets_dir(),
            external: vec![],
            port: default_port(),
            host: default_host(),
        }
    }
}

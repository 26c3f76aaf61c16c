//! Value enums for command-line arguments.

use clap::ValueEnum;
use fob_plugin_dotnet_wasm::BuildConfiguration;

/// MSBuild configuration accepted by `--configuration`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigurationArg {
    /// Unoptimized build with debugging support
    #[value(alias = "Debug")]
    Debug,
    /// Optimized build (trimming, AOT if enabled in the project)
    #[value(alias = "Release")]
    Release,
}

impl From<ConfigurationArg> for BuildConfiguration {
    fn from(arg: ConfigurationArg) -> Self {
        match arg {
            ConfigurationArg::Debug => BuildConfiguration::Debug,
            ConfigurationArg::Release => BuildConfiguration::Release,
        }
    }
}

//! Command implementations for the fob-dotnet CLI.
//!
//! - [`build`] - Bundle the JavaScript entry and integrate the .NET runtime
//! - [`dev`] - Development server with `dotnet watch` and full reload
//!
//! Both commands load configuration the same way and run the plugin's
//! `config` and `config_resolved` hooks before doing their own work.

pub mod build;
pub mod dev;

pub use build::execute as build_execute;
pub use dev::execute as dev_execute;

use crate::config::{ConfigOverrides, DotnetConfig};
use crate::error::{CliError, Result};
use fob_plugin_dotnet_wasm::{FobDotnetWasmPlugin, HostCommand, ResolvedHostConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load configuration and resolve the project root.
///
/// The config file is looked up in `--root` (or the current directory).
/// Relative roots resolve against the current directory.
pub(crate) fn load_config(
    overrides: &ConfigOverrides,
    root_arg: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<(DotnetConfig, PathBuf)> {
    let cwd = std::env::current_dir()?;
    let base = match root_arg {
        Some(root) => cwd.join(root),
        None => cwd.clone(),
    };

    let config = DotnetConfig::load(overrides, config_path, &base)?;
    let root = config.resolved_root(&cwd);
    if !root.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Root directory does not exist: {}",
            root.display()
        )));
    }

    Ok((config, root))
}

/// Create the plugin and drive its `config` / `config_resolved` hooks.
///
/// The wwwroot lookup spawns MSBuild synchronously, so it runs on the
/// blocking pool.
pub(crate) async fn setup_plugin(
    config: &DotnetConfig,
    root: &Path,
    command: HostCommand,
) -> Result<(FobDotnetWasmPlugin, ResolvedHostConfig)> {
    let plugin = FobDotnetWasmPlugin::new(config.plugin_options(root)?)?;
    let host = config.host_config(root, command)?;

    let context = Arc::clone(plugin.context());
    let host_for_hook = host.clone();
    let patch = tokio::task::spawn_blocking(move || context.config(&host_for_hook))
        .await
        .map_err(|e| CliError::Custom(format!("wwwroot lookup task failed: {}", e)))??;

    let resolved = host.resolve(patch);
    plugin.context().config_resolved(resolved.clone());

    Ok((plugin, resolved))
}

//! Rolldown plugin that drives a .NET WebAssembly build
//!
//! The plugin locates the project's `wwwroot` through MSBuild, keeps
//! `./_framework/*` imports external, and ties the `dotnet` toolchain to
//! the host lifecycle:
//!
//! - dev server: `dotnet watch` runs next to the server, every finished
//!   rebuild triggers a full page reload
//! - production build: `dotnet build` runs once and `_framework` is copied
//!   into `<outDir>/<assetsDir>/_framework`
//!
//! ## Architecture
//!
//! ```text
//! config()          → resolver (dotnet msbuild -t:PrintWwwroot) → alias / fs allow / external
//! configure_server  → bridge → supervisor (dotnet watch) → full_reload on readiness
//! generate_bundle   → integrator → supervisor (dotnet build) → copy _framework
//! close_bundle      → bridge shutdown
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_dotnet_wasm::{DotnetWasmOptions, FobDotnetWasmPlugin, HostCommand, HostConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let plugin = FobDotnetWasmPlugin::new(DotnetWasmOptions::new("../App/App.csproj"))?;
//! let host = HostConfig::new(".", HostCommand::Build);
//! let patch = plugin.context().config(&host)?;
//! plugin.context().config_resolved(host.resolve(patch));
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookGenerateBundleArgs, HookNoopReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

mod bridge;
mod config;
mod context;
mod error;
mod external;
mod integrator;
mod project;
mod resolver;
mod supervisor;
mod workspace;

pub use bridge::{DevServerBridge, DevServerHost, READY_MARKER, count_ready_markers};
pub use config::{
    BuildConfiguration, DEFAULT_TOOLCHAIN, DotnetWasmOptions, FRAMEWORK_DIR,
    FRAMEWORK_IMPORT_PREFIX, FrameworkAliasFn, FrameworkAliasMap, default_framework_alias,
};
pub use context::{ConfigPatch, DotnetWasmContext, HostCommand, HostConfig, ResolvedHostConfig};
pub use error::{DotnetWasmError, ErrorKind, Result};
pub use external::{ExternalOption, ExternalPredicate, compose_external, framework_external_rule};
pub use integrator::{
    BundleIntegrator, IntegrationReport, copy_dir_recursive, copy_framework, run_production_build,
};
pub use project::ProjectReference;
pub use resolver::{
    DUMP_TARGETS, introspection_args, materialize_targets_file, parse_web_root, resolve_web_root,
};
pub use supervisor::{
    BuildRequest, OutputStream, ProcessEvent, ProcessKiller, SupervisedProcess, start,
};
pub use workspace::{search_for_package_root, search_for_workspace_root};

/// Rolldown plugin wrapping a shared [`DotnetWasmContext`]
///
/// Clones share the context, so the host can keep a handle for the
/// `config`/`configure_server`/`close_bundle` hooks that Rolldown itself
/// does not drive.
#[derive(Clone, Debug)]
pub struct FobDotnetWasmPlugin {
    context: Arc<DotnetWasmContext>,
}

impl FobDotnetWasmPlugin {
    pub fn new(options: DotnetWasmOptions) -> Result<Self> {
        Ok(Self::with_context(Arc::new(DotnetWasmContext::new(options)?)))
    }

    pub fn with_context(context: Arc<DotnetWasmContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<DotnetWasmContext> {
        &self.context
    }
}

impl Plugin for FobDotnetWasmPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-dotnet-wasm".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::GenerateBundle
    }

    /// Keep `./_framework/*` external and apply the framework alias map
    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(|s| s.to_string());
        let context = Arc::clone(&self.context);

        async move {
            if context.is_external(&specifier, importer.as_deref()) {
                debug!("[dotnet-wasm] external: {}", specifier);
                return Ok(Some(HookResolveIdOutput {
                    id: specifier.into(),
                    external: Some(ResolvedExternal::Bool(true)),
                    ..Default::default()
                }));
            }

            if let Some(target) = context.resolve_alias(&specifier) {
                return Ok(Some(HookResolveIdOutput {
                    id: target.to_string_lossy().into_owned().into(),
                    external: Some(ResolvedExternal::Bool(false)),
                    ..Default::default()
                }));
            }

            Ok(None)
        }
    }

    /// Run the production build and copy `_framework` next to the bundle
    fn generate_bundle(
        &self,
        _ctx: &PluginContext,
        _args: &mut HookGenerateBundleArgs<'_>,
    ) -> impl std::future::Future<Output = HookNoopReturn> + Send {
        let context = Arc::clone(&self.context);

        async move {
            let report = context
                .generate_bundle()
                .await
                .context("Failed to integrate the .NET WebAssembly build")?;
            debug!(
                "[dotnet-wasm] integration finished: exit {:?}, {} files → {}",
                report.exit_code,
                report.files_copied,
                report.destination.display()
            );
            Ok(())
        }
    }
}

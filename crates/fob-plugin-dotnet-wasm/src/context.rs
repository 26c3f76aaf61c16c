//! Per-instance plugin state and the hook sequence
//!
//! A host drives one [`DotnetWasmContext`] through
//! `config → config_resolved → (configure_server | generate_bundle) → close`.
//! The wwwroot path is resolved once, on the first `config` call, and
//! reused by every later hook.

use crate::bridge::{DevServerBridge, DevServerHost};
use crate::config::{DotnetWasmOptions, FRAMEWORK_DIR, FrameworkAliasMap};
use crate::error::{DotnetWasmError, Result};
use crate::external::{ExternalOption, compose_external};
use crate::integrator::{BundleIntegrator, IntegrationReport};
use crate::project::ProjectReference;
use crate::resolver::resolve_web_root;
use crate::supervisor::BuildRequest;
use crate::workspace::search_for_workspace_root;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

/// Which host command is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Serve,
    Build,
}

/// Host configuration as seen before the plugin patches it
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub root: PathBuf,
    pub command: HostCommand,
    pub out_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub external: Option<ExternalOption>,
}

impl HostConfig {
    pub fn new(root: impl Into<PathBuf>, command: HostCommand) -> Self {
        Self {
            root: root.into(),
            command,
            out_dir: PathBuf::from("dist"),
            assets_dir: PathBuf::from("assets"),
            external: None,
        }
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn with_assets_dir(mut self, assets_dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = assets_dir.into();
        self
    }

    pub fn with_external(mut self, external: ExternalOption) -> Self {
        self.external = Some(external);
        self
    }

    /// Apply the plugin's patch
    pub fn resolve(self, patch: ConfigPatch) -> ResolvedHostConfig {
        ResolvedHostConfig {
            root: self.root,
            command: self.command,
            out_dir: self.out_dir,
            assets_dir: self.assets_dir,
            alias: patch.alias,
            fs_allow: patch.fs_allow,
            external: patch.external,
        }
    }
}

/// What the plugin contributes to the host configuration
#[derive(Debug, Clone)]
pub struct ConfigPatch {
    /// Module resolution aliases, usually `./_framework → <wwwroot>/_framework`
    pub alias: FrameworkAliasMap,
    /// Directories the dev server may serve files from
    pub fs_allow: Vec<PathBuf>,
    /// Externalization rule with the framework prefix merged in
    pub external: ExternalOption,
}

/// Final host configuration
#[derive(Debug, Clone)]
pub struct ResolvedHostConfig {
    pub root: PathBuf,
    pub command: HostCommand,
    pub out_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub alias: FrameworkAliasMap,
    pub fs_allow: Vec<PathBuf>,
    pub external: ExternalOption,
}

impl ResolvedHostConfig {
    /// `<root>/<outDir>/<assetsDir>/_framework`
    pub fn framework_output_dir(&self) -> PathBuf {
        self.root
            .join(&self.out_dir)
            .join(&self.assets_dir)
            .join(FRAMEWORK_DIR)
    }
}

/// State shared by every hook of one plugin instance
#[derive(Debug)]
pub struct DotnetWasmContext {
    options: DotnetWasmOptions,
    project: ProjectReference,
    web_root: OnceCell<Option<PathBuf>>,
    resolved: RwLock<Option<ResolvedHostConfig>>,
    bridge: DevServerBridge,
    last_report: RwLock<Option<IntegrationReport>>,
}

impl DotnetWasmContext {
    pub fn new(options: DotnetWasmOptions) -> Result<Self> {
        let project = ProjectReference::new(options.project_path.clone())?;
        Ok(Self::with_project(options, project))
    }

    /// Use an already resolved project reference
    pub fn with_project(options: DotnetWasmOptions, project: ProjectReference) -> Self {
        Self {
            options,
            project,
            web_root: OnceCell::new(),
            resolved: RwLock::new(None),
            bridge: DevServerBridge::new(),
            last_report: RwLock::new(None),
        }
    }

    pub fn options(&self) -> &DotnetWasmOptions {
        &self.options
    }

    pub fn project(&self) -> &ProjectReference {
        &self.project
    }

    pub fn bridge(&self) -> &DevServerBridge {
        &self.bridge
    }

    /// Resolved wwwroot, `None` before `config` or after a failed resolution
    pub fn web_root(&self) -> Option<&Path> {
        self.web_root.get().and_then(|root| root.as_deref())
    }

    fn ensure_web_root(&self) -> Result<Option<&Path>> {
        let web_root = self.web_root.get_or_try_init(|| {
            match resolve_web_root(
                &self.options.toolchain,
                &self.project,
                self.options.configuration,
                self.options.targets_file.as_deref(),
            ) {
                Ok(path) => Ok(Some(path)),
                Err(e) if self.options.strict => Err(e),
                Err(e) => {
                    error!("[dotnet-wasm] Failed to detect wwwroot path: {}", e);
                    Ok(None)
                }
            }
        })?;
        Ok(web_root.as_deref())
    }

    /// `config` hook: resolve wwwroot and build the configuration patch
    pub fn config(&self, host: &HostConfig) -> Result<ConfigPatch> {
        let web_root = self.ensure_web_root()?;

        let alias = web_root
            .map(|root| self.options.framework_path_alias.apply(root))
            .unwrap_or_default();

        let mut fs_allow = vec![search_for_workspace_root(&host.root)];
        if let Some(root) = web_root {
            fs_allow.push(root.join(FRAMEWORK_DIR));
        }

        Ok(ConfigPatch {
            alias,
            fs_allow,
            external: compose_external(host.external.clone()),
        })
    }

    /// `configResolved` hook: remember the final host configuration
    pub fn config_resolved(&self, config: ResolvedHostConfig) {
        debug!(
            "[dotnet-wasm] host config resolved (root: {}, command: {:?})",
            config.root.display(),
            config.command
        );
        *self.resolved.write() = Some(config);
    }

    pub fn resolved_config(&self) -> Option<ResolvedHostConfig> {
        self.resolved.read().clone()
    }

    /// Whether the toolchain runs in watch mode for the resolved command
    pub fn watch_enabled(&self) -> bool {
        let serving = self
            .resolved
            .read()
            .as_ref()
            .is_some_and(|c| c.command == HostCommand::Serve);
        self.options.watch.unwrap_or(serving)
    }

    pub fn build_request(&self, watch: bool) -> BuildRequest {
        BuildRequest::new(
            self.options.toolchain.clone(),
            &self.project,
            self.options.configuration,
        )
        .with_watch(watch)
        .with_extra_args(self.options.dotnet_build_args.iter().cloned())
    }

    /// `configureServer` hook: start the watch build for a dev server
    ///
    /// Returns `Ok(false)` if a build process is already running.
    pub fn configure_server(&self, host: Arc<dyn DevServerHost>) -> Result<bool> {
        let request = self.build_request(self.watch_enabled());
        self.bridge.attach(&request, host)
    }

    /// `closeServer`: stop the watch build
    pub fn close_server(&self) -> bool {
        self.bridge.shutdown()
    }

    /// `generateBundle` hook: one-shot build, then copy `_framework`
    pub async fn generate_bundle(&self) -> Result<IntegrationReport> {
        let dest = self
            .resolved
            .read()
            .as_ref()
            .map(ResolvedHostConfig::framework_output_dir)
            .ok_or_else(|| DotnetWasmError::not_configured("generate_bundle"))?;

        let integrator = BundleIntegrator::new(self.build_request(false), self.options.strict);
        let report = integrator.integrate(self.web_root(), &dest).await?;
        *self.last_report.write() = Some(report.clone());
        Ok(report)
    }

    /// Report of the most recent successful `generate_bundle`
    pub fn last_report(&self) -> Option<IntegrationReport> {
        self.last_report.read().clone()
    }

    /// `closeBundle` hook: make sure no build process outlives the bundle
    pub fn close_bundle(&self) -> bool {
        self.bridge.shutdown()
    }

    /// Externalization decision for an import, using the resolved rule
    pub fn is_external(&self, specifier: &str, importer: Option<&str>) -> bool {
        match self.resolved.read().as_ref() {
            Some(config) => config.external.is_external(specifier, importer, false),
            None => compose_external(None).is_external(specifier, importer, false),
        }
    }

    /// Rewrite `specifier` through the alias map
    ///
    /// Matches an exact alias key or a key followed by `/`.
    pub fn resolve_alias(&self, specifier: &str) -> Option<PathBuf> {
        let resolved = self.resolved.read();
        let alias = &resolved.as_ref()?.alias;
        alias.iter().find_map(|(key, target)| {
            if specifier == key {
                return Some(target.clone());
            }
            specifier
                .strip_prefix(key.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| target.join(rest))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameworkAliasMap;

    fn context_with_web_root(web_root: Option<PathBuf>) -> DotnetWasmContext {
        let options = DotnetWasmOptions::new("/src/App/App.csproj");
        let project = ProjectReference::split("/src/App/App.csproj", Path::new("/")).unwrap();
        let context = DotnetWasmContext::with_project(options, project);
        let _ = context.web_root.set(web_root);
        context
    }

    #[test]
    fn test_config_patch_with_web_root() {
        let context = context_with_web_root(Some(PathBuf::from("/out/wwwroot")));
        let host = HostConfig::new("/src/web", HostCommand::Build);
        let patch = context.config(&host).unwrap();

        assert_eq!(
            patch.alias.get("./_framework"),
            Some(&PathBuf::from("/out/wwwroot/_framework"))
        );
        assert_eq!(patch.fs_allow.len(), 2);
        assert_eq!(patch.fs_allow[1], PathBuf::from("/out/wwwroot/_framework"));
        assert!(patch.external.is_external("./_framework/dotnet.js", None, false));
    }

    #[test]
    fn test_config_patch_degraded() {
        let context = context_with_web_root(None);
        let host = HostConfig::new("/src/web", HostCommand::Serve);
        let patch = context.config(&host).unwrap();

        assert!(patch.alias.is_empty());
        assert_eq!(patch.fs_allow.len(), 1);
    }

    #[test]
    fn test_watch_defaults_follow_command() {
        let context = context_with_web_root(None);
        assert!(!context.watch_enabled());

        let host = HostConfig::new("/src/web", HostCommand::Serve);
        let patch = context.config(&host).unwrap();
        context.config_resolved(host.resolve(patch));
        assert!(context.watch_enabled());
    }

    #[test]
    fn test_explicit_watch_wins() {
        let options = DotnetWasmOptions::new("/a/A.csproj").with_watch(false);
        let project = ProjectReference::split("/a/A.csproj", Path::new("/")).unwrap();
        let context = DotnetWasmContext::with_project(options, project);
        let _ = context.web_root.set(None);
        let host = HostConfig::new("/a", HostCommand::Serve);
        let patch = context.config(&host).unwrap();
        context.config_resolved(host.resolve(patch));
        assert!(!context.watch_enabled());
    }

    #[test]
    fn test_framework_output_dir() {
        let context = context_with_web_root(None);
        let host = HostConfig::new("/proj", HostCommand::Build)
            .with_out_dir("build")
            .with_assets_dir("static");
        let patch = context.config(&host).unwrap();
        let resolved = host.resolve(patch);
        assert_eq!(
            resolved.framework_output_dir(),
            PathBuf::from("/proj/build/static/_framework")
        );
    }

    #[test]
    fn test_alias_resolution() {
        let context = context_with_web_root(Some(PathBuf::from("/w")));
        let host = HostConfig::new("/proj", HostCommand::Build);
        let patch = context.config(&host).unwrap();
        context.config_resolved(host.resolve(patch));

        assert_eq!(
            context.resolve_alias("./_framework/dotnet.js"),
            Some(PathBuf::from("/w/_framework/dotnet.js"))
        );
        assert_eq!(
            context.resolve_alias("./_framework"),
            Some(PathBuf::from("/w/_framework"))
        );
        assert_eq!(context.resolve_alias("./_frameworks/x.js"), None);
        assert_eq!(context.resolve_alias("react"), None);
    }

    #[test]
    fn test_request_carries_project_file_and_args() {
        let options = DotnetWasmOptions::new("/a/A.csproj").with_build_arg("-p:X=1");
        let project = ProjectReference::split("/a/A.csproj", Path::new("/")).unwrap();
        let context = DotnetWasmContext::with_project(options, project);
        let request = context.build_request(true);
        assert_eq!(
            request.args(),
            vec![
                "watch",
                "--non-interactive",
                "build",
                "A.csproj",
                "--configuration",
                "Release",
                "-p:X=1"
            ]
        );
        assert_eq!(request.working_dir, PathBuf::from("/a"));
    }

    #[tokio::test]
    async fn test_generate_bundle_before_config_resolved() {
        let context = context_with_web_root(None);
        let err = context.generate_bundle().await.unwrap_err();
        assert!(matches!(err, DotnetWasmError::NotConfigured { .. }));
    }

    #[test]
    fn test_custom_alias_applies() {
        let options = DotnetWasmOptions::new("/a/A.csproj").with_framework_path_alias(|root| {
            let mut map = FrameworkAliasMap::new();
            map.insert("@runtime".to_string(), root.join("_framework"));
            map
        });
        let project = ProjectReference::split("/a/A.csproj", Path::new("/")).unwrap();
        let context = DotnetWasmContext::with_project(options, project);
        let _ = context.web_root.set(Some(PathBuf::from("/w")));
        let patch = context
            .config(&HostConfig::new("/a", HostCommand::Build))
            .unwrap();
        assert!(patch.alias.contains_key("@runtime"));
        assert!(!patch.alias.contains_key("./_framework"));
    }
}

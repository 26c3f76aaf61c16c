//! Build command implementation.
//!
//! Bundles the JavaScript entry with Rolldown. The dotnet-wasm plugin keeps
//! `./_framework/*` imports external and, in its `generate_bundle` hook, runs
//! `dotnet build` and copies `_framework` next to the emitted chunks.

use crate::cli::BuildArgs;
use crate::commands::{load_config, setup_plugin};
use crate::config::ConfigOverrides;
use crate::error::{BuildError, CliError, Result};
use crate::ui;
use fob_plugin_dotnet_wasm::{FobDotnetWasmPlugin, HostCommand};
use rolldown::{BundleOutput, BundlerBuilder, BundlerOptions, InputItem, OutputFormat, Platform};
use rolldown_common::Output;
use rolldown_plugin::__inner::SharedPluginable;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Execute the build command.
///
/// # Build Process
///
/// 1. Load and validate configuration (CLI > Env > File > Defaults)
/// 2. Resolve wwwroot and the host configuration through the plugin
/// 3. Bundle the entry; the plugin integrates the .NET build
/// 4. Write chunks and assets to `<root>/<outDir>/<assetsDir>`
/// 5. Display build summary
///
/// # Errors
///
/// Returns errors for invalid configuration, a missing entry, bundler
/// failures (including strict-mode integration failures) and write errors.
pub async fn execute(args: BuildArgs, config_path: Option<PathBuf>) -> Result<()> {
    let start_time = Instant::now();

    ui::info("Loading configuration...");
    let overrides = ConfigOverrides::from_build_args(&args);
    let (config, root) = load_config(
        &overrides,
        args.dotnet.root.as_deref(),
        config_path.as_deref(),
    )?;
    config.validate_for_build()?;

    let entry = config
        .entry
        .as_deref()
        .map(|entry| root.join(entry))
        .ok_or_else(|| CliError::InvalidArgument("An entry point is required".to_string()))?;
    if !entry.is_file() {
        return Err(BuildError::EntryNotFound(entry).into());
    }

    let (plugin, resolved) = setup_plugin(&config, &root, HostCommand::Build).await?;
    let context = Arc::clone(plugin.context());

    ui::info(&format!("Building: {}", entry.display()));
    ui::info(&format!("Configuration: {}", config.configuration));

    let bundled = bundle(&entry, &root, plugin).await;
    context.close_bundle();
    let output = bundled?;

    let assets_dir = resolved.root.join(&resolved.out_dir).join(&resolved.assets_dir);
    let written = write_outputs(&output, &assets_dir)?;

    ui::print_build_summary(
        &written,
        context.last_report().as_ref(),
        start_time.elapsed(),
    );
    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(start_time.elapsed())
    ));

    Ok(())
}

/// Run Rolldown with the dotnet-wasm plugin installed.
async fn bundle(entry: &Path, root: &Path, plugin: FobDotnetWasmPlugin) -> Result<BundleOutput> {
    let options = BundlerOptions {
        input: Some(vec![InputItem {
            name: None,
            import: entry.to_string_lossy().into_owned(),
        }]),
        cwd: Some(root.to_path_buf()),
        format: Some(OutputFormat::Esm),
        platform: Some(Platform::Browser),
        ..Default::default()
    };

    let plugins: Vec<SharedPluginable> = vec![Arc::new(plugin)];

    let mut bundler = BundlerBuilder::default()
        .with_options(options)
        .with_plugins(plugins)
        .build()
        .map_err(|e| BuildError::Bundler(format!("{:?}", e)))?;

    bundler
        .generate()
        .await
        .map_err(|e| BuildError::Bundler(format!("{:?}", e)).into())
}

/// Write every chunk and asset below `dir`.
///
/// Returns (file name, size) pairs in emission order.
fn write_outputs(output: &BundleOutput, dir: &Path) -> Result<Vec<(String, u64)>> {
    fs::create_dir_all(dir).map_err(|_| BuildError::OutputNotWritable(dir.to_path_buf()))?;

    let mut written = Vec::new();
    for item in &output.assets {
        let (filename, bytes) = match item {
            Output::Chunk(chunk) => (chunk.filename.as_str(), chunk.code.as_bytes()),
            Output::Asset(asset) => (asset.filename.as_str(), asset.source.as_bytes()),
        };

        let target = output_path(dir, filename)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BuildError::AssetWriteFailed(format!("{}: {}", parent.display(), e)))?;
        }
        fs::write(&target, bytes)
            .map_err(|e| BuildError::AssetWriteFailed(format!("{}: {}", target.display(), e)))?;

        written.push((filename.to_string(), bytes.len() as u64));
    }

    Ok(written)
}

/// Join `filename` onto `dir`, refusing names that escape it.
fn output_path(dir: &Path, filename: &str) -> Result<PathBuf> {
    let relative = Path::new(filename);
    let escapes = relative.is_absolute()
        || relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
    if escapes {
        return Err(BuildError::AssetWriteFailed(format!(
            "output file '{}' would be written outside {}",
            filename,
            dir.display()
        ))
        .into());
    }
    Ok(dir.join(relative))
}

//! Development server command implementation.
//!
//! Orchestrates the dev lifecycle:
//! - Configuration loading and the plugin's `config` hooks
//! - HTTP server with SSE for full reload
//! - `dotnet watch` attached through the plugin's dev-server bridge
//! - Graceful shutdown on Ctrl+C, stopping the toolchain first

use crate::cli::DevArgs;
use crate::commands::{load_config, setup_plugin};
use crate::config::ConfigOverrides;
use crate::dev::{DevConfig, DevServer, DevServerState};
use crate::error::{CliError, Result};
use crate::ui;
use fob_plugin_dotnet_wasm::HostCommand;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Load and validate configuration
/// 2. Resolve wwwroot and the host configuration through the plugin
/// 3. Start the HTTP server with SSE
/// 4. Attach `dotnet watch` (`configure_server`)
/// 5. Wait for Ctrl+C, then stop the toolchain and the server
///
/// # Errors
///
/// Returns errors for invalid configuration, a failed wwwroot lookup in
/// strict mode and server startup failures. A toolchain that cannot be
/// spawned is reported and the server keeps running, unless strict.
pub async fn execute(args: DevArgs, config_path: Option<PathBuf>) -> Result<()> {
    ui::info("Starting development server...");

    let overrides = ConfigOverrides::from_dev_args(&args);
    let (config, root) = load_config(
        &overrides,
        args.dotnet.root.as_deref(),
        config_path.as_deref(),
    )?;
    config.validate_for_dev()?;

    let dev_config = DevConfig::from_config(&config, args.open)?;
    let (plugin, resolved) = setup_plugin(&config, &root, HostCommand::Serve).await?;
    let context = Arc::clone(plugin.context());

    let state = Arc::new(DevServerState::from_resolved(&resolved));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = DevServer::new(dev_config.clone(), Arc::clone(&state));
    let mut server_handle = tokio::spawn(server.run(async {
        let _ = shutdown_rx.await;
    }));

    ui::print_dev_banner(dev_config.addr, &root, context.web_root());

    match context.configure_server(state.clone()) {
        Ok(true) => ui::success("Started the .NET build process"),
        Ok(false) => ui::info("The .NET build process is already running"),
        Err(e) if config.strict => {
            let _ = shutdown_tx.send(());
            return Err(e.into());
        }
        Err(e) => ui::error(&format!("{} (serving without a .NET build)", e)),
    }

    if dev_config.open {
        open_browser(&dev_config.server_url());
    }

    ui::info("Press Ctrl+C to stop");

    let server_result = tokio::select! {
        _ = signal::ctrl_c() => {
            ui::info("Shutting down development server...");
            None
        }
        result = &mut server_handle => Some(result),
    };

    context.close_server();

    let server_result = match server_result {
        Some(result) => result,
        None => {
            let _ = shutdown_tx.send(());
            server_handle.await
        }
    };

    server_result.map_err(|e| CliError::Server(format!("Server task failed: {}", e)))??;

    ui::success(&format!(
        "Development server stopped ({} reloads)",
        state.reload_count()
    ));
    Ok(())
}

/// Open the server URL in the default browser.
///
/// Uses platform-specific commands:
/// - macOS: `open`
/// - Windows: `start`
/// - Linux: `xdg-open`
fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}

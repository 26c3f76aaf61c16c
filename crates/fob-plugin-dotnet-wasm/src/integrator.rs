//! Production side of the integration
//!
//! Runs the one-shot build and mirrors `<wwwroot>/_framework` into the
//! bundler output directory.

use crate::config::FRAMEWORK_DIR;
use crate::error::{DotnetWasmError, Result};
use crate::supervisor::{self, BuildRequest, OutputStream};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// What a production integration did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationReport {
    /// Exit code of `dotnet build`; `None` if it did not run to an exit code
    pub exit_code: Option<i32>,
    pub files_copied: usize,
    pub destination: PathBuf,
}

/// Run `dotnet build` to completion, forwarding its output to the debug log
pub async fn run_production_build(request: &BuildRequest) -> Result<Option<i32>> {
    let process = supervisor::start(request)?;
    process
        .wait(|stream, line| match stream {
            OutputStream::Stdout => debug!("[dotnet] {}", line),
            OutputStream::Stderr => debug!("[dotnet] (stderr) {}", line),
        })
        .await
}

/// Recursively copy `from` into `to`, returning the number of files copied
pub fn copy_dir_recursive(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(|e| DotnetWasmError::copy(from, to, e.into()))?;
        let relative = match entry.path().strip_prefix(from) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| DotnetWasmError::copy(entry.path(), &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| DotnetWasmError::copy(entry.path(), parent, e))?;
        }
        fs::copy(entry.path(), &target).map_err(|e| DotnetWasmError::copy(entry.path(), &target, e))?;
        copied += 1;
    }

    Ok(copied)
}

/// Copy `<web_root>/_framework` to `dest` on the blocking pool
pub async fn copy_framework(web_root: &Path, dest: &Path) -> Result<usize> {
    let from = web_root.join(FRAMEWORK_DIR);
    let to = dest.to_path_buf();

    task::spawn_blocking(move || copy_dir_recursive(&from, &to))
        .await
        .map_err(|e| DotnetWasmError::process_failed(format!("copy task failed: {}", e)))?
}

/// Drives the production build and copy for one bundle
#[derive(Debug, Clone)]
pub struct BundleIntegrator {
    request: BuildRequest,
    strict: bool,
}

impl BundleIntegrator {
    pub fn new(request: BuildRequest, strict: bool) -> Self {
        Self { request, strict }
    }

    /// Build, then copy the runtime bundle into `dest`
    ///
    /// Outside strict mode a failed build only warns, and a failed copy is
    /// logged and reported as zero files copied.
    pub async fn integrate(&self, web_root: Option<&Path>, dest: &Path) -> Result<IntegrationReport> {
        let exit_code = match run_production_build(&self.request).await {
            Ok(code) => code,
            Err(e) if self.strict => return Err(e),
            Err(e) => {
                error!("[dotnet-wasm] {}", e);
                None
            }
        };

        match exit_code {
            Some(0) => info!("[dotnet-wasm] dotnet build finished"),
            code if self.strict => return Err(DotnetWasmError::build_failed(code)),
            code => warn!(
                "[dotnet-wasm] {}; copying whatever output exists",
                DotnetWasmError::build_failed(code)
            ),
        }

        let copied = match web_root {
            Some(web_root) => copy_framework(web_root, dest).await,
            None => Err(DotnetWasmError::WebRootUnavailable),
        };

        let files_copied = match copied {
            Ok(count) => {
                info!(
                    "[dotnet-wasm] copied {} runtime files to {}",
                    count,
                    dest.display()
                );
                count
            }
            Err(e) if self.strict => return Err(e),
            Err(e) => {
                error!("[dotnet-wasm] {}", e);
                0
            }
        };

        Ok(IntegrationReport {
            exit_code,
            files_copied,
            destination: dest.to_path_buf(),
        })
    }
}

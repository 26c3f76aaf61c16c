//! Shared fixtures: a fake `dotnet` shell script and a recording host.

#![allow(dead_code)]

use async_trait::async_trait;
use fob_plugin_dotnet_wasm::{DevServerHost, OutputStream};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Write an executable `/bin/sh` script standing in for the toolchain
///
/// `body` is a `case "$1" in ... esac` block or any other shell code.
#[cfg(unix)]
pub fn fake_toolchain(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-dotnet.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Create `<dir>/App/App.csproj` and return its absolute path
pub fn project_file(dir: &Path) -> PathBuf {
    let project_dir = dir.join("App");
    fs::create_dir_all(&project_dir).unwrap();
    let path = project_dir.join("App.csproj");
    fs::write(&path, "<Project Sdk=\"Microsoft.NET.Sdk.BlazorWebAssembly\" />").unwrap();
    path
}

/// Host that records reloads and forwarded output
#[derive(Default)]
pub struct RecordingHost {
    reloads: AtomicUsize,
    lines: Mutex<Vec<(OutputStream, String)>>,
}

impl RecordingHost {
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn lines(&self) -> Vec<(OutputStream, String)> {
        self.lines.lock().clone()
    }
}

#[async_trait]
impl DevServerHost for RecordingHost {
    async fn full_reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    fn forward_output(&self, stream: OutputStream, line: &str) {
        self.lines.lock().push((stream, line.to_string()));
    }
}

/// Poll `check` until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Whether a process with this pid is still alive
#[cfg(unix)]
pub fn process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

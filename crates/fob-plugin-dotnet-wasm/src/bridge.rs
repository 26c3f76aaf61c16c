//! Dev-server side of the integration
//!
//! Owns at most one `dotnet watch` process for the lifetime of a dev
//! server and turns its "build finished" output into full-page reloads.

use crate::error::Result;
use crate::supervisor::{self, BuildRequest, OutputStream, ProcessEvent, ProcessKiller};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Phrase `dotnet watch` writes to stderr after every completed build
pub const READY_MARKER: &str = "Waiting for a file to change before restarting";

/// Number of readiness markers in a chunk of output
pub fn count_ready_markers(text: &str) -> usize {
    text.matches(READY_MARKER).count()
}

/// Reload and logging channel of the hosting dev server
#[async_trait]
pub trait DevServerHost: Send + Sync {
    /// Tell every connected client to reload the page
    async fn full_reload(&self);

    /// Surface one line of toolchain output
    ///
    /// Emits a tracing event by default; hosts override this to echo to a terminal.
    fn forward_output(&self, stream: OutputStream, line: &str) {
        match stream {
            OutputStream::Stdout => info!("[dotnet] {}", line),
            OutputStream::Stderr => warn!("[dotnet] {}", line),
        }
    }
}

#[derive(Debug)]
struct OwnedProcess {
    generation: u64,
    killer: ProcessKiller,
    pid: Option<u32>,
}

/// Keeps one watch process per dev server
#[derive(Debug, Default)]
pub struct DevServerBridge {
    slot: Arc<Mutex<Option<OwnedProcess>>>,
    generation: AtomicU64,
}

impl DevServerBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start supervising `request` on behalf of `host`
    ///
    /// Returns `Ok(false)` without spawning when a process is already owned.
    /// Must be called inside a tokio runtime.
    pub fn attach(&self, request: &BuildRequest, host: Arc<dyn DevServerHost>) -> Result<bool> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            debug!("[dotnet-wasm] build process already running, not spawning another");
            return Ok(false);
        }

        let process = supervisor::start(request)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "[dotnet-wasm] started dotnet {} (pid {:?})",
            if request.watch { "watch" } else { "build" },
            process.pid()
        );

        *slot = Some(OwnedProcess {
            generation,
            killer: process.killer(),
            pid: process.pid(),
        });
        drop(slot);

        let owner = Arc::clone(&self.slot);
        tokio::spawn(async move {
            let mut process = process;
            while let Some(event) = process.next_event().await {
                match event {
                    ProcessEvent::Stdout(line) => {
                        host.forward_output(OutputStream::Stdout, &line);
                    }
                    ProcessEvent::Stderr(line) => {
                        host.forward_output(OutputStream::Stderr, &line);
                        for _ in 0..count_ready_markers(&line) {
                            info!("[dotnet-wasm] Build succeeded, triggering reload");
                            host.full_reload().await;
                        }
                    }
                    ProcessEvent::Exited(code) => {
                        info!("[dotnet-wasm] dotnet process exited with code {:?}", code);
                        break;
                    }
                    ProcessEvent::Failed(message) => {
                        warn!("[dotnet-wasm] dotnet process failed: {}", message);
                        break;
                    }
                }
            }

            let mut slot = owner.lock();
            if slot.as_ref().is_some_and(|p| p.generation == generation) {
                *slot = None;
            }
        });

        Ok(true)
    }

    pub fn is_supervising(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Pid of the owned process, if any
    pub fn pid(&self) -> Option<u32> {
        self.slot.lock().as_ref().and_then(|p| p.pid)
    }

    /// Kill the owned process
    ///
    /// Returns whether a process was owned. Calling it again is a no-op.
    pub fn shutdown(&self) -> bool {
        let owned = self.slot.lock().take();
        match owned {
            Some(process) => {
                debug!("[dotnet-wasm] stopping dotnet (pid {:?})", process.pid);
                process.killer.kill();
                true
            }
            None => false,
        }
    }
}

impl Drop for DevServerBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Supervision of a single `dotnet build` / `dotnet watch` child process
//!
//! The child is owned by a waiter task. Its stdout and stderr are read line
//! by line by two reader tasks that push [`ProcessEvent`]s into a bounded
//! channel. The waiter emits the terminal `Exited`/`Failed` event once the
//! child is gone and the readers have drained, so the terminal event is
//! always the last one a consumer sees.

use crate::config::BuildConfiguration;
use crate::error::{DotnetWasmError, Result};
use crate::project::ProjectReference;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

const EVENT_CAPACITY: usize = 256;

/// How long readers may keep draining after the child exited
///
/// Grandchildren of `dotnet watch` can inherit the pipes and keep them open.
const READER_DRAIN: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Something the supervised process did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Stdout(String),
    Stderr(String),
    /// Process ended; `None` when it was terminated by a signal
    Exited(Option<i32>),
    /// Waiting on the process failed
    Failed(String),
}

impl ProcessEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited(_) | Self::Failed(_))
    }
}

/// Everything needed to launch the toolchain for one project
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub toolchain: String,
    pub project_file: String,
    pub working_dir: PathBuf,
    pub configuration: BuildConfiguration,
    pub watch: bool,
    pub extra_args: Vec<String>,
}

impl BuildRequest {
    pub fn new(
        toolchain: impl Into<String>,
        project: &ProjectReference,
        configuration: BuildConfiguration,
    ) -> Self {
        Self {
            toolchain: toolchain.into(),
            project_file: project.file_name.clone(),
            working_dir: project.directory.clone(),
            configuration,
            watch: false,
            extra_args: Vec::new(),
        }
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Command-line arguments, program name excluded
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(6 + self.extra_args.len());
        if self.watch {
            args.push("watch".to_string());
            args.push("--non-interactive".to_string());
        }
        args.push("build".to_string());
        args.push(self.project_file.clone());
        args.push("--configuration".to_string());
        args.push(self.configuration.to_string());
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Cloneable handle that asks the waiter task to kill the child
#[derive(Debug, Clone)]
pub struct ProcessKiller(Arc<Mutex<Option<oneshot::Sender<()>>>>);

impl ProcessKiller {
    /// Request termination
    ///
    /// Returns `false` when the process already exited or kill was
    /// requested before.
    pub fn kill(&self) -> bool {
        match self.0.lock().take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// A running toolchain process and its event stream
#[derive(Debug)]
pub struct SupervisedProcess {
    pid: Option<u32>,
    events: mpsc::Receiver<ProcessEvent>,
    killer: ProcessKiller,
}

impl SupervisedProcess {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn killer(&self) -> ProcessKiller {
        self.killer.clone()
    }

    pub fn kill(&self) -> bool {
        self.killer.kill()
    }

    /// Next event, `None` once the terminal event has been consumed
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        self.events.recv().await
    }

    /// Drain the process to completion, handing every output line to `on_line`
    pub async fn wait<F>(mut self, mut on_line: F) -> Result<Option<i32>>
    where
        F: FnMut(OutputStream, &str),
    {
        while let Some(event) = self.events.recv().await {
            match event {
                ProcessEvent::Stdout(line) => on_line(OutputStream::Stdout, &line),
                ProcessEvent::Stderr(line) => on_line(OutputStream::Stderr, &line),
                ProcessEvent::Exited(code) => return Ok(code),
                ProcessEvent::Failed(message) => {
                    return Err(DotnetWasmError::process_failed(message));
                }
            }
        }
        Err(DotnetWasmError::process_failed(
            "event stream closed before the process exited",
        ))
    }
}

/// Spawn the toolchain described by `request`
///
/// Must be called inside a tokio runtime. The caller must keep draining
/// events through [`SupervisedProcess::next_event`] or
/// [`SupervisedProcess::wait`]: once the channel holds its capacity of
/// lines the readers stop and the child blocks on a full pipe. Dropping
/// the [`SupervisedProcess`] releases the readers.
pub fn start(request: &BuildRequest) -> Result<SupervisedProcess> {
    let args = request.args();
    debug!(
        "[dotnet-wasm] spawning {} {} in {}",
        request.toolchain,
        args.join(" "),
        request.working_dir.display()
    );

    let mut child = Command::new(&request.toolchain)
        .args(&args)
        .current_dir(&request.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DotnetWasmError::spawn_failed(&request.toolchain, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| DotnetWasmError::missing_pipe("stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| DotnetWasmError::missing_pipe("stderr"))?;

    let pid = child.id();
    let (tx, events) = mpsc::channel(EVENT_CAPACITY);
    let (kill_tx, kill_rx) = oneshot::channel();

    let stdout_task = tokio::spawn(pump_lines(stdout, OutputStream::Stdout, tx.clone()));
    let stderr_task = tokio::spawn(pump_lines(stderr, OutputStream::Stderr, tx.clone()));
    tokio::spawn(watch_child(child, kill_rx, [stdout_task, stderr_task], tx));

    Ok(SupervisedProcess {
        pid,
        events,
        killer: ProcessKiller(Arc::new(Mutex::new(Some(kill_tx)))),
    })
}

async fn pump_lines<R>(reader: R, stream: OutputStream, tx: mpsc::Sender<ProcessEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                let event = match stream {
                    OutputStream::Stdout => ProcessEvent::Stdout(line),
                    OutputStream::Stderr => ProcessEvent::Stderr(line),
                };
                // Waits while the channel is full; fails only once the receiver is gone
                let _ = tx.send(event).await;
            }
        }
    }
}

async fn watch_child(
    mut child: tokio::process::Child,
    mut kill_rx: oneshot::Receiver<()>,
    mut readers: [JoinHandle<()>; 2],
    tx: mpsc::Sender<ProcessEvent>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        Ok(()) = &mut kill_rx => {
            debug!("[dotnet-wasm] killing pid {:?}", child.id());
            if let Err(e) = child.start_kill() {
                debug!("[dotnet-wasm] kill failed: {}", e);
            }
            child.wait().await
        }
    };
    drop(kill_rx);

    let drain = async {
        for reader in readers.iter_mut() {
            let _ = reader.await;
        }
    };
    if tokio::time::timeout(READER_DRAIN, drain).await.is_err() {
        for reader in &readers {
            reader.abort();
        }
    }

    let event = match status {
        Ok(status) => ProcessEvent::Exited(status.code()),
        Err(e) => ProcessEvent::Failed(e.to_string()),
    };
    let _ = tx.send(event).await;
}

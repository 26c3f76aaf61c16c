//! Dev-server bridge against a fake `dotnet watch`.

#![cfg(unix)]

mod common;

use common::{RecordingHost, fake_toolchain, process_alive, project_file, wait_until};
use fob_plugin_dotnet_wasm::{
    BuildConfiguration, BuildRequest, DevServerBridge, DevServerHost, OutputStream,
    ProjectReference,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(10);

fn watch_request(dir: &Path, script: &str) -> BuildRequest {
    let toolchain = fake_toolchain(dir, script);
    let project = ProjectReference::new(project_file(dir)).unwrap();
    BuildRequest::new(
        toolchain.display().to_string(),
        &project,
        BuildConfiguration::Debug,
    )
    .with_watch(true)
}

#[tokio::test]
async fn test_attach_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let request = watch_request(temp.path(), "exec sleep 30");
    let bridge = DevServerBridge::new();
    let host = Arc::new(RecordingHost::default());

    assert!(bridge.attach(&request, host.clone()).unwrap());
    let pid = bridge.pid();
    assert!(pid.is_some());

    assert!(!bridge.attach(&request, host.clone()).unwrap());
    assert_eq!(bridge.pid(), pid);

    assert!(bridge.shutdown());
}

#[tokio::test]
async fn test_one_reload_per_readiness_marker() {
    let temp = TempDir::new().unwrap();
    let script = r#"
echo "dotnet watch: building"
echo "watch : Waiting for a file to change before restarting dotnet..." >&2
echo "watch : Waiting for a file to change before restarting / Waiting for a file to change before restarting" >&2
echo "warning CS0168: unused variable" >&2
exec sleep 30
"#;
    let request = watch_request(temp.path(), script);
    let bridge = DevServerBridge::new();
    let host = Arc::new(RecordingHost::default());

    bridge.attach(&request, host.clone()).unwrap();

    assert!(wait_until(WAIT, || host.reloads() == 3).await);
    assert!(
        wait_until(WAIT, || host
            .lines()
            .iter()
            .any(|(_, line)| line.contains("CS0168")))
        .await
    );

    let lines = host.lines();
    assert!(lines.contains(&(OutputStream::Stdout, "dotnet watch: building".to_string())));
    assert_eq!(
        lines.iter().filter(|(s, _)| *s == OutputStream::Stderr).count(),
        3
    );
    assert_eq!(host.reloads(), 3);

    bridge.shutdown();
}

#[tokio::test]
async fn test_watch_receives_watch_arguments() {
    let temp = TempDir::new().unwrap();
    let request = watch_request(temp.path(), r#"echo "$@" > args.txt; exec sleep 30"#);
    let bridge = DevServerBridge::new();

    bridge
        .attach(&request, Arc::new(RecordingHost::default()))
        .unwrap();

    let args_file = temp.path().join("App/args.txt");
    assert!(wait_until(WAIT, || args_file.exists()).await);
    assert!(
        wait_until(WAIT, || std::fs::read_to_string(&args_file)
            .is_ok_and(|s| s.contains("--configuration Debug")))
        .await
    );
    let args = std::fs::read_to_string(&args_file).unwrap();
    assert_eq!(
        args.trim(),
        "watch --non-interactive build App.csproj --configuration Debug"
    );

    bridge.shutdown();
}

#[tokio::test]
async fn test_shutdown_kills_and_clears_handle() {
    let temp = TempDir::new().unwrap();
    let request = watch_request(temp.path(), "exec sleep 30");
    let bridge = DevServerBridge::new();

    bridge
        .attach(&request, Arc::new(RecordingHost::default()))
        .unwrap();
    let pid = bridge.pid().unwrap();
    assert!(process_alive(pid));

    assert!(bridge.shutdown());
    assert!(!bridge.is_supervising());
    assert_eq!(bridge.pid(), None);
    assert!(wait_until(WAIT, || !process_alive(pid)).await);

    // Second shutdown has nothing to do
    assert!(!bridge.shutdown());
}

#[tokio::test]
async fn test_exit_clears_handle_and_allows_reattach() {
    let temp = TempDir::new().unwrap();
    let request = watch_request(temp.path(), "echo bye; exit 0");
    let bridge = DevServerBridge::new();
    let host = Arc::new(RecordingHost::default());

    assert!(bridge.attach(&request, host.clone()).unwrap());
    assert!(wait_until(WAIT, || !bridge.is_supervising()).await);
    assert!(host.lines().contains(&(OutputStream::Stdout, "bye".to_string())));

    assert!(bridge.attach(&request, host).unwrap());
    bridge.shutdown();
}

#[tokio::test]
async fn test_missing_toolchain_leaves_bridge_idle() {
    let temp = TempDir::new().unwrap();
    let project = ProjectReference::new(project_file(temp.path())).unwrap();
    let request = BuildRequest::new(
        temp.path().join("no-such-dotnet").display().to_string(),
        &project,
        BuildConfiguration::Release,
    )
    .with_watch(true);
    let bridge = DevServerBridge::new();
    let host: Arc<dyn DevServerHost> = Arc::new(RecordingHost::default());

    assert!(bridge.attach(&request, host).is_err());
    assert!(!bridge.is_supervising());
}

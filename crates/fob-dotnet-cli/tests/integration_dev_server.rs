//! Integration tests for the development server.
//!
//! Tests verify file serving, the `_framework` alias, SSE reloads and the
//! `dotnet watch` bridge wired to the server state.

mod common;

use common::{dotnet_project, http_get, read_until_contains, wait_until};
use fob_dotnet_cli::dev::{DevServerState, SharedState, server};
use fob_plugin_dotnet_wasm::{DevServerHost, default_framework_alias};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::Duration;

fn web_state(dir: &Path) -> SharedState {
    let (_, web_root) = dotnet_project(dir);
    let root = dir.join("web");
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(
        root.join("index.html"),
        "<html><body><script type=\"module\" src=\"/src/main.js\"></script></body></html>",
    )
    .unwrap();
    fs::write(root.join("src/main.js"), "import('./_framework/dotnet.js');").unwrap();
    fs::write(dir.join("outside.txt"), "private").unwrap();

    Arc::new(DevServerState::new(
        root.clone(),
        default_framework_alias(&web_root),
        vec![root, web_root.join("_framework")],
    ))
}

async fn start(state: SharedState) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server::serve(listener, state, async {
        let _ = rx.await;
    }));
    (addr, tx)
}

#[tokio::test]
async fn test_index_gets_reload_client() {
    let temp = TempDir::new().unwrap();
    let (addr, _shutdown) = start(web_state(temp.path())).await;

    let response = http_get(addr, "/").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("text/html"));
    assert!(response.contains(r#"<script src="/__fob_reload__.js"></script>"#));

    let script = http_get(addr, "/__fob_reload__.js").await;
    assert!(script.starts_with("HTTP/1.1 200"));
    assert!(script.contains("full-reload"));
}

#[tokio::test]
async fn test_framework_served_from_wwwroot() {
    let temp = TempDir::new().unwrap();
    let (addr, _shutdown) = start(web_state(temp.path())).await;

    let response = http_get(addr, "/_framework/dotnet.js").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("application/javascript"));
    assert!(response.ends_with("export const dotnet = {};"));

    let wasm = http_get(addr, "/_framework/App.wasm").await;
    assert!(wasm.contains("application/wasm"));
}

#[tokio::test]
async fn test_not_found_and_forbidden() {
    let temp = TempDir::new().unwrap();
    let (addr, _shutdown) = start(web_state(temp.path())).await;

    assert!(http_get(addr, "/missing.js").await.starts_with("HTTP/1.1 404"));
    assert!(
        http_get(addr, "/../outside.txt")
            .await
            .starts_with("HTTP/1.1 403")
    );
}

#[tokio::test]
async fn test_sse_receives_full_reload() {
    let temp = TempDir::new().unwrap();
    let state = web_state(temp.path());
    let (addr, _shutdown) = start(Arc::clone(&state)).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(format!("GET /__fob_sse__ HTTP/1.1\r\nHost: {addr}\r\n\r\n").as_bytes())
        .await
        .unwrap();

    let greeting = read_until_contains(&mut stream, "client-connected").await;
    assert!(greeting.contains("text/event-stream"));
    assert_eq!(state.client_count(), 1);

    state.full_reload().await;
    read_until_contains(&mut stream, r#"{"type":"full-reload"}"#).await;
    assert_eq!(state.reload_count(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_dotnet_watch_drives_reloads() {
    use fob_plugin_dotnet_wasm::{
        DotnetWasmContext, DotnetWasmOptions, HostCommand, HostConfig, READY_MARKER,
    };

    let temp = TempDir::new().unwrap();
    let state = web_state(temp.path());
    let (project, web_root) = dotnet_project(temp.path());

    let script = common::fake_toolchain(
        temp.path(),
        &format!(
            r#"case "$1" in
  msbuild) echo "wwwroot path: {web_root}" ;;
  watch)
    echo "watch : {READY_MARKER}" >&2
    sleep 0.2
    echo "watch : {READY_MARKER}" >&2
    sleep 30
    ;;
esac"#,
            web_root = web_root.display()
        ),
    );

    let options = DotnetWasmOptions::new(&project).with_toolchain(script.to_string_lossy());
    let context = DotnetWasmContext::new(options).unwrap();
    let host = HostConfig::new(temp.path().join("web"), HostCommand::Serve);
    let patch = context.config(&host).unwrap();
    context.config_resolved(host.resolve(patch));
    assert!(context.watch_enabled());

    assert!(context.configure_server(state.clone()).unwrap());
    assert!(wait_until(Duration::from_secs(5), || state.reload_count() == 2).await);

    assert!(context.close_server());
    assert!(!context.bridge().is_supervising());
}

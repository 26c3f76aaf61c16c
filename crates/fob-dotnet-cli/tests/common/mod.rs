//! Shared fixtures for the CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Write an executable `/bin/sh` script standing in for `dotnet`
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

/// `<dir>/App/App.csproj` plus a `wwwroot/_framework` with two files
pub fn dotnet_project(dir: &Path) -> (PathBuf, PathBuf) {
    let project_dir = dir.join("App");
    let web_root = project_dir.join("wwwroot");
    fs::create_dir_all(web_root.join("_framework")).unwrap();
    fs::write(web_root.join("_framework/dotnet.js"), "export const dotnet = {};").unwrap();
    fs::write(web_root.join("_framework/App.wasm"), [0u8, 97, 115, 109]).unwrap();

    let project = project_dir.join("App.csproj");
    fs::write(&project, "<Project Sdk=\"Microsoft.NET.Sdk.WebAssembly\" />").unwrap();
    (project, web_root)
}

/// Send a bare HTTP/1.1 GET and return the raw response text
pub async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("response within timeout")
        .unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

/// Read from `stream` until the accumulated text contains `needle`
pub async fn read_until_contains(stream: &mut TcpStream, needle: &str) -> String {
    let mut seen = Vec::new();
    let mut buf = [0u8; 1024];
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);

    loop {
        let text = String::from_utf8_lossy(&seen).into_owned();
        if text.contains(needle) {
            return text;
        }
        let read = tokio::time::timeout_at(deadline, stream.read(&mut buf))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}, got {text:?}"))
            .unwrap();
        assert!(read > 0, "stream closed before {needle:?} arrived");
        seen.extend_from_slice(&buf[..read]);
    }
}

/// Poll `check` every 20ms until it holds or `timeout` passes
pub async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

//! Shared state for the development server.
//!
//! Holds the SSE client registry and the file-serving rules taken from the
//! resolved host configuration. It is also the [`DevServerHost`] the plugin's
//! bridge talks to, so reloads and toolchain output flow through here.

use crate::dev::DevEvent;
use async_trait::async_trait;
use fob_plugin_dotnet_wasm::{
    DevServerHost, FrameworkAliasMap, OutputStream, ResolvedHostConfig,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// Client connection tracker for Server-Sent Events.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

/// Outcome of mapping a request path onto the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    File(PathBuf),
    Forbidden,
    NotFound,
}

/// Shared development server state.
pub struct DevServerState {
    /// Connected SSE clients
    pub clients: ClientRegistry,

    next_client_id: AtomicUsize,
    reloads: AtomicU64,

    /// Directory served at `/`
    root: PathBuf,

    /// Import aliases, also served under their URL prefix
    alias: FrameworkAliasMap,

    /// Directories files may be served from
    fs_allow: Vec<PathBuf>,
}

impl DevServerState {
    pub fn new(root: PathBuf, alias: FrameworkAliasMap, fs_allow: Vec<PathBuf>) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: AtomicUsize::new(0),
            reloads: AtomicU64::new(0),
            root,
            alias,
            fs_allow,
        }
    }

    /// State for a host configuration resolved through the plugin
    pub fn from_resolved(config: &ResolvedHostConfig) -> Self {
        Self::new(
            config.root.clone(),
            config.alias.clone(),
            config.fs_allow.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a new SSE client.
    ///
    /// # Returns
    ///
    /// Client ID and receiver for events
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(100);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    /// Unregister an SSE client.
    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Send an event to every connected client.
    ///
    /// Clients whose stream has closed are dropped from the registry. A
    /// client with a full queue misses the event rather than stalling the
    /// sender.
    pub fn broadcast(&self, event: &DevEvent) {
        let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
        let clients = self.clients.read().clone();

        let mut closed = Vec::new();
        for (id, tx) in clients {
            match tx.try_send(json.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => debug!("SSE client {} lagging, event dropped", id),
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        for id in closed {
            self.unregister_client(id);
        }
    }

    /// Get number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Number of full reloads requested so far
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    /// Map a URL path to a file under the root or an alias target
    pub fn lookup(&self, url_path: &str) -> Lookup {
        let relative = url_path.trim_start_matches('/');
        if Path::new(relative)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Lookup::Forbidden;
        }

        let mut candidate = self
            .alias_target(url_path)
            .unwrap_or_else(|| self.root.join(relative));
        if candidate.is_dir() {
            candidate = candidate.join("index.html");
        }

        if !candidate.is_file() {
            return Lookup::NotFound;
        }
        if !self.is_allowed(&candidate) {
            return Lookup::Forbidden;
        }
        Lookup::File(candidate)
    }

    fn alias_target(&self, url_path: &str) -> Option<PathBuf> {
        self.alias.iter().find_map(|(key, target)| {
            let rest = url_path.strip_prefix(url_prefix(key).as_str())?;
            if rest.is_empty() {
                Some(target.clone())
            } else {
                rest.strip_prefix('/').map(|rest| target.join(rest))
            }
        })
    }

    fn is_allowed(&self, file: &Path) -> bool {
        let Ok(file) = file.canonicalize() else {
            return false;
        };
        self.fs_allow.iter().any(|dir| {
            dir.canonicalize()
                .map(|dir| file.starts_with(dir))
                .unwrap_or(false)
        })
    }
}

/// `./_framework` → `/_framework`
fn url_prefix(alias_key: &str) -> String {
    let trimmed = alias_key.trim_start_matches('.').trim_start_matches('/');
    format!("/{}", trimmed)
}

#[async_trait]
impl DevServerHost for DevServerState {
    async fn full_reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
        self.broadcast(&DevEvent::FullReload);
    }

    fn forward_output(&self, stream: OutputStream, line: &str) {
        crate::ui::dotnet_output(stream, line);
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;

#[cfg(test)]
mod tests {
    use super::*;
    use fob_plugin_dotnet_wasm::default_framework_alias;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, DevServerState) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("web");
        let web_root = temp.path().join("App/wwwroot");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(web_root.join("_framework")).unwrap();
        fs::write(root.join("index.html"), "<html><body></body></html>").unwrap();
        fs::write(root.join("src/main.js"), "import './_framework/dotnet.js'").unwrap();
        fs::write(web_root.join("_framework/dotnet.js"), "export {}").unwrap();
        fs::write(web_root.join("secret.txt"), "nope").unwrap();

        let state = DevServerState::new(
            root.clone(),
            default_framework_alias(&web_root),
            vec![root, web_root.join("_framework")],
        );
        (temp, state)
    }

    #[test]
    fn test_lookup_root_files() {
        let (_temp, state) = fixture();
        assert!(matches!(state.lookup("/"), Lookup::File(p) if p.ends_with("index.html")));
        assert!(matches!(state.lookup("/src/main.js"), Lookup::File(_)));
        assert_eq!(state.lookup("/missing.js"), Lookup::NotFound);
    }

    #[test]
    fn test_lookup_framework_alias() {
        let (_temp, state) = fixture();
        let Lookup::File(path) = state.lookup("/_framework/dotnet.js") else {
            panic!("framework file should be served");
        };
        assert!(path.ends_with("App/wwwroot/_framework/dotnet.js"));
    }

    #[test]
    fn test_lookup_rejects_parent_segments() {
        let (_temp, state) = fixture();
        assert_eq!(state.lookup("/../App/wwwroot/secret.txt"), Lookup::Forbidden);
        assert_eq!(state.lookup("/_framework/../secret.txt"), Lookup::Forbidden);
    }

    #[test]
    fn test_lookup_outside_allow_list() {
        let (temp, _) = fixture();
        let root = temp.path().join("web");
        let state = DevServerState::new(
            root,
            FrameworkAliasMap::new(),
            vec![temp.path().join("elsewhere")],
        );
        assert_eq!(state.lookup("/index.html"), Lookup::Forbidden);
    }

    #[test]
    fn test_url_prefix() {
        assert_eq!(url_prefix("./_framework"), "/_framework");
        assert_eq!(url_prefix("/_content"), "/_content");
        assert_eq!(url_prefix("dotnet"), "/dotnet");
    }

    #[tokio::test]
    async fn test_client_registration() {
        let state = DevServerState::new(PathBuf::from("."), FrameworkAliasMap::new(), vec![]);

        let (id1, _rx1) = state.register_client();
        let (id2, _rx2) = state.register_client();

        assert_eq!(state.client_count(), 2);
        assert_ne!(id1, id2);

        state.unregister_client(id1);
        assert_eq!(state.client_count(), 1);
    }

    #[tokio::test]
    async fn test_full_reload_reaches_clients() {
        let state = DevServerState::new(PathBuf::from("."), FrameworkAliasMap::new(), vec![]);
        let (_id, mut rx) = state.register_client();
        let (_gone, gone_rx) = state.register_client();
        drop(gone_rx);

        state.full_reload().await;

        assert_eq!(rx.recv().await.unwrap(), r#"{"type":"full-reload"}"#);
        assert_eq!(state.reload_count(), 1);
        assert_eq!(state.client_count(), 1);
    }
}

//! Development server module.
//!
//! Serves the project root next to a running `dotnet watch`:
//! - Full page reload via Server-Sent Events after every .NET rebuild
//! - `_framework` requests answered from the resolved wwwroot
//! - File access limited to the allow-list computed by the plugin

pub mod config;
pub mod server;
pub mod state;

pub use config::DevConfig;
pub use server::DevServer;
pub use state::{DevServerState, Lookup, SharedState};

use serde::{Deserialize, Serialize};

/// Events pushed to connected browsers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DevEvent {
    /// Client connected
    ClientConnected { id: usize },

    /// Reload the whole page
    FullReload,
}

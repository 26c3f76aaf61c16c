//! Workspace root detection for the dev-server file allow-list

use std::fs;
use std::path::{Path, PathBuf};

const WORKSPACE_MARKERS: [&str; 2] = ["pnpm-workspace.yaml", "lerna.json"];

fn has_workspaces_field(package_json: &Path) -> bool {
    fs::read_to_string(package_json)
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .is_some_and(|value| value.get("workspaces").is_some())
}

/// Nearest ancestor holding a `package.json`, or `current` itself
pub fn search_for_package_root(current: &Path) -> PathBuf {
    current
        .ancestors()
        .find(|dir| dir.join("package.json").is_file())
        .unwrap_or(current)
        .to_path_buf()
}

/// Nearest ancestor that looks like a JS monorepo root
///
/// Falls back to [`search_for_package_root`].
pub fn search_for_workspace_root(current: &Path) -> PathBuf {
    for dir in current.ancestors() {
        if WORKSPACE_MARKERS.iter().any(|m| dir.join(m).is_file()) {
            return dir.to_path_buf();
        }
        let package_json = dir.join("package.json");
        if package_json.is_file() && has_workspaces_field(&package_json) {
            return dir.to_path_buf();
        }
    }
    search_for_package_root(current)
}

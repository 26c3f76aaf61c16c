use std::path::PathBuf;

use fob_plugin_dotnet_wasm::DEFAULT_TOOLCHAIN;

pub fn default_toolchain() -> String {
    DEFAULT_TOOLCHAIN.to_string()
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

//! Development server configuration.

use crate::config::DotnetConfig;
use crate::error::{ConfigError, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Development server configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Server socket address (IP + port)
    pub addr: SocketAddr,

    /// Open browser automatically on start
    pub open: bool,
}

impl DevConfig {
    /// Build the server settings from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the host is not an IP address or no port near the
    /// requested one is free
    pub fn from_config(config: &DotnetConfig, open: bool) -> Result<Self> {
        let ip = parse_host(&config.host)?;
        let addr = Self::find_available_port(ip, config.port)?;
        Ok(Self { addr, open })
    }

    /// Find an available port starting from the requested port.
    ///
    /// Tries the requested port first, then incrementally searches
    /// for the next available port (up to +10 from original).
    pub fn find_available_port(ip: IpAddr, requested_port: u16) -> Result<SocketAddr> {
        use std::net::TcpListener;

        if requested_port < 1024 {
            crate::ui::warning(&format!(
                "Port {} is in privileged range, may require root access",
                requested_port
            ));
        }

        let addr = SocketAddr::new(ip, requested_port);
        if TcpListener::bind(addr).is_ok() {
            return Ok(addr);
        }

        for offset in 1..=10 {
            let port = requested_port.saturating_add(offset);
            let addr = SocketAddr::new(ip, port);
            if TcpListener::bind(addr).is_ok() {
                crate::ui::warning(&format!(
                    "Port {} is busy, using port {} instead",
                    requested_port, port
                ));
                return Ok(addr);
            }
        }

        Err(ConfigError::InvalidValue {
            field: "port".to_string(),
            value: requested_port.to_string(),
            hint: format!(
                "Ports {}-{} are all in use. Try a different port range.",
                requested_port,
                requested_port.saturating_add(10)
            ),
        }
        .into())
    }

    /// Get the server URL as a string.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

fn parse_host(host: &str) -> Result<IpAddr> {
    if host == "localhost" {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    host.parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: "host".to_string(),
            value: host.to_string(),
            hint: "Use an IP address such as 127.0.0.1 or 0.0.0.0".to_string(),
        }
        .into()
    })
}

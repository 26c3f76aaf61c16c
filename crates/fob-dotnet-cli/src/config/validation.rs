use crate::config::DotnetConfig;
use crate::error::{ConfigError, Result};

impl DotnetConfig {
    /// Validate settings shared by every command.
    pub fn validate(&self) -> Result<()> {
        match &self.project_path {
            None => {
                return Err(ConfigError::MissingField {
                    field: "projectPath".to_string(),
                    hint: "Pass --project <path/to/App.csproj> or set projectPath".to_string(),
                }
                .into());
            }
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::InvalidValue {
                    field: "projectPath".to_string(),
                    value: path.display().to_string(),
                    hint: "Point projectPath at a .csproj/.fsproj file".to_string(),
                }
                .into());
            }
            Some(_) => {}
        }

        if self.toolchain.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "toolchain".to_string(),
                value: self.toolchain.clone(),
                hint: "Use 'dotnet' or a path to the dotnet executable".to_string(),
            }
            .into());
        }

        for pattern in &self.external {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigError::InvalidValue {
                    field: "external".to_string(),
                    value: pattern.clone(),
                    hint: format!("Not a valid regular expression: {}", e),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Validate settings the dev server needs.
    pub fn validate_for_dev(&self) -> Result<()> {
        self.validate()?;

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Use a port between 1 and 65535".to_string(),
            }
            .into());
        }

        if self.host.parse::<std::net::IpAddr>().is_err() && self.host != "localhost" {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: "Use an IP address such as 127.0.0.1 or 0.0.0.0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Validate settings the production build needs.
    pub fn validate_for_build(&self) -> Result<()> {
        self.validate()?;

        if self.entry.is_none() {
            return Err(ConfigError::MissingField {
                field: "entry".to_string(),
                hint: "Pass the JavaScript entry (fob-dotnet build src/main.js) or set entry"
                    .to_string(),
            }
            .into());
        }

        if self.assets_dir.is_absolute() {
            return Err(ConfigError::InvalidValue {
                field: "assetsDir".to_string(),
                value: self.assets_dir.display().to_string(),
                hint: "assetsDir is relative to outDir".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

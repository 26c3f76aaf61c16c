//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError};
use miette::Report;

/// Convert CliError to miette Report
///
/// Plugin errors already carry a diagnostic code and help text, so they
/// are reported as-is.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Plugin(e) => Report::new(e),
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Bundler(message) => miette::miette!(
            "Bundler error:\n{}\n\nHint: Run with --verbose for the full plugin output",
            message
        ),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fob_plugin_dotnet_wasm::DotnetWasmError;

    #[test]
    fn test_plugin_error_keeps_diagnostic_code() {
        let report = cli_error_to_miette(CliError::Plugin(DotnetWasmError::build_failed(Some(1))));
        let code = report.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("fob::dotnet::build_failed"));
    }

    #[test]
    fn test_bundler_error_hint() {
        let report = build_error_to_miette(BuildError::Bundler("boom".to_string()));
        assert!(report.to_string().contains("--verbose"));
    }
}

//! Value parsers for command-line arguments.

use std::path::PathBuf;

/// Parse a project file path.
///
/// The path must name a file, e.g. `../App/App.csproj`. Whether it exists
/// is left to the toolchain.
pub fn parse_project_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.file_name().is_none() {
        return Err(format!("Project path must point to a project file: '{}'", s));
    }
    Ok(path)
}

/// Parse an externalization pattern.
///
/// Patterns are regular expressions matched against import specifiers.
pub fn parse_external_pattern(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("External pattern cannot be empty".to_string());
    }
    regex::Regex::new(s)
        .map(|_| s.to_string())
        .map_err(|e| format!("Invalid external pattern '{}': {}", s, e))
}

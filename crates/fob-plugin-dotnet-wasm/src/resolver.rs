//! wwwroot discovery through MSBuild introspection
//!
//! The project is evaluated with a small targets file injected through
//! `CustomAfterMicrosoftCommonTargets`. Its `PrintWwwroot` target prints
//! a single `wwwroot path: <dir>` line that is picked out of the
//! combined stdout/stderr stream.

use crate::config::BuildConfiguration;
use crate::error::{DotnetWasmError, Result};
use crate::project::ProjectReference;
use path_clean::PathClean;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tracing::debug;

/// Targets file shipped with the crate
pub const DUMP_TARGETS: &str = include_str!("../resources/DumpInfo.targets");

/// Target invoked in introspection mode
pub const PRINT_TARGET: &str = "PrintWwwroot";

const OUTPUT_TAIL_LINES: usize = 20;

static WWWROOT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wwwroot path:\s*(.+)").expect("wwwroot regex is valid"));

/// Write the bundled targets file to `$TMPDIR/fob-dotnet-wasm/DumpInfo.targets`
pub fn materialize_targets_file() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join("fob-dotnet-wasm");
    let path = dir.join("DumpInfo.targets");

    std::fs::create_dir_all(&dir).map_err(|e| DotnetWasmError::targets_file(&dir, e))?;

    // Skip the write when an identical copy is already there
    if std::fs::read_to_string(&path).is_ok_and(|existing| existing == DUMP_TARGETS) {
        return Ok(path);
    }

    std::fs::write(&path, DUMP_TARGETS).map_err(|e| DotnetWasmError::targets_file(&path, e))?;
    Ok(path)
}

/// Arguments for the introspection run (program name excluded)
pub fn introspection_args(
    project_path: &Path,
    configuration: BuildConfiguration,
    targets_file: &Path,
) -> Vec<String> {
    vec![
        "msbuild".to_string(),
        project_path.display().to_string(),
        format!("-property:Configuration={}", configuration),
        format!(
            "-property:CustomAfterMicrosoftCommonTargets={}",
            targets_file.display()
        ),
        format!("-t:{}", PRINT_TARGET),
        "-v:d".to_string(),
    ]
}

/// Extract the wwwroot directory from introspection output
///
/// Relative captures are joined onto `project_dir` and lexically cleaned.
pub fn parse_web_root(output: &str, project_dir: &Path) -> Option<PathBuf> {
    let captures = WWWROOT_LINE.captures(output)?;
    let raw = captures.get(1)?.as_str().trim_end();
    if raw.is_empty() {
        return None;
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(project_dir.join(path).clean())
    }
}

/// Run `<toolchain> msbuild` against the project and return its wwwroot
///
/// Blocks until the toolchain exits. `targets_file` overrides the bundled
/// targets file.
pub fn resolve_web_root(
    toolchain: &str,
    project: &ProjectReference,
    configuration: BuildConfiguration,
    targets_file: Option<&Path>,
) -> Result<PathBuf> {
    let targets = match targets_file {
        Some(path) => path.to_path_buf(),
        None => materialize_targets_file()?,
    };

    let args = introspection_args(&project.path, configuration, &targets);
    debug!("[dotnet-wasm] resolving wwwroot: {} {}", toolchain, args.join(" "));

    let output = Command::new(toolchain)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| DotnetWasmError::resolution_spawn(toolchain, e))?;

    let combined = combine_output(&output.stdout, &output.stderr);

    match parse_web_root(&combined, &project.directory) {
        Some(web_root) => {
            debug!("[dotnet-wasm] wwwroot resolved to {}", web_root.display());
            Ok(web_root)
        }
        None => Err(DotnetWasmError::wwwroot_not_found(output_tail(&combined))),
    }
}

/// Both streams, stdout first, with a line break between them
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    if !combined.is_empty() && !combined.ends_with('\n') {
        combined.push('\n');
    }
    combined.push_str(&String::from_utf8_lossy(stderr));
    combined
}

fn output_tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}

//! Formatting utilities for sizes, durations, and command summaries.

use console::Term;
use fob_plugin_dotnet_wasm::IntegrationReport;
use owo_colors::OwoColorize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Format file size in human-readable format.
///
/// ```
/// use fob_dotnet_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use fob_dotnet_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn rule_width() -> usize {
    (Term::stderr().size().1 as usize).min(80)
}

/// Print the bundle outputs and the `_framework` copy result to stderr.
///
/// `outputs` holds (file name, size in bytes) pairs.
pub fn print_build_summary(
    outputs: &[(String, u64)],
    framework: Option<&IntegrationReport>,
    elapsed: Duration,
) {
    let width = rule_width();

    eprintln!("\n{}", "Build Summary".bold().underline());
    eprintln!("{}", "─".repeat(width));

    for (name, size) in outputs {
        eprintln!(
            "  {} {} {}",
            "▸".blue(),
            name.bright_white().bold(),
            format_size(*size).dimmed()
        );
    }

    if let Some(report) = framework {
        eprintln!(
            "  {} {} {}",
            "▸".magenta(),
            "_framework/".bright_white().bold(),
            format!(
                "({} files → {})",
                report.files_copied,
                report.destination.display()
            )
            .dimmed()
        );
    }

    eprintln!("{}", "─".repeat(width));

    let total_size: u64 = outputs.iter().map(|(_, s)| s).sum();
    eprintln!(
        "  {} {} in {}",
        "Total:".bold(),
        format_size(total_size).green(),
        format_duration(elapsed).green()
    );
}

/// Print the dev server banner to stderr.
pub fn print_dev_banner(addr: SocketAddr, root: &Path, web_root: Option<&Path>) {
    eprintln!();
    eprintln!(
        "  {} {}",
        "fob-dotnet dev".bold(),
        format!("http://{}", addr).cyan().underline()
    );
    eprintln!("  {} {}", "root:".dimmed(), root.display());
    match web_root {
        Some(web_root) => eprintln!("  {} {}", "wwwroot:".dimmed(), web_root.display()),
        None => eprintln!("  {} {}", "wwwroot:".dimmed(), "not resolved".yellow()),
    }
    eprintln!();
}

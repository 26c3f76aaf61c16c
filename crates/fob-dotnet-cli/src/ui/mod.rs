//! Terminal output for the fob-dotnet CLI.
//!
//! Status lines, the dev-server banner, forwarded `dotnet` output and the
//! build summary all go through here so that color handling stays in one
//! place.
//!
//! # Examples
//!
//! ```no_run
//! use fob_dotnet_cli::ui;
//!
//! ui::init_colors();
//! ui::success("Build successful");
//! ui::error("Failed to parse file");
//! ```

mod format;
mod messages;

pub use format::{format_duration, format_size, print_build_summary, print_dev_banner};
pub use messages::{dotnet_output, error, info, success, warning};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "TF_BUILD"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr() && !is_ci()
}

/// Initialize color support based on environment.
///
/// `owo-colors` is switched globally so every helper in this module agrees
/// with the terminal.
pub fn init_colors() {
    owo_colors::set_override(should_use_color());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_is_ci_with_azure_pipelines() {
        unsafe { std::env::set_var("TF_BUILD", "True") };
        assert!(is_ci());
        unsafe { std::env::remove_var("TF_BUILD") };
    }

    #[test]
    #[serial]
    fn test_should_use_color_no_color_overrides_force() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_should_use_color_force_color() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_color());
        unsafe { std::env::remove_var("FORCE_COLOR") };
    }
}

//! Status message functions for terminal output.

use fob_plugin_dotnet_wasm::OutputStream;
use owo_colors::OwoColorize;

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Echo one line of toolchain output with the `[dotnet]` tag
///
/// stdout lines go to stdout and stderr lines to stderr, as the toolchain
/// wrote them.
pub fn dotnet_output(stream: OutputStream, line: &str) {
    let tagged = dotnet_line(stream, line);
    match stream {
        OutputStream::Stdout => println!("{}", tagged),
        OutputStream::Stderr => eprintln!("{}", tagged),
    }
}

fn dotnet_line(stream: OutputStream, line: &str) -> String {
    match stream {
        OutputStream::Stdout => format!("{} {}", "[dotnet]".magenta(), line),
        OutputStream::Stderr => format!("{} {}", "[dotnet]".magenta().bold(), line),
    }
}

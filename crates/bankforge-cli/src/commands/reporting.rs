//! Human-readable rendering shared by the commands.

use bankforge_model::Warning;
use colored::Colorize;

use super::json_output::OutputFile;

/// Print warnings with their codes and locations.
pub(crate) fn print_warnings(stage: &str, warnings: &[Warning]) {
    for warning in warnings {
        let location = match (warning.instrument, warning.line) {
            (Some(id), Some(line)) => format!(" instrument {} line {}", id, line),
            (Some(id), None) => format!(" instrument {}", id),
            (None, Some(line)) => format!(" line {}", line),
            (None, None) => String::new(),
        };
        println!(
            "  {} [{}] {}{}: {}",
            "!".yellow(),
            stage,
            warning.code.code().yellow(),
            location.dimmed(),
            warning.message
        );
    }
}

/// Print a written file with its size and short hash.
pub(crate) fn print_output(label: &str, output: &OutputFile) {
    println!(
        "  {} {} {} ({} bytes, {})",
        "+".green(),
        label,
        output.path,
        output.size,
        output.hash[..16].dimmed()
    );
}

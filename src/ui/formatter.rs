//! Pure formatting functions for UI output.
//!
//! Every run prints a linear trace: one status line when a step starts, then a
//! success or error line. The last status line before an error names the step
//! that failed.

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("\x1b[33m⚠ WARNING:\x1b[0m {}", warning);
}

/// Display the version change a release will make.
///
/// # Arguments
/// * `current` - Version currently in the manifest
/// * `next` - Version being released
pub fn display_version_change(current: &str, next: &str) {
    println!("\n\x1b[1mVersion Change:\x1b[0m");
    println!("  From: \x1b[31m{}\x1b[0m", current);
    println!("  To:   \x1b[32m{}\x1b[0m", next);
}

/// Display release notes, indented, or a placeholder when empty.
pub fn display_release_notes(notes: &str) {
    println!("\n\x1b[1mRelease notes:\x1b[0m");
    if notes.is_empty() {
        println!("  (none)");
        return;
    }
    for line in notes.lines() {
        println!("  {}", line);
    }
}

/// Display the steps a dry run would perform.
pub fn display_plan(steps: &[String]) {
    println!("\n\x1b[1mDry run - planned steps:\x1b[0m");
    for (i, step) in steps.iter().enumerate() {
        println!("  Step {}: {}", i + 1, step);
    }
}

use colored::Colorize;
use declarative::{Diagnostic, Diagnostics, Severity};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print one diagnostic, errors to stderr
pub fn diagnostic(diag: &Diagnostic) {
    let location = match (&diag.address, &diag.attribute) {
        (Some(address), Some(attribute)) => format!(" ({address}: {attribute})"),
        (Some(address), None) => format!(" ({address})"),
        (None, Some(attribute)) => format!(" ({attribute})"),
        (None, None) => String::new(),
    };
    match diag.severity {
        Severity::Error => {
            error(&format!("{}{}", diag.summary.bold(), location.dimmed()));
            if !diag.detail.is_empty() {
                eprintln!("  {}", diag.detail);
            }
        }
        Severity::Warning => {
            warn(&format!("{}{}", diag.summary.bold(), location.dimmed()));
            if !diag.detail.is_empty() {
                println!("  {}", diag.detail);
            }
        }
    }
}

pub fn diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        diagnostic(diag);
    }
}

/// Pluralise a count for summaries
pub fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - per-icon status helpers (`added`, `modified`, `removed`, `unchanged`)
//!   used by the diff display
//! - `success`/`warn` for stage results
//!
//! # Example
//!
//! ```ignore
//! log!("build"; "processing {} icons", count);
//! logger::added("transport_play");
//! logger::warn("npx not found, skipping binary fonts");
//! ```

use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    println!("{prefix} {message}");
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module {
        "error" => prefix.bright_red().bold().to_string(),
        "warning" => prefix.bright_yellow().bold().to_string(),
        _ => prefix.bright_blue().bold().to_string(),
    }
}

// ============================================================================
// Status Lines (per-icon diff markers and stage results)
// ============================================================================

/// Stage success line (`✓` prefix, green).
pub fn success(message: &str) {
    println!("  {} {}", "✓".green(), message);
}

/// Warning line (`⚠` prefix, yellow). Never affects the exit code.
pub fn warn(message: &str) {
    println!("  {} {}", "⚠".yellow(), message);
}

/// Added icon (`+` prefix, green).
pub fn added(name: &str) {
    println!("  {} {}", "+".green(), name.dimmed());
}

/// Modified icon (`~` prefix, yellow).
pub fn modified(name: &str) {
    println!("  {} {}", "~".yellow(), name.dimmed());
}

/// Removed icon (`-` prefix, red).
pub fn removed(name: &str) {
    println!("  {} {}", "-".red(), name.dimmed());
}

/// Unchanged icon (dimmed, no symbol). Only shown in verbose mode.
pub fn unchanged(name: &str) {
    if is_verbose() {
        println!("    {}", name.dimmed());
    }
}

#![deny(missing_docs)]
//! Shared logging utilities for the Orbit workspace.
//!
//! This crate provides the `orbit_*` logging macros used across the codebase,
//! a helper for logging untrusted payloads, and a minimal test initializer for
//! the global logger.

/// Maximum number of characters kept by [`payload_preview`].
pub const PREVIEW_CHARS: usize = 120;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! orbit_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! orbit_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! orbit_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! orbit_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! orbit_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Renders raw bytes as a single-line, length-capped string for log output.
///
/// Invalid UTF-8 is replaced lossily and control characters are escaped so a
/// hostile payload cannot break the log format.
pub fn payload_preview(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::new();
    for (count, c) in text.chars().enumerate() {
        if count == PREVIEW_CHARS {
            out.push_str("...");
            break;
        }
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

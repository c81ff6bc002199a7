#![deny(missing_docs)]
//! Shared logging utilities for the harvester workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a process-wide harvest round counter that prefixes verbose log lines, and a
//! minimal test initializer for the global logger.

use std::sync::atomic::{AtomicU64, Ordering};

/// Round of the harvest loop currently running in this process.
static CURRENT_ROUND: AtomicU64 = AtomicU64::new(0);

/// Sets the harvest round reported by the verbose logging macros.
/// The harvest loop calls this once per round; `0` means "outside a harvest".
pub fn set_round(round: u64) {
    CURRENT_ROUND.store(round, Ordering::Relaxed);
}

/// Retrieves the harvest round last set with [`set_round`].
/// Returns 0 if no harvest is running.
pub fn current_round() -> u64 {
    CURRENT_ROUND.load(Ordering::Relaxed)
}

/// Logs a trace-level message, prefixed with the current harvest round.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("[round {}] {}", $crate::current_round(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message, prefixed with the current harvest round.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("[round {}] {}", $crate::current_round(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
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

#[cfg(test)]
mod tests {
    use super::{current_round, set_round};

    #[test]
    fn round_counter_round_trips() {
        set_round(42);
        assert_eq!(current_round(), 42);
        set_round(0);
        assert_eq!(current_round(), 0);
    }
}

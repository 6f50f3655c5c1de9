//! Message display macros with optional tracing output.
//!
//! In normal runs messages go straight to the terminal. When `TOGGLSYNC_DEBUG`
//! or `RUST_LOG` is set, the same macros emit `tracing` events instead so the
//! progress lines interleave with the HTTP-level debug logs.
//!
//! ## Macro Categories
//!
//! - **`msg_print!`**: plain progress line
//! - **`msg_success!`** / **`msg_info!`** / **`msg_warning!`**: prefixed notices
//! - **`msg_error!`**: errors, written to stderr in normal mode
//! - **`msg_debug!`**: only emitted in debug mode
//!
//! ```rust
//! use togglsync::{msg_print, msg_warning};
//! use togglsync::libs::messages::Message;
//!
//! msg_print!(Message::ProjectCreated("#7 Fix crash".to_string()));
//! msg_warning!(Message::ProjectAmbiguous("7".to_string()));
//! ```

use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Returns `true` when debug output was requested through the environment.
///
/// The result is computed once per process.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("TOGGLSYNC_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

/// Prints a general progress message.
#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("{}", $msg);
        } else {
            println!("{}", $msg);
        }
    };
}

/// Prints a success message with ✅ prefix.
#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("✅ {}", $msg);
        } else {
            println!("✅ {}", $msg);
        }
    };
}

/// Prints an error message with ❌ prefix.
///
/// Normal mode writes to stderr so progress output on stdout stays clean.
#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::error!("❌ {}", $msg);
        } else {
            eprintln!("❌ {}", $msg);
        }
    };
}

/// Prints a warning message with ⚠️ prefix.
#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::warn!("⚠️ {}", $msg);
        } else {
            println!("⚠️ {}", $msg);
        }
    };
}

/// Prints an informational message with ℹ️ prefix.
#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::info!("ℹ️ {}", $msg);
        } else {
            println!("ℹ️ {}", $msg);
        }
    };
}

/// Debug-only message, suppressed entirely in normal mode.
///
/// Accepts either a single expression or a format string with arguments:
///
/// ```rust
/// use togglsync::msg_debug;
///
/// let project_id = 42;
/// msg_debug!(format!("Skipping project {}", project_id));
/// msg_debug!("Skipping project {}", project_id);
/// ```
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
    ($fmt:expr, $($arg:tt)+) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", format!($fmt, $($arg)+));
        }
    };
}

//! Error kinds that decide the process exit code.
//!
//! Everything else travels as a plain `anyhow::Error` and is reported like a
//! domain error.

use super::messages::Message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A credential prompt was needed during a `--headless` run.
    #[error("user interaction required")]
    InteractionRequired,
    /// The service refused the offered credentials.
    #[error("{0}")]
    AuthenticationRejected(String),
    #[error("{0}")]
    Domain(String),
}

impl SyncError {
    pub fn domain(message: Message) -> Self {
        SyncError::Domain(message.to_string())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            SyncError::InteractionRequired => 1,
            SyncError::AuthenticationRejected(_) | SyncError::Domain(_) => 2,
        }
    }
}

/// Maps any error reaching `main` to its exit code.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    error.downcast_ref::<SyncError>().map_or(2, SyncError::exit_code)
}

/// Whether `error` is a credential rejection rather than a transport or
/// server failure.
pub fn is_rejection(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<SyncError>(), Some(SyncError::AuthenticationRejected(_)))
}

/// Text printed to standard output before exiting.
pub fn describe(error: &anyhow::Error) -> String {
    match error.downcast_ref::<SyncError>() {
        Some(SyncError::InteractionRequired) => Message::HeadlessCredentialsInvalid.to_string(),
        _ => format!("{:#}", error),
    }
}

//! # togglsync - Toggl and issue tracker synchronization
//!
//! A command-line tool that keeps Toggl projects aligned with the tickets
//! assigned to you in Shotgun or JIRA, and writes your Toggl time back to the
//! tracker as work logs.
//!
//! ## Features
//!
//! - **Import**: active tickets become Toggl projects named `#123 Title` or
//!   `ABC-123 Title`; renamed tickets are renamed, finished ones archived
//! - **Export**: time entries are summed per day, project and task and
//!   upserted as work logs
//! - **Sessions**: cached tokens, keyring or encrypted-file secrets, and
//!   prompts that fail cleanly under `--headless`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use togglsync::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;

//! Core library modules for togglsync.
//!
//! ## Features
//!
//! - **Infrastructure**: configuration, data storage, secrets, prompts, messages
//! - **Matching**: ticket ids, project naming and the import plan
//! - **Aggregation**: date ranges and per-day work logs for export
//!
//! ## Usage
//!
//! ```rust
//! use togglsync::libs::reconcile::plan;
//! use togglsync::libs::ticket::{NamePattern, TicketId, TrackedItem};
//!
//! let items = vec![TrackedItem::new(TicketId::Number(7), "New ticket")];
//! let plan = plan(&[], &items, &NamePattern::numbered());
//! assert_eq!(plan.to_create().len(), 1);
//! ```

pub mod aggregate;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod formatter;
pub mod messages;
pub mod options;
pub mod period;
pub mod prompt;
pub mod reconcile;
pub mod secret;
pub mod ticket;

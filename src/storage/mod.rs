//! Intake records are kept in a single SQLite table inside the application directory.
//!  - Records are only ever appended, never updated or deleted.
//!  - Timestamps are stored as fixed width UTC text, so range queries can compare them directly.

pub mod entities;
pub mod error;
pub mod intake_store;

//! Periodic reminder to drink water. Every hour a prompt shows up in the terminal, stays for a
//! short countdown and then asks how much was drunk. Amounts are logged into a local SQLite
//! database and today's total is shown with every reminder.
//!

pub mod reminder;
pub mod storage;
pub mod utils;
pub mod view;

//! SQLite persistence for worker and device records.

mod seed;
mod sqlite;

pub use seed::{demo_devices, demo_workers};
pub use sqlite::{DbError, SqliteStore};

//! SongDesk Logs - Daily order spreadsheets
//!
//! One xlsx file per calendar day, a fixed header row written once, then one
//! row per order in arrival order. Storage and time are injected so the log
//! can run against a directory or entirely in memory.

mod clock;
mod error;
mod event;
mod order_log;
mod storage;
pub mod workbook;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{LogError, Result};
pub use event::LogEvent;
pub use order_log::{Appended, LogFile, OrderLog};
pub use storage::{DirStorage, LogStorage, MemoryStorage};

use std::sync::Arc;

/// Order log with type-erased storage and clock, as shared by the server
pub type SharedOrderLog = OrderLog<Arc<dyn LogStorage>, Arc<dyn Clock>>;

/// Order log over a directory on disk, stamped with local time
pub fn dir_order_log(dir: impl Into<std::path::PathBuf>, prefix: impl Into<String>) -> SharedOrderLog {
    let storage: Arc<dyn LogStorage> = Arc::new(DirStorage::new(dir));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    OrderLog::new(storage, clock, prefix)
}

pub mod logger;
pub mod reporter;

pub use logger::{ActivityEntry, ActivityLog, Outcome};

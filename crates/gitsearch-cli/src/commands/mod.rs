//! Command implementations

mod index;
mod sessions;
mod show;
mod stats;

pub use index::{cmd_index, IndexOptions};
pub use sessions::cmd_sessions;
pub use show::cmd_show;
pub use stats::cmd_stats;

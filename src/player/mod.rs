//! Player module: status querying and parsing for cmus.

pub mod command;
pub mod status;

pub use command::StatusCommand;
pub use status::{StatusError, TrackSnapshot};

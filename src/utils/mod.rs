pub mod formatter;

pub use formatter::{format_time_ago, format_timestamp};

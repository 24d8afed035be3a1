pub mod location;
pub mod machine;
pub mod stats;

// Re-export common types for easier access
pub use location::{parse_timestamp, AgeTier, Location};
pub use machine::Machine;
pub use stats::{ClearOutcome, DatabaseInfo, Stats};

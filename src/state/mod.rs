pub mod admin;
pub mod filters;
pub mod query;
pub mod store;

// Re-export the state types the views work with
pub use admin::{AdminState, ConfirmDialog, DeleteTarget, Notice, Severity};
pub use filters::{FilterPatch, Filters};
pub use query::LocationQuery;
pub use store::Store;

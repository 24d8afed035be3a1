pub mod admin;
pub mod map;
pub mod sidebar;

pub use map::MapState;

pub mod app;
pub mod jobs;
pub mod views;

pub use app::ViewerApp;

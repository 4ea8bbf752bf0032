//! HTTP API handlers for lms-space

pub mod health;
pub mod session;
pub mod ui;

pub use health::health_routes;
pub use session::session_routes;
pub use ui::ui_routes;

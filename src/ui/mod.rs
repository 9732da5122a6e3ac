//! egui front end
//!
//! Header with status badges, avatar on the left, conversation in the
//! middle, input bar at the bottom and toasts on top.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;

pub use app::AriaApp;
pub use state::{AppState, Toast};
pub use theme::Theme;

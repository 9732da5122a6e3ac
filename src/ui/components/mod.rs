//! UI components

pub mod avatar_view;
pub mod input_bar;
pub mod message_list;
pub mod status_panel;
pub mod toasts;

pub use avatar_view::AvatarView;
pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use status_panel::StatusPanel;
pub use toasts::Toasts;

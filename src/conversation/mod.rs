//! Conversation state and turn sequencing
//!
//! The controller owns the message log and the single status flag. A turn
//! runs `idle -> processing -> idle`: append the utterance, interpret it,
//! wait the simulated thinking time, append and speak the reply.

pub mod controller;
pub mod delay;
pub mod events;
pub mod status;

pub use controller::{ConversationController, InputOrigin, SubmitOutcome};
pub use delay::ThinkingDelay;
pub use events::{ConversationEvent, EventSink, Notification, NotificationLevel};
pub use status::{ConversationStatus, StatusCell};

//! Animated assistant avatar
//!
//! Pure presentation: the driver turns `(status, time)` into a frame
//! description that the UI paints. Nothing here feeds back into the
//! conversation.

pub mod driver;

pub use driver::{AvatarDriver, AvatarFrame, Eye, Particle, PARTICLE_COUNT};

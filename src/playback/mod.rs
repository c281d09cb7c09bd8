pub mod ambient;
pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{PlaybackController, PlaybackSnapshot};
pub use state::{PlaybackState, PlaybackStatus};

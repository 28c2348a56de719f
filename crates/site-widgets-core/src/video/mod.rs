pub mod element;
pub mod gate;
pub mod player;

pub use element::{MediaSource, VideoElement};
pub use gate::{VideoEffect, VideoEvent, VideoGate, VideoState};
pub use player::VideoPlayer;

// Compact track module
// Per-speaker gap-free audio buffers and the bidirectional compact/global
// time maps that describe them.

pub mod builder;
pub mod time_map;

pub use builder::{build_tracks, SpeakerTrack, TrackBuildResult};
pub use time_map::{global_to_compact, TimeMap, TimeMapEntry};

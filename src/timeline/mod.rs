// Timeline module
// Canonical speaker-turn records plus the interval math and post-processing
// that produce them from raw diarization output.

pub mod interval;
pub mod postprocess;
pub mod types;

pub use postprocess::{postprocess, PostprocessConfig};
pub use types::{
    single_speaker_fallback, sort_timeline, SpeakerTurn, Timeline, FALLBACK_CONFIDENCE,
    FALLBACK_SPEAKER_ID,
};

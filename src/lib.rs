// Speaker-tracks - speaker-track and time-mapping engine
//
// Turns a raw diarization timeline into one compact, speaker-exclusive audio
// track per speaker with an exact bidirectional compact/global time map,
// cleans up fragmentary speaker assignments by voice similarity, softens
// overlapped regions toward the target speaker, and projects compact-time
// transcription results back onto the recording's timeline.
//
// Diarization, ASR, and embedding models are external collaborators; the
// only model-facing seam in this crate is the `EmbeddingExtractor` trait.

pub mod artifacts;
pub mod audio;
pub mod embedding;
pub mod enhance;
pub mod merger;
pub mod timeline;
pub mod tracks;
pub mod transcript;

pub use embedding::EmbeddingExtractor;
pub use enhance::{EnhancerConfig, MaskStats, TargetSpeakerEnhancer};
pub use merger::{merge_short_segments, MergerConfig};
pub use timeline::{postprocess, single_speaker_fallback, PostprocessConfig, SpeakerTurn, Timeline};
pub use tracks::{
    build_tracks, global_to_compact, SpeakerTrack, TimeMap, TimeMapEntry, TrackBuildResult,
};
pub use transcript::{bind_segments, split_and_remap, RemappedSpan, TranscriptSegment, Word};

// Transcript module
// Binds external transcript segments to speakers and projects compact-time
// results back onto the global timeline.

pub mod binder;
pub mod remap;
pub mod types;

pub use binder::{apply_reference_audio, bind_segments, select_reference_audio};
pub use remap::{split_and_remap, RemappedSpan};
pub use types::{TranscriptSegment, Word};

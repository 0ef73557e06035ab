// Transcript data types.
//
// External ASR and translation stages emit loosely-keyed records
// (`start`/`start_time`, `end`/`end_time`); serde aliases normalize them
// into these canonical types at the boundary so the rest of the crate never
// sees the variants.

use serde::{Deserialize, Serialize};

/// One word token with compact- or global-time bounds, depending on stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(alias = "start_time")]
    pub start: f64,
    #[serde(alias = "end_time")]
    pub end: f64,
}

/// A transcript segment as produced by the ASR collaborator (compact time)
/// and later rewritten by the remapper (global time, resolved speaker).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    #[serde(alias = "start_time")]
    pub start: f64,
    #[serde(alias = "end_time")]
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_audio_path: Option<String>,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
            speaker_id: None,
            confidence: None,
            reference_audio_path: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

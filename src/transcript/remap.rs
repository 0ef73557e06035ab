// Compact-to-global remapping
// A compact-time span may cover several concatenated turns; it is split at
// every map-entry boundary it crosses and each piece rescaled linearly into
// that entry's global span, words included.

use log::debug;

use crate::timeline::interval::intersect;
use crate::tracks::TimeMapEntry;

use super::types::Word;

/// One global-time piece of a remapped compact span.
#[derive(Debug, Clone)]
pub struct RemappedSpan {
    pub start: f64,
    pub end: f64,
    pub words: Vec<Word>,
}

/// Project a compact-time span (and its words) onto the global timeline.
///
/// Emits one piece per map entry the span intersects, so a segment crossing
/// a diarization gap splits into multiple global segments instead of being
/// stretched across the gap. Words are rescaled by the same linear rule,
/// clipped to their enclosing sub-interval; a word is dropped only when its
/// span overlaps no entry at all.
pub fn split_and_remap(
    compact_start: f64,
    compact_end: f64,
    words: &[Word],
    time_map: &[TimeMapEntry],
) -> Vec<RemappedSpan> {
    let mut pieces = Vec::new();

    for entry in time_map {
        let (sub_start, sub_end) = match intersect(
            compact_start,
            compact_end,
            entry.compact_start,
            entry.compact_end,
        ) {
            Some(sub) => sub,
            None => continue,
        };

        let global_start = entry.compact_to_global(sub_start);
        let global_end = entry.compact_to_global(sub_end);

        let mut piece_words = Vec::new();
        for word in words {
            let (word_start, word_end) = match intersect(word.start, word.end, sub_start, sub_end) {
                Some(clipped) => clipped,
                None => continue,
            };
            piece_words.push(Word {
                text: word.text.clone(),
                start: entry.compact_to_global(word_start),
                end: entry.compact_to_global(word_end),
            });
        }

        pieces.push(RemappedSpan {
            start: global_start,
            end: global_end,
            words: piece_words,
        });
    }

    if pieces.is_empty() {
        debug!(
            "Compact span [{:.3}, {:.3}] intersects no map entry",
            compact_start, compact_end
        );
    }

    pieces
}

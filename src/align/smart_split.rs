use std::ops::Range;

use tracing::debug;

use crate::segment::{Segment, TranslationMapping};
use crate::translator::Translator;

use super::snap::snap_chars;
use super::{request_translation, StrategyOutcome};

/// Translates the plain concatenation of all segments, then splits the result
/// proportionally.
pub fn translate_then_smart_split(
    segments: &[Segment],
    translator: &dyn Translator,
) -> StrategyOutcome {
    let combined: String = segments.iter().map(|s| s.text.as_str()).collect();
    let translated = request_translation(translator, &combined)?;
    Ok(smart_split(segments, &translated))
}

/// Partitions `translated` over `segments` by original character-length ratio.
/// Empty slices fall back to the segment's source text.
pub fn smart_split(segments: &[Segment], translated: &str) -> TranslationMapping {
    let spans = proportional_spans(segments, translated);
    let mut mapping = TranslationMapping::new();
    for (seg, span) in segments.iter().zip(spans) {
        let slice = translated[span].trim();
        let text = if slice.is_empty() { seg.text.as_str() } else { slice };
        debug!(segment = seg.id, source = %seg.text, translated = %text, "smart split");
        mapping.insert(seg.id, text);
    }
    mapping
}

/// Byte ranges of `translated` assigned to each segment, in segment order.
///
/// The ranges are contiguous, untrimmed and cover the whole string.
pub fn proportional_spans(segments: &[Segment], translated: &str) -> Vec<Range<usize>> {
    let n = segments.len();
    if n == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = translated.chars().collect();
    let byte_at: Vec<usize> = translated
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(translated.len()))
        .collect();
    let len = chars.len();

    let char_bounds = if segments.iter().all(|s| s.text.is_empty()) {
        even_bounds(n, len)
    } else {
        ratio_bounds(segments, &chars)
    };

    char_bounds
        .windows(2)
        .map(|w| byte_at[w[0]]..byte_at[w[1]])
        .collect()
}

/// `n + 1` cut points giving `n` slices of `len / n` chars, the last one taking the remainder.
fn even_bounds(n: usize, len: usize) -> Vec<usize> {
    let width = len / n;
    let mut bounds: Vec<usize> = (0..n).map(|i| i * width).collect();
    bounds.push(len);
    bounds
}

fn ratio_bounds(segments: &[Segment], chars: &[char]) -> Vec<usize> {
    let total: usize = segments.iter().map(Segment::char_len).sum();
    let len = chars.len();

    let mut bounds = Vec::with_capacity(segments.len() + 1);
    let mut cursor = 0usize;
    bounds.push(cursor);
    for seg in &segments[..segments.len() - 1] {
        let share = len * seg.char_len() / total;
        let snapped = snap_chars(chars, cursor + share, cursor);
        bounds.push(snapped);
        cursor = snapped;
    }
    bounds.push(len);
    bounds
}

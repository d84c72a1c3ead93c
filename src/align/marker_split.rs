use tracing::debug;

use crate::markers::{compose_leading, leading_span};
use crate::segment::{Segment, TranslationMapping};
use crate::translator::Translator;

use super::{request_translation, StrategyOutcome};

/// One call over `[XF_SEGMENT_<id>]`-prefixed text; each segment takes the span
/// up to the next segment's marker.
pub fn marker_split(segments: &[Segment], translator: &dyn Translator) -> StrategyOutcome {
    let composite = compose_leading(segments);
    let translated = request_translation(translator, &composite)?;
    Ok(extract_leading(segments, &translated))
}

/// Segments whose marker did not survive keep their source text.
pub fn extract_leading(segments: &[Segment], translated: &str) -> TranslationMapping {
    let mut mapping = TranslationMapping::new();
    for seg in segments {
        match leading_span(translated, seg.id) {
            Some(span) => mapping.insert(seg.id, span),
            None => {
                debug!(segment = seg.id, "leading marker lost, keeping source text");
                mapping.insert(seg.id, seg.text.as_str());
            }
        }
    }
    mapping
}

use tracing::{debug, warn};

use crate::markers::{bracketed_span, compose_bracketed, strip_bracket_markers};
use crate::segment::{Segment, TranslationMapping};
use crate::translator::Translator;

use super::smart_split::smart_split;
use super::{request_translation, StrategyOutcome};

/// Segments whose `【<id>】` pair did not survive translation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialMarkerLoss {
    pub resolved: TranslationMapping,
    pub unresolved: Vec<usize>,
}

/// One call over `【<id>】text【<id>】` pairs. Any lost pair sends the whole
/// translation, stripped of markers, through the proportional splitter instead.
pub fn enhanced_marker(segments: &[Segment], translator: &dyn Translator) -> StrategyOutcome {
    let composite = compose_bracketed(segments);
    let translated = request_translation(translator, &composite)?;
    match extract_bracketed(segments, &translated) {
        Ok(mapping) => Ok(mapping),
        Err(loss) => {
            warn!(
                unresolved = ?loss.unresolved,
                resolved = loss.resolved.len(),
                "bracket markers lost, falling back to proportional split"
            );
            let plain = strip_bracket_markers(&translated);
            Ok(smart_split(segments, &plain))
        }
    }
}

pub fn extract_bracketed(
    segments: &[Segment],
    translated: &str,
) -> Result<TranslationMapping, PartialMarkerLoss> {
    let mut resolved = TranslationMapping::new();
    let mut unresolved = Vec::new();
    for seg in segments {
        match bracketed_span(translated, seg.id) {
            Some(span) if !span.is_empty() => resolved.insert(seg.id, span),
            Some(_) => resolved.insert(seg.id, seg.text.as_str()),
            None => {
                debug!(segment = seg.id, "bracket pair incomplete");
                unresolved.push(seg.id);
            }
        }
    }
    if unresolved.is_empty() {
        Ok(resolved)
    } else {
        Err(PartialMarkerLoss {
            resolved,
            unresolved,
        })
    }
}

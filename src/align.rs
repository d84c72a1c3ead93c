//! Recovering per-segment translations from a single whole-transcript call.
//!
//! Strategies run in a fixed order, each making at most one translator call. The
//! first candidate that covers every segment and differs from the source somewhere
//! wins. If none does, every segment keeps its own text.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::segment::{validate_segments, Segment, SegmentError, TranslationMapping};
use crate::translator::{TranslateError, Translator};

mod enhanced;
mod marker_split;
mod smart_split;
mod snap;

pub use enhanced::{enhanced_marker, extract_bracketed, PartialMarkerLoss};
pub use marker_split::{extract_leading, marker_split};
pub use smart_split::{proportional_spans, smart_split, translate_then_smart_split};
pub use snap::{is_boundary, snap_boundary, BOUNDARY_CHARS, SNAP_WINDOW};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StrategyFailure {
    #[error(transparent)]
    Translator(#[from] TranslateError),

    #[error("translator returned an empty result")]
    EmptyTranslation,
}

pub type StrategyOutcome = Result<TranslationMapping, StrategyFailure>;

pub type StrategyFn = fn(&[Segment], &dyn Translator) -> StrategyOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    MarkerSplit,
    EnhancedMarker,
    SmartSplit,
}

impl StrategyKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::MarkerSplit => "marker_split",
            Self::EnhancedMarker => "enhanced_marker",
            Self::SmartSplit => "smart_split",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Priority order of the multi-segment strategies.
pub const LADDER: [(StrategyKind, StrategyFn); 3] = [
    (StrategyKind::MarkerSplit, marker_split),
    (StrategyKind::EnhancedMarker, enhanced_marker),
    (StrategyKind::SmartSplit, translate_then_smart_split),
];

/// How a mapping was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The lone segment was translated directly.
    Direct,
    /// The lone segment's translation failed; its source text was kept.
    DirectFallback,
    Strategy(StrategyKind),
    /// No strategy produced an acceptable candidate.
    Identity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub mapping: TranslationMapping,
    pub resolution: Resolution,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    #[error("malformed segment sequence: {0}")]
    Malformed(#[from] SegmentError),
}

/// Calls the translator once, treating a blank result as a failure.
pub(crate) fn request_translation(
    translator: &dyn Translator,
    text: &str,
) -> Result<String, StrategyFailure> {
    let out = translator.translate(text)?;
    if out.trim().is_empty() {
        return Err(StrategyFailure::EmptyTranslation);
    }
    Ok(out)
}

/// A candidate must cover every id and change at least one segment.
pub fn accepts(segments: &[Segment], mapping: &TranslationMapping) -> bool {
    mapping.covers(segments) && !mapping.is_identity_of(segments)
}

pub struct Aligner<T> {
    translator: T,
}

impl<T: Translator> Aligner<T> {
    pub fn new(translator: T) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Per-segment translations, or `None` for an empty transcript.
    pub fn align(&self, segments: &[Segment]) -> Result<Option<TranslationMapping>, AlignError> {
        Ok(self.align_detailed(segments)?.map(|a| a.mapping))
    }

    pub fn align_detailed(&self, segments: &[Segment]) -> Result<Option<Alignment>, AlignError> {
        validate_segments(segments)?;
        match segments {
            [] => Ok(None),
            [only] => Ok(Some(self.align_single(only))),
            _ => Ok(Some(self.run_ladder(segments))),
        }
    }

    fn align_single(&self, seg: &Segment) -> Alignment {
        let mut mapping = TranslationMapping::new();
        match request_translation(&self.translator, &seg.text) {
            Ok(text) => {
                mapping.insert(seg.id, text.trim());
                Alignment {
                    mapping,
                    resolution: Resolution::Direct,
                }
            }
            Err(err) => {
                warn!(segment = seg.id, error = %err, "direct translation failed, keeping source text");
                mapping.insert(seg.id, seg.text.as_str());
                Alignment {
                    mapping,
                    resolution: Resolution::DirectFallback,
                }
            }
        }
    }

    fn run_ladder(&self, segments: &[Segment]) -> Alignment {
        let translator: &dyn Translator = &self.translator;
        let accepted = LADDER.iter().find_map(|&(kind, strategy)| {
            debug!(strategy = %kind, segments = segments.len(), "trying strategy");
            match strategy(segments, translator) {
                Ok(mapping) if accepts(segments, &mapping) => {
                    info!(strategy = %kind, "strategy accepted");
                    Some(Alignment {
                        mapping,
                        resolution: Resolution::Strategy(kind),
                    })
                }
                Ok(_) => {
                    warn!(strategy = %kind, "candidate rejected: incomplete or unchanged");
                    None
                }
                Err(err) => {
                    warn!(strategy = %kind, error = %err, "strategy failed");
                    None
                }
            }
        });

        accepted.unwrap_or_else(|| {
            warn!(segments = segments.len(), "all strategies exhausted, keeping source text");
            Alignment {
                mapping: TranslationMapping::identity(segments),
                resolution: Resolution::Identity,
            }
        })
    }
}

/// Shorthand for `Aligner::new(translator).align(segments)`.
pub fn align<T: Translator>(
    translator: T,
    segments: &[Segment],
) -> Result<Option<TranslationMapping>, AlignError> {
    Aligner::new(translator).align(segments)
}

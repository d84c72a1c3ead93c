pub mod align;
pub mod config;
pub mod markers;
pub mod progress;
pub mod report;
pub mod segment;
pub mod trace;
pub mod translator;

pub use align::{align, Aligner, AlignError, Alignment, Resolution, StrategyKind};
pub use segment::{Segment, Transcript, TranslationMapping, WordDetail};
pub use translator::{TranslateError, Translator};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One recognized word with its timing and language tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDetail {
    pub text: String,
    #[serde(default)]
    pub begin_time: u64,
    #[serde(default)]
    pub end_time: u64,
    #[serde(default)]
    pub language: String,
}

/// A semantic unit of recognized speech.
///
/// `id` doubles as the position of the segment in its transcript; marker lookups
/// ("the next marker") rely on that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: usize,
    pub text: String,
    #[serde(default)]
    pub begin_time: u64,
    #[serde(default)]
    pub end_time: u64,
    /// Inclusive `[start, end]` indices into the transcript's word list.
    #[serde(rename = "word_indices", default)]
    pub word_index_range: (usize, usize),
}

impl Segment {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            begin_time: 0,
            end_time: 0,
            word_index_range: (0, 0),
        }
    }

    #[must_use]
    pub fn with_times(mut self, begin_time: u64, end_time: u64) -> Self {
        self.begin_time = begin_time;
        self.end_time = end_time;
        self
    }

    #[must_use]
    pub fn with_words(mut self, start: usize, end: usize) -> Self {
        self.word_index_range = (start, end);
        self
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Words covered by this segment, or an empty slice when the range starts
    /// past the end of `words`.
    pub fn words<'a>(&self, words: &'a [WordDetail]) -> &'a [WordDetail] {
        let (start, end) = self.word_index_range;
        if start >= words.len() {
            return &[];
        }
        let end = end.saturating_add(1).min(words.len()).max(start);
        &words[start..end]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("segment at position {index} has id {id}; ids must equal their position")]
    IdMismatch { index: usize, id: usize },

    #[error("segment {id} ends before it begins ({begin_time} > {end_time})")]
    InvertedTimes {
        id: usize,
        begin_time: u64,
        end_time: u64,
    },

    #[error("segment {id} has inverted word range [{start}, {end}]")]
    InvertedWordRange { id: usize, start: usize, end: usize },
}

/// Checks the preconditions alignment relies on: ids equal positions, times and
/// word ranges are ordered.
pub fn validate_segments(segments: &[Segment]) -> Result<(), SegmentError> {
    for (index, seg) in segments.iter().enumerate() {
        if seg.id != index {
            return Err(SegmentError::IdMismatch { index, id: seg.id });
        }
        if seg.begin_time > seg.end_time {
            return Err(SegmentError::InvertedTimes {
                id: seg.id,
                begin_time: seg.begin_time,
                end_time: seg.end_time,
            });
        }
        let (start, end) = seg.word_index_range;
        if start > end {
            return Err(SegmentError::InvertedWordRange {
                id: seg.id,
                start,
                end,
            });
        }
    }
    Ok(())
}

/// Recognition output: segments plus the parallel word list they index into.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub recognized_text: String,
    pub segments: Vec<Segment>,
    #[serde(default, alias = "word_details")]
    pub words: Vec<WordDetail>,
}

impl Transcript {
    pub fn validate(&self) -> Result<(), SegmentError> {
        validate_segments(&self.segments)
    }

    /// The recognizer's full text, or the segment texts joined when it was not supplied.
    pub fn source_text(&self) -> String {
        if !self.recognized_text.is_empty() {
            return self.recognized_text.clone();
        }
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Segment id -> translated text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranslationMapping(BTreeMap<usize, String>);

impl TranslationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every segment mapped to its own text.
    pub fn identity(segments: &[Segment]) -> Self {
        segments
            .iter()
            .map(|seg| (seg.id, seg.text.clone()))
            .collect()
    }

    pub fn insert(&mut self, id: usize, text: impl Into<String>) {
        self.0.insert(id, text.into());
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(id, text)| (*id, text.as_str()))
    }

    /// True when the mapping has exactly one entry per segment id.
    pub fn covers(&self, segments: &[Segment]) -> bool {
        self.0.len() == segments.len() && segments.iter().all(|seg| self.0.contains_key(&seg.id))
    }

    /// True when every segment maps to its own original text.
    pub fn is_identity_of(&self, segments: &[Segment]) -> bool {
        segments
            .iter()
            .all(|seg| self.get(seg.id) == Some(seg.text.as_str()))
    }

    /// Translations joined in segment order, falling back to source text for gaps.
    pub fn joined(&self, segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|seg| self.get(seg.id).unwrap_or(&seg.text))
            .collect()
    }
}

impl FromIterator<(usize, String)> for TranslationMapping {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

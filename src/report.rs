//! The JSON document written for a translated transcript.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::segment::{Segment, Transcript, TranslationMapping, WordDetail};

/// Milliseconds assumed per character when no timing survived recognition.
pub const FALLBACK_MS_PER_CHAR: u64 = 200;

#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub audio_format: String,
    pub sampling_rate: u32,
    pub channel: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            audio_format: "mp3".to_string(),
            sampling_rate: 16000,
            channel: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub file_url: String,
    pub properties: Properties,
    pub transcripts: Vec<ChannelTranscript>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Properties {
    pub audio_format: String,
    pub channels: Vec<u32>,
    pub original_sampling_rate: u32,
    pub original_duration_in_milliseconds: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChannelTranscript {
    pub channel_id: u32,
    pub content_duration_in_milliseconds: u64,
    pub source_text: String,
    pub text: String,
    pub language: Vec<String>,
    pub sentences: Vec<Sentence>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Sentence {
    pub begin_time: u64,
    pub end_time: u64,
    pub source_text: String,
    pub text: String,
    pub sentence_id: usize,
    pub words: Vec<WordDetail>,
    pub language: String,
}

pub fn build_report(
    file_url: &str,
    transcript: &Transcript,
    mapping: &TranslationMapping,
    options: &ReportOptions,
) -> Report {
    let duration = total_duration(transcript);
    let sentences = transcript
        .segments
        .iter()
        .enumerate()
        .map(|(i, seg)| sentence_for(i, seg, &transcript.words, mapping))
        .collect();

    Report {
        file_url: file_url.to_string(),
        properties: Properties {
            audio_format: options.audio_format.clone(),
            channels: vec![options.channel],
            original_sampling_rate: options.sampling_rate,
            original_duration_in_milliseconds: duration,
        },
        transcripts: vec![ChannelTranscript {
            channel_id: options.channel,
            content_duration_in_milliseconds: duration,
            source_text: transcript.source_text(),
            text: mapping.joined(&transcript.segments),
            language: distinct_languages(&transcript.words),
            sentences,
        }],
    }
}

pub fn write_report(path: &Path, report: &Report, pretty: bool) -> anyhow::Result<()> {
    let body = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .context("serialize report")?;
    std::fs::write(path, body).with_context(|| format!("write report: {}", path.display()))?;
    Ok(())
}

fn sentence_for(
    index: usize,
    seg: &Segment,
    words: &[WordDetail],
    mapping: &TranslationMapping,
) -> Sentence {
    let words = seg.words(words).to_vec();
    Sentence {
        begin_time: seg.begin_time,
        end_time: seg.end_time,
        source_text: seg.text.clone(),
        text: mapping.get(seg.id).unwrap_or_default().to_string(),
        sentence_id: index + 1,
        language: dominant_language(&words),
        words,
    }
}

/// Most frequent non-empty language tag; ties go to the tag seen first.
fn dominant_language(words: &[WordDetail]) -> String {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, w) in words.iter().enumerate() {
        if w.language.is_empty() {
            continue;
        }
        counts.entry(w.language.as_str()).or_insert((0, pos)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(lang, _)| lang.to_string())
        .unwrap_or_default()
}

fn distinct_languages(words: &[WordDetail]) -> Vec<String> {
    words
        .iter()
        .filter(|w| !w.language.is_empty())
        .map(|w| w.language.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Last word end time, else last segment end time, else an estimate from text length.
fn total_duration(transcript: &Transcript) -> u64 {
    if let Some(w) = transcript.words.iter().rev().find(|w| w.end_time > 0) {
        return w.end_time;
    }
    if let Some(s) = transcript.segments.iter().rev().find(|s| s.end_time > 0) {
        return s.end_time;
    }
    transcript.source_text().chars().count() as u64 * FALLBACK_MS_PER_CHAR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, begin: u64, end: u64, lang: &str) -> WordDetail {
        WordDetail {
            text: text.to_string(),
            begin_time: begin,
            end_time: end,
            language: lang.to_string(),
        }
    }

    fn sample() -> Transcript {
        Transcript {
            recognized_text: "你好世界hello".to_string(),
            segments: vec![
                Segment::new(0, "你好世界").with_times(100, 500).with_words(0, 1),
                Segment::new(1, "hello").with_times(600, 900).with_words(2, 2),
            ],
            words: vec![
                word("你好", 100, 300, "cn"),
                word("世界", 300, 500, "cn"),
                word("hello", 600, 900, "en"),
            ],
        }
    }

    #[test]
    fn sentences_carry_timing_words_and_translation() {
        let t = sample();
        let mut mapping = TranslationMapping::new();
        mapping.insert(0, "Hello world");
        mapping.insert(1, "你好");
        let report = build_report("a.mp3", &t, &mapping, &ReportOptions::default());

        let ch = &report.transcripts[0];
        assert_eq!(ch.text, "Hello world你好");
        assert_eq!(ch.source_text, "你好世界hello");
        assert_eq!(ch.language, vec!["cn".to_string(), "en".to_string()]);
        assert_eq!(ch.content_duration_in_milliseconds, 900);
        assert_eq!(ch.sentences[0].sentence_id, 1);
        assert_eq!(ch.sentences[0].words.len(), 2);
        assert_eq!(ch.sentences[0].language, "cn");
        assert_eq!(ch.sentences[1].text, "你好");
        assert_eq!(ch.sentences[1].language, "en");
        assert_eq!(report.properties.original_duration_in_milliseconds, 900);
    }

    #[test]
    fn missing_translation_renders_empty_sentence_text() {
        let t = sample();
        let report = build_report("a.mp3", &t, &TranslationMapping::new(), &ReportOptions::default());
        assert_eq!(report.transcripts[0].sentences[0].text, "");
        assert_eq!(report.transcripts[0].text, "你好世界hello");
    }

    #[test]
    fn duration_falls_back_to_segments_then_text() {
        let mut t = sample();
        for w in &mut t.words {
            w.end_time = 0;
        }
        assert_eq!(total_duration(&t), 900);

        for s in &mut t.segments {
            s.end_time = 0;
        }
        assert_eq!(total_duration(&t), 9 * FALLBACK_MS_PER_CHAR);
    }

    #[test]
    fn dominant_language_prefers_first_on_tie() {
        let words = vec![word("a", 0, 1, "en"), word("b", 1, 2, ""), word("c", 2, 3, "cn")];
        assert_eq!(dominant_language(&words), "en");
        assert_eq!(dominant_language(&[]), "");
    }

    #[test]
    fn report_serializes_expected_keys() {
        let t = sample();
        let mapping = TranslationMapping::identity(&t.segments);
        let report = build_report("a.mp3", &t, &mapping, &ReportOptions::default());
        let v = serde_json::to_value(&report).expect("json");
        assert_eq!(v["properties"]["channels"], serde_json::json!([0]));
        assert_eq!(v["transcripts"][0]["sentences"][1]["words"][0]["text"], "hello");
    }
}

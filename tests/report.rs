//! Transcript JSON in, aligned report JSON out.

use serde_json::Value;
use transcript_translate::report::{build_report, write_report, ReportOptions};
use transcript_translate::translator::from_fn;
use transcript_translate::{Aligner, Resolution, StrategyKind, Transcript};

const TRANSCRIPT: &str = r#"{
  "recognized_text": "你好世界今天天气很好",
  "segments": [
    {"id": 0, "text": "你好世界", "begin_time": 120, "end_time": 900, "word_indices": [0, 1]},
    {"id": 1, "text": "今天天气很好", "begin_time": 1000, "end_time": 2100, "word_indices": [2, 4]}
  ],
  "word_details": [
    {"text": "你好", "begin_time": 120, "end_time": 320, "language": "cn"},
    {"text": "世界", "begin_time": 500, "end_time": 700, "language": "cn"},
    {"text": "今天", "begin_time": 1000, "end_time": 1200, "language": "cn"},
    {"text": "天气", "begin_time": 1300, "end_time": 1500, "language": "cn"},
    {"text": "很好", "begin_time": 1600, "end_time": 1800, "language": ""}
  ]
}"#;

#[test]
fn translated_transcript_round_trips_to_report() {
    let transcript: Transcript = serde_json::from_str(TRANSCRIPT).expect("parse transcript");
    transcript.validate().expect("valid transcript");

    let translator = from_fn(|text: &str| {
        assert!(text.starts_with("[XF_SEGMENT_0]"));
        Ok("[XF_SEGMENT_0] Hello world [XF_SEGMENT_1] The weather is nice today".to_string())
    });
    let alignment = Aligner::new(translator)
        .align_detailed(&transcript.segments)
        .expect("align")
        .expect("non-empty");
    assert_eq!(
        alignment.resolution,
        Resolution::Strategy(StrategyKind::MarkerSplit)
    );

    let report = build_report(
        "https://example.com/audio.mp3",
        &transcript,
        &alignment.mapping,
        &ReportOptions::default(),
    );

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.json");
    write_report(&path, &report, true).expect("write report");
    let v: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");

    let ch = &v["transcripts"][0];
    assert_eq!(v["file_url"], "https://example.com/audio.mp3");
    assert_eq!(v["properties"]["original_duration_in_milliseconds"], 1800);
    assert_eq!(ch["text"], "Hello worldThe weather is nice today");
    assert_eq!(ch["source_text"], "你好世界今天天气很好");
    assert_eq!(ch["language"], serde_json::json!(["cn"]));
    assert_eq!(ch["sentences"][0]["text"], "Hello world");
    assert_eq!(ch["sentences"][1]["sentence_id"], 2);
    assert_eq!(ch["sentences"][1]["words"].as_array().map(Vec::len), Some(3));
    assert_eq!(ch["sentences"][1]["language"], "cn");
}

#[test]
fn malformed_transcript_is_rejected_before_translation() {
    let transcript: Transcript = serde_json::from_str(
        r#"{"segments": [{"id": 0, "text": "a"}, {"id": 5, "text": "b"}]}"#,
    )
    .expect("parse");
    assert!(transcript.validate().is_err());

    let translator = from_fn(|_: &str| -> Result<String, _> {
        panic!("translator must not be called for malformed input")
    });
    assert!(Aligner::new(translator)
        .align(&transcript.segments)
        .is_err());
}

use once_cell::sync::Lazy;
use regex::Regex;

use crate::segment::Segment;

pub const LEADING_MARKER_PREFIX: &str = "[XF_SEGMENT_";
pub const LEADING_MARKER_SUFFIX: &str = "]";

pub const BRACKET_OPEN: char = '【';
pub const BRACKET_CLOSE: char = '】';

static BRACKET_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"【\d+】").expect("bracket marker regex"));

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));

pub fn leading_marker(id: usize) -> String {
    format!("{LEADING_MARKER_PREFIX}{id}{LEADING_MARKER_SUFFIX}")
}

pub fn bracket_marker(id: usize) -> String {
    format!("{BRACKET_OPEN}{id}{BRACKET_CLOSE}")
}

/// `[XF_SEGMENT_0]text0[XF_SEGMENT_1]text1...`, no marker after the last segment.
pub fn compose_leading(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        out.push_str(&leading_marker(seg.id));
        out.push_str(&seg.text);
    }
    out
}

/// `【0】text0【0】【1】text1【1】...`
pub fn compose_bracketed(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        let marker = bracket_marker(seg.id);
        out.push_str(&marker);
        out.push_str(&seg.text);
        out.push_str(&marker);
    }
    out
}

/// Span following `[XF_SEGMENT_<id>]` up to the next segment's marker (or the end
/// of `text`), trimmed. `None` when the segment's own marker is gone.
pub fn leading_span(text: &str, id: usize) -> Option<&str> {
    let marker = leading_marker(id);
    let start = text.find(&marker)?;
    let span_start = start + marker.len();
    let next = leading_marker(id + 1);
    let span_end = text[start..]
        .find(&next)
        .map(|i| start + i)
        .unwrap_or(text.len());
    Some(text[span_start..span_end.max(span_start)].trim())
}

/// Trimmed text strictly between the first two occurrences of `【<id>】`.
pub fn bracketed_span(text: &str, id: usize) -> Option<&str> {
    let marker = bracket_marker(id);
    let first = text.find(&marker)?;
    let inner_start = first + marker.len();
    let second = text[inner_start..].find(&marker).map(|i| inner_start + i)?;
    Some(text[inner_start..second].trim())
}

/// Removes every `【<digits>】` token and collapses whitespace runs.
pub fn strip_bracket_markers(text: &str) -> String {
    let plain = BRACKET_MARKER_RE.replace_all(text, "");
    WHITESPACE_RUN_RE.replace_all(&plain, " ").trim().to_string()
}

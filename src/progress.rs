use std::io::{self, Write};
use std::time::Instant;

use crate::align::{Alignment, Resolution};
use crate::segment::Segment;

/// Timestamped stage messages on stderr for the command-line tool.
pub struct ConsoleProgress {
    enabled: bool,
    t0: Instant,
}

impl ConsoleProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            t0: Instant::now(),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.enabled {
            return;
        }
        let ts = fmt_elapsed(self.t0.elapsed().as_secs_f64());
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{ts}] {}", msg.as_ref());
    }

    /// One line naming how the mapping was obtained, then one line per segment.
    pub fn alignment(&self, segments: &[Segment], alignment: &Alignment) {
        if !self.enabled {
            return;
        }
        self.info(describe_resolution(alignment.resolution));
        for seg in segments {
            let out = alignment.mapping.get(seg.id).unwrap_or_default();
            self.info(format!("  #{} {} -> {}", seg.id, seg.text, out));
        }
    }
}

pub fn describe_resolution(resolution: Resolution) -> String {
    match resolution {
        Resolution::Direct => "Translated single segment".to_string(),
        Resolution::DirectFallback => "Single segment translation failed; kept source".to_string(),
        Resolution::Strategy(kind) => format!("Aligned via {kind}"),
        Resolution::Identity => "All strategies failed; kept source text".to_string(),
    }
}

fn fmt_elapsed(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Context;
use tracing::warn;

use crate::translator::{TranslateError, Translator};

pub struct TraceWriter {
    dir: PathBuf,
    enabled: bool,
}

impl TraceWriter {
    pub fn new(dir: PathBuf, enabled: bool) -> anyhow::Result<Self> {
        if enabled {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create trace dir: {}", dir.display()))?;
        }
        Ok(Self { dir, enabled })
    }

    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn write_named_text(&self, name: &str, text: &str) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let path = self.dir.join(sanitize_filename(name));
        std::fs::write(&path, text).with_context(|| format!("write trace: {}", path.display()))?;
        Ok(())
    }

    pub fn write_call_text(&self, call: usize, kind: &str, text: &str) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let name = format!("call_{call:03}.{kind}.txt");
        self.write_named_text(&name, text)
    }
}

/// Records every request and response of the wrapped translator to a [`TraceWriter`].
pub struct TracingTranslator<T> {
    inner: T,
    trace: TraceWriter,
    calls: AtomicUsize,
}

impl<T> TracingTranslator<T> {
    pub fn new(inner: T, trace: TraceWriter) -> Self {
        Self {
            inner,
            trace,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<T: Translator> Translator for TracingTranslator<T> {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if let Err(err) = self.trace.write_call_text(call, "request", text) {
            warn!(error = %err, "trace write failed");
        }
        let result = self.inner.translate(text);
        let written = match &result {
            Ok(out) => self.trace.write_call_text(call, "response", out),
            Err(e) => self.trace.write_call_text(call, "error", &e.to_string()),
        };
        if let Err(err) = written {
            warn!(error = %err, "trace write failed");
        }
        result
    }
}

fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => out.push('_'),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::{from_fn, IdentityTranslator};

    #[test]
    fn records_requests_and_responses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let trace = TraceWriter::new(dir.path().join("trace"), true).expect("trace");
        assert!(trace.is_enabled());
        assert_eq!(trace.dir(), dir.path().join("trace"));
        let t = TracingTranslator::new(IdentityTranslator, trace);

        assert_eq!(t.translate("【0】你好【0】").expect("translate"), "【0】你好【0】");
        assert_eq!(t.calls(), 1);

        let req = std::fs::read_to_string(dir.path().join("trace/call_001.request.txt"))
            .expect("request trace");
        let resp = std::fs::read_to_string(dir.path().join("trace/call_001.response.txt"))
            .expect("response trace");
        assert_eq!(req, "【0】你好【0】");
        assert_eq!(resp, "【0】你好【0】");
    }

    #[test]
    fn records_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let trace = TraceWriter::new(dir.path().to_path_buf(), true).expect("trace");
        let t = TracingTranslator::new(
            from_fn(|_: &str| Err(TranslateError::Unauthenticated)),
            trace,
        );
        assert!(t.translate("x").is_err());
        let err = std::fs::read_to_string(dir.path().join("call_001.error.txt")).expect("error");
        assert_eq!(err, "translator rejected credentials");
    }

    #[test]
    fn disabled_writer_touches_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let trace = TraceWriter::new(dir.path().join("never"), false).expect("trace");
        assert!(!trace.is_enabled());
        trace.write_named_text("a.txt", "x").expect("noop");
        assert!(!dir.path().join("never").exists());
        assert!(!TraceWriter::disabled().is_enabled());
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_filename("a/b:c?.txt"), "a_b_c_.txt");
    }
}

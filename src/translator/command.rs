use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::{TranslateError, Translator};

/// Exit status a translator command uses to report rejected credentials.
pub const EXIT_UNAUTHENTICATED: i32 = 77;

/// Runs an external program once per call: source text on stdin, translation on stdout.
#[derive(Clone, Debug)]
pub struct CommandTranslator {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandTranslator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl Translator for CommandTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TranslateError::Network(format!("spawn {}: {e}", self.program.display()))
            })?;

        // stdin is fed from its own thread while wait_with_output drains stdout.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_owned();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| TranslateError::Network(format!("wait translator: {e}")))?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The program exited without reading; its status says why.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(TranslateError::Network(format!("write stdin: {e}"))),
                Err(_) => return Err(TranslateError::Network("stdin writer panicked".to_string())),
            }
        }

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            if code == EXIT_UNAUTHENTICATED {
                return Err(TranslateError::Unauthenticated);
            }
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(TranslateError::Vendor { code, message });
        }

        String::from_utf8(output.stdout).map_err(|_| TranslateError::Vendor {
            code: 0,
            message: "translator produced non-utf8 output".to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn pipes_text_through_program() {
        let t = CommandTranslator::new("cat");
        assert_eq!(t.translate("你好 world").expect("cat"), "你好 world");
    }

    #[test]
    fn large_input_streams_without_deadlock() {
        let text = "你好世界。".repeat(20_000);
        let (tx, rx) = std::sync::mpsc::channel();
        let input = text.clone();
        std::thread::spawn(move || {
            let _ = tx.send(CommandTranslator::new("cat").translate(&input));
        });
        let got = rx
            .recv_timeout(std::time::Duration::from_secs(30))
            .expect("cat finished");
        assert_eq!(got.expect("cat").len(), text.len());
    }

    #[test]
    fn maps_exit_codes_to_errors() {
        let auth = CommandTranslator::new("sh").args(["-c", "exit 77"]);
        assert_eq!(auth.translate("x"), Err(TranslateError::Unauthenticated));

        let vendor = CommandTranslator::new("sh").args(["-c", "echo quota exceeded >&2; exit 3"]);
        assert_eq!(
            vendor.translate("x"),
            Err(TranslateError::Vendor {
                code: 3,
                message: "quota exceeded".to_string()
            })
        );
    }

    #[test]
    fn missing_program_is_a_network_error() {
        let t = CommandTranslator::new("/nonexistent/translator-bin");
        assert!(matches!(t.translate("x"), Err(TranslateError::Network(_))));
    }
}

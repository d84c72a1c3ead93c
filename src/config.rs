use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::report::ReportOptions;
use crate::translator::CommandTranslator;

pub const DEFAULT_CONFIG_FILE: &str = "transcript-translate.toml";
pub const CONFIG_ENV: &str = "TRANSCRIPT_TRANSLATE_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub translator: TranslatorSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub trace: TraceSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TranslatorSection {
    /// Program that reads source text on stdin and prints the translation.
    #[serde(default)]
    pub command: Option<PathBuf>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for the command (credentials, target language).
    #[serde(default)]
    pub env: std::collections::BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct OutputSection {
    #[serde(default)]
    pub pretty: Option<bool>,
    #[serde(default)]
    pub audio_format: Option<String>,
    #[serde(default)]
    pub sampling_rate: Option<u32>,
    #[serde(default)]
    pub channel: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TraceSection {
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Relative paths resolve against the config file's directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn report_options(&self) -> ReportOptions {
        let defaults = ReportOptions::default();
        ReportOptions {
            audio_format: self
                .output
                .audio_format
                .clone()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.audio_format),
            sampling_rate: self.output.sampling_rate.unwrap_or(defaults.sampling_rate),
            channel: self.output.channel.unwrap_or(defaults.channel),
        }
    }

    pub fn pretty(&self) -> bool {
        self.output.pretty.unwrap_or(true)
    }

    /// The configured command translator, if any.
    pub fn command_translator(&self) -> Option<CommandTranslator> {
        let program = self.translator.command.as_ref()?;
        Some(self.translator_for(program, self.translator.args.iter().cloned()))
    }

    /// Command translator for an explicit program, still carrying `[translator.env]`.
    pub fn translator_for<I, S>(&self, program: impl Into<PathBuf>, args: I) -> CommandTranslator
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut t = CommandTranslator::new(program).args(args);
        for (k, v) in &self.translator.env {
            t = t.env(k, v);
        }
        t
    }

    pub fn trace_dir(&self, config_path: &Path) -> Option<PathBuf> {
        if !self.trace.enabled.unwrap_or(false) {
            return None;
        }
        let dir = self
            .trace
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("trace"));
        if dir.is_relative() {
            let base = config_path.parent().unwrap_or_else(|| Path::new("."));
            return Some(base.join(dir));
        }
        Some(dir)
    }
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

pub fn find_default_config(workdir: &Path, filename: &str) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, filename, 8) {
            return Some(p);
        }
    }
    if let Some(p) = find_file_upwards(workdir, filename, 8) {
        return Some(p);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, filename, 10) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

/// Explicit path, then `$TRANSCRIPT_TRANSLATE_CONFIG`, then an upward search.
/// Returns defaults when nothing is found; an explicit path must exist.
pub fn resolve_config(
    explicit: Option<PathBuf>,
    workdir: &Path,
) -> anyhow::Result<(AppConfig, PathBuf)> {
    if let Some(p) = explicit {
        if !p.exists() {
            return Err(anyhow!("config not found: {}", p.display()));
        }
        return Ok((load_config(&p)?, p));
    }
    let found = std::env::var(CONFIG_ENV)
        .ok()
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .or_else(|| find_default_config(workdir, DEFAULT_CONFIG_FILE));
    match found {
        Some(p) => Ok((load_config(&p)?, p)),
        None => Ok((AppConfig::default(), workdir.join(DEFAULT_CONFIG_FILE))),
    }
}

pub const DEFAULT_CONFIG_TOML: &str = r#"# transcript-translate configuration

[translator]
# Program that reads source text on stdin and writes the translation to stdout.
# Exit status 77 means rejected credentials; any other non-zero status is a vendor error.
# command = "./translate.sh"
# args = ["--to", "en"]

[translator.env]
# TRANSLATE_API_KEY = "..."

[output]
pretty = true
audio_format = "mp3"
sampling_rate = 16000
channel = 0

[trace]
# Write every translator request/response to this directory.
enabled = false
dir = "trace"
"#;

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(DEFAULT_CONFIG_FILE);
    if cfg_path.exists() && !force {
        return Err(anyhow!(
            "config already exists: {} (use --force to overwrite)",
            cfg_path.display()
        ));
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_parses() {
        let cfg: AppConfig = toml::from_str(DEFAULT_CONFIG_TOML).expect("parse default");
        assert!(cfg.translator.command.is_none());
        assert!(cfg.pretty());
        assert_eq!(cfg.report_options().sampling_rate, 16000);
        assert!(cfg.trace_dir(Path::new("/etc/x.toml")).is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [translator]
            command = "translate"
            args = ["--to", "en"]
            [translator.env]
            API_KEY = "k"
            [output]
            audio_format = "wav"
            pretty = false
            [trace]
            enabled = true
            "#,
        )
        .expect("parse");
        let t = cfg.command_translator().expect("command");
        assert_eq!(t.program(), Path::new("translate"));
        assert_eq!(cfg.report_options().audio_format, "wav");
        assert!(!cfg.pretty());
        assert_eq!(
            cfg.trace_dir(Path::new("/srv/app/transcript-translate.toml")),
            Some(PathBuf::from("/srv/app/trace"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn overridden_command_keeps_configured_env() {
        use crate::translator::Translator;

        let cfg: AppConfig = toml::from_str(
            r#"
            [translator]
            command = "translate"
            [translator.env]
            API_KEY = "secret"
            "#,
        )
        .expect("parse");
        let t = cfg.translator_for("sh", ["-c", "printf %s \"$API_KEY\""]);
        assert_eq!(t.program(), Path::new("sh"));
        assert_eq!(t.translate("x").expect("sh"), "secret");
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_default_config(dir.path(), false).expect("init");
        assert!(path.exists());
        assert!(init_default_config(dir.path(), false).is_err());
        init_default_config(dir.path(), true).expect("force");
        let (cfg, found) = resolve_config(Some(path.clone()), dir.path()).expect("resolve");
        assert_eq!(found, path);
        assert!(cfg.pretty());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(resolve_config(Some(dir.path().join("nope.toml")), dir.path()).is_err());
    }

    #[test]
    fn upward_search_finds_parent_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.path().join("x.toml"), "").expect("write");
        assert_eq!(
            find_file_upwards(&nested, "x.toml", 4),
            Some(dir.path().join("x.toml"))
        );
        assert_eq!(find_file_upwards(&nested, "x.toml", 1), None);
    }
}

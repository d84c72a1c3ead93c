use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use transcript_translate::config::{init_default_config, resolve_config};
use transcript_translate::progress::ConsoleProgress;
use transcript_translate::report::{build_report, write_report};
use transcript_translate::trace::{TraceWriter, TracingTranslator};
use transcript_translate::translator::IdentityTranslator;
use transcript_translate::{Aligner, Transcript, TranslationMapping, Translator};

#[derive(Parser, Debug)]
#[command(name = "transcript-translate")]
#[command(about = "Translate a segmented transcript with one translator call and realign the result", long_about = None)]
struct Args {
    /// Write a default config file, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write the config file to (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config file when used with --init-config
    #[arg(long)]
    force: bool,

    /// Recognized transcript JSON (segments + words)
    #[arg(value_name = "JSON")]
    input: Option<PathBuf>,

    /// Output report JSON (default: <input_stem>_translated.json)
    #[arg(short, long, value_name = "JSON")]
    output: Option<PathBuf>,

    /// Config file path (default: search for transcript-translate.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Translator program (stdin: source text, stdout: translation); overrides config
    #[arg(long, value_name = "PROG")]
    translator_cmd: Option<PathBuf>,

    /// Argument passed to the translator program (repeatable)
    #[arg(long = "translator-arg", value_name = "ARG", allow_hyphen_values = true)]
    translator_args: Vec<String>,

    /// Skip translation; every segment keeps its source text
    #[arg(long)]
    dry_run: bool,

    /// Write translator requests/responses to this directory
    #[arg(long, value_name = "DIR")]
    trace_dir: Option<PathBuf>,

    /// Value for the report's file_url (default: input path)
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let progress = ConsoleProgress::new(!args.quiet);

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let input = match args.input.clone() {
        Some(p) => p,
        None => {
            let mut cmd = Args::command();
            cmd.print_help().context("print help")?;
            eprintln!(
                "\n\nUSAGE:\n  transcript-translate <transcript.json> --translator-cmd ./translate.sh\n\nTIPS:\n  - Default config search: transcript-translate.toml (upwards), or set TRANSCRIPT_TRANSLATE_CONFIG.\n  - --dry-run writes the report without calling a translator.\n"
            );
            return Ok(());
        }
    };
    let output = args.output.clone().unwrap_or_else(|| default_output_for(&input));

    let workdir = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let (cfg, cfg_path) = resolve_config(args.config.clone(), &workdir).context("load config")?;

    progress.info(format!("Read transcript: {}", input.display()));
    let transcript = read_transcript(&input)?;
    transcript
        .validate()
        .with_context(|| format!("invalid transcript: {}", input.display()))?;
    progress.info(format!(
        "Segments: {}, words: {}",
        transcript.segments.len(),
        transcript.words.len()
    ));

    let translator = select_translator(&args, &cfg)?;
    let trace_dir = args.trace_dir.clone().or_else(|| cfg.trace_dir(&cfg_path));
    let trace = match trace_dir {
        Some(dir) => TraceWriter::new(dir, true)?,
        None => TraceWriter::disabled(),
    };
    if trace.is_enabled() {
        progress.info(format!("Trace: {}", trace.dir().display()));
    }
    let aligner = Aligner::new(TracingTranslator::new(translator, trace));

    let mapping = match aligner.align_detailed(&transcript.segments)? {
        Some(alignment) => {
            progress.alignment(&transcript.segments, &alignment);
            alignment.mapping
        }
        None => {
            progress.info("Transcript has no segments; nothing to translate");
            TranslationMapping::new()
        }
    };
    progress.info(format!("Translator calls: {}", aligner.translator().calls()));

    let file_url = args
        .source_url
        .clone()
        .unwrap_or_else(|| input.display().to_string());
    let report = build_report(&file_url, &transcript, &mapping, &cfg.report_options());
    write_report(&output, &report, cfg.pretty())?;
    progress.info(format!("Wrote report: {}", output.display()));
    Ok(())
}

fn select_translator(
    args: &Args,
    cfg: &transcript_translate::config::AppConfig,
) -> anyhow::Result<Box<dyn Translator>> {
    if args.dry_run {
        return Ok(Box::new(IdentityTranslator));
    }
    if let Some(prog) = args.translator_cmd.as_ref() {
        let t = cfg.translator_for(prog, args.translator_args.iter().cloned());
        return Ok(Box::new(t));
    }
    cfg.command_translator()
        .map(|t| Box::new(t) as Box<dyn Translator>)
        .context("no translator configured: pass --translator-cmd, set [translator] command, or use --dry-run")
}

fn read_transcript(path: &Path) -> anyhow::Result<Transcript> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read transcript: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse transcript json: {}", path.display()))
}

fn default_output_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string();
    input.with_file_name(format!("{stem}_translated.json"))
}

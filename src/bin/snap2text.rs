//! CLI binary for snap2text.
//!
//! A thin shim over the library crate: it maps CLI flags to `ClientConfig`,
//! drives one `UploadWorkflow` session and prints the result.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use snap2text::pipeline::input::declared_mime_for_path;
use snap2text::{
    copy, download, Alert, AlertLevel, ClientConfig, ExtractionResult, OcrClient, Osc52Clipboard,
    Phase, SelectedFile, SystemClipboard, UploadWorkflow, WorkflowObserver,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a spinner while the request is in flight, and one
/// coloured line per alert.
struct CliObserver {
    spinner: Mutex<Option<ProgressBar>>,
    show_spinner: bool,
    quiet: bool,
}

impl CliObserver {
    fn new(show_spinner: bool, quiet: bool) -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
            show_spinner,
            quiet,
        })
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl WorkflowObserver for CliObserver {
    fn on_phase_change(&self, from: Phase, _to: Phase) {
        if from == Phase::Extracting {
            self.stop_spinner();
        }
    }

    fn on_extraction_start(&self, file_name: &str, size: usize) {
        if !self.show_spinner {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Extracting");
        bar.set_message(format!("{file_name} ({})", human_size(size)));
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(bar);
        }
    }

    fn on_extraction_complete(&self, result: &ExtractionResult, elapsed_ms: u64) {
        self.stop_spinner();
        if self.quiet {
            return;
        }
        let stats = result.stats();
        eprintln!(
            "   {}",
            dim(&format!(
                "{} chars  /  {} words  —  {:.1}s",
                stats.chars,
                stats.words,
                elapsed_ms as f64 / 1000.0
            ))
        );
    }

    fn on_alert(&self, alert: &Alert) {
        // Errors end the run and are reported by main.
        if self.quiet || alert.level == AlertLevel::Error {
            return;
        }
        eprintln!("{}", render_alert(alert));
    }
}

fn render_alert(alert: &Alert) -> String {
    match alert.level {
        AlertLevel::Success => format!("{} {}", green("✔"), alert.message),
        AlertLevel::Warning => format!("{} {}", yellow("⚠"), alert.message),
        AlertLevel::Error => format!("{} {}", red("✘"), red(&alert.message)),
    }
}

fn human_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.1} MB", b / (KB * KB))
    } else if b >= KB {
        format!("{:.0} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print the text found in a screenshot
  snap2text screenshot.png

  # Save it next to the image as screenshot-ocr.txt
  snap2text screenshot.png -o .

  # Copy to the clipboard instead of printing
  snap2text --copy --no-print screenshot.png

  # Use a remote OCR server
  snap2text --endpoint https://ocr.example.com/extract-text shot.jpg

  # Structured output
  snap2text --json shot.png > result.json

  # Is the server up?
  snap2text --check

ENVIRONMENT VARIABLES:
  SNAP2TEXT_ENDPOINT   OCR endpoint URL (default http://localhost:8000/extract-text)
  SNAP2TEXT_TIMEOUT    Request timeout in seconds
  RUST_LOG             Override log filter (e.g. snap2text=debug)

CLIPBOARD:
  --copy uses pbcopy (macOS), clip (Windows), wl-copy (Wayland) or xclip (X11).
  If that fails the text is sent to the terminal with an OSC 52 escape, which
  most modern terminals (and tmux with set-clipboard on) accept, even over SSH.
"#;

/// Extract text from a screenshot using a remote OCR endpoint.
#[derive(Parser, Debug)]
#[command(
    name = "snap2text",
    version,
    about = "Extract text from screenshots and images via an OCR server",
    long_about = "Upload an image to an OCR server and print, copy or save the extracted text. \
The image must be an image/* type; everything else is refused before any upload.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file to extract text from.
    #[arg(required_unless_present = "check")]
    input: Option<PathBuf>,

    /// OCR endpoint URL.
    #[arg(long, env = "SNAP2TEXT_ENDPOINT", default_value = snap2text::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds.
    #[arg(long, env = "SNAP2TEXT_TIMEOUT", default_value_t = 60,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Connect timeout in seconds.
    #[arg(long, env = "SNAP2TEXT_CONNECT_TIMEOUT", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    connect_timeout: u64,

    /// Override the declared MIME type instead of guessing from the extension.
    #[arg(long)]
    mime: Option<String>,

    /// Save the text as <name>-ocr.txt in this directory.
    #[arg(short, long, env = "SNAP2TEXT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Copy the text to the clipboard.
    #[arg(long)]
    copy: bool,

    /// Do not print the text to stdout.
    #[arg(long)]
    no_print: bool,

    /// Print the image preview as a data: URL and exit without extracting.
    #[arg(long)]
    preview: bool,

    /// Output structured JSON (ExtractionResult) instead of plain text.
    #[arg(long)]
    json: bool,

    /// Only check that the OCR server is reachable.
    #[arg(long)]
    check: bool,

    /// Disable the busy spinner.
    #[arg(long, env = "SNAP2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SNAP2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the extracted text.
    #[arg(short, long, env = "SNAP2TEXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Client ───────────────────────────────────────────────────────────
    let config = ClientConfig::builder()
        .endpoint(&cli.endpoint)
        .timeout_secs(cli.timeout)
        .connect_timeout_secs(cli.connect_timeout)
        .build()
        .context("Invalid configuration")?;
    let client = OcrClient::new(&config).context("Failed to create OCR client")?;

    // ── Health check mode ────────────────────────────────────────────────
    if cli.check {
        let message = client
            .check_health()
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .context("OCR server is not healthy")?;
        println!("{} {}", green("✔"), message);
        return Ok(());
    }

    let Some(input) = cli.input.clone() else {
        bail!("No input file given");
    };

    // ── Select ───────────────────────────────────────────────────────────
    let mime = cli.mime.clone().or_else(|| declared_mime_for_path(&input));
    let file = SelectedFile::open_as(&input, mime)
        .await
        .with_context(|| format!("Failed to open {}", input.display()))?;

    let show_spinner = !cli.quiet && !cli.no_progress && !cli.json;
    let observer = CliObserver::new(show_spinner, cli.quiet);
    let mut workflow = UploadWorkflow::new().with_observer(observer.clone());

    if !workflow.select(file).await {
        let message = workflow
            .alert()
            .map(|a| a.message.clone())
            .unwrap_or_default();
        let declared = cli
            .mime
            .clone()
            .or_else(|| declared_mime_for_path(&input))
            .unwrap_or_else(|| "unknown".to_string());
        bail!("{message}\n'{}' has type {declared}.", input.display());
    }

    if cli.preview {
        let preview = workflow
            .preview()
            .context("Preview could not be generated")?;
        if !cli.quiet {
            if let Some((w, h)) = preview.dimensions {
                eprintln!("{}", dim(&format!("{w}×{h} px")));
            }
        }
        println!("{}", preview.data_url);
        return Ok(());
    }

    // ── Extract ──────────────────────────────────────────────────────────
    let phase = workflow.extract(&client).await;
    observer.stop_spinner();

    if cli.json {
        let json = if let Some(result) = workflow.last_result() {
            Some(serde_json::to_string_pretty(result))
        } else {
            workflow
                .last_error()
                .map(|error| serde_json::to_string_pretty(&serde_json::json!({ "error": error })))
        };
        if let Some(json) = json.transpose().context("Failed to serialise result")? {
            println!("{json}");
        }
    }

    match phase {
        Phase::ResultReady => {}
        Phase::FileSelected if workflow.last_result().is_some() => {
            // Valid call, blank text: the warning has been shown.
            return Ok(());
        }
        _ => {
            let message = workflow
                .alert()
                .map(|a| a.message.clone())
                .unwrap_or_else(|| "Extraction failed".to_string());
            bail!(message);
        }
    }

    let Some(result) = workflow.view().result.cloned() else {
        bail!("Extraction produced no visible result");
    };
    let base_name = workflow
        .file()
        .map(|f| f.base_name().to_string())
        .unwrap_or_default();

    if !cli.json && !cli.no_print {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !result.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if let Some(ref dir) = cli.output_dir {
        let path = download(&result.text, &base_name, dir)
            .await
            .context("Failed to save text")?;
        if !cli.quiet {
            eprintln!("{} Saved {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    if cli.copy {
        let primary = SystemClipboard::detect();
        let fallback = Osc52Clipboard::new(io::stderr());
        let used = copy(&result.text, &primary, &fallback).context("Copy failed")?;
        if !cli.quiet {
            eprintln!("{} Copied to {used}", green("✔"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn check_does_not_need_input() {
        let cli = Cli::try_parse_from(["snap2text", "--check"]).unwrap();
        assert!(cli.check);
        assert!(cli.input.is_none());
    }

    #[test]
    fn human_sizes() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(500 * 1024), "500 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
    }
}
